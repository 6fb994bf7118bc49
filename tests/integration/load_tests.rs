//! Integration tests for loading a dacpac into a schema model

use std::fs;

use dac2sql::dacpac::load_dacpac;
use dac2sql::model::{ObjectKind, QualifiedName};
use dac2sql::Dac2SqlError;
use tempfile::TempDir;

use crate::common::{sales_dacpac, DacpacFixture, FixtureElement, TestContext};

#[test]
fn test_loads_named_elements_in_document_order() {
    let ctx = TestContext::with_dacpac(&sales_dacpac(), "Sales.dacpac");
    let model = load_dacpac(&ctx.dacpac_path).unwrap();

    let kinds: Vec<String> = model.objects().map(|o| o.kind.to_string()).collect();
    assert_eq!(
        kinds,
        vec![
            "SqlSchema",
            "SqlTable",
            "SqlTable",
            "SqlPrimaryKeyConstraint",
            "SqlForeignKeyConstraint",
            "SqlIndex",
            "SqlDefaultConstraint",
            "SqlExtendedProperty",
            "SqlView",
            "SqlProcedure",
            "SqlUser",
            "SqlFilegroup",
        ]
    );
}

#[test]
fn test_children_are_linked_to_their_table() {
    let ctx = TestContext::with_dacpac(&sales_dacpac(), "Sales.dacpac");
    let model = load_dacpac(&ctx.dacpac_path).unwrap();

    let orders = model
        .find_object(&QualifiedName::new(["dbo", "Orders"]))
        .unwrap();
    let children: Vec<&ObjectKind> = model.children(orders).map(|c| &c.kind).collect();
    assert_eq!(
        children,
        vec![
            &ObjectKind::PrimaryKeyConstraint,
            &ObjectKind::ForeignKeyConstraint,
            &ObjectKind::Index,
            &ObjectKind::DefaultConstraint,
            &ObjectKind::ExtendedProperty,
        ]
    );

    let customers = model
        .find_object(&QualifiedName::new(["dbo", "Customers"]))
        .unwrap();
    assert_eq!(model.children(customers).count(), 0);
}

#[test]
fn test_trigger_on_view_is_linked() {
    let fixture = DacpacFixture::new()
        .element(
            FixtureElement::new("SqlView", "[dbo].[V]")
                .script("QueryScript", "SELECT 1 AS [One]"),
        )
        .element(
            FixtureElement::new("SqlDmlTrigger", "[dbo].[trg_V]")
                .reference("Parent", "[dbo].[V]")
                .property("IsInsertTrigger", "True")
                .property("SqlTriggerType", "3")
                .script("BodyScript", "SET NOCOUNT ON;"),
        );
    let ctx = TestContext::with_dacpac(&fixture, "Views.dacpac");
    let model = load_dacpac(&ctx.dacpac_path).unwrap();

    let view = model.find_object(&QualifiedName::new(["dbo", "V"])).unwrap();
    let names: Vec<String> = model.children(view).map(|c| c.name.to_string()).collect();
    assert_eq!(names, vec!["[dbo].[trg_V]"]);
}

#[test]
fn test_archive_without_model_xml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Empty.dacpac");
    {
        use std::io::Write;
        let mut zip = zip::ZipWriter::new(fs::File::create(&path).unwrap());
        zip.start_file("Origin.xml", zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(b"<DacOrigin />").unwrap();
        zip.finish().unwrap();
    }

    let err = load_dacpac(&path).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<Dac2SqlError>(),
        Some(Dac2SqlError::ModelXmlMissing { .. })
    ));
}

#[test]
fn test_file_that_is_not_a_dacpac() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Broken.dacpac");
    fs::write(&path, "plain text").unwrap();

    let err = load_dacpac(&path).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<Dac2SqlError>(),
        Some(Dac2SqlError::ZipError { .. })
    ));
}
