//! Aggregation tests driven by a stub extractor

use std::collections::HashSet;

use dac2sql::extract::{DefinitionAggregator, ObjectCategory, SchemaDefinition};
use dac2sql::model::{ModelObject, ObjectKind, QualifiedName, SchemaModel};
use dac2sql::script::ScriptError;

fn object(kind: ObjectKind, name: &str) -> ModelObject {
    ModelObject::new(kind, QualifiedName::parse(name))
}

/// Scripts an object as `<local name>` unless its `Script` property says `fail`.
fn stub(object: &ModelObject) -> Result<String, ScriptError> {
    if object.property("Script") == Some("fail") {
        return Err(ScriptError::Unsupported {
            kind: object.kind.to_string(),
        });
    }
    Ok(object.name.object_name().unwrap_or("?").to_string())
}

fn aggregate(model: &SchemaModel) -> Vec<SchemaDefinition> {
    DefinitionAggregator::new(&stub).aggregate(model).0
}

/// Orders table with a PK, two indexes, a trigger and an extended property,
/// enumerated with the children before and after the table.
fn orders_model() -> SchemaModel {
    let mut model = SchemaModel::new();
    let trigger = model.add_object(object(ObjectKind::DmlTrigger, "[dbo].[trg_Orders]"));
    let table = model.add_object(object(ObjectKind::Table, "[dbo].[Orders]"));
    let pk = model.add_object(object(ObjectKind::PrimaryKeyConstraint, "[dbo].[PK_Orders]"));
    let ix_b = model.add_object(object(ObjectKind::Index, "[dbo].[Orders].[IX_B]"));
    let ix_a = model.add_object(object(ObjectKind::Index, "[dbo].[Orders].[IX_A]"));
    let prop = model.add_object(object(
        ObjectKind::ExtendedProperty,
        "[SqlTableBase].[dbo].[Orders].[MS_Description]",
    ));
    for child in [pk, ix_b, ix_a, trigger, prop] {
        model.add_child(table, child);
    }
    model
}

#[test]
fn test_parent_first_then_children_in_enumeration_order() {
    let definitions = aggregate(&orders_model());
    assert_eq!(definitions.len(), 1);

    let orders = &definitions[0];
    assert_eq!(orders.schema, "dbo");
    assert_eq!(orders.object_name, "Orders");
    assert_eq!(orders.object_type, ObjectCategory::Tables);
    assert_eq!(
        orders.definitions,
        vec!["Orders", "PK_Orders", "IX_B", "IX_A", "trg_Orders", "MS_Description"]
    );
}

#[test]
fn test_no_orphan_children() {
    let definitions = aggregate(&orders_model());
    let misc: Vec<_> = definitions
        .iter()
        .filter(|d| d.object_type == ObjectCategory::Misc)
        .collect();
    assert!(misc.is_empty(), "child kinds leaked into Misc: {misc:?}");
}

#[test]
fn test_child_failures_are_independent() {
    let mut model = SchemaModel::new();
    let table = model
        .add_object(object(ObjectKind::Table, "[dbo].[Orders]").with_property("Script", "fail"));
    let broken = model.add_object(
        object(ObjectKind::Index, "[dbo].[Orders].[IX_Broken]").with_property("Script", "fail"),
    );
    let ok = model.add_object(object(ObjectKind::Index, "[dbo].[Orders].[IX_Ok]"));
    model.add_child(table, broken);
    model.add_child(table, ok);

    let (definitions, stats) = DefinitionAggregator::new(&stub).aggregate(&model);
    assert_eq!(definitions.len(), 1);
    assert_eq!(definitions[0].definitions, vec!["IX_Ok"]);
    assert_eq!(stats.skipped, 2);
}

#[test]
fn test_non_child_children_are_not_absorbed() {
    let mut model = SchemaModel::new();
    let table = model.add_object(object(ObjectKind::Table, "[dbo].[Orders]"));
    let default = model.add_object(object(
        ObjectKind::DefaultConstraint,
        "[dbo].[DF_Orders_Date]",
    ));
    model.add_child(table, default);

    let definitions = aggregate(&model);
    assert_eq!(definitions.len(), 2);
    assert_eq!(definitions[0].definitions, vec!["Orders"]);
    assert_eq!(definitions[1].object_type, ObjectCategory::Misc);
    assert_eq!(definitions[1].definitions, vec!["DF_Orders_Date"]);
}

#[test]
fn test_table_and_view_keys_are_unique() {
    let mut model = SchemaModel::new();
    for name in [
        "[dbo].[Orders]",
        "[sales].[Orders]",
        "[dbo].[Orders]",
        "[dbo].[Customers]",
    ] {
        model.add_object(object(ObjectKind::Table, name));
    }
    model.add_object(object(ObjectKind::View, "[dbo].[Orders]"));
    model.add_object(object(ObjectKind::View, "[dbo].[Orders]"));

    let definitions = aggregate(&model);
    let keys: HashSet<_> = definitions.iter().map(SchemaDefinition::key).collect();
    assert_eq!(keys.len(), definitions.len());
    assert_eq!(definitions.len(), 4);
}

#[test]
fn test_procedures_are_one_fragment_per_group() {
    let mut model = SchemaModel::new();
    model.add_object(object(ObjectKind::Procedure, "[dbo].[DoThing]"));
    model.add_object(object(ObjectKind::Procedure, "[dbo].[DoThing]"));

    let definitions = aggregate(&model);
    assert_eq!(definitions.len(), 2);
    assert!(definitions.iter().all(|d| d.definitions.len() == 1));
}

#[test]
fn test_name_defaults() {
    let mut model = SchemaModel::new();
    model.add_object(object(ObjectKind::Procedure, "[NoSchema]"));
    model.add_object(ModelObject::new(ObjectKind::View, QualifiedName::empty()));

    let definitions = aggregate(&model);
    assert_eq!(definitions[0].schema, "dbo");
    assert_eq!(definitions[0].object_name, "NoSchema");
    assert_eq!(definitions[1].schema, "dbo");
    assert_eq!(definitions[1].object_name, "UnknownObject");
}
