//! Integration tests for extracting a dacpac to script files
//!
//! Each test writes a fixture dacpac to a temp directory, runs the full
//! load → aggregate → write pipeline and inspects the produced tree.

use std::fs;

use dac2sql::{extract_dacpac, Dac2SqlError, ExtractOptions};
use pretty_assertions::assert_eq;

use crate::common::{
    column, column_spec, list_files, read, sales_dacpac, DacpacFixture, FixtureElement, TestContext,
};

// ============================================================================
// Layout
// ============================================================================

#[test]
fn test_output_tree() {
    let ctx = TestContext::with_dacpac(&sales_dacpac(), "Sales.dacpac");
    let summary = extract_dacpac(ctx.options()).unwrap();

    assert_eq!(summary.output_root, ctx.output_dir.join("Sales"));
    assert_eq!(
        list_files(&ctx.output_dir),
        vec![
            "Sales/Security/alice.sql",
            "Sales/Security/sales.sql",
            "Sales/dbo/Misc/DF_Orders_OrderDate.sql",
            "Sales/dbo/StoredProcedures/GetOrder.sql",
            "Sales/dbo/Tables/Customers.sql",
            "Sales/dbo/Tables/Orders.sql",
            "Sales/sales/Views/RecentOrders.sql",
        ]
    );
    assert_eq!(summary.files.len(), 7);
}

#[test]
fn test_database_name_overrides_file_stem() {
    let ctx = TestContext::with_dacpac(&sales_dacpac(), "Sales.dacpac");
    let summary = extract_dacpac(ExtractOptions {
        database_name: Some("Reporting".to_string()),
        ..ctx.options()
    })
    .unwrap();

    assert_eq!(summary.output_root, ctx.output_dir.join("Reporting"));
    assert!(ctx
        .output_dir
        .join("Reporting/dbo/Tables/Orders.sql")
        .is_file());
}

// ============================================================================
// Content
// ============================================================================

#[test]
fn test_table_file_holds_table_and_children() {
    let ctx = TestContext::with_dacpac(&sales_dacpac(), "Sales.dacpac");
    extract_dacpac(ctx.options()).unwrap();

    assert_eq!(
        read(&ctx.output_dir, "Sales/dbo/Tables/Orders.sql"),
        "CREATE TABLE [dbo].[Orders] (
    [Id] INT IDENTITY (1, 1) NOT NULL,
    [CustomerId] INT NULL,
    [OrderDate] DATETIME2 NULL
);
GO
ALTER TABLE [dbo].[Orders]
    ADD CONSTRAINT [PK_Orders] PRIMARY KEY CLUSTERED ([Id] ASC);
GO
ALTER TABLE [dbo].[Orders]
    ADD CONSTRAINT [FK_Orders_Customers] FOREIGN KEY ([CustomerId]) REFERENCES [dbo].[Customers] ([Id]);
GO
CREATE NONCLUSTERED INDEX [IX_Orders_OrderDate]
    ON [dbo].[Orders]([OrderDate] ASC);
GO
EXECUTE sp_addextendedproperty @name = N'MS_Description', @value = N'When the order was placed', @level0type = N'SCHEMA', @level0name = N'dbo', @level1type = N'TABLE', @level1name = N'Orders', @level2type = N'COLUMN', @level2name = N'OrderDate';
"
    );
}

#[test]
fn test_default_constraint_is_standalone() {
    let ctx = TestContext::with_dacpac(&sales_dacpac(), "Sales.dacpac");
    extract_dacpac(ctx.options()).unwrap();

    assert_eq!(
        read(&ctx.output_dir, "Sales/dbo/Misc/DF_Orders_OrderDate.sql"),
        "ALTER TABLE [dbo].[Orders]\n    ADD CONSTRAINT [DF_Orders_OrderDate] DEFAULT (sysutcdatetime()) FOR [OrderDate];\n"
    );
}

#[test]
fn test_programmability_uses_header_annotation() {
    let ctx = TestContext::with_dacpac(&sales_dacpac(), "Sales.dacpac");
    extract_dacpac(ctx.options()).unwrap();

    assert_eq!(
        read(&ctx.output_dir, "Sales/sales/Views/RecentOrders.sql"),
        "CREATE VIEW [sales].[RecentOrders]\nAS\nSELECT [Id], [OrderDate] FROM [dbo].[Orders] WHERE [OrderDate] > DATEADD(DAY, -7, SYSUTCDATETIME())\n"
    );
    assert_eq!(
        read(&ctx.output_dir, "Sales/dbo/StoredProcedures/GetOrder.sql"),
        "CREATE PROCEDURE [dbo].[GetOrder]\n    @Id INT\nAS\nSELECT * FROM [dbo].[Orders] WHERE [Id] = @Id;\n"
    );
}

#[test]
fn test_security_principals() {
    let ctx = TestContext::with_dacpac(&sales_dacpac(), "Sales.dacpac");
    extract_dacpac(ctx.options()).unwrap();

    assert_eq!(
        read(&ctx.output_dir, "Sales/Security/sales.sql"),
        "CREATE SCHEMA [sales]\n    AUTHORIZATION [dbo];\n"
    );
    assert_eq!(
        read(&ctx.output_dir, "Sales/Security/alice.sql"),
        "CREATE USER [alice] WITHOUT LOGIN WITH DEFAULT_SCHEMA = [sales];\n"
    );
}

#[test]
fn test_unnamed_constraints_stay_with_their_table() {
    let fixture = DacpacFixture::new()
        .element(
            FixtureElement::new("SqlTable", "[dbo].[Orders]")
                .inline(
                    "Columns",
                    column("[dbo].[Orders]", "Id", "int").property("IsNullable", "False"),
                )
                .inline("Columns", column("[dbo].[Orders]", "OrderDate", "datetime2")),
        )
        .element(
            FixtureElement::unnamed("SqlPrimaryKeyConstraint")
                .reference("DefiningTable", "[dbo].[Orders]")
                .inline("ColumnSpecifications", column_spec("[dbo].[Orders].[Id]")),
        )
        .element(
            FixtureElement::unnamed("SqlDefaultConstraint")
                .reference("DefiningTable", "[dbo].[Orders]")
                .reference("ForColumn", "[dbo].[Orders].[OrderDate]")
                .script("DefaultExpressionScript", "(sysutcdatetime())"),
        );
    let ctx = TestContext::with_dacpac(&fixture, "Orders.dacpac");
    let summary = extract_dacpac(ctx.options()).unwrap();

    assert_eq!(list_files(&ctx.output_dir), vec!["Orders/dbo/Tables/Orders.sql"]);
    assert_eq!(
        read(&ctx.output_dir, "Orders/dbo/Tables/Orders.sql"),
        "CREATE TABLE [dbo].[Orders] (
    [Id] INT NOT NULL,
    [OrderDate] DATETIME2 NULL
);
GO
ALTER TABLE [dbo].[Orders]
    ADD PRIMARY KEY CLUSTERED ([Id] ASC);
GO
ALTER TABLE [dbo].[Orders]
    ADD DEFAULT (sysutcdatetime()) FOR [OrderDate];
"
    );
    assert_eq!(summary.stats.deferred_children, 2);
}

#[test]
fn test_script_text_is_written_verbatim() {
    let fixture = DacpacFixture::new().element(
        FixtureElement::new("SqlProcedure", "[dbo].[Greet]")
            .property("BodyScript", "SELECT 'hello\r\nworld'   \r\n-- done  ")
            .header("CREATE PROCEDURE [dbo].[Greet]\r\nAS"),
    );
    let ctx = TestContext::with_dacpac(&fixture, "Greet.dacpac");
    extract_dacpac(ctx.options()).unwrap();

    assert_eq!(
        read(&ctx.output_dir, "Greet/dbo/StoredProcedures/Greet.sql"),
        "CREATE PROCEDURE [dbo].[Greet]\r\nAS\nSELECT 'hello\r\nworld'   \r\n-- done  \n"
    );
}

#[test]
fn test_dot_names_do_not_leave_output_root() {
    let fixture = DacpacFixture::new().element(
        FixtureElement::new("SqlTable", "[..].[T]").inline(
            "Columns",
            column("[..].[T]", "Id", "int").property("IsNullable", "False"),
        ),
    );
    let ctx = TestContext::with_dacpac(&fixture, "Dots.dacpac");
    let summary = extract_dacpac(ctx.options()).unwrap();

    assert_eq!(list_files(&ctx.output_dir), vec!["Dots/__/Tables/T.sql"]);
    assert!(summary
        .files
        .iter()
        .all(|f| f.starts_with(&summary.output_root)));
}

// ============================================================================
// Runs
// ============================================================================

#[test]
fn test_summary_counts() {
    let ctx = TestContext::with_dacpac(&sales_dacpac(), "Sales.dacpac");
    let summary = extract_dacpac(ctx.options()).unwrap();

    // 12 named elements; SqlDatabaseOptions is unnamed and never reaches the model
    assert_eq!(summary.stats.objects_visited, 12);
    // PK, FK, index and extended property are only scripted through their table
    assert_eq!(summary.stats.deferred_children, 4);
    // The filegroup has no script
    assert_eq!(summary.stats.skipped, 1);
    assert_eq!(summary.definitions, 7);
}

#[test]
fn test_parallel_and_repeated_runs_are_identical() {
    let ctx = TestContext::with_dacpac(&sales_dacpac(), "Sales.dacpac");

    let snapshot = |ctx: &TestContext| -> Vec<(String, String)> {
        list_files(&ctx.output_dir)
            .into_iter()
            .map(|f| (read(&ctx.output_dir, &f), f))
            .collect()
    };

    extract_dacpac(ctx.options()).unwrap();
    let first = snapshot(&ctx);

    extract_dacpac(ctx.options()).unwrap();
    let second = snapshot(&ctx);

    fs::remove_dir_all(&ctx.output_dir).unwrap();
    extract_dacpac(ExtractOptions {
        parallel_writes: true,
        ..ctx.options()
    })
    .unwrap();
    let parallel = snapshot(&ctx);

    assert_eq!(first, second);
    assert_eq!(first, parallel);
}

#[test]
fn test_missing_dacpac_is_reported() {
    let ctx = TestContext::with_dacpac(&sales_dacpac(), "Sales.dacpac");
    let err = extract_dacpac(ExtractOptions {
        dacpac_path: ctx.dacpac_path.with_file_name("Missing.dacpac"),
        ..ctx.options()
    })
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<Dac2SqlError>(),
        Some(Dac2SqlError::DacpacReadError { .. })
    ));
    assert!(!ctx.output_dir.exists());
}
