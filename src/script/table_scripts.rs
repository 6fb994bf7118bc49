//! Table, column, index and constraint script rendering.
//!
//! Produces SSDT-style T-SQL from the properties and relationships that
//! model.xml records for tables and the objects hanging off them.

use crate::model::{bracket, ModelObject, ObjectKind, QualifiedName};

use super::ScriptError;

/// Write a `CREATE TABLE` statement from the table's `Columns` relationship.
pub(crate) fn script_table(table: &ModelObject) -> Result<String, ScriptError> {
    let name = require_name(table)?;
    let columns: Vec<String> = table
        .relationship("Columns")
        .iter()
        .filter_map(|r| r.inline())
        .map(script_column)
        .collect();

    if columns.is_empty() {
        return Err(ScriptError::missing_relationship(table, "Columns"));
    }

    Ok(format!(
        "CREATE TABLE {} (\n    {}\n);",
        name,
        columns.join(",\n    ")
    ))
}

/// Render one column definition (without indentation or trailing comma).
pub(crate) fn script_column(column: &ModelObject) -> String {
    let name = bracket(column.name.object_name().unwrap_or_default());

    if matches!(&column.kind, ObjectKind::Other(t) if t == "SqlComputedColumn") {
        let expression = column.property("ExpressionScript").unwrap_or_default();
        let mut sql = format!("{} AS {}", name, parenthesize(expression));
        if column.flag("IsPersisted") {
            sql.push_str(" PERSISTED");
        }
        return sql;
    }

    let mut sql = name;
    if let Some(data_type) = type_of(column, "TypeSpecifier") {
        sql.push(' ');
        sql.push_str(&data_type);
    }
    if let Some(collation) = column.property("Collation") {
        sql.push_str(" COLLATE ");
        sql.push_str(collation);
    }
    if column.flag("IsIdentity") {
        sql.push_str(&format!(
            " IDENTITY ({}, {})",
            column.property("IdentitySeed").unwrap_or("1"),
            column.property("IdentityIncrement").unwrap_or("1")
        ));
    }
    // Model default for IsNullable is True; only NOT NULL columns record it
    if column.property("IsNullable").is_some() && !column.flag("IsNullable") {
        sql.push_str(" NOT NULL");
    } else {
        sql.push_str(" NULL");
    }
    sql
}

/// Render the type held by a relationship such as `TypeSpecifier` or `Type`.
///
/// The entry is usually an inline `SqlTypeSpecifier` whose own `Type` relationship
/// references a built-in (`[nvarchar]`) or user-defined (`[dbo].[Phone]`) type.
pub(crate) fn type_of(object: &ModelObject, relationship: &str) -> Option<String> {
    let entry = object.relationship(relationship).first()?;
    match entry.inline() {
        Some(spec) => {
            let base = spec.reference("Type")?;
            Some(format_type(base, spec))
        }
        None => entry.name().map(|name| format_type(name, object)),
    }
}

fn format_type(base: &QualifiedName, spec: &ModelObject) -> String {
    let mut sql = if base.len() == 1 {
        base.object_name().unwrap_or_default().to_uppercase()
    } else {
        base.to_string()
    };

    if spec.flag("IsMax") {
        sql.push_str(" (MAX)");
    } else if let Some(length) = spec.property("Length") {
        sql.push_str(&format!(" ({})", length));
    } else if let Some(precision) = spec.property("Precision") {
        sql.push_str(&format!(
            " ({}, {})",
            precision,
            spec.property("Scale").unwrap_or("0")
        ));
    } else if let Some(scale) = spec.property("Scale") {
        sql.push_str(&format!(" ({})", scale));
    }
    sql
}

/// Write a `CREATE INDEX` statement.
pub(crate) fn script_index(index: &ModelObject) -> Result<String, ScriptError> {
    let name = require_local_name(index)?;
    let table = index
        .reference("IndexedObject")
        .ok_or_else(|| ScriptError::missing_relationship(index, "IndexedObject"))?;

    let mut sql = String::from("CREATE ");
    if index.flag("IsUnique") {
        sql.push_str("UNIQUE ");
    }
    sql.push_str(if index.flag("IsClustered") {
        "CLUSTERED"
    } else {
        "NONCLUSTERED"
    });
    sql.push_str(&format!(
        " INDEX {}\n    ON {}({})",
        bracket(name),
        table,
        column_specifications(index).join(", ")
    ));

    let included: Vec<String> = index
        .relationship("IncludedColumns")
        .iter()
        .filter_map(|r| r.name())
        .map(column_name)
        .collect();
    if !included.is_empty() {
        sql.push_str(&format!("\n    INCLUDE({})", included.join(", ")));
    }

    if let Some(filter) = index.property("FilterPredicate") {
        sql.push_str(&format!("\n    WHERE {}", filter.trim()));
    }

    sql.push(';');
    Ok(sql)
}

/// Write `ALTER TABLE ... ADD CONSTRAINT` for a primary key or unique constraint.
pub(crate) fn script_key_constraint(constraint: &ModelObject) -> Result<String, ScriptError> {
    let table = defining_table(constraint)?;

    let (keyword, clustered) = match constraint.kind {
        // Primary keys are clustered unless the model says otherwise; unique constraints the reverse
        ObjectKind::PrimaryKeyConstraint => (
            "PRIMARY KEY",
            constraint.property("IsClustered").is_none() || constraint.flag("IsClustered"),
        ),
        _ => ("UNIQUE", constraint.flag("IsClustered")),
    };

    Ok(format!(
        "ALTER TABLE {}\n    {}{} {} ({});",
        table,
        add_constraint(constraint),
        keyword,
        if clustered { "CLUSTERED" } else { "NONCLUSTERED" },
        column_specifications(constraint).join(", ")
    ))
}

/// Write `ALTER TABLE ... ADD CONSTRAINT ... FOREIGN KEY`.
pub(crate) fn script_foreign_key(constraint: &ModelObject) -> Result<String, ScriptError> {
    let table = defining_table(constraint)?;
    let foreign_table = constraint
        .reference("ForeignTable")
        .ok_or_else(|| ScriptError::missing_relationship(constraint, "ForeignTable"))?;

    let columns = referenced_columns(constraint, "Columns");
    let foreign_columns = referenced_columns(constraint, "ForeignColumns");

    let mut sql = format!(
        "ALTER TABLE {}\n    {}FOREIGN KEY ({}) REFERENCES {} ({})",
        table,
        add_constraint(constraint),
        columns.join(", "),
        foreign_table,
        foreign_columns.join(", ")
    );
    if let Some(action) = constraint.property("DeleteAction").and_then(referential_action) {
        sql.push_str(&format!(" ON DELETE {}", action));
    }
    if let Some(action) = constraint.property("UpdateAction").and_then(referential_action) {
        sql.push_str(&format!(" ON UPDATE {}", action));
    }
    sql.push(';');
    Ok(sql)
}

/// Write `ALTER TABLE ... ADD CONSTRAINT ... CHECK`.
pub(crate) fn script_check_constraint(constraint: &ModelObject) -> Result<String, ScriptError> {
    let table = defining_table(constraint)?;
    let expression = constraint
        .property("CheckExpressionScript")
        .ok_or_else(|| ScriptError::missing_property(constraint, "CheckExpressionScript"))?;

    Ok(format!(
        "ALTER TABLE {}\n    {}CHECK {};",
        table,
        add_constraint(constraint),
        parenthesize(expression)
    ))
}

/// Write `ALTER TABLE ... ADD CONSTRAINT ... DEFAULT ... FOR`.
pub(crate) fn script_default_constraint(constraint: &ModelObject) -> Result<String, ScriptError> {
    let table = defining_table(constraint)?;
    let expression = constraint
        .property("DefaultExpressionScript")
        .ok_or_else(|| ScriptError::missing_property(constraint, "DefaultExpressionScript"))?;
    let column = constraint
        .reference("ForColumn")
        .ok_or_else(|| ScriptError::missing_relationship(constraint, "ForColumn"))?;

    Ok(format!(
        "ALTER TABLE {}\n    {}DEFAULT {} FOR {};",
        table,
        add_constraint(constraint),
        parenthesize(expression),
        column_name(column)
    ))
}

pub(crate) fn require_name(object: &ModelObject) -> Result<&QualifiedName, ScriptError> {
    if object.name.is_empty() {
        Err(ScriptError::Unnamed {
            kind: object.kind.to_string(),
        })
    } else {
        Ok(&object.name)
    }
}

pub(crate) fn require_local_name(object: &ModelObject) -> Result<&str, ScriptError> {
    require_name(object)?
        .object_name()
        .ok_or_else(|| ScriptError::Unnamed {
            kind: object.kind.to_string(),
        })
}

/// `[col]` for a column reference such as `[dbo].[Orders].[col]`.
pub(crate) fn column_name(reference: &QualifiedName) -> String {
    bracket(reference.object_name().unwrap_or_default())
}

/// Wrap an expression in parentheses unless it already is wrapped as a whole.
pub(crate) fn parenthesize(expression: &str) -> String {
    let trimmed = expression.trim();
    if is_parenthesized(trimmed) {
        trimmed.to_string()
    } else {
        format!("({})", trimmed)
    }
}

fn is_parenthesized(expression: &str) -> bool {
    if !expression.starts_with('(') || !expression.ends_with(')') {
        return false;
    }
    let mut depth = 0usize;
    for (i, c) in expression.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 && i != expression.len() - 1 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

/// `ADD CONSTRAINT [name] `, or just `ADD ` for a constraint the server names itself.
fn add_constraint(constraint: &ModelObject) -> String {
    match constraint.name.object_name() {
        Some(name) => format!("ADD CONSTRAINT {} ", bracket(name)),
        None => "ADD ".to_string(),
    }
}

fn defining_table(constraint: &ModelObject) -> Result<&QualifiedName, ScriptError> {
    constraint
        .reference("DefiningTable")
        .ok_or_else(|| ScriptError::missing_relationship(constraint, "DefiningTable"))
}

fn column_specifications(object: &ModelObject) -> Vec<String> {
    object
        .relationship("ColumnSpecifications")
        .iter()
        .filter_map(|r| r.inline())
        .filter_map(|spec| {
            let column = spec.reference("Column")?;
            let descending = spec.flag("IsDescending")
                || spec
                    .property("IsAscending")
                    .is_some_and(|v| v.eq_ignore_ascii_case("false"));
            Some(format!(
                "{} {}",
                column_name(column),
                if descending { "DESC" } else { "ASC" }
            ))
        })
        .collect()
}

fn referenced_columns(object: &ModelObject, relationship: &str) -> Vec<String> {
    object
        .relationship(relationship)
        .iter()
        .filter_map(|r| r.name())
        .map(column_name)
        .collect()
}

/// Map a model.xml referential action (numeric or named) to its T-SQL clause.
fn referential_action(value: &str) -> Option<&'static str> {
    match value {
        "1" | "Cascade" => Some("CASCADE"),
        "2" | "SetNull" => Some("SET NULL"),
        "3" | "SetDefault" => Some("SET DEFAULT"),
        _ => None,
    }
}
