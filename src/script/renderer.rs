//! Script rendering for objects loaded from a dacpac model

use crate::model::{bracket, ModelObject, ObjectKind, QualifiedName, SchemaModel};

use super::table_scripts::{
    require_local_name, require_name, script_check_constraint, script_default_constraint,
    script_foreign_key, script_index, script_key_constraint, script_table, type_of,
};
use super::{ScriptError, ScriptExtractor};

/// Annotation DacFx attaches to programmable objects, carrying their CREATE header.
const SYS_COMMENTS_ANNOTATION: &str = "SysCommentsObjectAnnotation";

/// Renders T-SQL for model objects from the properties and relationships in model.xml.
///
/// Extended properties need to look at the object they describe, so the renderer
/// borrows the whole model.
pub struct DacpacScriptRenderer<'m> {
    model: &'m SchemaModel,
}

impl<'m> DacpacScriptRenderer<'m> {
    pub fn new(model: &'m SchemaModel) -> Self {
        Self { model }
    }
}

impl ScriptExtractor for DacpacScriptRenderer<'_> {
    fn try_extract(&self, object: &ModelObject) -> Result<String, ScriptError> {
        match &object.kind {
            ObjectKind::Table => script_table(object),
            ObjectKind::View => script_view(object),
            ObjectKind::Procedure => script_procedure(object),
            ObjectKind::ScalarFunction
            | ObjectKind::MultiStatementTableValuedFunction
            | ObjectKind::InlineTableValuedFunction => script_function(object),
            ObjectKind::DmlTrigger => script_trigger(object),
            ObjectKind::Index => script_index(object),
            ObjectKind::PrimaryKeyConstraint | ObjectKind::UniqueConstraint => {
                script_key_constraint(object)
            }
            ObjectKind::ForeignKeyConstraint => script_foreign_key(object),
            ObjectKind::CheckConstraint => script_check_constraint(object),
            ObjectKind::DefaultConstraint => script_default_constraint(object),
            ObjectKind::ExtendedProperty => script_extended_property(self.model, object),
            ObjectKind::Schema => script_schema(object),
            ObjectKind::User => script_user(object),
            ObjectKind::Role => script_role(object),
            ObjectKind::Sequence => script_sequence(object),
            ObjectKind::TableType | ObjectKind::Synonym | ObjectKind::Other(_) => {
                Err(ScriptError::unsupported(object))
            }
        }
    }
}

// =============================================================================
// Programmability
// =============================================================================

fn script_view(view: &ModelObject) -> Result<String, ScriptError> {
    let name = require_name(view)?;
    let query = view
        .property("QueryScript")
        .ok_or_else(|| ScriptError::missing_property(view, "QueryScript"))?;
    let header = header_contents(view).unwrap_or_else(|| format!("CREATE VIEW {}\nAS", name));
    Ok(join_header(&header, query))
}

fn script_procedure(procedure: &ModelObject) -> Result<String, ScriptError> {
    let name = require_name(procedure)?;
    let body = procedure
        .property("BodyScript")
        .ok_or_else(|| ScriptError::missing_property(procedure, "BodyScript"))?;

    let header = header_contents(procedure).unwrap_or_else(|| {
        let parameters = script_parameters(procedure);
        if parameters.is_empty() {
            format!("CREATE PROCEDURE {}\nAS", name)
        } else {
            format!(
                "CREATE PROCEDURE {}\n    {}\nAS",
                name,
                parameters.join(",\n    ")
            )
        }
    });
    Ok(join_header(&header, body))
}

/// Functions need the header annotation; their RETURNS clause is not recoverable otherwise.
fn script_function(function: &ModelObject) -> Result<String, ScriptError> {
    let name = require_name(function)?;
    let header = header_contents(function).ok_or_else(|| ScriptError::MissingHeader {
        object: name.to_string(),
    })?;

    let body = function
        .relationship("FunctionBody")
        .iter()
        .filter_map(|r| r.inline())
        .find_map(|implementation| implementation.property("BodyScript"))
        .or_else(|| function.property("BodyScript"))
        .ok_or_else(|| ScriptError::missing_property(function, "BodyScript"))?;

    Ok(join_header(&header, body))
}

fn script_trigger(trigger: &ModelObject) -> Result<String, ScriptError> {
    let name = require_name(trigger)?;
    let body = trigger
        .property("BodyScript")
        .ok_or_else(|| ScriptError::missing_property(trigger, "BodyScript"))?;

    let header = match header_contents(trigger) {
        Some(header) => header,
        None => {
            let parent = trigger
                .reference("Parent")
                .ok_or_else(|| ScriptError::missing_relationship(trigger, "Parent"))?;
            let events: Vec<&str> = [
                ("IsInsertTrigger", "INSERT"),
                ("IsUpdateTrigger", "UPDATE"),
                ("IsDeleteTrigger", "DELETE"),
            ]
            .iter()
            .filter(|(flag, _)| trigger.flag(flag))
            .map(|(_, event)| *event)
            .collect();
            if events.is_empty() {
                return Err(ScriptError::missing_property(trigger, "IsInsertTrigger"));
            }
            // SqlTriggerType 3 is INSTEAD OF; 2 (and anything else) is AFTER
            let timing = if trigger.property("SqlTriggerType") == Some("3") {
                "INSTEAD OF"
            } else {
                "AFTER"
            };
            format!(
                "CREATE TRIGGER {}\n    ON {}\n    {} {}\nAS",
                name,
                parent,
                timing,
                events.join(", ")
            )
        }
    };
    Ok(join_header(&header, body))
}

fn script_parameters(routine: &ModelObject) -> Vec<String> {
    routine
        .relationship("Parameters")
        .iter()
        .filter_map(|r| r.inline())
        .map(|parameter| {
            let mut sql = parameter
                .name
                .object_name()
                .unwrap_or_default()
                .to_string();
            if let Some(data_type) = type_of(parameter, "Type") {
                sql.push(' ');
                sql.push_str(&data_type);
            }
            if let Some(default) = parameter.property("DefaultExpressionScript") {
                sql.push_str(" = ");
                sql.push_str(default.trim());
            }
            if parameter.flag("IsOutput") {
                sql.push_str(" OUTPUT");
            }
            if parameter.flag("IsReadOnly") {
                sql.push_str(" READONLY");
            }
            sql
        })
        .collect()
}

fn header_contents(object: &ModelObject) -> Option<String> {
    object
        .annotation_property(SYS_COMMENTS_ANNOTATION, "HeaderContents")
        .filter(|h| !h.trim().is_empty())
        .map(str::to_string)
}

/// Header followed by the body, both verbatim. A line break is added only when
/// neither side supplies one.
fn join_header(header: &str, body: &str) -> String {
    let mut script = String::with_capacity(header.len() + body.len() + 1);
    script.push_str(header);
    if !header.ends_with('\n') && !body.starts_with(['\r', '\n']) {
        script.push('\n');
    }
    script.push_str(body);
    script
}

// =============================================================================
// Security and database-level objects
// =============================================================================

fn script_schema(schema: &ModelObject) -> Result<String, ScriptError> {
    let name = require_local_name(schema)?;
    let mut sql = format!("CREATE SCHEMA {}", bracket(name));
    if let Some(owner) = schema.reference("Authorizer") {
        sql.push_str(&format!("\n    AUTHORIZATION {}", owner));
    }
    sql.push(';');
    Ok(sql)
}

fn script_user(user: &ModelObject) -> Result<String, ScriptError> {
    let name = require_local_name(user)?;
    let mut sql = format!("CREATE USER {}", bracket(name));
    if let Some(login) = user.reference("Login") {
        sql.push_str(&format!(" FOR LOGIN {}", login));
    } else if user.flag("WithoutLogin") {
        sql.push_str(" WITHOUT LOGIN");
    }
    if let Some(schema) = user.reference("DefaultSchema") {
        sql.push_str(&format!(" WITH DEFAULT_SCHEMA = {}", schema));
    }
    sql.push(';');
    Ok(sql)
}

fn script_role(role: &ModelObject) -> Result<String, ScriptError> {
    let name = require_local_name(role)?;
    let mut sql = format!("CREATE ROLE {}", bracket(name));
    if let Some(owner) = role.reference("Authorizer") {
        sql.push_str(&format!("\n    AUTHORIZATION {}", owner));
    }
    sql.push(';');
    Ok(sql)
}

fn script_sequence(sequence: &ModelObject) -> Result<String, ScriptError> {
    let name = require_name(sequence)?;
    let mut lines = vec![format!("CREATE SEQUENCE {}", name)];

    if let Some(data_type) = type_of(sequence, "TypeSpecifier") {
        lines.push(format!("AS {}", data_type));
    }
    for (property, clause) in [
        ("StartValue", "START WITH"),
        ("Increment", "INCREMENT BY"),
        ("MinValue", "MINVALUE"),
        ("MaxValue", "MAXVALUE"),
    ] {
        if let Some(value) = sequence.property(property) {
            lines.push(format!("{} {}", clause, value));
        }
    }
    lines.push(if sequence.flag("IsCycling") {
        "CYCLE".to_string()
    } else {
        "NO CYCLE".to_string()
    });
    if let Some(cache) = sequence.property("CacheSize") {
        lines.push(format!("CACHE {}", cache));
    }

    Ok(format!("{};", lines.join("\n    ")))
}

// =============================================================================
// Extended properties
// =============================================================================

/// Write `sp_addextendedproperty` for a property hosted by a schema, a
/// schema-scoped object, or a column / index / constraint / trigger beneath one.
fn script_extended_property(
    model: &SchemaModel,
    property: &ModelObject,
) -> Result<String, ScriptError> {
    let name = require_local_name(property)?;
    let value = property
        .property("Value")
        .ok_or_else(|| ScriptError::missing_property(property, "Value"))?;
    let host = property
        .reference("Host")
        .ok_or_else(|| ScriptError::missing_relationship(property, "Host"))?;

    let levels = host_levels(model, host).ok_or_else(|| ScriptError::UnresolvedReference {
        object: property.name.to_string(),
        target: host.to_string(),
    })?;

    let mut sql = format!(
        "EXECUTE sp_addextendedproperty @name = {}, @value = {}",
        n_literal(name),
        value.trim()
    );
    for (i, (level_type, level_name)) in levels.iter().enumerate() {
        sql.push_str(&format!(
            ", @level{i}type = {}, @level{i}name = {}",
            n_literal(level_type),
            n_literal(level_name)
        ));
    }
    sql.push(';');
    Ok(sql)
}

/// Work out the `(level type, level name)` pairs for an extended property host.
fn host_levels(model: &SchemaModel, host: &QualifiedName) -> Option<Vec<(String, String)>> {
    let owner_id = model.resolve_owner(host)?;
    let owner = model.get(owner_id)?;

    if owner.kind == ObjectKind::Schema {
        return Some(vec![level("SCHEMA", owner.name.object_name()?)]);
    }

    if owner.name == *host {
        // The host is a registered object; sub-objects report against their table
        let sub_object_level = match owner.kind {
            ObjectKind::Index => Some(("INDEX", owner.reference("IndexedObject"))),
            ObjectKind::DmlTrigger => Some(("TRIGGER", owner.reference("Parent"))),
            ObjectKind::PrimaryKeyConstraint
            | ObjectKind::UniqueConstraint
            | ObjectKind::ForeignKeyConstraint
            | ObjectKind::CheckConstraint
            | ObjectKind::DefaultConstraint => {
                Some(("CONSTRAINT", owner.reference("DefiningTable")))
            }
            _ => None,
        };

        return match sub_object_level {
            Some((level_type, parent)) => {
                let parent = model.find_object(parent?)?;
                let mut levels = schema_object_levels(parent)?;
                levels.push(level(level_type, owner.name.object_name()?));
                Some(levels)
            }
            None => schema_object_levels(owner),
        };
    }

    // The host is nested inside the owner (a column or parameter)
    let mut levels = schema_object_levels(owner)?;
    let member = host.object_name()?;
    let member_type = if member.starts_with('@') {
        "PARAMETER"
    } else {
        "COLUMN"
    };
    levels.push(level(member_type, member));
    Some(levels)
}

fn schema_object_levels(object: &ModelObject) -> Option<Vec<(String, String)>> {
    let level1_type = match object.kind {
        ObjectKind::Table => "TABLE",
        ObjectKind::View => "VIEW",
        ObjectKind::Procedure => "PROCEDURE",
        ObjectKind::ScalarFunction
        | ObjectKind::MultiStatementTableValuedFunction
        | ObjectKind::InlineTableValuedFunction => "FUNCTION",
        ObjectKind::Sequence => "SEQUENCE",
        ObjectKind::TableType => "TYPE",
        ObjectKind::Synonym => "SYNONYM",
        _ => return None,
    };
    Some(vec![
        level("SCHEMA", object.name.schema()?),
        level(level1_type, object.name.object_name()?),
    ])
}

fn level(level_type: &str, name: &str) -> (String, String) {
    (level_type.to_string(), name.to_string())
}

/// Quote text as an `N'...'` literal.
fn n_literal(text: &str) -> String {
    format!("N'{}'", text.replace('\'', "''"))
}
