//! Classification, aggregation and emission of per-object scripts
//!
//! Objects are classified into an output category, tables and views are merged
//! with their dependent sub-objects, and every resulting group is written to one
//! `.sql` file under the output root.

mod aggregator;
mod classify;
mod writer;

use std::fmt;

use crate::model::ModelObject;

pub use aggregator::{AggregationStats, DefinitionAggregator};
pub use classify::{belongs_to_parent, classify, is_child};
pub use writer::ScriptWriter;

/// Schema used when an object's name carries no schema qualifier.
pub const DEFAULT_SCHEMA: &str = "dbo";

/// Schema every security principal is filed under.
pub const SECURITY_SCHEMA: &str = "Security";

/// Object name used when a qualified name is empty.
pub const UNKNOWN_OBJECT: &str = "UnknownObject";

/// Output category, which is also the folder name under the schema directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ObjectCategory {
    Tables,
    Views,
    StoredProcedures,
    Security,
    Misc,
}

impl ObjectCategory {
    pub fn folder_name(self) -> &'static str {
        match self {
            ObjectCategory::Tables => "Tables",
            ObjectCategory::Views => "Views",
            ObjectCategory::StoredProcedures => "StoredProcedures",
            ObjectCategory::Security => "Security",
            ObjectCategory::Misc => "Misc",
        }
    }

    /// Tables and views absorb the scripts of their child objects.
    pub fn aggregates_children(self) -> bool {
        matches!(self, ObjectCategory::Tables | ObjectCategory::Views)
    }
}

impl fmt::Display for ObjectCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.folder_name())
    }
}

/// Identity of a grouped definition.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DefinitionKey {
    pub schema: String,
    pub object_name: String,
    pub category: ObjectCategory,
}

impl DefinitionKey {
    /// Derive the key for a model object, applying the name defaults and the
    /// Security schema override.
    pub fn for_object(object: &ModelObject) -> Self {
        let category = classify(&object.kind);
        let schema = if category == ObjectCategory::Security {
            SECURITY_SCHEMA
        } else {
            object.name.schema().unwrap_or(DEFAULT_SCHEMA)
        };
        Self {
            schema: schema.to_string(),
            object_name: object
                .name
                .object_name()
                .unwrap_or(UNKNOWN_OBJECT)
                .to_string(),
            category,
        }
    }
}

impl fmt::Display for DefinitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} ({})", self.schema, self.object_name, self.category)
    }
}

/// One output file's worth of script fragments, parent first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDefinition {
    pub schema: String,
    pub object_name: String,
    pub object_type: ObjectCategory,
    pub definitions: Vec<String>,
}

impl SchemaDefinition {
    pub fn new(key: DefinitionKey) -> Self {
        Self {
            schema: key.schema,
            object_name: key.object_name,
            object_type: key.category,
            definitions: Vec::new(),
        }
    }

    pub fn key(&self) -> DefinitionKey {
        DefinitionKey {
            schema: self.schema.clone(),
            object_name: self.object_name.clone(),
            category: self.object_type,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
