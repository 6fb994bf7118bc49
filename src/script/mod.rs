//! Per-object script extraction
//!
//! The extraction pipeline never renders SQL itself; it asks a [`ScriptExtractor`]
//! for each object's text. Failing to produce a script is an ordinary outcome
//! (plenty of model kinds have no standalone script), so extractors return a
//! [`ScriptError`] instead of panicking and the caller decides how to report it.

mod renderer;
mod table_scripts;

use thiserror::Error;

use crate::model::ModelObject;

pub use renderer::DacpacScriptRenderer;

/// Why an object's script could not be produced
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    #[error("script retrieval not supported for {kind}")]
    Unsupported { kind: String },

    #[error("{kind} has no name")]
    Unnamed { kind: String },

    #[error("{object} is missing property {property}")]
    MissingProperty { object: String, property: String },

    #[error("{object} is missing relationship {relationship}")]
    MissingRelationship {
        object: String,
        relationship: String,
    },

    #[error("{object} has no header annotation")]
    MissingHeader { object: String },

    #[error("{object} references unknown object {target}")]
    UnresolvedReference { object: String, target: String },
}

impl ScriptError {
    pub(crate) fn unsupported(object: &ModelObject) -> Self {
        ScriptError::Unsupported {
            kind: object.kind.to_string(),
        }
    }

    pub(crate) fn missing_property(object: &ModelObject, property: &str) -> Self {
        ScriptError::MissingProperty {
            object: object.name.to_string(),
            property: property.to_string(),
        }
    }

    pub(crate) fn missing_relationship(object: &ModelObject, relationship: &str) -> Self {
        ScriptError::MissingRelationship {
            object: object.name.to_string(),
            relationship: relationship.to_string(),
        }
    }
}

/// Produces the script text for a single model object.
pub trait ScriptExtractor {
    fn try_extract(&self, object: &ModelObject) -> Result<String, ScriptError>;
}

impl<F> ScriptExtractor for F
where
    F: Fn(&ModelObject) -> Result<String, ScriptError>,
{
    fn try_extract(&self, object: &ModelObject) -> Result<String, ScriptError> {
        self(object)
    }
}
