//! Schema model representation

mod kind;
mod name;
mod schema_model;

pub use kind::ObjectKind;
pub use name::{bracket, QualifiedName};
pub use schema_model::{Annotation, ModelObject, ObjectId, Reference, SchemaModel};
