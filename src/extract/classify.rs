//! Kind → category mapping and the child-kind predicate

use crate::model::{ModelObject, ObjectKind};

use super::ObjectCategory;

/// Map an object kind to its output category. Unmapped kinds land in `Misc`.
pub fn classify(kind: &ObjectKind) -> ObjectCategory {
    match kind {
        ObjectKind::Table => ObjectCategory::Tables,
        ObjectKind::View => ObjectCategory::Views,
        ObjectKind::Procedure => ObjectCategory::StoredProcedures,
        ObjectKind::User | ObjectKind::Schema => ObjectCategory::Security,
        _ => ObjectCategory::Misc,
    }
}

/// Kinds that are only ever scripted inside their parent's file.
pub fn is_child(kind: &ObjectKind) -> bool {
    matches!(
        kind,
        ObjectKind::DmlTrigger
            | ObjectKind::Index
            | ObjectKind::ExtendedProperty
            | ObjectKind::UniqueConstraint
            | ObjectKind::PrimaryKeyConstraint
            | ObjectKind::ForeignKeyConstraint
    )
}

/// Objects scripted through their parent: child kinds, plus unnamed check and
/// default constraints, which have no file name of their own.
pub fn belongs_to_parent(object: &ModelObject) -> bool {
    is_child(&object.kind)
        || (object.name.is_empty()
            && matches!(
                object.kind,
                ObjectKind::CheckConstraint | ObjectKind::DefaultConstraint
            ))
}
