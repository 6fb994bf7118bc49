//! Object kind tags as they appear in model.xml

use std::fmt;

/// The kind of a model object, keyed by its model.xml `Type` attribute.
///
/// Kinds the extractor does not know about are kept verbatim in [`ObjectKind::Other`]
/// so they still flow through classification (as `Misc`) and diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Table,
    View,
    Procedure,
    User,
    Schema,
    Role,
    DmlTrigger,
    Index,
    ExtendedProperty,
    UniqueConstraint,
    PrimaryKeyConstraint,
    ForeignKeyConstraint,
    CheckConstraint,
    DefaultConstraint,
    ScalarFunction,
    MultiStatementTableValuedFunction,
    InlineTableValuedFunction,
    Sequence,
    TableType,
    Synonym,
    Other(String),
}

impl ObjectKind {
    /// Map a model.xml element type name (e.g. `SqlTable`) to a kind.
    pub fn from_type_name(type_name: &str) -> Self {
        match type_name {
            "SqlTable" => ObjectKind::Table,
            "SqlView" => ObjectKind::View,
            "SqlProcedure" => ObjectKind::Procedure,
            "SqlUser" => ObjectKind::User,
            "SqlSchema" => ObjectKind::Schema,
            "SqlRole" => ObjectKind::Role,
            "SqlDmlTrigger" => ObjectKind::DmlTrigger,
            "SqlIndex" => ObjectKind::Index,
            "SqlExtendedProperty" => ObjectKind::ExtendedProperty,
            "SqlUniqueConstraint" => ObjectKind::UniqueConstraint,
            "SqlPrimaryKeyConstraint" => ObjectKind::PrimaryKeyConstraint,
            "SqlForeignKeyConstraint" => ObjectKind::ForeignKeyConstraint,
            "SqlCheckConstraint" => ObjectKind::CheckConstraint,
            "SqlDefaultConstraint" => ObjectKind::DefaultConstraint,
            "SqlScalarFunction" => ObjectKind::ScalarFunction,
            "SqlMultiStatementTableValuedFunction" => ObjectKind::MultiStatementTableValuedFunction,
            "SqlInlineTableValuedFunction" => ObjectKind::InlineTableValuedFunction,
            "SqlSequence" => ObjectKind::Sequence,
            "SqlTableType" => ObjectKind::TableType,
            "SqlSynonym" => ObjectKind::Synonym,
            other => ObjectKind::Other(other.to_string()),
        }
    }

    /// The model.xml element type name for this kind.
    pub fn type_name(&self) -> &str {
        match self {
            ObjectKind::Table => "SqlTable",
            ObjectKind::View => "SqlView",
            ObjectKind::Procedure => "SqlProcedure",
            ObjectKind::User => "SqlUser",
            ObjectKind::Schema => "SqlSchema",
            ObjectKind::Role => "SqlRole",
            ObjectKind::DmlTrigger => "SqlDmlTrigger",
            ObjectKind::Index => "SqlIndex",
            ObjectKind::ExtendedProperty => "SqlExtendedProperty",
            ObjectKind::UniqueConstraint => "SqlUniqueConstraint",
            ObjectKind::PrimaryKeyConstraint => "SqlPrimaryKeyConstraint",
            ObjectKind::ForeignKeyConstraint => "SqlForeignKeyConstraint",
            ObjectKind::CheckConstraint => "SqlCheckConstraint",
            ObjectKind::DefaultConstraint => "SqlDefaultConstraint",
            ObjectKind::ScalarFunction => "SqlScalarFunction",
            ObjectKind::MultiStatementTableValuedFunction => "SqlMultiStatementTableValuedFunction",
            ObjectKind::InlineTableValuedFunction => "SqlInlineTableValuedFunction",
            ObjectKind::Sequence => "SqlSequence",
            ObjectKind::TableType => "SqlTableType",
            ObjectKind::Synonym => "SqlSynonym",
            ObjectKind::Other(name) => name.as_str(),
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}
