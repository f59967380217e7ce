use crate::{filter::FilterKind, model::Category};
use std::fmt;
use thiserror::Error as ThisError;

///
/// ConfigError
///
/// Configuration-time failure raised while registering attributes, filter
/// definitions, bindings or settings, or while pairing persisted state with a
/// schema. These are programming errors and are surfaced at startup; raw
/// per-request input never produces one.
///

#[remain::sorted]
#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ConfigError {
    #[error("accessor '{accessor}' on '{entity}' yields the wrong cardinality for a {kind} binding")]
    AccessorCardinality {
        entity: String,
        accessor: String,
        kind: String,
    },

    #[error("accessor '{accessor}' yields '{found}', expected '{expected}'")]
    AccessorTarget {
        accessor: String,
        expected: String,
        found: String,
    },

    #[error(
        "attribute '{entity}.{name}' declares category '{declared}' but its field is '{inferred}'"
    )]
    CategoryMismatch {
        entity: String,
        name: String,
        declared: Category,
        inferred: Category,
    },

    #[error("attribute '{entity}.{name}' is already defined with different backing fields")]
    ConflictingRedefinition { entity: String, name: String },

    #[error("entity '{entity}' is already registered")]
    DuplicateEntity { entity: String },

    #[error("handle '{handle}' is already bound under '{scope}'")]
    DuplicateHandle { scope: String, handle: String },

    #[error("{kind} filter option '{option}' given more than once")]
    DuplicateOption { kind: FilterKind, option: &'static str },

    #[error("attribute '{entity}.{name}' has no backing fields")]
    EmptyBackingFields { entity: String, name: String },

    #[error("set filter on '{entity}' has an empty value list")]
    EmptySetValues { entity: String },

    #[error("{kind} filter options '{first}' and '{second}' are mutually exclusive")]
    ExclusiveOptions {
        kind: FilterKind,
        first: &'static str,
        second: &'static str,
    },

    #[error("{kind} filter is not available for {category} attributes")]
    IllegalCategory { kind: FilterKind, category: Category },

    #[error("{kind} filter on a {category} attribute does not accept option '{option}'")]
    IllegalOption {
        kind: FilterKind,
        category: Category,
        option: &'static str,
    },

    #[error("invalid name '{name}': expected [a-z0-9_-]+")]
    InvalidName { name: String },

    #[error("invalid settings: {message}")]
    InvalidSettings { message: String },

    #[error("invalid persisted state: {message}")]
    InvalidState { message: String },

    #[error("logical attribute '{entity}.{name}' must declare a category")]
    LogicalWithoutCategory { entity: String, name: String },

    #[error("child binding of '{entity}' under '{scope}' requires an accessor")]
    MissingAccessor { scope: String, entity: String },

    #[error("{kind} filter requires option '{option}'")]
    MissingOption { kind: FilterKind, option: &'static str },

    #[error("binding {binding} is scoped by a parent and needs the parent's selected record")]
    MissingParentRecord { binding: usize },

    #[error("attribute '{entity}.{name}' is not searchable")]
    NotSearchable { entity: String, name: String },

    #[error("attribute '{entity}.{name}' is not sortable")]
    NotSortable { entity: String, name: String },

    #[error("set value '{value}' on '{entity}' is not a valid {category} value")]
    SetValueCategory {
        entity: String,
        value: String,
        category: Category,
    },

    #[error("attribute '{entity}.{name}' must be displayable before it can be sortable")]
    SortableWithoutDisplay { entity: String, name: String },

    #[error("entity '{entity}' has no {level} accessor '{accessor}'")]
    UnknownAccessor {
        entity: String,
        accessor: String,
        level: &'static str,
    },

    #[error("attribute '{entity}.{name}' is not registered")]
    UnknownAttribute { entity: String, name: String },

    #[error("binding {id} is not registered")]
    UnknownBinding { id: usize },

    #[error("unknown category or storage type '{alias}'")]
    UnknownCategory { alias: String },

    #[error("entity '{entity}' is not registered")]
    UnknownEntity { entity: String },

    #[error("entity '{entity}' has no field '{field}'")]
    UnknownField { entity: String, field: String },
}

impl ConfigError {
    /// Registration surface that produced this error.
    #[must_use]
    pub const fn origin(&self) -> ErrorOrigin {
        match self {
            Self::DuplicateEntity { .. }
            | Self::UnknownCategory { .. }
            | Self::UnknownEntity { .. }
            | Self::UnknownField { .. } => ErrorOrigin::Catalog,

            Self::CategoryMismatch { .. }
            | Self::ConflictingRedefinition { .. }
            | Self::EmptyBackingFields { .. }
            | Self::InvalidName { .. }
            | Self::LogicalWithoutCategory { .. }
            | Self::SortableWithoutDisplay { .. }
            | Self::UnknownAttribute { .. } => ErrorOrigin::Attribute,

            Self::DuplicateOption { .. }
            | Self::EmptySetValues { .. }
            | Self::ExclusiveOptions { .. }
            | Self::IllegalCategory { .. }
            | Self::IllegalOption { .. }
            | Self::MissingOption { .. }
            | Self::SetValueCategory { .. } => ErrorOrigin::Filter,

            Self::AccessorCardinality { .. }
            | Self::AccessorTarget { .. }
            | Self::DuplicateHandle { .. }
            | Self::MissingAccessor { .. }
            | Self::UnknownAccessor { .. }
            | Self::UnknownBinding { .. } => ErrorOrigin::Binding,

            Self::InvalidState { .. }
            | Self::MissingParentRecord { .. }
            | Self::NotSearchable { .. }
            | Self::NotSortable { .. } => ErrorOrigin::Form,

            Self::InvalidSettings { .. } => ErrorOrigin::Settings,
        }
    }

    #[must_use]
    pub fn display_with_origin(&self) -> String {
        format!("{}: {self}", self.origin())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidSettings {
            message: err.to_string(),
        }
    }
}

///
/// ErrorOrigin
/// Origin taxonomy for configuration errors.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Attribute,
    Binding,
    Catalog,
    Filter,
    Form,
    Settings,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Attribute => "attribute",
            Self::Binding => "binding",
            Self::Catalog => "catalog",
            Self::Filter => "filter",
            Self::Form => "form",
            Self::Settings => "settings",
        };
        write!(f, "{label}")
    }
}
