use derive_more::Display;
use serde::{Deserialize, Serialize};

///
/// Category
///
/// Canonical attribute data category.
/// Every storage type resolves to exactly one category through the alias
/// table; filter legality and raw-value parsing are keyed on it.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[display("string")]
    String,
    #[display("binary")]
    Binary,
    #[display("numeric")]
    Numeric,
    #[display("temporal")]
    Temporal,
    #[display("boolean")]
    Boolean,
}

///
/// ALIASES
/// storage type name -> category, matched case-insensitively
///

const ALIASES: &[(&str, Category)] = &[
    ("string", Category::String),
    ("text", Category::String),
    ("char", Category::String),
    ("varchar", Category::String),
    ("citext", Category::String),
    ("uuid", Category::String),
    ("binary", Category::Binary),
    ("blob", Category::Binary),
    ("bytea", Category::Binary),
    ("varbinary", Category::Binary),
    ("numeric", Category::Numeric),
    ("integer", Category::Numeric),
    ("int", Category::Numeric),
    ("smallint", Category::Numeric),
    ("bigint", Category::Numeric),
    ("float", Category::Numeric),
    ("double", Category::Numeric),
    ("real", Category::Numeric),
    ("decimal", Category::Numeric),
    ("temporal", Category::Temporal),
    ("date", Category::Temporal),
    ("datetime", Category::Temporal),
    ("time", Category::Temporal),
    ("timestamp", Category::Temporal),
    ("timestamptz", Category::Temporal),
    ("boolean", Category::Boolean),
    ("bool", Category::Boolean),
];

impl Category {
    /// Resolve a storage type name (or a category name) through the alias table.
    #[must_use]
    pub fn from_alias(alias: &str) -> Option<Self> {
        let alias = alias.trim();

        ALIASES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(alias))
            .map(|(_, category)| *category)
    }

    /// Categories whose values have a meaningful order (range/comparison filters).
    #[must_use]
    pub const fn is_ordered(self) -> bool {
        matches!(self, Self::Numeric | Self::Temporal)
    }

    #[must_use]
    pub const fn is_string(self) -> bool {
        matches!(self, Self::String)
    }
}
