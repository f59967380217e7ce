use crate::model::Category;
use derive_more::Display;
use serde::{Deserialize, Serialize};

///
/// FilterKind
/// The closed set of filter state machines.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    #[display("default")]
    Default,
    #[display("set")]
    Set,
    #[display("null")]
    Null,
    #[display("boolean")]
    Boolean,
    #[display("range")]
    Range,
    #[display("pattern")]
    Pattern,
}

impl FilterKind {
    /// Whether this kind can search attributes of `category`.
    #[must_use]
    pub const fn accepts_category(self, category: Category) -> bool {
        match self {
            Self::Default | Self::Null => true,
            Self::Set => !matches!(category, Category::Boolean),
            Self::Boolean => matches!(category, Category::Boolean),
            Self::Range => category.is_ordered(),
            Self::Pattern => category.is_string(),
        }
    }
}
