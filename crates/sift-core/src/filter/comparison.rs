use crate::{filter::FilterDefinition, model::Category, query::CompareOp};
use derive_more::Display;
use serde::{Deserialize, Serialize};

///
/// Comparison
///
/// Operator chosen in a default filter. The vocabulary offered to the user
/// depends on the attribute category and on the pseudo options enabled on
/// the definition.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    #[display("equals")]
    Equals,
    #[display("begins")]
    Begins,
    #[display("ends")]
    Ends,
    #[display("contains")]
    Contains,
    #[display("less")]
    Less,
    #[display("greater")]
    Greater,
    #[display("less_or_equal")]
    LessOrEqual,
    #[display("greater_or_equal")]
    GreaterOrEqual,
    #[display("is_unset")]
    IsUnset,
    #[display("is_blank")]
    IsBlank,
    #[display("is_empty")]
    IsEmpty,
    #[display("true")]
    True,
    #[display("false")]
    False,
}

impl Comparison {
    /// Operators available for a default filter on this definition, in the
    /// order controls should offer them.
    #[must_use]
    pub fn vocabulary(def: &FilterDefinition) -> Vec<Self> {
        let mut ops = match def.category() {
            Category::String => vec![Self::Equals, Self::Begins, Self::Ends, Self::Contains],
            Category::Numeric | Category::Temporal => vec![
                Self::Equals,
                Self::Less,
                Self::Greater,
                Self::LessOrEqual,
                Self::GreaterOrEqual,
            ],
            Category::Boolean => vec![Self::True, Self::False],
            Category::Binary => vec![Self::Equals],
        };

        if def.offers_unset() {
            ops.push(Self::IsUnset);
        }
        if def.offers_blank() {
            ops.push(Self::IsBlank);
        }
        if def.offers_empty() {
            ops.push(Self::IsEmpty);
        }

        ops
    }

    /// Parse a raw operator token against the definition's vocabulary.
    /// Temporal spellings (`before`, `after`, ...) are accepted as aliases.
    #[must_use]
    pub fn parse(token: &str, def: &FilterDefinition) -> Option<Self> {
        let token = token.trim().to_ascii_lowercase();
        let op = match token.as_str() {
            "equals" | "eq" => Self::Equals,
            "begins" => Self::Begins,
            "ends" => Self::Ends,
            "contains" => Self::Contains,
            "less" | "before" => Self::Less,
            "greater" | "after" => Self::Greater,
            "less_or_equal" | "on_or_before" => Self::LessOrEqual,
            "greater_or_equal" | "on_or_after" => Self::GreaterOrEqual,
            "is_unset" => Self::IsUnset,
            "is_blank" => Self::IsBlank,
            "is_empty" => Self::IsEmpty,
            "true" => Self::True,
            "false" => Self::False,
            _ => return None,
        };

        Self::vocabulary(def).contains(&op).then_some(op)
    }

    /// Pseudo comparisons test presence rather than a user value.
    #[must_use]
    pub const fn is_pseudo(self) -> bool {
        matches!(self, Self::IsUnset | Self::IsBlank | Self::IsEmpty)
    }

    /// Whether the comparison applies without a user-supplied value.
    #[must_use]
    pub const fn is_valueless(self) -> bool {
        self.is_pseudo() || matches!(self, Self::True | Self::False)
    }

    /// Predicate operator for value comparisons.
    #[must_use]
    pub const fn compare_op(self) -> Option<CompareOp> {
        match self {
            Self::Equals => Some(CompareOp::Eq),
            Self::Begins => Some(CompareOp::StartsWith),
            Self::Ends => Some(CompareOp::EndsWith),
            Self::Contains => Some(CompareOp::Contains),
            Self::Less => Some(CompareOp::Lt),
            Self::Greater => Some(CompareOp::Gt),
            Self::LessOrEqual => Some(CompareOp::Lte),
            Self::GreaterOrEqual => Some(CompareOp::Gte),
            _ => None,
        }
    }

    /// Human phrase used when describing an active filter.
    #[must_use]
    pub const fn phrase(self, negated: bool, category: Category) -> &'static str {
        let temporal = matches!(category, Category::Temporal);

        match (self, negated) {
            (Self::Equals, false) => "is",
            (Self::Equals, true) => "is not",
            (Self::Begins, false) => "begins with",
            (Self::Begins, true) => "does not begin with",
            (Self::Ends, false) => "ends with",
            (Self::Ends, true) => "does not end with",
            (Self::Contains, false) => "contains",
            (Self::Contains, true) => "does not contain",
            (Self::Less, false) | (Self::GreaterOrEqual, true) => {
                if temporal { "is before" } else { "is less than" }
            }
            (Self::Greater, false) | (Self::LessOrEqual, true) => {
                if temporal { "is after" } else { "is greater than" }
            }
            (Self::LessOrEqual, false) | (Self::Greater, true) => {
                if temporal { "is on or before" } else { "is at most" }
            }
            (Self::GreaterOrEqual, false) | (Self::Less, true) => {
                if temporal { "is on or after" } else { "is at least" }
            }
            (Self::IsUnset, false) => "is unset",
            (Self::IsUnset, true) => "is set",
            (Self::IsBlank, false) => "is blank",
            (Self::IsBlank, true) => "is not blank",
            (Self::IsEmpty, false) => "is empty",
            (Self::IsEmpty, true) => "is not empty",
            (Self::True, false) => "is true",
            (Self::True, true) => "is not true",
            (Self::False, false) => "is false",
            (Self::False, true) => "is not false",
        }
    }
}
