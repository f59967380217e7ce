use crate::{model::Value, query::pattern::Pattern};
use std::ops::{BitAnd, BitOr};

///
/// Predicate AST
///
/// Pure, storage-agnostic representation of filter predicates.
/// This layer has no schema knowledge and no execution semantics; a store
/// adapter turns it into a real query (or evaluates it in memory).
///

///
/// CompareOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum CompareOp {
    Eq = 0x01,
    Ne = 0x02,
    Lt = 0x03,
    Lte = 0x04,
    Gt = 0x05,
    Gte = 0x06,
    Contains = 0x07,
    StartsWith = 0x08,
    EndsWith = 0x09,
}

impl CompareOp {
    #[must_use]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Operator selecting exactly the rows (with a non-null field) this one
    /// rejects, when one exists.
    #[must_use]
    pub const fn inverse(self) -> Option<Self> {
        match self {
            Self::Eq => Some(Self::Ne),
            Self::Ne => Some(Self::Eq),
            Self::Lt => Some(Self::Gte),
            Self::Lte => Some(Self::Gt),
            Self::Gt => Some(Self::Lte),
            Self::Gte => Some(Self::Lt),
            Self::Contains | Self::StartsWith | Self::EndsWith => None,
        }
    }
}

///
/// ComparePredicate
///

#[derive(Clone, Debug, PartialEq)]
pub struct ComparePredicate {
    pub field: String,
    pub op: CompareOp,
    pub value: Value,
}

impl ComparePredicate {
    #[must_use]
    pub fn new(field: impl Into<String>, op: CompareOp, value: Value) -> Self {
        Self {
            field: field.into(),
            op,
            value,
        }
    }
}

///
/// Predicate
///

#[derive(Clone, Debug, PartialEq)]
pub enum Predicate {
    True,
    False,
    And(Vec<Self>),
    Or(Vec<Self>),
    Not(Box<Self>),
    Compare(ComparePredicate),
    In { field: String, values: Vec<Value> },
    NotIn { field: String, values: Vec<Value> },
    Between { field: String, low: Value, high: Value },
    IsNull { field: String },
    IsNotNull { field: String },
    Matches { field: String, pattern: Pattern },
    NotMatches { field: String, pattern: Pattern },
}

impl Predicate {
    /// Conjunction that collapses empty and single-child lists.
    #[must_use]
    pub fn and(mut preds: Vec<Self>) -> Self {
        match preds.len() {
            0 => Self::True,
            1 => preds.remove(0),
            _ => Self::And(preds),
        }
    }

    /// Disjunction that collapses empty and single-child lists.
    #[must_use]
    pub fn or(mut preds: Vec<Self>) -> Self {
        match preds.len() {
            0 => Self::False,
            1 => preds.remove(0),
            _ => Self::Or(preds),
        }
    }

    #[expect(clippy::should_implement_trait)]
    #[must_use]
    pub fn not(pred: Self) -> Self {
        match pred {
            Self::Not(inner) => *inner,
            Self::True => Self::False,
            Self::False => Self::True,
            other => Self::Not(Box::new(other)),
        }
    }

    #[must_use]
    pub fn compare(field: impl Into<String>, op: CompareOp, value: Value) -> Self {
        Self::Compare(ComparePredicate::new(field, op, value))
    }

    #[must_use]
    pub fn eq(field: impl Into<String>, value: Value) -> Self {
        Self::compare(field, CompareOp::Eq, value)
    }

    #[must_use]
    pub fn ne(field: impl Into<String>, value: Value) -> Self {
        Self::compare(field, CompareOp::Ne, value)
    }

    #[must_use]
    pub fn lt(field: impl Into<String>, value: Value) -> Self {
        Self::compare(field, CompareOp::Lt, value)
    }

    #[must_use]
    pub fn lte(field: impl Into<String>, value: Value) -> Self {
        Self::compare(field, CompareOp::Lte, value)
    }

    #[must_use]
    pub fn gt(field: impl Into<String>, value: Value) -> Self {
        Self::compare(field, CompareOp::Gt, value)
    }

    #[must_use]
    pub fn gte(field: impl Into<String>, value: Value) -> Self {
        Self::compare(field, CompareOp::Gte, value)
    }

    /// Membership test; a single value collapses to equality.
    #[must_use]
    pub fn in_(field: impl Into<String>, values: Vec<Value>) -> Self {
        match <[Value; 1]>::try_from(values) {
            Ok([value]) => Self::eq(field, value),
            Err(values) => Self::In {
                field: field.into(),
                values,
            },
        }
    }

    /// Negated membership test; a single value collapses to inequality.
    #[must_use]
    pub fn not_in(field: impl Into<String>, values: Vec<Value>) -> Self {
        match <[Value; 1]>::try_from(values) {
            Ok([value]) => Self::ne(field, value),
            Err(values) => Self::NotIn {
                field: field.into(),
                values,
            },
        }
    }

    #[must_use]
    pub fn between(field: impl Into<String>, low: Value, high: Value) -> Self {
        Self::Between {
            field: field.into(),
            low,
            high,
        }
    }

    #[must_use]
    pub fn is_null(field: impl Into<String>) -> Self {
        Self::IsNull {
            field: field.into(),
        }
    }

    #[must_use]
    pub fn is_not_null(field: impl Into<String>) -> Self {
        Self::IsNotNull {
            field: field.into(),
        }
    }

    /// Null or the empty string.
    #[must_use]
    pub fn is_blank(field: &str) -> Self {
        Self::Or(vec![Self::is_null(field), Self::eq(field, Value::from(""))])
    }

    #[must_use]
    pub fn is_not_blank(field: &str) -> Self {
        Self::And(vec![
            Self::is_not_null(field),
            Self::ne(field, Value::from("")),
        ])
    }

    #[must_use]
    pub fn matches(field: impl Into<String>, pattern: Pattern) -> Self {
        Self::Matches {
            field: field.into(),
            pattern,
        }
    }

    #[must_use]
    pub fn not_matches(field: impl Into<String>, pattern: Pattern) -> Self {
        Self::NotMatches {
            field: field.into(),
            pattern,
        }
    }
}

impl BitAnd for Predicate {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self::And(vec![self, rhs])
    }
}

impl BitAnd for &Predicate {
    type Output = Predicate;

    fn bitand(self, rhs: Self) -> Self::Output {
        Predicate::And(vec![self.clone(), rhs.clone()])
    }
}

impl BitOr for Predicate {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::Or(vec![self, rhs])
    }
}

impl BitOr for &Predicate {
    type Output = Predicate;

    fn bitor(self, rhs: Self) -> Self::Output {
        Predicate::Or(vec![self.clone(), rhs.clone()])
    }
}
