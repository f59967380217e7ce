//! Passive query contract types handed to store adapters.

use crate::query::predicate::Predicate;
use serde::{Deserialize, Serialize};

///
/// OrderDirection
/// Store-facing ordering direction (applied after filtering).
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum OrderDirection {
    Asc,
    Desc,
}

impl OrderDirection {
    #[must_use]
    pub const fn from_descending(descending: bool) -> Self {
        if descending { Self::Desc } else { Self::Asc }
    }

    #[must_use]
    pub const fn reverse(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

///
/// OrderSpec
/// Ordered `(field, direction)` pairs; the first entry has highest priority.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct OrderSpec {
    pub fields: Vec<(String, OrderDirection)>,
}

impl OrderSpec {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|(name, _)| name == field)
    }

    /// Append a field unless a higher-priority entry already orders it.
    pub fn push(&mut self, field: impl Into<String>, direction: OrderDirection) {
        let field = field.into();
        if !self.contains(&field) {
            self.fields.push((field, direction));
        }
    }
}

///
/// PageSpec
/// Store-facing row window.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PageSpec {
    pub offset: u64,
    pub limit: u64,
}

///
/// Query
///
/// A composed query: the base collection handle produced by the store, the
/// residual predicate, and the ordering. Windowing is passed separately so
/// the same query serves both the count and the fetch.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Query<C> {
    pub collection: C,
    pub predicate: Option<Predicate>,
    pub order: OrderSpec,
}
