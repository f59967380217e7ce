//! Storage-agnostic query description: predicates, wildcard patterns,
//! ordering and windowing, plus an in-memory row evaluator.

pub mod eval;
pub mod pattern;
pub mod plan;
pub mod predicate;


// re-exports
pub use pattern::{Pattern, PatternSegment};
pub use plan::{OrderDirection, OrderSpec, PageSpec, Query};
pub use predicate::{CompareOp, ComparePredicate, Predicate};
