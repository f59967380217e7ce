//! Filter definitions and the six filter-state machines.
//!
//! A [`FilterDefinition`] is fixed at configuration time and says how an
//! attribute may be searched. A [`FilterState`] is the per-session value of
//! one filter instance; it is mutated from raw request input and compiled
//! into predicate atoms, one per backing field.

pub mod comparison;
pub mod definition;
pub mod kind;
pub mod state;

#[cfg(test)]
mod tests;

// re-exports
pub use comparison::Comparison;
pub use definition::{FilterDefinition, FilterOption, NullMode, Presentation, SetValues};
pub use kind::FilterKind;
pub use state::{FilterFields, FilterState, Mutation};
