//! Core runtime for Sift: attribute registry, filter state machines, binding
//! tree, per-session runtime state and the query composer that folds them
//! into store queries.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod attribute;
pub mod binding;
pub mod config;
pub mod error;
pub mod filter;
pub mod form;
pub mod model;
pub mod obs;
pub mod param;
pub mod query;
pub mod schema;
pub mod state;
pub mod store;

// re-exports
pub use error::ConfigError;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No adapters, observability sinks or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        attribute::{Attribute, SortMode, SortRule},
        binding::{BindOptions, BindingId, BindingKind, Selector},
        filter::{FilterKind, FilterOption, FilterState, SetValues},
        form::Form,
        model::{AccessorModel, Category, EntityModel, Value},
        param::{Param, Params},
        schema::{Schema, SchemaBuilder},
        state::RuntimeState,
        store::{Record, Store},
    };
}
