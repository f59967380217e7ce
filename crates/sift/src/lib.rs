//! ## Crate layout
//! - `core`: attributes, filters, bindings, runtime state and the form
//!   composer, plus the in-memory reference store.
//!
//! The `prelude` module mirrors the surface a host application needs to
//! register a schema and drive one interaction.

pub use sift_core as core;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use core::{ConfigError, config::Settings};

///
/// Prelude
///

pub mod prelude {
    pub use crate::core::{
        ConfigError,
        config::Settings,
        prelude::*,
        state::{EndpointState, SessionStore, StateKey},
    };
    pub use serde::{Deserialize, Serialize};
}
