//! Engine settings: pagination bounds, sort depth and page-window shape.
//!
//! Settings are plain serde data so hosts can keep them next to the rest of
//! their configuration; every field has a default.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

///
/// CONSTANTS
///

pub const DEFAULT_PER_PAGE: u32 = 20;
pub const MAX_PER_PAGE: u32 = 1000;
pub const MAX_SORTS: usize = 3;

///
/// Settings
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Page size given to freshly created runtime state.
    pub default_per_page: u32,
    /// Upper bound for any requested page size.
    pub max_per_page: u32,
    /// Number of sort clauses kept; the lowest priority is evicted beyond it.
    pub max_sorts: usize,
    pub pagination: PaginationSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_per_page: DEFAULT_PER_PAGE,
            max_per_page: MAX_PER_PAGE,
            max_sorts: MAX_SORTS,
            pagination: PaginationSettings::default(),
        }
    }
}

impl Settings {
    /// Parse and validate settings from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;

        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_per_page == 0 {
            return Err(invalid("max_per_page must be at least 1"));
        }
        if self.default_per_page == 0 || self.default_per_page > self.max_per_page {
            return Err(invalid("default_per_page must be between 1 and max_per_page"));
        }
        if self.max_sorts == 0 {
            return Err(invalid("max_sorts must be at least 1"));
        }
        if self.pagination.minimum_in_group == 0 {
            return Err(invalid("pagination.minimum_in_group must be at least 1"));
        }

        Ok(())
    }

    /// Clamp a requested page size into `1..=max_per_page`.
    #[must_use]
    pub fn clamp_per_page(&self, per_page: u64) -> u32 {
        let clamped = per_page.clamp(1, u64::from(self.max_per_page));

        u32::try_from(clamped).unwrap_or(self.max_per_page)
    }
}

///
/// PaginationSettings
/// Shape of the page-number window shown by navigation controls.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PaginationSettings {
    /// Minimum number of pages in the window around the current page.
    pub minimum_in_group: u64,
    /// Pages always shown at the start.
    pub minimum_at_beginning: u64,
    /// Pages always shown at the end.
    pub minimum_at_end: u64,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            minimum_in_group: 9,
            minimum_at_beginning: 2,
            minimum_at_end: 2,
        }
    }
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::InvalidSettings {
        message: message.to_string(),
    }
}
