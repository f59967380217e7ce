//! Per-binding, per-session runtime state.
//!
//! Pagination is stored as `page`/`selected`; the absolute `offset` is
//! derived from them. Every setter keeps `0 <= offset < total` when
//! `total > 0`, and `page == selected == 0` when `total == 0`.

pub mod session;


use crate::{config::Settings, filter::FilterState};
use serde::{Deserialize, Serialize};

// re-exports
pub use session::{EndpointState, MemorySessionStore, SessionStore, StateKey};

///
/// SortClause
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SortClause {
    pub attribute: String,
    #[serde(default)]
    pub descending: bool,
}

///
/// RuntimeState
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct RuntimeState {
    per_page: u32,
    total: u64,
    page: u64,
    selected: u64,
    pub filters: Vec<FilterState>,
    pub sorts: Vec<SortClause>,
}

impl Default for RuntimeState {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}

impl RuntimeState {
    #[must_use]
    pub const fn new(settings: &Settings) -> Self {
        Self {
            per_page: settings.default_per_page,
            total: 0,
            page: 0,
            selected: 0,
            filters: Vec::new(),
            sorts: Vec::new(),
        }
    }

    #[must_use]
    pub const fn per_page(&self) -> u32 {
        self.per_page
    }

    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    #[must_use]
    pub const fn page(&self) -> u64 {
        self.page
    }

    #[must_use]
    pub const fn selected(&self) -> u64 {
        self.selected
    }

    #[must_use]
    pub const fn total_pages(&self) -> u64 {
        self.total.div_ceil(self.per_page_u64())
    }

    /// Absolute 0-based index of the selected record.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        if self.page == 0 || self.selected == 0 {
            return 0;
        }

        // saturates on unchecked persisted values
        (self.page - 1)
            .saturating_mul(self.per_page_u64())
            .saturating_add(self.selected - 1)
    }

    /// Offset of the first record on the current page.
    #[must_use]
    pub const fn page_offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.per_page_u64())
    }

    /// Select the record at `offset`, clamped to the last record.
    pub const fn set_offset(&mut self, offset: u64) {
        if self.total == 0 {
            self.page = 0;
            self.selected = 0;
            return;
        }

        let offset = if offset >= self.total { self.total - 1 } else { offset };
        let per_page = self.per_page_u64();
        self.page = offset / per_page + 1;
        self.selected = offset % per_page + 1;
    }

    /// Change the page size, keeping the selected record's offset.
    pub fn set_per_page(&mut self, per_page: u64, settings: &Settings) {
        let offset = self.offset();
        self.per_page = settings.clamp_per_page(per_page);
        self.set_offset(offset);
    }

    /// Record a fresh count. A zero total clears the selection; a first
    /// non-zero total selects the first record; otherwise the offset is
    /// clamped into range.
    pub const fn set_total(&mut self, total: u64) {
        let offset = self.offset();
        let had_selection = self.page > 0;
        self.total = total;

        if had_selection {
            self.set_offset(offset);
        } else {
            self.set_offset(0);
        }
    }

    /// Jump to the first record of `page` (clamped to the last page).
    pub const fn set_page(&mut self, page: u64) {
        if self.total == 0 {
            return;
        }

        let page = if page == 0 { 1 } else { page };
        let pages = self.total_pages();
        let page = if page > pages { pages } else { page };
        self.set_offset((page - 1).saturating_mul(self.per_page_u64()));
    }

    /// Select the `selected`-th (1-based) record of the current page.
    pub const fn set_selected(&mut self, selected: u64) {
        if self.total == 0 {
            return;
        }

        let selected = if selected == 0 { 1 } else { selected };
        let selected = if selected > self.per_page_u64() {
            self.per_page_u64()
        } else {
            selected
        };
        self.set_offset(self.page_offset().saturating_add(selected - 1));
    }

    /// Select the first record; with `total` also zero the count until the
    /// next recomputation.
    pub const fn reset(&mut self, total: bool) {
        if total {
            self.total = 0;
            self.page = 0;
            self.selected = 0;
        } else {
            self.set_offset(0);
        }
    }

    /// Request a sort by `attribute`. The top clause toggles direction;
    /// anything else is promoted to the top, ascending, and the list is
    /// trimmed to `max_sorts`. Returns whether the ordering changed.
    pub fn sort_by(&mut self, attribute: &str, max_sorts: usize) -> bool {
        if let Some(top) = self.sorts.first_mut()
            && top.attribute == attribute
        {
            top.descending = !top.descending;
            return true;
        }

        self.sorts.retain(|clause| clause.attribute != attribute);
        self.sorts.insert(
            0,
            SortClause {
                attribute: attribute.to_string(),
                descending: false,
            },
        );
        self.sorts.truncate(max_sorts.max(1));

        true
    }

    /// Position (1-based priority) and direction of `attribute` in the sort list.
    #[must_use]
    pub fn sort_position(&self, attribute: &str) -> Option<(usize, bool)> {
        self.sorts
            .iter()
            .position(|clause| clause.attribute == attribute)
            .map(|index| (index + 1, self.sorts[index].descending))
    }

    const fn per_page_u64(&self) -> u64 {
        if self.per_page == 0 { 1 } else { self.per_page as u64 }
    }
}
