use crate::config::PaginationSettings;
use std::ops::RangeInclusive;

///
/// PageItem
/// One slot in rendered page navigation.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PageItem {
    Page { number: u64, current: bool },
    Gap,
}

///
/// PageWindow
///
/// Page numbers shown by navigation controls: an optional leading range
/// near page 1, the main window around the current page, and an optional
/// trailing range near the last page. Edge ranges that would overlap or
/// touch the main window are absorbed into it, so a gap flag is only set
/// when at least one page is actually skipped.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PageWindow {
    pub current: u64,
    pub total_pages: u64,
    pub first: Option<RangeInclusive<u64>>,
    pub main: Option<RangeInclusive<u64>>,
    pub last: Option<RangeInclusive<u64>>,
    pub gap_before: bool,
    pub gap_after: bool,
}

impl PageWindow {
    #[must_use]
    pub fn compute(page: u64, total_pages: u64, settings: &PaginationSettings) -> Self {
        if total_pages == 0 {
            return Self::default();
        }

        let current = page.clamp(1, total_pages);
        let size = settings.minimum_in_group.clamp(1, total_pages);
        let half = (size - 1) / 2;

        let mut start = current.saturating_sub(half).max(1);
        let mut end = start + size - 1;
        if end > total_pages {
            end = total_pages;
            start = end + 1 - size;
        }

        let first_end = settings.minimum_at_beginning.min(total_pages);
        let first = if first_end == 0 {
            None
        } else if start <= first_end + 1 {
            start = 1;
            None
        } else {
            Some(1..=first_end)
        };

        let last_start = total_pages
            .saturating_sub(settings.minimum_at_end)
            .saturating_add(1)
            .max(1);
        let last = if settings.minimum_at_end == 0 {
            None
        } else if end + 1 >= last_start {
            end = total_pages;
            None
        } else {
            Some(last_start..=total_pages)
        };

        // an empty edge range still leaves a gap when pages are skipped
        Self {
            current,
            total_pages,
            gap_before: start > 1,
            gap_after: end < total_pages,
            first,
            main: Some(start..=end),
            last,
        }
    }

    /// Flattened navigation: page numbers in order with gaps between
    /// disjoint ranges.
    #[must_use]
    pub fn items(&self) -> Vec<PageItem> {
        let mut items = Vec::new();
        let push_range = |items: &mut Vec<PageItem>, range: &RangeInclusive<u64>| {
            for number in range.clone() {
                items.push(PageItem::Page {
                    number,
                    current: number == self.current,
                });
            }
        };

        if let Some(first) = &self.first {
            push_range(&mut items, first);
        }
        if self.gap_before {
            items.push(PageItem::Gap);
        }
        if let Some(main) = &self.main {
            push_range(&mut items, main);
        }
        if self.gap_after {
            items.push(PageItem::Gap);
        }
        if let Some(last) = &self.last {
            push_range(&mut items, last);
        }

        items
    }
}
