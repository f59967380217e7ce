use crate::{
    filter::FilterState,
    form::Form,
    obs::{MetricsEvent, sink::record},
    param::{Param, Params},
    store::Store,
};
use tracing::debug;

///
/// Instruction keys
///

const DELETE_FILTER: &str = "delete_filter";
const ADD_FILTER: &str = "add_filter";
const FILTERS: &str = "filters";
const PER_PAGE: &str = "per_page";
const SORT: &str = "sort";
const PAGE: &str = "page";
const RECORD: &str = "record";
const OFFSET: &str = "offset";

const COMMAND_UPDATE: &str = "update";
const COMMAND_RESET: &str = "reset";

impl<S: Store> Form<'_, S> {
    /// Apply one interaction's raw instructions, then reload.
    ///
    /// Instructions are applied in a fixed order: filter removal, filter
    /// addition, bulk filter update (`command == "update"`) or reset
    /// (`command == "reset"`), page size, sort, then navigation by page,
    /// record and absolute offset. Malformed values are skipped.
    pub fn update(&mut self, params: &Params, command: Option<&str>) -> Result<(), S::Error> {
        let mut material = false;

        if let Some(raw) = params.get(DELETE_FILTER) {
            material |= self.delete_filters(raw);
        }
        if let Some(name) = params.get(ADD_FILTER).and_then(Param::as_text) {
            self.add_filter(name);
        }
        match command {
            Some(COMMAND_UPDATE) => {
                if let Some(raw) = params.get(FILTERS) {
                    material |= self.update_filters(raw);
                }
            }
            Some(COMMAND_RESET) => material |= self.reset_filters(),
            _ => {}
        }

        if material {
            self.state.reset(true);
        }
        if material || self.state.total() == 0 {
            self.update_total()?;
        }

        let settings = self.schema.settings();
        if let Some(per_page) = params.get(PER_PAGE).and_then(Param::as_u64) {
            self.state.set_per_page(per_page, settings);
        }
        if let Some(name) = params.get(SORT).and_then(Param::as_text) {
            self.sort(name);
        }
        if let Some(page) = params.get(PAGE).and_then(Param::as_u64) {
            self.state.set_page(page);
        }
        if let Some(selected) = params.get(RECORD).and_then(Param::as_u64) {
            self.state.set_selected(selected);
        }
        if let Some(offset) = params.get(OFFSET).and_then(Param::as_u64) {
            self.state.set_offset(offset);
        }

        self.reload()
    }

    /// Add a fresh filter for a searchable attribute. Unknown or
    /// non-searchable names are ignored.
    pub fn add_filter(&mut self, name: &str) -> bool {
        let Some(attribute) = self.attribute(name) else {
            debug!(entity = self.entity(), name, "add_filter: unknown attribute");
            return false;
        };
        let Some(def) = attribute.filter() else {
            return false;
        };

        self.state
            .filters
            .push(FilterState::new(attribute.name(), def));
        true
    }

    // Remove filters by index (scalar or list); true if any removed filter
    // was applying.
    fn delete_filters(&mut self, raw: &Param) -> bool {
        let mut indices: Vec<usize> = raw
            .texts()
            .into_iter()
            .filter_map(|text| text.trim().parse().ok())
            .filter(|index| *index < self.state.filters.len())
            .collect();
        indices.sort_unstable();
        indices.dedup();

        let mut material = false;
        for index in indices.into_iter().rev() {
            material |= self.state.filters.remove(index).matches();
        }

        material
    }

    // Bulk update from a list or index-keyed map of raw filter changes.
    fn update_filters(&mut self, raw: &Param) -> bool {
        let schema = self.schema;
        let entity = self.entity();
        let mut material = false;
        let mut ignored = 0_u64;

        for (index, changes) in raw.indexed() {
            let Some(filter) = self.state.filters.get_mut(index) else {
                ignored += 1;
                continue;
            };
            let Some(def) = schema
                .attributes()
                .lookup(entity, &filter.attribute)
                .and_then(|attribute| attribute.filter())
            else {
                continue;
            };

            let outcome = filter.apply(def, changes);
            material |= outcome.material;
            ignored += u64::from(outcome.ignored);
            record(MetricsEvent::FilterChanged {
                entity: entity.to_string(),
                material: outcome.material,
            });
        }

        if ignored > 0 {
            debug!(entity, ignored, "filter input ignored");
            record(MetricsEvent::InputIgnored {
                entity: entity.to_string(),
                count: ignored,
            });
        }

        material
    }

    fn reset_filters(&mut self) -> bool {
        let schema = self.schema;
        let entity = self.entity();
        let mut material = false;

        for filter in &mut self.state.filters {
            if let Some(def) = schema
                .attributes()
                .lookup(entity, &filter.attribute)
                .and_then(|attribute| attribute.filter())
            {
                material |= filter.reset(def);
            }
        }

        material
    }

    // Toggle or promote a sort clause; ordering changes select the first
    // record again.
    fn sort(&mut self, name: &str) {
        let Some(attribute) = self.attribute(name).filter(|a| a.is_sortable()) else {
            debug!(entity = self.entity(), name, "sort: attribute not sortable");
            return;
        };
        let name = attribute.name();

        let max_sorts = self.schema.settings().max_sorts;
        if self.state.sort_by(name, max_sorts) {
            self.state.reset(false);
            record(MetricsEvent::SortChanged {
                entity: self.entity().to_string(),
            });
        }
    }
}
