//! Query composer.
//!
//! A [`Form`] pairs one binding with one runtime state for the length of an
//! interaction. It folds filters and sorts into a [`Query`], asks the store
//! for the count and the current page window, and exposes what controls
//! need to render the current selections.

pub mod pagination;
mod update;


use crate::{
    attribute::{Attribute, normalize_name},
    binding::{Binding, BindingId},
    error::ConfigError,
    filter::FilterState,
    obs::{MetricsEvent, sink::record},
    query::{OrderSpec, PageSpec, Predicate, Query},
    schema::Schema,
    state::RuntimeState,
    store::Store,
};
use tracing::{debug, warn};

// re-exports
pub use pagination::{PageItem, PageWindow};

///
/// ActiveFilter
/// Control-facing view of one filter instance.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ActiveFilter {
    pub index: usize,
    pub attribute: String,
    pub caption: String,
    pub negated: bool,
    pub matches: bool,
    pub description: Option<String>,
}

///
/// Form
///

pub struct Form<'a, S: Store> {
    schema: &'a Schema,
    binding: &'a Binding,
    parent_entity: Option<&'a str>,
    parent: Option<&'a S::Record>,
    state: &'a mut RuntimeState,
    store: &'a S,
    base: Option<S::Collection>,
    records: Vec<S::Record>,
    selected: Option<S::Record>,
}

impl<'a, S: Store> Form<'a, S> {
    /// Pair a binding with its runtime state.
    ///
    /// Filters and sorts must reference searchable and sortable attributes
    /// of the binding's entity. Persisted filters whose shape no longer fits
    /// their definition are reinitialized. Child bindings need the parent's
    /// selected record.
    pub fn new(
        schema: &'a Schema,
        binding: BindingId,
        state: &'a mut RuntimeState,
        store: &'a S,
        parent: Option<&'a S::Record>,
    ) -> Result<Self, ConfigError> {
        let binding = schema.binding(binding)?;
        let entity = binding.entity.as_str();

        let parent_entity = match binding.parent {
            Some(parent_id) => {
                if parent.is_none() {
                    return Err(ConfigError::MissingParentRecord {
                        binding: binding.id.0,
                    });
                }
                Some(schema.binding(parent_id)?.entity.as_str())
            }
            None => None,
        };

        for filter in &mut state.filters {
            let attribute = schema.attribute(entity, &filter.attribute)?;
            let Some(def) = attribute.filter() else {
                return Err(ConfigError::NotSearchable {
                    entity: entity.to_string(),
                    name: attribute.name().to_string(),
                });
            };
            if !filter.conforms(def) {
                warn!(entity, attribute = attribute.name(), "stale filter state reinitialized");
                *filter = FilterState::new(attribute.name(), def);
            }
        }
        for clause in &state.sorts {
            let attribute = schema.attribute(entity, &clause.attribute)?;
            if !attribute.is_sortable() {
                return Err(ConfigError::NotSortable {
                    entity: entity.to_string(),
                    name: attribute.name().to_string(),
                });
            }
        }

        let per_page = u64::from(state.per_page());
        state.set_per_page(per_page, schema.settings());

        Ok(Self {
            schema,
            binding,
            parent_entity,
            parent,
            state,
            store,
            base: None,
            records: Vec::new(),
            selected: None,
        })
    }

    #[must_use]
    pub const fn binding(&self) -> &Binding {
        self.binding
    }

    #[must_use]
    pub fn state(&self) -> &RuntimeState {
        self.state
    }

    fn entity(&self) -> &'a str {
        self.binding.entity.as_str()
    }

    fn attribute(&self, name: &str) -> Option<&'a Attribute> {
        self.schema.attributes().lookup(self.entity(), name)
    }

    /// The collection every query starts from: the parent record's
    /// accessor for child bindings, else the entity's root accessor.
    pub fn base_collection(&mut self) -> Result<S::Collection, S::Error> {
        if let Some(base) = &self.base {
            return Ok(base.clone());
        }

        let accessor = self.binding.accessor.as_deref();
        let base = match (self.parent_entity, self.parent, accessor) {
            (Some(parent_entity), Some(parent), Some(accessor)) => {
                self.store.related(parent_entity, parent, accessor)?
            }
            _ => self.store.root(self.entity(), accessor)?,
        };
        self.base = Some(base.clone());

        Ok(base)
    }

    /// Conjunction of every applying filter. Within a filter, backing-field
    /// atoms are OR-ed, or AND-ed when the filter is negated.
    #[must_use]
    pub fn filter_predicate(&self) -> Option<Predicate> {
        let mut parts = Vec::new();

        for filter in &self.state.filters {
            let Some(attribute) = self.attribute(&filter.attribute) else {
                continue;
            };
            let Some(def) = attribute.filter() else {
                continue;
            };

            let atoms: Vec<Predicate> = attribute
                .backing_fields()
                .iter()
                .filter_map(|field| filter.atom(def, field))
                .collect();
            if atoms.is_empty() {
                continue;
            }

            parts.push(if filter.negated {
                Predicate::and(atoms)
            } else {
                Predicate::or(atoms)
            });
        }

        (!parts.is_empty()).then(|| Predicate::and(parts))
    }

    /// Ordering from the sort clauses, highest priority first. Fields
    /// already ordered by an earlier clause are skipped.
    #[must_use]
    pub fn order(&self) -> OrderSpec {
        let mut order = OrderSpec::default();

        for clause in &self.state.sorts {
            let Some(rules) = self.attribute(&clause.attribute).and_then(Attribute::sort_rules)
            else {
                continue;
            };
            for rule in rules {
                order.push(rule.field.as_str(), rule.mode.direction(clause.descending));
            }
        }

        order
    }

    pub fn query(&mut self) -> Result<Query<S::Collection>, S::Error> {
        Ok(Query {
            collection: self.base_collection()?,
            predicate: self.filter_predicate(),
            order: self.order(),
        })
    }

    /// Recount the filtered collection into the runtime state.
    pub fn update_total(&mut self) -> Result<u64, S::Error> {
        let query = self.query()?;
        let total = self.store.count(&query)?;
        self.state.set_total(total);

        Ok(total)
    }

    /// Recount, then load the current page window and the selected record.
    pub fn reload(&mut self) -> Result<(), S::Error> {
        let total = self.update_total()?;

        if total == 0 {
            self.records.clear();
            self.selected = None;
        } else {
            let query = self.query()?;
            let page = PageSpec {
                offset: self.state.page_offset(),
                limit: u64::from(self.state.per_page()),
            };
            self.records = self.store.fetch(&query, page)?;

            let index = usize::try_from(self.state.selected().saturating_sub(1)).unwrap_or(0);
            self.selected = self.records.get(index).cloned();
        }

        let rows = self.records.len() as u64;
        debug!(entity = self.entity(), total, rows, page = self.state.page(), "reload");
        record(MetricsEvent::Reload {
            entity: self.entity().to_string(),
            total,
            rows,
        });

        Ok(())
    }

    /// Records of the current page, as of the last reload.
    #[must_use]
    pub fn records(&self) -> &[S::Record] {
        &self.records
    }

    #[must_use]
    pub const fn selected_record(&self) -> Option<&S::Record> {
        self.selected.as_ref()
    }

    #[must_use]
    pub fn total_pages(&self) -> u64 {
        self.state.total_pages()
    }

    #[must_use]
    pub fn pagination(&self) -> PageWindow {
        PageWindow::compute(
            self.state.page(),
            self.state.total_pages(),
            &self.schema.settings().pagination,
        )
    }

    /// Searchable attributes of the entity, in definition order.
    #[must_use]
    pub fn searchable_attributes(&self) -> Vec<&'a Attribute> {
        self.schema
            .attributes()
            .iter(self.entity())
            .filter(|attribute| attribute.is_searchable())
            .collect()
    }

    /// Sortable attributes of the entity, in definition order.
    #[must_use]
    pub fn sortable_attributes(&self) -> Vec<&'a Attribute> {
        self.schema
            .attributes()
            .iter(self.entity())
            .filter(|attribute| attribute.is_sortable())
            .collect()
    }

    /// 1-based sort priority and direction for a column header.
    #[must_use]
    pub fn sort_indicator(&self, attribute: &str) -> Option<(usize, bool)> {
        let name = normalize_name(attribute).ok()?;
        self.state.sort_position(&name)
    }

    #[must_use]
    pub fn active_filters(&self) -> Vec<ActiveFilter> {
        self.state
            .filters
            .iter()
            .enumerate()
            .filter_map(|(index, filter)| {
                let attribute = self.attribute(&filter.attribute)?;
                let def = attribute.filter()?;
                let caption = def
                    .display()
                    .map_or_else(|| attribute.caption(), str::to_string);

                Some(ActiveFilter {
                    index,
                    attribute: attribute.name().to_string(),
                    description: filter.describe(def, &caption),
                    caption,
                    negated: filter.negated,
                    matches: filter.matches(),
                })
            })
            .collect()
    }
}
