//! Attribute registry.
//!
//! An [`Attribute`] is a named, typed view over one or more physical fields
//! of an entity. It carries the display, sort and search capabilities the
//! controls and the query composer consume.

mod registry;


use crate::{
    filter::FilterDefinition,
    model::{Category, Value},
    query::OrderDirection,
    store::Record,
};
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};

// re-exports
pub use registry::{AttributeConfig, AttributeRegistry, normalize_name};

///
/// Renderer
/// Turns an attribute value into display text.
///

pub type Renderer = Arc<dyn Fn(&Value) -> String + Send + Sync>;

///
/// Combinator
/// Folds the backing values of a logical attribute into one value.
///

pub type Combinator = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;

///
/// SortMode
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    /// Follow the requested direction.
    #[default]
    Mirror,
    /// Always the opposite of the requested direction.
    Reverse,
    Ascending,
    Descending,
}

impl SortMode {
    #[must_use]
    pub const fn direction(self, descending: bool) -> OrderDirection {
        match self {
            Self::Mirror => OrderDirection::from_descending(descending),
            Self::Reverse => OrderDirection::from_descending(!descending),
            Self::Ascending => OrderDirection::Asc,
            Self::Descending => OrderDirection::Desc,
        }
    }
}

///
/// SortRule
/// One physical field contributed to the ordering when sorting by an attribute.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SortRule {
    pub field: String,
    #[serde(default)]
    pub mode: SortMode,
}

impl SortRule {
    #[must_use]
    pub fn new(field: impl Into<String>, mode: SortMode) -> Self {
        Self {
            field: field.into(),
            mode,
        }
    }

    #[must_use]
    pub fn mirror(field: impl Into<String>) -> Self {
        Self::new(field, SortMode::Mirror)
    }
}

///
/// DisplaySpec
///

#[derive(Clone)]
pub struct DisplaySpec {
    pub caption: String,
    pub renderer: Option<Renderer>,
}

impl fmt::Debug for DisplaySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisplaySpec")
            .field("caption", &self.caption)
            .field("renderer", &self.renderer.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

///
/// Attribute
///
/// Literal attributes have exactly one backing field named like the
/// attribute and take its category. Logical attributes span other fields,
/// declare their category, and fold backing values through a combinator.
///

#[derive(Clone)]
pub struct Attribute {
    entity: String,
    name: String,
    backing_fields: Vec<String>,
    category: Category,
    combinator: Option<Combinator>,
    display: Option<DisplaySpec>,
    sort: Option<Vec<SortRule>>,
    filter: Option<FilterDefinition>,
}

impl Attribute {
    pub(crate) const fn new(
        entity: String,
        name: String,
        backing_fields: Vec<String>,
        category: Category,
    ) -> Self {
        Self {
            entity,
            name,
            backing_fields,
            category,
            combinator: None,
            display: None,
            sort: None,
            filter: None,
        }
    }

    #[must_use]
    pub fn entity(&self) -> &str {
        &self.entity
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn backing_fields(&self) -> &[String] {
        &self.backing_fields
    }

    #[must_use]
    pub const fn category(&self) -> Category {
        self.category
    }

    #[must_use]
    pub fn is_literal(&self) -> bool {
        matches!(self.backing_fields.as_slice(), [field] if *field == self.name)
    }

    #[must_use]
    pub const fn display(&self) -> Option<&DisplaySpec> {
        self.display.as_ref()
    }

    #[must_use]
    pub const fn is_displayable(&self) -> bool {
        self.display.is_some()
    }

    /// Caption shown in headers and filter labels.
    #[must_use]
    pub fn caption(&self) -> String {
        self.display
            .as_ref()
            .map_or_else(|| default_caption(&self.name), |d| d.caption.clone())
    }

    #[must_use]
    pub fn sort_rules(&self) -> Option<&[SortRule]> {
        self.sort.as_deref()
    }

    #[must_use]
    pub const fn is_sortable(&self) -> bool {
        self.sort.is_some()
    }

    #[must_use]
    pub const fn filter(&self) -> Option<&FilterDefinition> {
        self.filter.as_ref()
    }

    #[must_use]
    pub const fn is_searchable(&self) -> bool {
        self.filter.is_some()
    }

    /// Value of this attribute on one record. Missing fields read as null.
    #[must_use]
    pub fn value<R: Record + ?Sized>(&self, record: &R) -> Value {
        let values: Vec<Value> = self
            .backing_fields
            .iter()
            .map(|field| record.field(field).unwrap_or(Value::Null))
            .collect();

        if let Some(combine) = &self.combinator {
            return combine(&values);
        }

        match (self.category, values.as_slice()) {
            (_, [single]) => single.clone(),
            (Category::String, _) => {
                let parts: Vec<String> = values
                    .iter()
                    .filter(|v| !v.is_null())
                    .map(ToString::to_string)
                    .collect();
                if parts.is_empty() {
                    Value::Null
                } else {
                    Value::Text(parts.join(" "))
                }
            }
            _ => values
                .into_iter()
                .find(|v| !v.is_null())
                .unwrap_or(Value::Null),
        }
    }

    /// Display text for one record, through the renderer when set.
    #[must_use]
    pub fn render<R: Record + ?Sized>(&self, record: &R) -> String {
        let value = self.value(record);

        match self.display.as_ref().and_then(|d| d.renderer.as_ref()) {
            Some(render) => render(&value),
            None => value.to_string(),
        }
    }
}

impl fmt::Debug for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attribute")
            .field("entity", &self.entity)
            .field("name", &self.name)
            .field("backing_fields", &self.backing_fields)
            .field("category", &self.category)
            .field("combinator", &self.combinator.as_ref().map(|_| "<fn>"))
            .field("display", &self.display)
            .field("sort", &self.sort)
            .field("filter", &self.filter)
            .finish()
    }
}

pub(crate) fn default_caption(name: &str) -> String {
    use convert_case::{Case, Casing};

    name.to_case(Case::Title)
}
