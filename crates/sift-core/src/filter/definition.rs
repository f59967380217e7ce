use crate::{
    error::ConfigError,
    filter::FilterKind,
    model::{Category, Value},
};
use serde::{Deserialize, Deserializer};

///
/// CONSTANTS
///
/// Reserved negative set indices selecting pseudo-members.
///

pub const SET_UNSET: i64 = -1;
pub const SET_BLANK: i64 = -2;
pub const SET_EMPTY: i64 = -3;

///
/// FilterOption
///
/// One configuration knob for a filter definition. Which knobs are legal
/// depends on the filter kind and the attribute category.
///

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum FilterOption {
    /// The filter may be negated by the user.
    Not,
    /// Label override used by filter controls.
    Display(String),
    /// Ordered values offered by a set filter.
    Values(SetValues),
    /// Set filter accepts several values at once.
    Multiple,
    /// Offer an "is unset" (null) choice.
    Unset,
    /// Offer an "is blank" (null or empty string) choice.
    Blank,
    /// Offer an "is empty" (empty string) choice.
    Empty,
    /// Present a tri-state radio group instead of a checkbox.
    Radio,
    /// The "false" branch matches everything that is not true.
    NonTrue,
}

impl FilterOption {
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Not => "not",
            Self::Display(_) => "display",
            Self::Values(_) => "values",
            Self::Multiple => "multiple",
            Self::Unset => "unset",
            Self::Blank => "blank",
            Self::Empty => "empty",
            Self::Radio => "radio",
            Self::NonTrue => "non_true",
        }
    }

    // Legality of this option for a (kind, category) pair.
    const fn is_legal(&self, kind: FilterKind, category: Category) -> bool {
        match self {
            Self::Not | Self::Display(_) => true,
            Self::Values(_) | Self::Multiple => matches!(kind, FilterKind::Set),
            Self::Unset => matches!(kind, FilterKind::Default | FilterKind::Set),
            Self::Blank | Self::Empty => {
                matches!(kind, FilterKind::Default | FilterKind::Set | FilterKind::Null)
                    && category.is_string()
            }
            Self::Radio => matches!(kind, FilterKind::Null | FilterKind::Boolean),
            Self::NonTrue => {
                matches!(kind, FilterKind::Boolean) && matches!(category, Category::Boolean)
            }
        }
    }
}

///
/// SetValues
/// Ordered `(label, value)` pairs offered by a set filter.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SetValues {
    entries: Vec<(String, Value)>,
}

impl SetValues {
    /// Values whose labels are their own text rendering.
    pub fn list<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            entries: values
                .into_iter()
                .map(|v| {
                    let value = v.into();
                    (value.to_string(), value)
                })
                .collect(),
        }
    }

    /// Labelled values, in the given order.
    pub fn map<I, L, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (L, V)>,
        L: Into<String>,
        V: Into<Value>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(label, value)| (label.into(), value.into()))
                .collect(),
        }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<(&str, &Value)> {
        self.entries
            .get(index)
            .map(|(label, value)| (label.as_str(), value))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries
            .iter()
            .map(|(label, value)| (label.as_str(), value))
    }

    // Text entries are parsed into `category`; any other entry must
    // already belong to it.
    fn coerce(self, category: Category, entity: &str) -> Result<Self, ConfigError> {
        let mismatch = |value: String| ConfigError::SetValueCategory {
            entity: entity.to_string(),
            value,
            category,
        };

        let entries = self
            .entries
            .into_iter()
            .map(|(label, value)| {
                let value = match value {
                    Value::Text(raw) if category != Category::String => {
                        match Value::parse(category, &raw) {
                            Some(parsed) => parsed,
                            None => return Err(mismatch(raw)),
                        }
                    }
                    value if value.category() == Some(category) => value,
                    value => return Err(mismatch(value.to_string())),
                };

                Ok((label, value))
            })
            .collect::<Result<_, _>>()?;

        Ok(Self { entries })
    }
}

impl<'de> Deserialize<'de> for SetValues {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            List(Vec<String>),
            Pairs(Vec<(String, String)>),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::List(values) => Self::list(values),
            Raw::Pairs(pairs) => Self::map(pairs),
        })
    }
}

///
/// Presentation
/// How tri-state filters are rendered.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Presentation {
    #[default]
    Checkbox,
    Radio,
}

///
/// NullMode
/// What a null-kind filter (or pseudo choice) tests for.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum NullMode {
    #[default]
    Null,
    Blank,
    Empty,
}

///
/// FilterDefinition
///
/// Configuration-time description of how one attribute may be searched.
/// Immutable once created.
///

#[derive(Clone, Debug, PartialEq)]
pub struct FilterDefinition {
    kind: FilterKind,
    category: Category,
    negatable: bool,
    display: Option<String>,
    presentation: Presentation,
    non_true: bool,
    unset: bool,
    blank: bool,
    empty: bool,
    multiple: bool,
    values: SetValues,
}

impl FilterDefinition {
    /// Validate `options` for `(kind, category)` and build the definition.
    pub fn create(
        kind: FilterKind,
        entity: &str,
        category: Category,
        options: Vec<FilterOption>,
    ) -> Result<Self, ConfigError> {
        if !kind.accepts_category(category) {
            return Err(ConfigError::IllegalCategory { kind, category });
        }

        let mut def = Self {
            kind,
            category,
            negatable: false,
            display: None,
            presentation: Presentation::default(),
            non_true: false,
            unset: false,
            blank: false,
            empty: false,
            multiple: false,
            values: SetValues::default(),
        };
        let mut seen: Vec<&'static str> = Vec::new();
        let mut has_values = false;

        for option in options {
            let key = option.key();
            if !option.is_legal(kind, category) {
                return Err(ConfigError::IllegalOption {
                    kind,
                    category,
                    option: key,
                });
            }
            if seen.contains(&key) {
                return Err(ConfigError::DuplicateOption { kind, option: key });
            }
            seen.push(key);

            match option {
                FilterOption::Not => def.negatable = true,
                FilterOption::Display(display) => def.display = Some(display),
                FilterOption::Values(values) => {
                    if values.is_empty() {
                        return Err(ConfigError::EmptySetValues {
                            entity: entity.to_string(),
                        });
                    }
                    def.values = values.coerce(category, entity)?;
                    has_values = true;
                }
                FilterOption::Multiple => def.multiple = true,
                FilterOption::Unset => def.unset = true,
                FilterOption::Blank => def.blank = true,
                FilterOption::Empty => def.empty = true,
                FilterOption::Radio => def.presentation = Presentation::Radio,
                FilterOption::NonTrue => def.non_true = true,
            }
        }

        if kind == FilterKind::Set && !has_values {
            return Err(ConfigError::MissingOption {
                kind,
                option: "values",
            });
        }
        if kind == FilterKind::Null && def.blank && def.empty {
            return Err(ConfigError::ExclusiveOptions {
                kind,
                first: "blank",
                second: "empty",
            });
        }

        Ok(def)
    }

    #[must_use]
    pub const fn kind(&self) -> FilterKind {
        self.kind
    }

    #[must_use]
    pub const fn category(&self) -> Category {
        self.category
    }

    #[must_use]
    pub const fn negatable(&self) -> bool {
        self.negatable
    }

    #[must_use]
    pub fn display(&self) -> Option<&str> {
        self.display.as_deref()
    }

    #[must_use]
    pub const fn presentation(&self) -> Presentation {
        self.presentation
    }

    #[must_use]
    pub const fn non_true(&self) -> bool {
        self.non_true
    }

    #[must_use]
    pub const fn offers_unset(&self) -> bool {
        self.unset
    }

    #[must_use]
    pub const fn offers_blank(&self) -> bool {
        self.blank
    }

    #[must_use]
    pub const fn offers_empty(&self) -> bool {
        self.empty
    }

    #[must_use]
    pub const fn multiple(&self) -> bool {
        self.multiple
    }

    #[must_use]
    pub const fn values(&self) -> &SetValues {
        &self.values
    }

    /// What a null-kind filter tests for.
    #[must_use]
    pub const fn null_mode(&self) -> NullMode {
        if self.blank {
            NullMode::Blank
        } else if self.empty {
            NullMode::Empty
        } else {
            NullMode::Null
        }
    }

    /// Whether `index` addresses a set value or an enabled pseudo-member.
    #[must_use]
    pub fn is_valid_set_index(&self, index: i64) -> bool {
        match index {
            SET_UNSET => self.unset,
            SET_BLANK => self.blank,
            SET_EMPTY => self.empty,
            i => usize::try_from(i).is_ok_and(|i| i < self.values.len()),
        }
    }
}
