use crate::{
    filter::{
        Comparison, FilterDefinition, FilterKind, NullMode,
        definition::{SET_BLANK, SET_EMPTY, SET_UNSET},
    },
    model::{Category, Value, value::parse_bool},
    param::Param,
    query::{Pattern, Predicate},
};
use serde::{Deserialize, Serialize};

///
/// FilterState
///
/// Per-session value of one active filter instance. The kind-specific part
/// is a closed union; every operation dispatches on it.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct FilterState {
    pub attribute: String,
    #[serde(default)]
    pub negated: bool,
    #[serde(flatten)]
    pub fields: FilterFields,
}

///
/// FilterFields
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterFields {
    Default {
        #[serde(default)]
        comparison: Option<Comparison>,
        #[serde(default)]
        value: Option<Value>,
    },
    Set {
        #[serde(default)]
        selected: Vec<i64>,
    },
    Null {
        #[serde(default)]
        value: Option<bool>,
    },
    Boolean {
        #[serde(default)]
        value: Option<bool>,
    },
    Range {
        #[serde(default)]
        first: Option<Value>,
        #[serde(default)]
        last: Option<Value>,
    },
    Pattern {
        #[serde(default)]
        value: Option<String>,
    },
}

impl FilterFields {
    #[must_use]
    pub const fn kind(&self) -> FilterKind {
        match self {
            Self::Default { .. } => FilterKind::Default,
            Self::Set { .. } => FilterKind::Set,
            Self::Null { .. } => FilterKind::Null,
            Self::Boolean { .. } => FilterKind::Boolean,
            Self::Range { .. } => FilterKind::Range,
            Self::Pattern { .. } => FilterKind::Pattern,
        }
    }
}

///
/// Mutation
/// Outcome of applying one raw change set to a filter.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Mutation {
    /// The set or order of matching records may have changed.
    pub material: bool,
    /// Raw values dropped because they were malformed or out of range.
    pub ignored: u32,
}

impl FilterState {
    /// Fresh, non-matching state for `def`.
    #[must_use]
    pub fn new(attribute: impl Into<String>, def: &FilterDefinition) -> Self {
        let fields = match def.kind() {
            FilterKind::Default => FilterFields::Default {
                comparison: match def.category() {
                    Category::Boolean => None,
                    _ => Comparison::vocabulary(def).first().copied(),
                },
                value: None,
            },
            FilterKind::Set => FilterFields::Set {
                selected: Vec::new(),
            },
            FilterKind::Null => FilterFields::Null { value: None },
            FilterKind::Boolean => FilterFields::Boolean { value: None },
            FilterKind::Range => FilterFields::Range {
                first: None,
                last: None,
            },
            FilterKind::Pattern => FilterFields::Pattern { value: None },
        };

        Self {
            attribute: attribute.into(),
            negated: false,
            fields,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> FilterKind {
        self.fields.kind()
    }

    /// Does this filter currently constrain anything?
    #[must_use]
    pub const fn matches(&self) -> bool {
        match &self.fields {
            FilterFields::Default { comparison, value } => match comparison {
                Some(op) => value.is_some() || op.is_valueless(),
                None => false,
            },
            FilterFields::Set { selected } => !selected.is_empty(),
            FilterFields::Null { value } | FilterFields::Boolean { value } => value.is_some(),
            FilterFields::Range { first, last } => first.is_some() && last.is_some(),
            FilterFields::Pattern { value } => value.is_some(),
        }
    }

    /// Apply raw changes and report whether the change is material.
    pub fn mutate(&mut self, def: &FilterDefinition, raw: &Param) -> bool {
        self.apply(def, raw).material
    }

    /// Apply raw changes. Malformed values are dropped and the prior value is
    /// kept; a change is material when it flips whether the filter applies,
    /// or alters it while it keeps applying.
    pub fn apply(&mut self, def: &FilterDefinition, raw: &Param) -> Mutation {
        let before = self.clone();
        let mut ignored = 0;

        if let Some(not) = raw.get("not") {
            // an unchecked box submits nothing or an empty string
            let flag = not
                .as_text()
                .and_then(|text| if text.trim().is_empty() { Some(false) } else { parse_bool(text) });
            match flag {
                Some(flag) if def.negatable() => self.negated = flag,
                _ => ignored += 1,
            }
        }

        let category = def.category();
        match &mut self.fields {
            FilterFields::Default { comparison, value } => {
                if let Some(token) = raw.get("comparison").and_then(Param::as_text) {
                    if token.trim().is_empty() {
                        *comparison = None;
                    } else if let Some(op) = Comparison::parse(token, def) {
                        *comparison = Some(op);
                    } else {
                        ignored += 1;
                    }
                }
                if comparison.is_some_and(Comparison::is_valueless) {
                    *value = None;
                } else if let Some(text) = raw.get("value").and_then(Param::as_text) {
                    ignored += assign_value(value, category, text);
                }
            }

            FilterFields::Set { selected } => {
                if let Some(param) = raw.get("selected") {
                    match parse_selection(def, param) {
                        Some(indices) => *selected = indices,
                        None => ignored += 1,
                    }
                }
            }

            FilterFields::Null { value } | FilterFields::Boolean { value } => {
                if let Some(text) = raw.get("value").and_then(Param::as_text) {
                    if text.trim().is_empty() {
                        *value = None;
                    } else if let Some(flag) = parse_bool(text) {
                        *value = Some(flag);
                    } else {
                        ignored += 1;
                    }
                }
            }

            FilterFields::Range { first, last } => {
                if let Some(text) = raw.get("first").and_then(Param::as_text) {
                    ignored += assign_value(first, category, text);
                }
                if let Some(text) = raw.get("last").and_then(Param::as_text) {
                    ignored += assign_value(last, category, text);
                }
            }

            FilterFields::Pattern { value } => {
                if let Some(text) = raw.get("value").and_then(Param::as_text) {
                    *value = (!text.is_empty()).then(|| text.to_string());
                }
            }
        }

        let was = before.matches();
        let is = self.matches();

        Mutation {
            material: was != is || (is && *self != before),
            ignored,
        }
    }

    /// Return to defaults; material when the filter was applying.
    pub fn reset(&mut self, def: &FilterDefinition) -> bool {
        let was = self.matches();
        *self = Self::new(std::mem::take(&mut self.attribute), def);

        was
    }

    /// Whether this state can be driven by `def` (persisted state may
    /// predate a configuration change).
    #[must_use]
    pub fn conforms(&self, def: &FilterDefinition) -> bool {
        if self.kind() != def.kind() || (self.negated && !def.negatable()) {
            return false;
        }

        match &self.fields {
            FilterFields::Default { comparison, .. } => {
                comparison.is_none_or(|op| Comparison::vocabulary(def).contains(&op))
            }
            FilterFields::Set { selected } => {
                (def.multiple() || selected.len() <= 1)
                    && selected.iter().all(|i| def.is_valid_set_index(*i))
            }
            _ => true,
        }
    }

    /// Predicate for one backing field, with kind-specific inversion already
    /// applied when negated. `None` when the filter does not apply.
    #[must_use]
    pub fn atom(&self, def: &FilterDefinition, field: &str) -> Option<Predicate> {
        if !self.matches() {
            return None;
        }
        let negated = self.negated;

        match &self.fields {
            FilterFields::Default { comparison, value } => {
                let op = (*comparison)?;
                Some(default_atom(def, field, op, value.clone(), negated))
            }

            FilterFields::Set { selected } => Some(set_atom(def, field, selected, negated)),

            FilterFields::Null { value } => {
                let null = (*value)? != negated;
                Some(null_atom(def.null_mode(), field, null))
            }

            FilterFields::Boolean { value } => {
                Some(boolean_atom(field, (*value)?, negated, def.non_true()))
            }

            FilterFields::Range { first, last } => {
                let between = Predicate::between(field, first.clone()?, last.clone()?);
                Some(if negated {
                    Predicate::not(between)
                } else {
                    between
                })
            }

            FilterFields::Pattern { value } => {
                let pattern = Pattern::parse(value.as_deref()?);
                Some(if negated {
                    Predicate::not_matches(field, pattern)
                } else {
                    Predicate::matches(field, pattern)
                })
            }
        }
    }

    /// Short human summary of an applying filter, e.g. "Age is greater
    /// than 30". The definition's display label wins over `caption`.
    #[must_use]
    pub fn describe(&self, def: &FilterDefinition, caption: &str) -> Option<String> {
        if !self.matches() {
            return None;
        }
        let label = def.display().unwrap_or(caption);
        let negated = self.negated;

        let text = match &self.fields {
            FilterFields::Default { comparison, value } => {
                let op = (*comparison)?;
                let phrase = op.phrase(negated, def.category());
                match value {
                    Some(value) if !op.is_valueless() => format!("{label} {phrase} {value}"),
                    _ => format!("{label} {phrase}"),
                }
            }

            FilterFields::Set { selected } => {
                let labels: Vec<&str> = selected
                    .iter()
                    .filter_map(|i| set_label(def, *i))
                    .collect();
                let verb = match (labels.len() > 1, negated) {
                    (false, false) => "is",
                    (false, true) => "is not",
                    (true, false) => "is one of",
                    (true, true) => "is none of",
                };
                format!("{label} {verb} {}", labels.join(", "))
            }

            FilterFields::Null { value } => {
                let word = match def.null_mode() {
                    NullMode::Null => "unset",
                    NullMode::Blank => "blank",
                    NullMode::Empty => "empty",
                };
                let verb = if (*value)? != negated { "is" } else { "is not" };
                format!("{label} {verb} {word}")
            }

            FilterFields::Boolean { value } => {
                let phrase = match ((*value)?, negated) {
                    (true, false) => "is true",
                    (false, false) if def.non_true() => "is not true",
                    (false, false) => "is false",
                    (true, true) => "is not true",
                    (false, true) if def.non_true() => "is true",
                    (false, true) => "is not false",
                };
                format!("{label} {phrase}")
            }

            FilterFields::Range { first, last } => {
                let verb = if negated { "is not between" } else { "is between" };
                format!("{label} {verb} {} and {}", first.as_ref()?, last.as_ref()?)
            }

            FilterFields::Pattern { value } => {
                let verb = if negated { "does not match" } else { "matches" };
                format!("{label} {verb} {}", value.as_deref()?)
            }
        };

        Some(text)
    }
}

// Set `slot` from raw text: empty clears, malformed is ignored (returns 1).
fn assign_value(slot: &mut Option<Value>, category: Category, text: &str) -> u32 {
    if text.trim().is_empty() {
        *slot = None;
        return 0;
    }

    match Value::parse(category, text) {
        Some(value) => {
            *slot = Some(value);
            0
        }
        None => 1,
    }
}

// Parse a set selection; any out-of-range index rejects the whole update.
fn parse_selection(def: &FilterDefinition, param: &Param) -> Option<Vec<i64>> {
    let mut indices = Vec::new();
    for text in param.texts() {
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        let index: i64 = text.parse().ok()?;
        if !def.is_valid_set_index(index) {
            return None;
        }
        indices.push(index);
    }

    indices.sort_unstable();
    indices.dedup();
    if !def.multiple() && indices.len() > 1 {
        return None;
    }

    Some(indices)
}

fn set_label(def: &FilterDefinition, index: i64) -> Option<&str> {
    match index {
        SET_UNSET => Some("unset"),
        SET_BLANK => Some("blank"),
        SET_EMPTY => Some("empty"),
        i => def
            .values()
            .get(usize::try_from(i).ok()?)
            .map(|(label, _)| label),
    }
}

fn default_atom(
    def: &FilterDefinition,
    field: &str,
    op: Comparison,
    value: Option<Value>,
    negated: bool,
) -> Predicate {
    match op {
        Comparison::IsUnset => null_atom(NullMode::Null, field, !negated),
        Comparison::IsBlank => null_atom(NullMode::Blank, field, !negated),
        Comparison::IsEmpty => null_atom(NullMode::Empty, field, !negated),
        Comparison::True => boolean_atom(field, true, negated, false),
        Comparison::False => boolean_atom(field, false, negated, def.non_true()),
        _ => {
            let value = value.unwrap_or(Value::Null);
            let Some(cmp) = op.compare_op() else {
                return Predicate::False;
            };
            if !negated {
                return Predicate::compare(field, cmp, value);
            }
            match cmp.inverse() {
                Some(inverse) => Predicate::compare(field, inverse, value),
                None => Predicate::not(Predicate::compare(field, cmp, value)),
            }
        }
    }
}

fn set_atom(def: &FilterDefinition, field: &str, selected: &[i64], negated: bool) -> Predicate {
    let mut values = Vec::new();
    let mut pseudo = Vec::new();
    for index in selected {
        match *index {
            SET_UNSET => pseudo.push(NullMode::Null),
            SET_BLANK => pseudo.push(NullMode::Blank),
            SET_EMPTY => pseudo.push(NullMode::Empty),
            i => {
                if let Some((_, value)) = usize::try_from(i).ok().and_then(|i| def.values().get(i)) {
                    values.push(value.clone());
                }
            }
        }
    }

    let mut parts = Vec::new();
    if !values.is_empty() {
        parts.push(if negated {
            Predicate::not_in(field, values)
        } else {
            Predicate::in_(field, values)
        });
    }
    parts.extend(pseudo.into_iter().map(|mode| null_atom(mode, field, !negated)));

    if negated {
        Predicate::and(parts)
    } else {
        Predicate::or(parts)
    }
}

// `present == true` selects the null/blank/empty rows, `false` the others.
fn null_atom(mode: NullMode, field: &str, present: bool) -> Predicate {
    match (mode, present) {
        (NullMode::Null, true) => Predicate::is_null(field),
        (NullMode::Null, false) => Predicate::is_not_null(field),
        (NullMode::Blank, true) => Predicate::is_blank(field),
        (NullMode::Blank, false) => Predicate::is_not_blank(field),
        (NullMode::Empty, true) => Predicate::eq(field, Value::from("")),
        (NullMode::Empty, false) => Predicate::ne(field, Value::from("")),
    }
}

fn boolean_atom(field: &str, value: bool, negated: bool, non_true: bool) -> Predicate {
    let truth = Value::Bool(true);

    match (value, negated) {
        (true, false) => Predicate::eq(field, truth),
        (true, true) => Predicate::ne(field, truth),
        (false, false) if non_true => Predicate::ne(field, truth),
        (false, false) => Predicate::eq(field, Value::Bool(false)),
        (false, true) if non_true => Predicate::eq(field, truth),
        (false, true) => Predicate::ne(field, Value::Bool(false)),
    }
}
