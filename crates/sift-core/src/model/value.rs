use crate::model::category::Category;
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt};
use time::{
    Date, PrimitiveDateTime, Time, format_description::BorrowedFormatItem,
    macros::format_description,
};

///
/// CONSTANTS
///

const DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

const DATETIME_FORMATS: &[&[BorrowedFormatItem<'_>]] = &[
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]"),
];

const TIME_FORMATS: &[&[BorrowedFormatItem<'_>]] = &[
    format_description!("[hour]:[minute]:[second]"),
    format_description!("[hour]:[minute]"),
];

const TRUE_WORDS: &[&str] = &["1", "true", "t", "yes", "y", "on"];
const FALSE_WORDS: &[&str] = &["0", "false", "f", "no", "n", "off"];

///
/// Value
/// can be used in predicates and persisted filter state
///
/// Null        → the field holds no value (SQL NULL).
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Blob(Vec<u8>),
    Date(Date),
    Timestamp(PrimitiveDateTime),
    Time(Time),
}

impl Value {
    /// Parse one raw (user-supplied) string for the given category.
    ///
    /// Returns `None` when the input is malformed for the category; callers
    /// keep their previous value in that case.
    #[must_use]
    pub fn parse(category: Category, raw: &str) -> Option<Self> {
        match category {
            Category::String => Some(Self::Text(raw.to_string())),
            Category::Binary => Some(Self::Blob(raw.as_bytes().to_vec())),
            Category::Numeric => parse_numeric(raw.trim()),
            Category::Temporal => parse_temporal(raw.trim()),
            Category::Boolean => parse_bool(raw).map(Self::Bool),
        }
    }

    /// Category of a concrete value; `Null` has none.
    #[must_use]
    pub const fn category(&self) -> Option<Category> {
        match self {
            Self::Null => None,
            Self::Bool(_) => Some(Category::Boolean),
            Self::Int(_) | Self::Float(_) => Some(Category::Numeric),
            Self::Text(_) => Some(Category::String),
            Self::Blob(_) => Some(Category::Binary),
            Self::Date(_) | Self::Timestamp(_) | Self::Time(_) => Some(Category::Temporal),
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Ordering between values of the same orderable family.
    ///
    /// Integers and floats compare numerically; dates compare against
    /// timestamps at midnight. Mismatched families return `None`.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn strict_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.partial_cmp(b),
            (Self::Int(a), Self::Int(b)) => a.partial_cmp(b),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            (Self::Int(a), Self::Float(b)) => (*a as f64).partial_cmp(b),
            (Self::Float(a), Self::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Self::Text(a), Self::Text(b)) => a.partial_cmp(b),
            (Self::Blob(a), Self::Blob(b)) => a.partial_cmp(b),
            (Self::Date(a), Self::Date(b)) => a.partial_cmp(b),
            (Self::Timestamp(a), Self::Timestamp(b)) => a.partial_cmp(b),
            (Self::Date(a), Self::Timestamp(b)) => a.midnight().partial_cmp(b),
            (Self::Timestamp(a), Self::Date(b)) => a.partial_cmp(&b.midnight()),
            (Self::Time(a), Self::Time(b)) => a.partial_cmp(b),
            _ => None,
        }
    }

    /// Total order used for sorting rows: nulls first, then by family rank,
    /// then by value.
    #[must_use]
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        let rank = self.rank().cmp(&other.rank());
        if rank != Ordering::Equal {
            return rank;
        }

        self.strict_cmp(other).unwrap_or(Ordering::Equal)
    }

    const fn rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Bool(_) => 1,
            Self::Int(_) | Self::Float(_) => 2,
            Self::Date(_) | Self::Timestamp(_) | Self::Time(_) => 3,
            Self::Text(_) => 4,
            Self::Blob(_) => 5,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
            Self::Blob(bytes) => write!(f, "{}", String::from_utf8_lossy(bytes)),
            Self::Date(date) => f.write_str(&date.format(DATE_FORMAT).map_err(|_| fmt::Error)?),
            Self::Timestamp(ts) => {
                f.write_str(&ts.format(DATETIME_FORMATS[0]).map_err(|_| fmt::Error)?)
            }
            Self::Time(time) => {
                f.write_str(&time.format(TIME_FORMATS[0]).map_err(|_| fmt::Error)?)
            }
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Date> for Value {
    fn from(value: Date) -> Self {
        Self::Date(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Parse a user-facing boolean word (`1`, `true`, `yes`, `on`, ...).
#[must_use]
pub fn parse_bool(raw: &str) -> Option<bool> {
    let raw = raw.trim();

    if TRUE_WORDS.iter().any(|word| word.eq_ignore_ascii_case(raw)) {
        Some(true)
    } else if FALSE_WORDS.iter().any(|word| word.eq_ignore_ascii_case(raw)) {
        Some(false)
    } else {
        None
    }
}

fn parse_numeric(raw: &str) -> Option<Value> {
    if let Ok(int) = raw.parse::<i64>() {
        return Some(Value::Int(int));
    }

    raw.parse::<f64>()
        .ok()
        .filter(|float| float.is_finite())
        .map(Value::Float)
}

fn parse_temporal(raw: &str) -> Option<Value> {
    if let Ok(date) = Date::parse(raw, DATE_FORMAT) {
        return Some(Value::Date(date));
    }

    if let Some(ts) = DATETIME_FORMATS
        .iter()
        .find_map(|format| PrimitiveDateTime::parse(raw, format).ok())
    {
        return Some(Value::Timestamp(ts));
    }

    // time of day on its own
    TIME_FORMATS
        .iter()
        .find_map(|format| Time::parse(raw, format).ok())
        .map(Value::Time)
}
