//! Raw, untrusted request parameters.
//!
//! Web frameworks deliver nested string data (`a[b][0]=x`); this module keeps
//! that shape without interpreting it. Interpretation happens in the filter
//! machines and the form, which ignore anything malformed.

use derive_more::Deref;
use std::collections::BTreeMap;

///
/// Param
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Param {
    Text(String),
    List(Vec<Self>),
    Map(BTreeMap<String, Self>),
}

impl Param {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_map(&self) -> Option<&BTreeMap<String, Self>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Self> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Every text leaf of a scalar or list; maps contribute their values in
    /// index order.
    #[must_use]
    pub fn texts(&self) -> Vec<&str> {
        match self {
            Self::Text(text) => vec![text.as_str()],
            Self::List(items) => items.iter().filter_map(Self::as_text).collect(),
            Self::Map(_) => self
                .indexed()
                .into_iter()
                .filter_map(|(_, param)| param.as_text())
                .collect(),
        }
    }

    /// Positional entries: list items by position, or map entries whose keys
    /// are non-negative integers. Other keys are ignored.
    #[must_use]
    pub fn indexed(&self) -> Vec<(usize, &Self)> {
        match self {
            Self::Text(_) => Vec::new(),
            Self::List(items) => items.iter().enumerate().collect(),
            Self::Map(map) => {
                let mut entries: Vec<(usize, &Self)> = map
                    .iter()
                    .filter_map(|(key, value)| key.trim().parse::<usize>().ok().map(|i| (i, value)))
                    .collect();
                entries.sort_by_key(|(index, _)| *index);
                entries
            }
        }
    }

    /// Parse the text leaf as an integer.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        self.as_text().and_then(|text| text.trim().parse().ok())
    }

    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        self.as_text().and_then(|text| text.trim().parse().ok())
    }
}

impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Param {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<serde_json::Value> for Param {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match value {
            Json::Null => Self::Text(String::new()),
            Json::Bool(b) => Self::Text(if b { "1" } else { "0" }.to_string()),
            Json::Number(n) => Self::Text(n.to_string()),
            Json::String(s) => Self::Text(s),
            Json::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Json::Object(map) => Self::Map(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect()),
        }
    }
}

///
/// Params
/// Top-level parameter map handed to one interaction.
///

#[derive(Clone, Debug, Default, Deref, Eq, PartialEq)]
pub struct Params(BTreeMap<String, Param>);

impl Params {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Param>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }
}

impl From<BTreeMap<String, Param>> for Params {
    fn from(map: BTreeMap<String, Param>) -> Self {
        Self(map)
    }
}

impl From<serde_json::Value> for Params {
    fn from(value: serde_json::Value) -> Self {
        match Param::from(value) {
            Param::Map(map) => Self(map),
            _ => Self::default(),
        }
    }
}
