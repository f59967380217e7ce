use crate::{binding::BindingId, error::ConfigError, state::RuntimeState};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

///
/// StateKey
/// Identifies one persisted runtime state.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct StateKey {
    pub endpoint: String,
    pub binding: BindingId,
}

impl StateKey {
    #[must_use]
    pub fn new(endpoint: impl Into<String>, binding: BindingId) -> Self {
        Self {
            endpoint: endpoint.into(),
            binding,
        }
    }
}

///
/// SessionStore
///
/// Opaque persistence for runtime state between interactions. Hosts back
/// this with their session mechanism and serialize access per session.
///

pub trait SessionStore {
    fn get(&self, key: &StateKey) -> Option<RuntimeState>;

    fn set(&mut self, key: StateKey, state: RuntimeState);
}

///
/// MemorySessionStore
///

#[derive(Clone, Debug, Default)]
pub struct MemorySessionStore {
    states: HashMap<StateKey, RuntimeState>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &StateKey) -> Option<RuntimeState> {
        self.states.get(key).cloned()
    }

    fn set(&mut self, key: StateKey, state: RuntimeState) {
        self.states.insert(key, state);
    }
}

///
/// EndpointState
///
/// Every runtime state of one endpoint keyed by binding id; the JSON
/// layout is `{ "<binding id>": { per_page, total, page, ... } }`.
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EndpointState {
    states: BTreeMap<BindingId, RuntimeState>,
}

impl EndpointState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, binding: BindingId) -> Option<&RuntimeState> {
        self.states.get(&binding)
    }

    /// State for `binding`, created lazily with `init`.
    pub fn entry(
        &mut self,
        binding: BindingId,
        init: impl FnOnce() -> RuntimeState,
    ) -> &mut RuntimeState {
        self.states.entry(binding).or_insert_with(init)
    }

    pub fn insert(&mut self, binding: BindingId, state: RuntimeState) {
        self.states.insert(binding, state);
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string(self).map_err(invalid_state)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(invalid_state)
    }
}

fn invalid_state(err: serde_json::Error) -> ConfigError {
    ConfigError::InvalidState {
        message: err.to_string(),
    }
}
