//! Binding tree.
//!
//! Bindings attach an entity (optionally through an accessor) to an
//! endpoint, or to a parent binding whose selected record scopes the child.
//! The registry is append-only, so a binding's id is its insertion index.

#[cfg(test)]
mod tests;

use crate::{
    error::ConfigError,
    model::{AccessorLevel, Cardinality, Catalog},
};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use tracing::debug;

///
/// BindingKind
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingKind {
    /// Binds to a single record.
    #[display("single")]
    Single,
    /// Binds to a record collection.
    #[default]
    #[display("set")]
    Set,
}

impl BindingKind {
    const fn cardinality(self) -> Cardinality {
        match self {
            Self::Single => Cardinality::One,
            Self::Set => Cardinality::Many,
        }
    }
}

///
/// BindingId
///

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub struct BindingId(pub usize);

///
/// Binding
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Binding {
    pub id: BindingId,
    pub endpoint: String,
    pub kind: BindingKind,
    pub entity: String,
    pub accessor: Option<String>,
    pub handle: String,
    pub parent: Option<BindingId>,
    pub children: Vec<BindingId>,
}

impl Binding {
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

///
/// BindOptions
/// Declarative description of a binding and its subtree.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct BindOptions {
    pub kind: BindingKind,
    pub entity: String,
    pub accessor: Option<String>,
    pub handle: Option<String>,
    pub children: Vec<Self>,
}

impl BindOptions {
    #[must_use]
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn kind(mut self, kind: BindingKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn accessor(mut self, accessor: impl Into<String>) -> Self {
        self.accessor = Some(accessor.into());
        self
    }

    #[must_use]
    pub fn handle(mut self, handle: impl Into<String>) -> Self {
        self.handle = Some(handle.into());
        self
    }

    #[must_use]
    pub fn child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }
}

///
/// Selector
///
/// One step of a lookup path. `Auto` tries a numeric id, then a handle,
/// then an entity name.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Selector {
    Handle(String),
    Id(BindingId),
    Entity(String),
    Auto(String),
}

impl From<&str> for Selector {
    fn from(text: &str) -> Self {
        Self::Auto(text.to_string())
    }
}

impl From<BindingId> for Selector {
    fn from(id: BindingId) -> Self {
        Self::Id(id)
    }
}

///
/// BindingRegistry
///

#[derive(Clone, Debug, Default)]
pub struct BindingRegistry {
    bindings: Vec<Binding>,
}

impl BindingRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a root and, recursively, its children.
    pub fn bind(
        &mut self,
        catalog: &Catalog,
        endpoint: &str,
        options: BindOptions,
    ) -> Result<BindingId, ConfigError> {
        self.bind_node(catalog, endpoint, None, options)
    }

    fn bind_node(
        &mut self,
        catalog: &Catalog,
        endpoint: &str,
        parent: Option<BindingId>,
        options: BindOptions,
    ) -> Result<BindingId, ConfigError> {
        let BindOptions {
            kind,
            entity,
            accessor,
            handle,
            children,
        } = options;

        catalog.require(&entity)?;

        // roots resolve class accessors on their own entity, children
        // resolve instance accessors on the parent's entity
        let (owner, level, scope) = match parent {
            None => (entity.clone(), AccessorLevel::Class, endpoint.to_string()),
            Some(parent) => {
                let parent = self.require(parent)?;
                (
                    parent.entity.clone(),
                    AccessorLevel::Instance,
                    format!("{endpoint}/{}", parent.handle),
                )
            }
        };

        match &accessor {
            Some(name) => {
                let model = catalog.require(&owner)?;
                let found = model.get_accessor(name, level).ok_or_else(|| {
                    ConfigError::UnknownAccessor {
                        entity: owner.clone(),
                        accessor: name.clone(),
                        level: match level {
                            AccessorLevel::Class => "class-level",
                            AccessorLevel::Instance => "instance-level",
                        },
                    }
                })?;
                if found.target != entity {
                    return Err(ConfigError::AccessorTarget {
                        accessor: name.clone(),
                        expected: entity,
                        found: found.target.clone(),
                    });
                }
                if found.cardinality != kind.cardinality() {
                    return Err(ConfigError::AccessorCardinality {
                        entity: owner,
                        accessor: name.clone(),
                        kind: kind.to_string(),
                    });
                }
            }
            None if parent.is_some() => {
                return Err(ConfigError::MissingAccessor { scope, entity });
            }
            None => {}
        }

        let handle = handle
            .or_else(|| accessor.clone())
            .unwrap_or_else(|| entity.clone());

        let siblings: Vec<BindingId> = match parent {
            Some(parent) => self.require(parent)?.children.clone(),
            None => self.roots(endpoint).map(|b| b.id).collect(),
        };
        if siblings
            .iter()
            .filter_map(|id| self.get(*id))
            .any(|b| b.handle == handle)
        {
            return Err(ConfigError::DuplicateHandle { scope, handle });
        }

        let id = BindingId(self.bindings.len());
        debug!(%id, endpoint, %entity, %handle, "binding registered");
        self.bindings.push(Binding {
            id,
            endpoint: endpoint.to_string(),
            kind,
            entity,
            accessor,
            handle,
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent
            && let Some(node) = self.bindings.get_mut(parent.0)
        {
            node.children.push(id);
        }

        for child in children {
            self.bind_node(catalog, endpoint, Some(id), child)?;
        }

        Ok(id)
    }

    #[must_use]
    pub fn get(&self, id: BindingId) -> Option<&Binding> {
        self.bindings.get(id.0)
    }

    pub fn require(&self, id: BindingId) -> Result<&Binding, ConfigError> {
        self.get(id).ok_or(ConfigError::UnknownBinding { id: id.0 })
    }

    /// Root bindings of an endpoint in registration order.
    pub fn roots<'a, 'e>(
        &'a self,
        endpoint: &'e str,
    ) -> impl Iterator<Item = &'a Binding> {
        self.bindings
            .iter()
            .filter(move |b| b.is_root() && b.endpoint == endpoint)
    }

    pub fn children(&self, id: BindingId) -> impl Iterator<Item = &Binding> {
        self.get(id)
            .into_iter()
            .flat_map(|b| b.children.iter())
            .filter_map(|child| self.get(*child))
    }

    /// Chain from the root down to `id`.
    #[must_use]
    pub fn path(&self, id: BindingId) -> Vec<&Binding> {
        let mut chain = Vec::new();
        let mut cursor = self.get(id);
        while let Some(binding) = cursor {
            chain.push(binding);
            cursor = binding.parent.and_then(|parent| self.get(parent));
        }
        chain.reverse();

        chain
    }

    /// Resolve a path of selectors from the endpoint's roots downwards.
    /// Any step matching zero or several bindings fails the lookup.
    #[must_use]
    pub fn lookup(&self, endpoint: &str, path: &[Selector]) -> Option<&Binding> {
        let mut level: Vec<&Binding> = self.roots(endpoint).collect();
        let mut found = None;

        for selector in path {
            let binding = resolve(&level, selector)?;
            level = self.children(binding.id).collect();
            found = Some(binding);
        }

        found
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

fn resolve<'a>(level: &[&'a Binding], selector: &Selector) -> Option<&'a Binding> {
    match selector {
        Selector::Handle(handle) => unique(level, |b| b.handle == *handle),
        Selector::Id(id) => unique(level, |b| b.id == *id),
        Selector::Entity(entity) => unique(level, |b| b.entity == *entity),
        Selector::Auto(text) => {
            if let Ok(id) = text.trim().parse::<usize>() {
                return unique(level, |b| b.id == BindingId(id));
            }
            unique(level, |b| b.handle == *text).or_else(|| unique(level, |b| b.entity == *text))
        }
    }
}

fn unique<'a>(level: &[&'a Binding], pred: impl Fn(&Binding) -> bool) -> Option<&'a Binding> {
    let mut matches = level.iter().filter(|b| pred(b));
    let first = matches.next()?;

    matches.next().is_none().then_some(*first)
}
