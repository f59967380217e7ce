use crate::{
    model::Value,
    query::{OrderDirection, OrderSpec, PageSpec, Predicate, Query, eval::eval},
    store::{Record, Store},
};
use std::{cmp::Ordering, collections::BTreeMap};
use thiserror::Error as ThisError;

///
/// MemoryError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum MemoryError {
    #[error("memory store has no entity '{0}'")]
    UnknownEntity(String),

    #[error("memory store has no accessor '{entity}.{accessor}'")]
    UnknownAccessor { entity: String, accessor: String },
}

///
/// MemoryRecord
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemoryRecord {
    fields: BTreeMap<String, Value>,
}

impl MemoryRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }
}

impl Record for MemoryRecord {
    fn field(&self, name: &str) -> Option<Value> {
        self.fields.get(name).cloned()
    }
}

///
/// MemoryCollection
/// Handle to a (possibly scoped) set of rows of one entity.
///

#[derive(Clone, Debug, PartialEq)]
pub struct MemoryCollection {
    pub entity: String,
    pub scope: Option<Predicate>,
}

///
/// MemoryAccessor
///

#[derive(Clone, Debug)]
enum MemoryAccessor {
    Scope(Predicate),
    Relation {
        target: String,
        local_field: String,
        foreign_field: String,
    },
}

///
/// MemoryStore
///
/// Reference adapter evaluating predicates over in-memory rows.
/// Class-level accessors are named scopes; instance-level accessors are
/// key relations between two entities.
///

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    tables: BTreeMap<String, Vec<MemoryRecord>>,
    accessors: BTreeMap<(String, String), MemoryAccessor>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entity: &str, record: MemoryRecord) {
        self.tables.entry(entity.to_string()).or_default().push(record);
    }

    /// Register a class-level accessor returning the rows matching `scope`.
    pub fn scope(&mut self, entity: &str, name: &str, scope: Predicate) {
        self.tables.entry(entity.to_string()).or_default();
        self.accessors.insert(
            (entity.to_string(), name.to_string()),
            MemoryAccessor::Scope(scope),
        );
    }

    /// Register an instance-level accessor: rows of `target` whose
    /// `foreign_field` equals the parent's `local_field`.
    pub fn relation(
        &mut self,
        entity: &str,
        name: &str,
        target: &str,
        local_field: &str,
        foreign_field: &str,
    ) {
        self.accessors.insert(
            (entity.to_string(), name.to_string()),
            MemoryAccessor::Relation {
                target: target.to_string(),
                local_field: local_field.to_string(),
                foreign_field: foreign_field.to_string(),
            },
        );
    }

    fn accessor(&self, entity: &str, name: &str) -> Result<&MemoryAccessor, MemoryError> {
        self.accessors
            .get(&(entity.to_string(), name.to_string()))
            .ok_or_else(|| MemoryError::UnknownAccessor {
                entity: entity.to_string(),
                accessor: name.to_string(),
            })
    }

    fn matching(&self, query: &Query<MemoryCollection>) -> Result<Vec<&MemoryRecord>, MemoryError> {
        let rows = self
            .tables
            .get(&query.collection.entity)
            .ok_or_else(|| MemoryError::UnknownEntity(query.collection.entity.clone()))?;

        let mut rows: Vec<&MemoryRecord> = rows
            .iter()
            .filter(|row| query.collection.scope.as_ref().is_none_or(|p| eval(*row, p)))
            .filter(|row| query.predicate.as_ref().is_none_or(|p| eval(*row, p)))
            .collect();
        rows.sort_by(|a, b| compare_rows(*a, *b, &query.order));

        Ok(rows)
    }
}

impl Store for MemoryStore {
    type Record = MemoryRecord;
    type Collection = MemoryCollection;
    type Error = MemoryError;

    fn root(&self, entity: &str, accessor: Option<&str>) -> Result<MemoryCollection, MemoryError> {
        if !self.tables.contains_key(entity) {
            return Err(MemoryError::UnknownEntity(entity.to_string()));
        }

        let scope = match accessor {
            None => None,
            Some(name) => match self.accessor(entity, name)? {
                MemoryAccessor::Scope(scope) => Some(scope.clone()),
                MemoryAccessor::Relation { .. } => {
                    return Err(MemoryError::UnknownAccessor {
                        entity: entity.to_string(),
                        accessor: name.to_string(),
                    });
                }
            },
        };

        Ok(MemoryCollection {
            entity: entity.to_string(),
            scope,
        })
    }

    fn related(
        &self,
        parent_entity: &str,
        parent: &MemoryRecord,
        accessor: &str,
    ) -> Result<MemoryCollection, MemoryError> {
        match self.accessor(parent_entity, accessor)? {
            MemoryAccessor::Relation {
                target,
                local_field,
                foreign_field,
            } => {
                let key = parent.field(local_field).unwrap_or(Value::Null);
                let scope = if key.is_null() {
                    Predicate::False
                } else {
                    Predicate::eq(foreign_field.as_str(), key)
                };

                Ok(MemoryCollection {
                    entity: target.clone(),
                    scope: Some(scope),
                })
            }
            MemoryAccessor::Scope(_) => Err(MemoryError::UnknownAccessor {
                entity: parent_entity.to_string(),
                accessor: accessor.to_string(),
            }),
        }
    }

    fn count(&self, query: &Query<MemoryCollection>) -> Result<u64, MemoryError> {
        Ok(self.matching(query)?.len() as u64)
    }

    fn fetch(
        &self,
        query: &Query<MemoryCollection>,
        page: PageSpec,
    ) -> Result<Vec<MemoryRecord>, MemoryError> {
        let offset = usize::try_from(page.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit).unwrap_or(usize::MAX);

        Ok(self
            .matching(query)?
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }
}

// Compare two rows by the order spec; unordered ties keep insertion order.
fn compare_rows(a: &MemoryRecord, b: &MemoryRecord, order: &OrderSpec) -> Ordering {
    for (field, direction) in &order.fields {
        let left = a.field(field).unwrap_or(Value::Null);
        let right = b.field(field).unwrap_or(Value::Null);

        let ord = match direction {
            OrderDirection::Asc => left.canonical_cmp(&right),
            OrderDirection::Desc => right.canonical_cmp(&left),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }

    Ordering::Equal
}
