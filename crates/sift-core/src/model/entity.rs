use crate::{error::ConfigError, model::category::Category};
use std::collections::BTreeMap;

///
/// FieldModel
/// One physical field of an entity and its storage type name.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldModel {
    /// Field name as used in predicates and ordering.
    pub name: String,
    /// Storage type name, resolved through the category alias table.
    pub storage_type: String,
}

impl FieldModel {
    #[must_use]
    pub fn new(name: impl Into<String>, storage_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            storage_type: storage_type.into(),
        }
    }

    /// Resolve the storage type to its canonical category.
    pub fn category(&self) -> Result<Category, ConfigError> {
        Category::from_alias(&self.storage_type).ok_or_else(|| ConfigError::UnknownCategory {
            alias: self.storage_type.clone(),
        })
    }
}

///
/// AccessorLevel
/// Whether an accessor is invoked on the entity class or on one record.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AccessorLevel {
    Class,
    Instance,
}

///
/// Cardinality
/// What an accessor yields.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Cardinality {
    One,
    Many,
}

///
/// AccessorModel
/// Zero-argument accessor yielding a record or a record collection.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AccessorModel {
    pub name: String,
    pub level: AccessorLevel,
    /// Entity the accessor yields records of.
    pub target: String,
    pub cardinality: Cardinality,
}

impl AccessorModel {
    /// Class-level accessor (a named scope) yielding many records of `target`.
    #[must_use]
    pub fn scope(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: AccessorLevel::Class,
            target: target.into(),
            cardinality: Cardinality::Many,
        }
    }

    /// Instance-level accessor yielding many related records.
    #[must_use]
    pub fn has_many(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: AccessorLevel::Instance,
            target: target.into(),
            cardinality: Cardinality::Many,
        }
    }

    /// Instance-level accessor yielding one related record.
    #[must_use]
    pub fn has_one(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: AccessorLevel::Instance,
            target: target.into(),
            cardinality: Cardinality::One,
        }
    }
}

///
/// EntityModel
///
/// Introspected description of one entity class: its physical fields and
/// the accessors it exposes. Registrations are validated against it.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EntityModel {
    pub name: String,
    pub fields: Vec<FieldModel>,
    pub accessors: Vec<AccessorModel>,
}

impl EntityModel {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            accessors: Vec::new(),
        }
    }

    #[must_use]
    pub fn field(mut self, name: impl Into<String>, storage_type: impl Into<String>) -> Self {
        self.fields.push(FieldModel::new(name, storage_type));
        self
    }

    #[must_use]
    pub fn accessor(mut self, accessor: AccessorModel) -> Self {
        self.accessors.push(accessor);
        self
    }

    #[must_use]
    pub fn get_field(&self, name: &str) -> Option<&FieldModel> {
        self.fields.iter().find(|f| f.name == name)
    }

    #[must_use]
    pub fn get_accessor(&self, name: &str, level: AccessorLevel) -> Option<&AccessorModel> {
        self.accessors
            .iter()
            .find(|a| a.name == name && a.level == level)
    }
}

///
/// Catalog
/// Entity models keyed by entity name.
///

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    entities: BTreeMap<String, EntityModel>,
}

impl Catalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity model; every field type must resolve to a category.
    pub fn insert(&mut self, entity: EntityModel) -> Result<(), ConfigError> {
        for field in &entity.fields {
            field.category()?;
        }
        if self.entities.contains_key(&entity.name) {
            return Err(ConfigError::DuplicateEntity {
                entity: entity.name,
            });
        }
        self.entities.insert(entity.name.clone(), entity);

        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&EntityModel> {
        self.entities.get(name)
    }

    /// Fetch an entity or fail with a configuration error.
    pub fn require(&self, name: &str) -> Result<&EntityModel, ConfigError> {
        self.get(name).ok_or_else(|| ConfigError::UnknownEntity {
            entity: name.to_string(),
        })
    }
}
