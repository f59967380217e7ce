//! Configuration-time assembly of the immutable [`Schema`].
//!
//! Everything registered here is validated eagerly; `build` freezes the
//! result so request handling only ever reads it.

use crate::{
    attribute::{Attribute, AttributeConfig, AttributeRegistry},
    binding::{BindOptions, Binding, BindingId, BindingRegistry},
    config::Settings,
    error::ConfigError,
    model::{Catalog, EntityModel},
};
use tracing::debug;

///
/// SchemaBuilder
///

#[derive(Debug, Default)]
pub struct SchemaBuilder {
    catalog: Catalog,
    attributes: AttributeRegistry,
    bindings: BindingRegistry,
    settings: Settings,
}

impl SchemaBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity model.
    pub fn entity(&mut self, entity: EntityModel) -> Result<&mut Self, ConfigError> {
        self.catalog.insert(entity)?;
        Ok(self)
    }

    /// Find or create an attribute and configure its capabilities.
    pub fn define(
        &mut self,
        entity: &str,
        name: &str,
        backing_fields: &[&str],
        category: Option<&str>,
    ) -> Result<AttributeConfig<'_>, ConfigError> {
        self.attributes
            .define(&self.catalog, entity, name, backing_fields, category)
    }

    /// Bind an entity tree to an endpoint.
    pub fn bind(&mut self, endpoint: &str, options: BindOptions) -> Result<BindingId, ConfigError> {
        self.bindings.bind(&self.catalog, endpoint, options)
    }

    /// Replace the settings after validating them.
    pub fn settings(&mut self, settings: Settings) -> Result<&mut Self, ConfigError> {
        settings.validate()?;
        self.settings = settings;
        Ok(self)
    }

    #[must_use]
    pub fn build(self) -> Schema {
        debug!(
            bindings = self.bindings.len(),
            per_page = self.settings.default_per_page,
            "schema built"
        );

        Schema {
            catalog: self.catalog,
            attributes: self.attributes,
            bindings: self.bindings,
            settings: self.settings,
        }
    }
}

///
/// Schema
///
/// Frozen catalog, attributes, bindings and settings. Shared by reference
/// across interactions; nothing in it changes after `build`.
///

#[derive(Debug)]
pub struct Schema {
    catalog: Catalog,
    attributes: AttributeRegistry,
    bindings: BindingRegistry,
    settings: Settings,
}

impl Schema {
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub const fn attributes(&self) -> &AttributeRegistry {
        &self.attributes
    }

    #[must_use]
    pub const fn bindings(&self) -> &BindingRegistry {
        &self.bindings
    }

    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn binding(&self, id: BindingId) -> Result<&Binding, ConfigError> {
        self.bindings.require(id)
    }

    pub fn attribute(&self, entity: &str, name: &str) -> Result<&Attribute, ConfigError> {
        self.attributes
            .lookup(entity, name)
            .ok_or_else(|| ConfigError::UnknownAttribute {
                entity: entity.to_string(),
                name: name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterKind;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn schema_is_shareable() {
        assert_send_sync::<Schema>();
    }

    #[test]
    fn builder_validates_eagerly() {
        let mut builder = SchemaBuilder::new();
        builder
            .entity(EntityModel::new("person").field("age", "integer"))
            .expect("entity should register");

        builder
            .define("person", "age", &["age"], None)
            .expect("define should succeed")
            .searchable(FilterKind::Range, vec![])
            .expect("searchable should succeed");
        let root = builder
            .bind("people", BindOptions::new("person"))
            .expect("bind should succeed");

        let bad = Settings {
            max_sorts: 0,
            ..Settings::default()
        };
        assert!(matches!(
            builder.settings(bad),
            Err(ConfigError::InvalidSettings { .. })
        ));

        let schema = builder.build();
        assert_eq!(schema.binding(root).map(|b| b.entity.as_str()), Ok("person"));
        assert!(schema.attribute("person", "age").is_ok());
        assert!(matches!(
            schema.attribute("person", "height"),
            Err(ConfigError::UnknownAttribute { .. })
        ));
    }
}
