use crate::{
    attribute::{Attribute, Combinator, DisplaySpec, Renderer, SortRule, default_caption},
    error::ConfigError,
    filter::{FilterDefinition, FilterKind, FilterOption},
    model::{Catalog, Category, EntityModel, Value},
};
use std::{collections::BTreeMap, sync::Arc};

///
/// AttributeRegistry
///
/// Attributes keyed by `(entity, name)`, kept in definition order per
/// entity. Populated during schema construction and read-only afterwards.
///

#[derive(Clone, Debug, Default)]
pub struct AttributeRegistry {
    entities: BTreeMap<String, Vec<Attribute>>,
}

impl AttributeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Find or create an attribute.
    ///
    /// Redefining with the same backing fields returns the existing
    /// attribute; anything else that disagrees with it is an error.
    pub fn define<'a>(
        &'a mut self,
        catalog: &'a Catalog,
        entity: &str,
        name: &str,
        backing_fields: &[&str],
        category: Option<&str>,
    ) -> Result<AttributeConfig<'a>, ConfigError> {
        let name = normalize_name(name)?;
        let model = catalog.require(entity)?;

        if backing_fields.is_empty() {
            return Err(ConfigError::EmptyBackingFields {
                entity: entity.to_string(),
                name,
            });
        }
        for field in backing_fields {
            if model.get_field(field).is_none() {
                return Err(ConfigError::UnknownField {
                    entity: entity.to_string(),
                    field: (*field).to_string(),
                });
            }
        }

        let declared = category
            .map(|alias| {
                Category::from_alias(alias).ok_or_else(|| ConfigError::UnknownCategory {
                    alias: alias.to_string(),
                })
            })
            .transpose()?;

        let category = resolve_category(model, &name, backing_fields, declared)?;
        let attributes = self.entities.entry(entity.to_string()).or_default();

        let index = match attributes.iter().position(|a| a.name == name) {
            Some(index) => {
                let existing = &attributes[index];
                if existing.backing_fields != backing_fields || existing.category != category {
                    return Err(ConfigError::ConflictingRedefinition {
                        entity: entity.to_string(),
                        name,
                    });
                }
                index
            }
            None => {
                let fields = backing_fields.iter().map(ToString::to_string).collect();
                attributes.push(Attribute::new(entity.to_string(), name, fields, category));
                attributes.len() - 1
            }
        };

        Ok(AttributeConfig {
            attribute: &mut attributes[index],
            model,
        })
    }

    /// Look up an attribute; the name is normalized first.
    #[must_use]
    pub fn lookup(&self, entity: &str, name: &str) -> Option<&Attribute> {
        let name = normalize_name(name).ok()?;

        self.entities
            .get(entity)?
            .iter()
            .find(|attribute| attribute.name == name)
    }

    /// Every attribute of an entity, keyed by name. The map is a copy.
    #[must_use]
    pub fn all(&self, entity: &str) -> BTreeMap<String, Attribute> {
        self.iter(entity)
            .map(|attribute| (attribute.name.clone(), attribute.clone()))
            .collect()
    }

    /// Attributes of an entity in definition order.
    pub fn iter(&self, entity: &str) -> impl Iterator<Item = &Attribute> {
        self.entities.get(entity).into_iter().flatten()
    }
}

///
/// AttributeConfig
///
/// Capability configuration for one attribute, returned by
/// [`AttributeRegistry::define`]. Each step either succeeds and returns the
/// builder again, or fails with a configuration error.
///

pub struct AttributeConfig<'a> {
    attribute: &'a mut Attribute,
    model: &'a EntityModel,
}

impl AttributeConfig<'_> {
    #[must_use]
    pub fn attribute(&self) -> &Attribute {
        self.attribute
    }

    /// Make the attribute displayable. The caption defaults to the title
    /// cased name.
    #[must_use]
    pub fn displayable(self, caption: Option<&str>) -> Self {
        let caption = caption.map_or_else(|| default_caption(&self.attribute.name), str::to_string);
        let renderer = self.attribute.display.take().and_then(|d| d.renderer);

        self.attribute.display = Some(DisplaySpec { caption, renderer });
        self
    }

    /// Replace the value renderer; implies displayable.
    #[must_use]
    pub fn render_with<F>(self, render: F) -> Self
    where
        F: Fn(&Value) -> String + Send + Sync + 'static,
    {
        let renderer: Renderer = Arc::new(render);
        let this = if self.attribute.display.is_none() {
            self.displayable(None)
        } else {
            self
        };
        if let Some(display) = this.attribute.display.as_mut() {
            display.renderer = Some(renderer);
        }

        this
    }

    /// Replace the combinator folding backing values.
    #[must_use]
    pub fn combine_with<F>(self, combine: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        let combinator: Combinator = Arc::new(combine);
        self.attribute.combinator = Some(combinator);
        self
    }

    /// Make the attribute sortable. Without explicit rules every backing
    /// field mirrors the requested direction.
    pub fn sortable(self, rules: Option<Vec<SortRule>>) -> Result<Self, ConfigError> {
        if !self.attribute.is_displayable() {
            return Err(ConfigError::SortableWithoutDisplay {
                entity: self.attribute.entity.clone(),
                name: self.attribute.name.clone(),
            });
        }

        let rules = match rules {
            Some(rules) if !rules.is_empty() => rules,
            _ => self
                .attribute
                .backing_fields
                .iter()
                .map(SortRule::mirror)
                .collect(),
        };
        for rule in &rules {
            if self.model.get_field(&rule.field).is_none() {
                return Err(ConfigError::UnknownField {
                    entity: self.attribute.entity.clone(),
                    field: rule.field.clone(),
                });
            }
        }

        self.attribute.sort = Some(rules);
        Ok(self)
    }

    /// Make the attribute searchable with a validated filter definition.
    pub fn searchable(
        self,
        kind: FilterKind,
        options: Vec<FilterOption>,
    ) -> Result<Self, ConfigError> {
        let def = FilterDefinition::create(
            kind,
            &self.attribute.entity,
            self.attribute.category,
            options,
        )?;

        self.attribute.filter = Some(def);
        Ok(self)
    }
}

/// Validate an attribute name and bring it to canonical form: lowercase,
/// hyphens folded to underscores.
pub fn normalize_name(name: &str) -> Result<String, ConfigError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if valid {
        Ok(name.to_ascii_lowercase().replace('-', "_"))
    } else {
        Err(ConfigError::InvalidName {
            name: name.to_string(),
        })
    }
}

// Literal attributes infer their category; logical ones must declare it.
fn resolve_category(
    model: &EntityModel,
    name: &str,
    backing_fields: &[&str],
    declared: Option<Category>,
) -> Result<Category, ConfigError> {
    if let [field] = backing_fields
        && *field == name
    {
        let inferred = model
            .get_field(field)
            .ok_or_else(|| ConfigError::UnknownField {
                entity: model.name.clone(),
                field: (*field).to_string(),
            })?
            .category()?;

        return match declared {
            Some(declared) if declared != inferred => Err(ConfigError::CategoryMismatch {
                entity: model.name.clone(),
                name: name.to_string(),
                declared,
                inferred,
            }),
            _ => Ok(inferred),
        };
    }

    declared.ok_or_else(|| ConfigError::LogicalWithoutCategory {
        entity: model.name.clone(),
        name: name.to_string(),
    })
}
