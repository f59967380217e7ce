//! Runtime data model definitions.
//!
//! Types in `model` describe *what exists* on the storage side: the canonical
//! attribute categories, the value vocabulary shared by predicates and
//! persisted state, and the entity catalog used to validate registrations.
//! Everything here is plain data and is frozen once a schema is built.

pub mod category;
pub mod entity;
pub mod value;


// re-exports
pub use category::Category;
pub use entity::{AccessorLevel, AccessorModel, Cardinality, Catalog, EntityModel, FieldModel};
pub use value::Value;
