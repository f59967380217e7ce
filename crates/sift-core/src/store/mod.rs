//! Backing-store adapter boundary.
//!
//! The core never executes queries itself. It hands a [`Query`] (base
//! collection handle, predicate, ordering) plus an optional [`PageSpec`] to a
//! [`Store`] and caches what comes back for one interaction. Adapter errors
//! are propagated unchanged.

pub mod memory;


use crate::{
    model::Value,
    query::{PageSpec, Query},
};
use std::fmt;

// re-exports
pub use memory::{MemoryCollection, MemoryError, MemoryRecord, MemoryStore};

///
/// Record
///
/// Abstraction over a row-like value that can expose fields by name.
/// `None` means the field does not exist on the row.
///

pub trait Record: Clone {
    fn field(&self, name: &str) -> Option<Value>;
}

///
/// Store
///

pub trait Store {
    type Record: Record;
    type Collection: Clone + fmt::Debug;
    type Error;

    /// Base collection for a root binding: the class-level accessor when
    /// given, otherwise every record of the entity.
    fn root(&self, entity: &str, accessor: Option<&str>) -> Result<Self::Collection, Self::Error>;

    /// Collection reached through an instance-level accessor on one record.
    fn related(
        &self,
        parent_entity: &str,
        parent: &Self::Record,
        accessor: &str,
    ) -> Result<Self::Collection, Self::Error>;

    /// Count the rows matching a query.
    fn count(&self, query: &Query<Self::Collection>) -> Result<u64, Self::Error>;

    /// Fetch one ordered window of a query.
    fn fetch(
        &self,
        query: &Query<Self::Collection>,
        page: PageSpec,
    ) -> Result<Vec<Self::Record>, Self::Error>;
}
