//! The persistence contract each entity store implements.

use crate::error::PersistenceError;
use async_trait::async_trait;
use uuid::Uuid;

/// Generic repository over one entity type. Implementations own all persistence semantics;
/// the dispatch layer only forwards calls and awaits them.
#[async_trait]
pub trait Repository<T>: Send + Sync + 'static
where
    T: Send + 'static,
{
    async fn get_list(&self) -> Result<Vec<T>, PersistenceError>;

    async fn get(&self, id: Uuid) -> Result<T, PersistenceError>;

    async fn create(&self, entity: T) -> Result<T, PersistenceError>;

    async fn update(&self, entity: T) -> Result<(), PersistenceError>;

    /// Returns whether a row was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, PersistenceError>;
}
