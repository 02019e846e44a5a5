//! Per-entity CRUD gateway over the storage engine.

pub mod manager;

use crate::error::AdminError;
use crate::storage::{Page, StorageEngine};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

pub use manager::{EntityKind, RepositoryManager};

/// The persistence contract consumed by adapters and domain services.
#[async_trait]
pub trait Repository: Send + Sync {
    async fn all(&self) -> Result<Vec<Value>, AdminError>;

    async fn find(&self, id: i64) -> Result<Option<Value>, AdminError>;

    async fn find_or_fail(&self, id: i64) -> Result<Value, AdminError>;

    async fn create(&self, data: Map<String, Value>) -> Result<Value, AdminError>;

    /// Returns false when the row does not exist; no error is raised.
    async fn update(&self, id: i64, data: Map<String, Value>) -> Result<bool, AdminError>;

    async fn delete(&self, id: i64) -> Result<bool, AdminError>;

    async fn paginate(&self, per_page: u32, page: u32) -> Result<Page, AdminError>;

    async fn find_by(&self, column: &str, value: Value) -> Result<Vec<Value>, AdminError>;

    async fn find_one_by(&self, column: &str, value: Value) -> Result<Option<Value>, AdminError> {
        Ok(self.find_by(column, value).await?.into_iter().next())
    }
}

/// Generic repository bound to one table of a storage engine.
pub struct EntityRepository {
    engine: Arc<dyn StorageEngine>,
    table: &'static str,
}

impl EntityRepository {
    pub fn new(engine: Arc<dyn StorageEngine>, table: &'static str) -> Self {
        EntityRepository { engine, table }
    }

    pub fn table(&self) -> &'static str {
        self.table
    }
}

#[async_trait]
impl Repository for EntityRepository {
    async fn all(&self) -> Result<Vec<Value>, AdminError> {
        self.engine.fetch_all(self.table).await
    }

    async fn find(&self, id: i64) -> Result<Option<Value>, AdminError> {
        self.engine.fetch(self.table, id).await
    }

    async fn find_or_fail(&self, id: i64) -> Result<Value, AdminError> {
        self.engine
            .fetch(self.table, id)
            .await?
            .ok_or_else(|| AdminError::NotFound(format!("{} {}", self.table, id)))
    }

    async fn create(&self, data: Map<String, Value>) -> Result<Value, AdminError> {
        self.engine.insert(self.table, &data).await
    }

    async fn update(&self, id: i64, data: Map<String, Value>) -> Result<bool, AdminError> {
        self.engine.update(self.table, id, &data).await
    }

    async fn delete(&self, id: i64) -> Result<bool, AdminError> {
        self.engine.delete(self.table, id).await
    }

    async fn paginate(&self, per_page: u32, page: u32) -> Result<Page, AdminError> {
        self.engine.fetch_page(self.table, per_page, page).await
    }

    async fn find_by(&self, column: &str, value: Value) -> Result<Vec<Value>, AdminError> {
        self.engine.fetch_by(self.table, column, &value).await
    }
}
