//! Persistence contract consumed by the repository layer.
//!
//! The engine owns transactions and isolation; the rest of the crate only
//! sees begin/commit/rollback plus row-level CRUD over JSON objects.

pub mod memory;
pub mod postgres;

use crate::error::AdminError;
use async_trait::async_trait;
use serde_json::{Map, Value};

pub use memory::MemoryEngine;
pub use postgres::PgEngine;

/// One page of rows plus totals, for list views and stat cards.
#[derive(Clone, Debug, serde::Serialize)]
pub struct Page {
    pub items: Vec<Value>,
    pub total: u64,
    pub per_page: u32,
    pub current_page: u32,
}

impl Page {
    pub fn last_page(&self) -> u32 {
        if self.total == 0 {
            1
        } else {
            ((self.total + u64::from(self.per_page) - 1) / u64::from(self.per_page)) as u32
        }
    }

    /// Count of page items whose `column` equals `value`. Stat-card helper.
    pub fn count_where(&self, column: &str, value: &Value) -> u64 {
        self.items
            .iter()
            .filter(|row| row.get(column) == Some(value))
            .count() as u64
    }
}

/// Row store with transaction support. Rows are JSON objects keyed by an
/// integer `id` column. At most one transaction is active per engine; writes
/// issued while a transaction is open belong to it.
#[async_trait]
pub trait StorageEngine: Send + Sync {
    async fn begin(&self) -> Result<(), AdminError>;
    async fn commit(&self) -> Result<(), AdminError>;
    async fn rollback(&self) -> Result<(), AdminError>;

    async fn fetch_all(&self, table: &str) -> Result<Vec<Value>, AdminError>;
    async fn fetch(&self, table: &str, id: i64) -> Result<Option<Value>, AdminError>;
    async fn fetch_by(&self, table: &str, column: &str, value: &Value)
        -> Result<Vec<Value>, AdminError>;
    /// Insert one row. An `id` key in `data` is honored; otherwise the engine
    /// assigns the next id. Returns the stored row.
    async fn insert(&self, table: &str, data: &Map<String, Value>) -> Result<Value, AdminError>;
    async fn update(
        &self,
        table: &str,
        id: i64,
        data: &Map<String, Value>,
    ) -> Result<bool, AdminError>;
    async fn delete(&self, table: &str, id: i64) -> Result<bool, AdminError>;
    async fn count(&self, table: &str) -> Result<u64, AdminError>;
    async fn fetch_page(&self, table: &str, per_page: u32, page: u32)
        -> Result<Page, AdminError>;
}

pub(crate) fn row_id(row: &Value) -> Option<i64> {
    row.get("id").and_then(Value::as_i64)
}
