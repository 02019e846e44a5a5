//! In-process JSON row store with snapshot-based transaction rollback.
//! Default engine for tests and demos; production uses the PostgreSQL engine.

use crate::error::AdminError;
use crate::storage::{Page, StorageEngine};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock, Semaphore};

type Tables = HashMap<String, BTreeMap<i64, Value>>;

struct TxState {
    snapshot: Tables,
    _permit: tokio::sync::OwnedSemaphorePermit,
}

pub struct MemoryEngine {
    tables: RwLock<Tables>,
    next_id: AtomicI64,
    /// Serializes transactions; isolation here is one-writer-at-a-time.
    tx_gate: Arc<Semaphore>,
    tx: Mutex<Option<TxState>>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        MemoryEngine {
            tables: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
            tx_gate: Arc::new(Semaphore::new(1)),
            tx: Mutex::new(None),
        }
    }

    fn claim_id(&self, explicit: Option<i64>) -> i64 {
        match explicit {
            Some(id) => {
                self.next_id.fetch_max(id + 1, Ordering::SeqCst);
                id
            }
            None => self.next_id.fetch_add(1, Ordering::SeqCst),
        }
    }
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageEngine for MemoryEngine {
    async fn begin(&self) -> Result<(), AdminError> {
        let permit = self
            .tx_gate
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| AdminError::Storage(format!("transaction gate closed: {}", e)))?;
        let snapshot = self.tables.read().await.clone();
        *self.tx.lock().await = Some(TxState {
            snapshot,
            _permit: permit,
        });
        Ok(())
    }

    async fn commit(&self) -> Result<(), AdminError> {
        match self.tx.lock().await.take() {
            Some(_) => Ok(()),
            None => Err(AdminError::Storage("commit without begin".into())),
        }
    }

    async fn rollback(&self) -> Result<(), AdminError> {
        match self.tx.lock().await.take() {
            Some(state) => {
                *self.tables.write().await = state.snapshot;
                Ok(())
            }
            None => Err(AdminError::Storage("rollback without begin".into())),
        }
    }

    async fn fetch_all(&self, table: &str) -> Result<Vec<Value>, AdminError> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(table)
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn fetch(&self, table: &str, id: i64) -> Result<Option<Value>, AdminError> {
        let tables = self.tables.read().await;
        Ok(tables.get(table).and_then(|rows| rows.get(&id)).cloned())
    }

    async fn fetch_by(
        &self,
        table: &str,
        column: &str,
        value: &Value,
    ) -> Result<Vec<Value>, AdminError> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(table)
            .map(|rows| {
                rows.values()
                    .filter(|row| row.get(column) == Some(value))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert(&self, table: &str, data: &Map<String, Value>) -> Result<Value, AdminError> {
        let id = self.claim_id(data.get("id").and_then(Value::as_i64));
        let mut row = data.clone();
        row.insert("id".into(), Value::Number(id.into()));
        let mut tables = self.tables.write().await;
        let rows = tables.entry(table.to_string()).or_default();
        if rows.contains_key(&id) {
            return Err(AdminError::Conflict(format!(
                "{} id {} already exists",
                table, id
            )));
        }
        let row = Value::Object(row);
        rows.insert(id, row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        table: &str,
        id: i64,
        data: &Map<String, Value>,
    ) -> Result<bool, AdminError> {
        let mut tables = self.tables.write().await;
        let Some(row) = tables.get_mut(table).and_then(|rows| rows.get_mut(&id)) else {
            return Ok(false);
        };
        if let Value::Object(fields) = row {
            for (k, v) in data {
                if k != "id" {
                    fields.insert(k.clone(), v.clone());
                }
            }
        }
        Ok(true)
    }

    async fn delete(&self, table: &str, id: i64) -> Result<bool, AdminError> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .get_mut(table)
            .map(|rows| rows.remove(&id).is_some())
            .unwrap_or(false))
    }

    async fn count(&self, table: &str) -> Result<u64, AdminError> {
        let tables = self.tables.read().await;
        Ok(tables.get(table).map(|rows| rows.len() as u64).unwrap_or(0))
    }

    async fn fetch_page(
        &self,
        table: &str,
        per_page: u32,
        page: u32,
    ) -> Result<Page, AdminError> {
        if per_page == 0 {
            return Err(crate::error::ConfigError::InvalidPerPage.into());
        }
        let page = page.max(1);
        let tables = self.tables.read().await;
        let rows = tables.get(table);
        let total = rows.map(|r| r.len() as u64).unwrap_or(0);
        let items = rows
            .map(|r| {
                r.values()
                    .skip(((page - 1) * per_page) as usize)
                    .take(per_page as usize)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(Page {
            items,
            total,
            per_page,
            current_page: page,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn insert_assigns_sequential_ids() {
        let engine = MemoryEngine::new();
        let a = engine.insert("tenants", &obj(json!({"name": "a"}))).await.unwrap();
        let b = engine.insert("tenants", &obj(json!({"name": "b"}))).await.unwrap();
        assert_eq!(a["id"], json!(1));
        assert_eq!(b["id"], json!(2));
    }

    #[tokio::test]
    async fn explicit_id_is_honored_and_advances_counter() {
        let engine = MemoryEngine::new();
        engine.insert("users", &obj(json!({"id": 10, "name": "x"}))).await.unwrap();
        let next = engine.insert("users", &obj(json!({"name": "y"}))).await.unwrap();
        assert_eq!(next["id"], json!(11));
    }

    #[tokio::test]
    async fn rollback_restores_snapshot() {
        let engine = MemoryEngine::new();
        engine.insert("tenants", &obj(json!({"name": "kept"}))).await.unwrap();

        engine.begin().await.unwrap();
        engine.insert("tenants", &obj(json!({"name": "discarded"}))).await.unwrap();
        engine.update("tenants", 1, &obj(json!({"name": "mutated"}))).await.unwrap();
        engine.rollback().await.unwrap();

        let rows = engine.fetch_all("tenants").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], json!("kept"));
    }

    #[tokio::test]
    async fn fetch_by_matches_column_value() {
        let engine = MemoryEngine::new();
        engine.insert("users", &obj(json!({"tenant_id": 1, "name": "a"}))).await.unwrap();
        engine.insert("users", &obj(json!({"tenant_id": 2, "name": "b"}))).await.unwrap();
        let rows = engine.fetch_by("users", "tenant_id", &json!(1)).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], json!("a"));
    }

    #[tokio::test]
    async fn pagination_slices_in_id_order() {
        let engine = MemoryEngine::new();
        for i in 0..5 {
            engine.insert("t", &obj(json!({"n": i}))).await.unwrap();
        }
        let page = engine.fetch_page("t", 2, 2).await.unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.last_page(), 3);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0]["n"], json!(2));
    }
}
