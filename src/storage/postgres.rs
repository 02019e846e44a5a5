//! PostgreSQL engine over sqlx. Rows travel as JSON objects; one ambient
//! transaction per engine, serialized by a gate so repository calls issued
//! inside a transaction boundary land on the open transaction.

use crate::error::AdminError;
use crate::storage::{Page, StorageEngine};
use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::encode::{Encode, IsNull};
use sqlx::postgres::{PgRow, PgTypeInfo, Postgres};
use sqlx::{Database, PgPool, Transaction};
use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore};

/// A value that can be bound to a PostgreSQL query. Converts from serde_json::Value.
#[derive(Clone, Debug)]
pub enum PgBindValue {
    Null,
    Bool(bool),
    I64(i64),
    F64(f64),
    String(String),
    Json(Value),
}

impl PgBindValue {
    pub fn from_json(v: &Value) -> Self {
        match v {
            Value::Null => PgBindValue::Null,
            Value::Bool(b) => PgBindValue::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    PgBindValue::I64(i)
                } else {
                    PgBindValue::F64(n.as_f64().unwrap_or(0.0))
                }
            }
            Value::String(s) => PgBindValue::String(s.clone()),
            Value::Array(_) | Value::Object(_) => PgBindValue::Json(v.clone()),
        }
    }
}

impl<'q> Encode<'q, Postgres> for PgBindValue {
    fn encode_by_ref(
        &self,
        buf: &mut <Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, Box<dyn std::error::Error + Send + Sync>> {
        Ok(match self {
            PgBindValue::Null => <Option<i32> as Encode<Postgres>>::encode_by_ref(&None, buf)?,
            PgBindValue::Bool(b) => <bool as Encode<Postgres>>::encode_by_ref(b, buf)?,
            PgBindValue::I64(n) => <i64 as Encode<Postgres>>::encode_by_ref(n, buf)?,
            PgBindValue::F64(n) => <f64 as Encode<Postgres>>::encode_by_ref(n, buf)?,
            PgBindValue::String(s) => {
                let s_ref: &str = s.as_str();
                <&str as Encode<Postgres>>::encode_by_ref(&s_ref, buf)?
            }
            PgBindValue::Json(v) => <serde_json::Value as Encode<Postgres>>::encode_by_ref(v, buf)?,
        })
    }
}

impl sqlx::Type<Postgres> for PgBindValue {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("TEXT")
    }
}

struct TxState {
    tx: Transaction<'static, Postgres>,
    _permit: tokio::sync::OwnedSemaphorePermit,
}

pub struct PgEngine {
    pool: PgPool,
    tx_gate: Arc<Semaphore>,
    tx: Mutex<Option<TxState>>,
}

impl PgEngine {
    pub fn new(pool: PgPool) -> Self {
        PgEngine {
            pool,
            tx_gate: Arc::new(Semaphore::new(1)),
            tx: Mutex::new(None),
        }
    }

    /// Connect using `DATABASE_URL` (dotenv-aware).
    pub async fn from_env() -> Result<Self, AdminError> {
        dotenvy::dotenv().ok();
        let url = std::env::var("DATABASE_URL")
            .map_err(|_| AdminError::BadRequest("DATABASE_URL is not set".into()))?;
        let pool = PgPool::connect(&url).await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn fetch_rows(&self, sql: &str, params: Vec<PgBindValue>) -> Result<Vec<PgRow>, AdminError> {
        tracing::debug!(sql = %sql, "query");
        let mut query = sqlx::query(sql);
        for p in params {
            query = query.bind(p);
        }
        let mut guard = self.tx.lock().await;
        let rows = match guard.as_mut() {
            Some(state) => query.fetch_all(&mut *state.tx).await?,
            None => query.fetch_all(&self.pool).await?,
        };
        Ok(rows)
    }

    async fn execute_sql(&self, sql: &str, params: Vec<PgBindValue>) -> Result<u64, AdminError> {
        tracing::debug!(sql = %sql, "execute");
        let mut query = sqlx::query(sql);
        for p in params {
            query = query.bind(p);
        }
        let mut guard = self.tx.lock().await;
        let result = match guard.as_mut() {
            Some(state) => query.execute(&mut *state.tx).await?,
            None => query.execute(&self.pool).await?,
        };
        Ok(result.rows_affected())
    }
}

/// Table and column names come from code-level registrations, never from
/// request input; this check still rejects anything that is not a plain
/// lowercase identifier before it reaches interpolated SQL.
fn checked_ident(name: &str) -> Result<&str, AdminError> {
    let ok = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if ok {
        Ok(name)
    } else {
        Err(AdminError::BadRequest(format!("invalid identifier: {}", name)))
    }
}

#[async_trait]
impl StorageEngine for PgEngine {
    async fn begin(&self) -> Result<(), AdminError> {
        let permit = self
            .tx_gate
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| AdminError::Storage(format!("transaction gate closed: {}", e)))?;
        let tx = self.pool.begin().await?;
        *self.tx.lock().await = Some(TxState { tx, _permit: permit });
        Ok(())
    }

    async fn commit(&self) -> Result<(), AdminError> {
        match self.tx.lock().await.take() {
            Some(state) => {
                state.tx.commit().await?;
                Ok(())
            }
            None => Err(AdminError::Storage("commit without begin".into())),
        }
    }

    async fn rollback(&self) -> Result<(), AdminError> {
        match self.tx.lock().await.take() {
            Some(state) => {
                state.tx.rollback().await?;
                Ok(())
            }
            None => Err(AdminError::Storage("rollback without begin".into())),
        }
    }

    async fn fetch_all(&self, table: &str) -> Result<Vec<Value>, AdminError> {
        let sql = format!("SELECT * FROM {} ORDER BY id", checked_ident(table)?);
        let rows = self.fetch_rows(&sql, Vec::new()).await?;
        Ok(rows.iter().map(row_to_json).collect())
    }

    async fn fetch(&self, table: &str, id: i64) -> Result<Option<Value>, AdminError> {
        let sql = format!("SELECT * FROM {} WHERE id = $1", checked_ident(table)?);
        let rows = self.fetch_rows(&sql, vec![PgBindValue::I64(id)]).await?;
        Ok(rows.first().map(row_to_json))
    }

    async fn fetch_by(
        &self,
        table: &str,
        column: &str,
        value: &Value,
    ) -> Result<Vec<Value>, AdminError> {
        let sql = format!(
            "SELECT * FROM {} WHERE {} = $1 ORDER BY id",
            checked_ident(table)?,
            checked_ident(column)?
        );
        let rows = self
            .fetch_rows(&sql, vec![PgBindValue::from_json(value)])
            .await?;
        Ok(rows.iter().map(row_to_json).collect())
    }

    async fn insert(&self, table: &str, data: &Map<String, Value>) -> Result<Value, AdminError> {
        let table = checked_ident(table)?;
        let mut columns = Vec::with_capacity(data.len());
        let mut placeholders = Vec::with_capacity(data.len());
        let mut params = Vec::with_capacity(data.len());
        for (i, (k, v)) in data.iter().enumerate() {
            columns.push(checked_ident(k)?.to_string());
            placeholders.push(format!("${}", i + 1));
            params.push(PgBindValue::from_json(v));
        }
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING *",
            table,
            columns.join(", "),
            placeholders.join(", ")
        );
        let rows = self.fetch_rows(&sql, params).await?;
        rows.first()
            .map(row_to_json)
            .ok_or(AdminError::Db(sqlx::Error::RowNotFound))
    }

    async fn update(
        &self,
        table: &str,
        id: i64,
        data: &Map<String, Value>,
    ) -> Result<bool, AdminError> {
        let table = checked_ident(table)?;
        let mut assignments = Vec::new();
        let mut params = Vec::new();
        for (k, v) in data {
            if k == "id" {
                continue;
            }
            params.push(PgBindValue::from_json(v));
            assignments.push(format!("{} = ${}", checked_ident(k)?, params.len()));
        }
        if assignments.is_empty() {
            return Ok(self.fetch(table, id).await?.is_some());
        }
        params.push(PgBindValue::I64(id));
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ${}",
            table,
            assignments.join(", "),
            params.len()
        );
        Ok(self.execute_sql(&sql, params).await? > 0)
    }

    async fn delete(&self, table: &str, id: i64) -> Result<bool, AdminError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", checked_ident(table)?);
        Ok(self.execute_sql(&sql, vec![PgBindValue::I64(id)]).await? > 0)
    }

    async fn count(&self, table: &str) -> Result<u64, AdminError> {
        let sql = format!("SELECT COUNT(*) AS count FROM {}", checked_ident(table)?);
        let rows = self.fetch_rows(&sql, Vec::new()).await?;
        let count = rows
            .first()
            .map(|r| {
                use sqlx::Row;
                r.try_get::<i64, _>("count").unwrap_or(0)
            })
            .unwrap_or(0);
        Ok(count as u64)
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
        let table = checked_ident(table)?;
        let total = self.count(table).await?;
        let sql = format!("SELECT * FROM {} ORDER BY id LIMIT $1 OFFSET $2", table);
        let rows = self
            .fetch_rows(
                &sql,
                vec![
                    PgBindValue::I64(i64::from(per_page)),
                    PgBindValue::I64(i64::from((page - 1) * per_page)),
                ],
            )
            .await?;
        Ok(Page {
            items: rows.iter().map(row_to_json).collect(),
            total,
            per_page,
            current_page: page,
        })
    }
}

fn row_to_json(row: &PgRow) -> Value {
    use sqlx::Column;
    use sqlx::Row;
    let mut map = serde_json::Map::new();
    for col in row.columns() {
        let name = col.name();
        map.insert(name.to_string(), cell_to_value(row, name));
    }
    Value::Object(map)
}

fn cell_to_value(row: &PgRow, name: &str) -> Value {
    use sqlx::Row;
    if let Ok(Some(n)) = row.try_get::<Option<i16>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i32>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<f64>, _>(name) {
        if let Some(n) = serde_json::Number::from_f64(n) {
            return Value::Number(n);
        }
    }
    if let Ok(Some(b)) = row.try_get::<Option<bool>, _>(name) {
        return Value::Bool(b);
    }
    if let Ok(Some(u)) = row.try_get::<Option<uuid::Uuid>, _>(name) {
        return Value::String(u.to_string());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name) {
        return Value::String(d.to_rfc3339());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::NaiveDateTime>, _>(name) {
        return Value::String(d.format("%Y-%m-%dT%H:%M:%S%.f").to_string());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::NaiveDate>, _>(name) {
        return Value::String(d.format("%Y-%m-%d").to_string());
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        return Value::String(s);
    }
    if let Ok(Some(j)) = row.try_get::<Option<serde_json::Value>, _>(name) {
        return j;
    }
    Value::Null
}
