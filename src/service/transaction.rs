//! Atomic execution of repository operations with deadlock retry.

use crate::error::AdminError;
use crate::storage::StorageEngine;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

const RETRY_BASE_DELAY: Duration = Duration::from_millis(100);

/// Named zero-argument operation for [`TransactionService::execute_multiple`].
pub type NamedOperation<T> = (
    &'static str,
    Box<dyn FnOnce() -> Pin<Box<dyn Future<Output = Result<T, AdminError>> + Send>> + Send>,
);

#[derive(Clone)]
pub struct TransactionService {
    engine: Arc<dyn StorageEngine>,
}

impl TransactionService {
    pub fn new(engine: Arc<dyn StorageEngine>) -> Self {
        TransactionService { engine }
    }

    /// Runs `op` inside one transaction. Any failure rolls everything back
    /// and is re-raised; no partial effects survive.
    pub async fn execute<T, F, Fut>(&self, op: F) -> Result<T, AdminError>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<T, AdminError>> + Send,
        T: Send,
    {
        match self.run(op).await {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::error!(error = %e, origin = "transaction", "transaction failed");
                Err(e)
            }
        }
    }

    /// Runs the named operations sequentially inside one transaction.
    /// Results are keyed by operation name; a failure in any operation rolls
    /// back all of them.
    pub async fn execute_multiple<T>(
        &self,
        operations: Vec<NamedOperation<T>>,
    ) -> Result<HashMap<String, T>, AdminError>
    where
        T: Send + 'static,
    {
        self.execute(|| async move {
            let mut results = HashMap::with_capacity(operations.len());
            for (name, op) in operations {
                results.insert(name.to_string(), op().await?);
            }
            Ok(results)
        })
        .await
    }

    /// Re-attempts `op` on storage deadlock / lock-timeout failures, waiting
    /// `base × attempt` between attempts. Non-deadlock failures and attempt
    /// exhaustion re-raise immediately. The whole operation is re-invoked on
    /// each attempt; the caller owns idempotency of any side effects taken
    /// before the failure point.
    pub async fn execute_with_retry<T, F, Fut>(
        &self,
        op: F,
        max_attempts: u32,
    ) -> Result<T, AdminError>
    where
        F: Fn() -> Fut + Send + Sync,
        Fut: Future<Output = Result<T, AdminError>> + Send,
        T: Send,
    {
        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.run(&op).await {
                Ok(value) => return Ok(value),
                Err(e) if is_deadlock(&e) && attempts < max_attempts => {
                    tracing::warn!(
                        attempt = attempts,
                        max_attempts,
                        "deadlock detected, retrying"
                    );
                    tokio::time::sleep(RETRY_BASE_DELAY * attempts).await;
                }
                Err(e) => {
                    tracing::error!(error = %e, origin = "transaction", attempts, "transaction failed");
                    return Err(e);
                }
            }
        }
    }

    /// Like [`execute`](Self::execute), but invokes `on_rollback` with the
    /// causing failure before re-raising, for callers needing custom cleanup.
    pub async fn execute_with_rollback_handler<T, F, Fut, R>(
        &self,
        op: F,
        on_rollback: Option<R>,
    ) -> Result<T, AdminError>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<T, AdminError>> + Send,
        T: Send,
        R: FnOnce(&AdminError) + Send,
    {
        match self.execute(op).await {
            Err(e) => {
                if let Some(handler) = on_rollback {
                    handler(&e);
                }
                Err(e)
            }
            ok => ok,
        }
    }

    async fn run<T, F, Fut>(&self, op: F) -> Result<T, AdminError>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<T, AdminError>> + Send,
        T: Send,
    {
        self.engine.begin().await?;
        match op().await {
            Ok(value) => {
                self.engine.commit().await?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rb) = self.engine.rollback().await {
                    tracing::error!(error = %rb, "rollback failed");
                }
                Err(e)
            }
        }
    }
}

/// Storage-engine lock conflicts, recognized by the markers MySQL (1213)
/// and PostgreSQL (40P01) put in their error texts.
fn is_deadlock(e: &AdminError) -> bool {
    let message = e.to_string();
    message.contains("deadlock")
        || message.contains("Deadlock")
        || message.contains("1213")
        || message.contains("40P01")
        || message.contains("lock wait timeout")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryEngine;
    use serde_json::{json, Map, Value};
    use std::sync::atomic::{AtomicU32, Ordering};

    fn obj(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    fn service() -> (Arc<MemoryEngine>, TransactionService) {
        let engine = Arc::new(MemoryEngine::new());
        let service = TransactionService::new(engine.clone());
        (engine, service)
    }

    #[tokio::test]
    async fn execute_commits_on_success() {
        let (engine, service) = service();
        let created = service
            .execute(|| {
                let engine = engine.clone();
                async move { engine.insert("tenants", &obj(json!({"name": "acme"}))).await }
            })
            .await
            .unwrap();
        assert_eq!(created["name"], json!("acme"));
        assert_eq!(engine.count("tenants").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn execute_rolls_back_partial_writes() {
        let (engine, service) = service();
        let result: Result<(), AdminError> = service
            .execute(|| {
                let engine = engine.clone();
                async move {
                    engine.insert("tenants", &obj(json!({"name": "first"}))).await?;
                    engine.insert("users", &obj(json!({"name": "second"}))).await?;
                    Err(AdminError::Validation("boom".into()))
                }
            })
            .await;
        assert!(result.is_err());
        assert_eq!(engine.count("tenants").await.unwrap(), 0);
        assert_eq!(engine.count("users").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn execute_multiple_collects_results_by_name() {
        let (engine, service) = service();
        let e1 = engine.clone();
        let e2 = engine.clone();
        let results = service
            .execute_multiple(vec![
                (
                    "tenant",
                    Box::new(move || {
                        let engine = e1.clone();
                        Box::pin(async move {
                            engine.insert("tenants", &obj(json!({"name": "a"}))).await
                        })
                    }),
                ),
                (
                    "user",
                    Box::new(move || {
                        let engine = e2.clone();
                        Box::pin(async move {
                            engine.insert("users", &obj(json!({"name": "b"}))).await
                        })
                    }),
                ),
            ])
            .await
            .unwrap();
        assert_eq!(results["tenant"]["name"], json!("a"));
        assert_eq!(results["user"]["name"], json!("b"));
    }

    #[tokio::test]
    async fn execute_multiple_rolls_back_earlier_operations() {
        let (engine, service) = service();
        let e1 = engine.clone();
        let results: Result<HashMap<String, Value>, _> = service
            .execute_multiple(vec![
                (
                    "ok",
                    Box::new(move || {
                        let engine = e1.clone();
                        Box::pin(async move {
                            engine.insert("tenants", &obj(json!({"name": "a"}))).await
                        })
                    }),
                ),
                (
                    "fails",
                    Box::new(|| {
                        Box::pin(async { Err(AdminError::Validation("nope".into())) })
                    }),
                ),
            ])
            .await;
        assert!(results.is_err());
        assert_eq!(engine.count("tenants").await.unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_recovers_from_two_deadlocks() {
        let (_, service) = service();
        let calls = AtomicU32::new(0);
        let started = tokio::time::Instant::now();
        let result = service
            .execute_with_retry(
                || {
                    let attempt = calls.fetch_add(1, Ordering::SeqCst) + 1;
                    async move {
                        if attempt < 3 {
                            Err(AdminError::Storage("deadlock detected".into()))
                        } else {
                            Ok(attempt)
                        }
                    }
                },
                3,
            )
            .await
            .unwrap();
        assert_eq!(result, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // Backoff ran twice: 100ms after attempt 1, 200ms after attempt 2.
        assert_eq!(started.elapsed(), Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn retry_exhaustion_reraises_the_deadlock() {
        let (_, service) = service();
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = service
            .execute_with_retry(
                || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Err(AdminError::Storage("deadlock detected".into())) }
                },
                3,
            )
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_deadlock_error_is_not_retried() {
        let (_, service) = service();
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = service
            .execute_with_retry(
                || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Err(AdminError::Validation("bad input".into())) }
                },
                3,
            )
            .await;
        // The failure is re-raised unchanged after being logged.
        assert_eq!(result.unwrap_err().to_string(), "validation: bad input");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn rollback_handler_sees_the_failure() {
        let (_, service) = service();
        let seen = std::sync::Mutex::new(None);
        let result: Result<(), _> = service
            .execute_with_rollback_handler(
                || async { Err(AdminError::Conflict("taken".into())) },
                Some(|e: &AdminError| {
                    *seen.lock().unwrap() = Some(e.to_string());
                }),
            )
            .await;
        assert!(result.is_err());
        assert_eq!(seen.lock().unwrap().as_deref(), Some("conflict: taken"));
    }
}
