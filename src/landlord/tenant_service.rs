//! Tenant writes: every multi-row operation runs inside one transaction.

use crate::admin::AdminService;
use crate::error::AdminError;
use crate::landlord::{SETTINGS, TENANTS, USERS};
use crate::landlord::user_service;
use crate::repository::{Repository, RepositoryManager};
use crate::service::{NamedOperation, TransactionService};
use crate::storage::StorageEngine;
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::Arc;

const DELETE_RETRY_ATTEMPTS: u32 = 3;

pub struct TenantService {
    tx: TransactionService,
    tenants: Arc<dyn Repository>,
    users: Arc<dyn Repository>,
    settings: Arc<dyn Repository>,
}

impl TenantService {
    pub fn new(
        engine: Arc<dyn StorageEngine>,
        repositories: &RepositoryManager,
    ) -> Result<Self, AdminError> {
        Ok(TenantService {
            tx: TransactionService::new(engine),
            tenants: repositories.get(TENANTS)?,
            users: repositories.get(USERS)?,
            settings: repositories.get(SETTINGS)?,
        })
    }

    /// Creates the tenant and its default settings row atomically.
    pub async fn create_tenant(&self, attributes: Map<String, Value>) -> Result<Value, AdminError> {
        self.tx
            .execute(|| async {
                let tenant = self.tenants.create(attributes).await?;
                let id = tenant_id(&tenant)?;
                self.setup_default_settings(id).await?;
                Ok(tenant)
            })
            .await
    }

    /// Creates a tenant together with its first administrator. The admin is
    /// stamped with the new tenant's id and the `admin` role, and the
    /// password is hashed before it touches storage.
    pub async fn create_with_admin(
        &self,
        tenant_attributes: Map<String, Value>,
        mut admin_attributes: Map<String, Value>,
    ) -> Result<Value, AdminError> {
        user_service::hash_password_field(&mut admin_attributes)?;
        self.tx
            .execute(|| async {
                let tenant = self.tenants.create(tenant_attributes).await?;
                let id = tenant_id(&tenant)?;
                self.setup_default_settings(id).await?;

                let mut admin = admin_attributes;
                admin.insert("tenant_id".to_string(), json!(id));
                admin.insert("role".to_string(), json!("admin"));
                self.users.create(admin).await?;
                Ok(tenant)
            })
            .await
    }

    /// Updates the tenant and a batch of its users in one atomic boundary.
    /// Results are keyed `tenant` and `users`.
    pub async fn update_with_users(
        &self,
        id: i64,
        tenant_attributes: Map<String, Value>,
        user_updates: Vec<(i64, Map<String, Value>)>,
    ) -> Result<Value, AdminError> {
        let tenants = self.tenants.clone();
        let users = self.users.clone();
        let operations: Vec<NamedOperation<Value>> = vec![
            (
                "tenant",
                Box::new(move || {
                    Box::pin(async move {
                        let updated = tenants.update(id, tenant_attributes).await?;
                        if !updated {
                            return Err(AdminError::NotFound(format!("tenants {}", id)));
                        }
                        Ok(json!(updated))
                    })
                }),
            ),
            (
                "users",
                Box::new(move || {
                    Box::pin(async move {
                        let mut updated = 0u32;
                        for (user_id, attributes) in user_updates {
                            if users.update(user_id, attributes).await? {
                                updated += 1;
                            }
                        }
                        Ok(json!(updated))
                    })
                }),
            ),
        ];
        let results = self.tx.execute_multiple(operations).await?;
        Ok(json!({
            "tenant": results["tenant"],
            "users": results["users"],
        }))
    }

    /// Cascade delete: the tenant's users and settings go with it. Retried
    /// on storage deadlocks, so the body must stay idempotent.
    pub async fn delete_with_relations(&self, id: i64) -> Result<bool, AdminError> {
        self.tx
            .execute_with_retry(
                || async {
                    self.tenants.find_or_fail(id).await?;
                    for user in self.users.find_by("tenant_id", json!(id)).await? {
                        if let Some(user_id) = crate::storage::row_id(&user) {
                            self.users.delete(user_id).await?;
                        }
                    }
                    for settings in self.settings.find_by("tenant_id", json!(id)).await? {
                        if let Some(settings_id) = crate::storage::row_id(&settings) {
                            self.settings.delete(settings_id).await?;
                        }
                    }
                    self.tenants.delete(id).await
                },
                DELETE_RETRY_ATTEMPTS,
            )
            .await
    }

    /// Moves the given users from one tenant to another. Users that do not
    /// belong to the source tenant are skipped, not failed; returns the
    /// rows of the users actually migrated.
    pub async fn migrate_users(
        &self,
        user_ids: &[i64],
        from_tenant: i64,
        to_tenant: i64,
    ) -> Result<Vec<Value>, AdminError> {
        self.tx
            .execute(|| async {
                self.tenants.find_or_fail(to_tenant).await?;
                let mut migrated = Vec::new();
                for &user_id in user_ids {
                    let Some(user) = self.users.find(user_id).await? else {
                        continue;
                    };
                    if user.get("tenant_id").and_then(Value::as_i64) != Some(from_tenant) {
                        tracing::debug!(user_id, from_tenant, "user not in source tenant, skipped");
                        continue;
                    }
                    let mut attributes = Map::new();
                    attributes.insert("tenant_id".to_string(), json!(to_tenant));
                    if self.users.update(user_id, attributes).await? {
                        migrated.push(self.users.find_or_fail(user_id).await?);
                    }
                }
                Ok(migrated)
            })
            .await
    }

    async fn setup_default_settings(&self, tenant_id: i64) -> Result<Value, AdminError> {
        let mut defaults = Map::new();
        defaults.insert("tenant_id".to_string(), json!(tenant_id));
        defaults.insert("locale".to_string(), json!("es"));
        defaults.insert("timezone".to_string(), json!("UTC"));
        defaults.insert("notifications".to_string(), json!(true));
        self.settings.create(defaults).await
    }
}

fn tenant_id(tenant: &Value) -> Result<i64, AdminError> {
    crate::storage::row_id(tenant)
        .ok_or_else(|| AdminError::Storage("created tenant has no id".into()))
}

#[async_trait]
impl AdminService for TenantService {
    async fn create(&self, attributes: Map<String, Value>) -> Result<Value, AdminError> {
        self.create_tenant(attributes).await
    }

    async fn update(&self, id: i64, attributes: Map<String, Value>) -> Result<bool, AdminError> {
        self.tx
            .execute(|| async {
                let updated = self.tenants.update(id, attributes).await?;
                if !updated {
                    return Err(AdminError::NotFound(format!("tenants {}", id)));
                }
                Ok(updated)
            })
            .await
    }

    async fn delete(&self, id: i64) -> Result<bool, AdminError> {
        self.delete_with_relations(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landlord::register_repositories;
    use crate::storage::MemoryEngine;
    use pretty_assertions::assert_eq;

    fn obj(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    fn service() -> (Arc<MemoryEngine>, TenantService) {
        let engine = Arc::new(MemoryEngine::new());
        let mut manager = RepositoryManager::new();
        register_repositories(&mut manager, engine.clone());
        let service = TenantService::new(engine.clone(), &manager).unwrap();
        (engine, service)
    }

    #[tokio::test]
    async fn create_also_seeds_default_settings() {
        let (engine, service) = service();
        let tenant = service
            .create_tenant(obj(json!({"name": "Acme", "status": "active"})))
            .await
            .unwrap();
        let id = tenant["id"].as_i64().unwrap();
        let settings = engine
            .fetch_by("settings", "tenant_id", &json!(id))
            .await
            .unwrap();
        assert_eq!(settings.len(), 1);
        assert_eq!(settings[0]["locale"], json!("es"));
        assert_eq!(settings[0]["notifications"], json!(true));
    }

    #[tokio::test]
    async fn create_with_admin_stamps_tenant_and_role() {
        let (engine, service) = service();
        let tenant = service
            .create_with_admin(
                obj(json!({"name": "Acme"})),
                obj(json!({"name": "Ana", "email": "ana@acme.test", "password": "s3cret"})),
            )
            .await
            .unwrap();
        let id = tenant["id"].as_i64().unwrap();
        let admins = engine
            .fetch_by("users", "tenant_id", &json!(id))
            .await
            .unwrap();
        assert_eq!(admins.len(), 1);
        assert_eq!(admins[0]["role"], json!("admin"));
        // Plaintext must never reach storage.
        assert_ne!(admins[0]["password"], json!("s3cret"));
        assert!(admins[0]["password"].as_str().unwrap().starts_with("$argon2"));
    }

    #[tokio::test]
    async fn update_with_users_reports_per_operation_results() {
        let (engine, service) = service();
        let tenant = service.create_tenant(obj(json!({"name": "Acme"}))).await.unwrap();
        let id = tenant["id"].as_i64().unwrap();
        let u1 = engine
            .insert("users", &obj(json!({"name": "a", "tenant_id": id})))
            .await
            .unwrap();
        let u1_id = u1["id"].as_i64().unwrap();

        let result = service
            .update_with_users(
                id,
                obj(json!({"name": "Acme 2"})),
                vec![(u1_id, obj(json!({"name": "b"}))), (9999, obj(json!({"name": "x"})))],
            )
            .await
            .unwrap();
        assert_eq!(result["tenant"], json!(true));
        assert_eq!(result["users"], json!(1));
        let tenant = engine.fetch("tenants", id).await.unwrap().unwrap();
        assert_eq!(tenant["name"], json!("Acme 2"));
    }

    #[tokio::test]
    async fn cascade_delete_removes_users_and_settings() {
        let (engine, service) = service();
        let tenant = service.create_tenant(obj(json!({"name": "Acme"}))).await.unwrap();
        let id = tenant["id"].as_i64().unwrap();
        engine
            .insert("users", &obj(json!({"name": "a", "tenant_id": id})))
            .await
            .unwrap();
        engine
            .insert("users", &obj(json!({"name": "b", "tenant_id": id})))
            .await
            .unwrap();

        assert!(service.delete_with_relations(id).await.unwrap());
        assert_eq!(engine.count("tenants").await.unwrap(), 0);
        assert_eq!(engine.count("users").await.unwrap(), 0);
        assert_eq!(engine.count("settings").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn cascade_delete_of_missing_tenant_mutates_nothing() {
        let (engine, service) = service();
        engine
            .insert("users", &obj(json!({"name": "orphanless", "tenant_id": 42})))
            .await
            .unwrap();
        let err = service.delete_with_relations(42).await.unwrap_err();
        assert!(matches!(err, AdminError::NotFound(_)));
        assert_eq!(engine.count("users").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn migrate_users_skips_users_of_other_tenants() {
        let (engine, service) = service();
        let from = service.create_tenant(obj(json!({"name": "From"}))).await.unwrap();
        let to = service.create_tenant(obj(json!({"name": "To"}))).await.unwrap();
        let from_id = from["id"].as_i64().unwrap();
        let to_id = to["id"].as_i64().unwrap();

        engine
            .insert("users", &obj(json!({"id": 10, "name": "a", "tenant_id": from_id})))
            .await
            .unwrap();
        engine
            .insert("users", &obj(json!({"id": 11, "name": "b", "tenant_id": 999})))
            .await
            .unwrap();
        engine
            .insert("users", &obj(json!({"id": 12, "name": "c", "tenant_id": from_id})))
            .await
            .unwrap();

        let migrated = service
            .migrate_users(&[10, 11, 12, 77], from_id, to_id)
            .await
            .unwrap();
        let migrated_ids: Vec<i64> = migrated
            .iter()
            .map(|u| u["id"].as_i64().unwrap())
            .collect();
        assert_eq!(migrated_ids, vec![10, 12]);
        for user in &migrated {
            assert_eq!(user["tenant_id"], json!(to_id));
        }
        let skipped = engine.fetch("users", 11).await.unwrap().unwrap();
        assert_eq!(skipped["tenant_id"], json!(999));
    }
}
