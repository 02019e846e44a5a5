//! User writes. Passwords are hashed with Argon2 before storage; a blank or
//! absent password on update leaves the stored hash untouched.

use crate::admin::AdminService;
use crate::error::AdminError;
use crate::landlord::USERS;
use crate::repository::{Repository, RepositoryManager};
use crate::service::TransactionService;
use crate::storage::StorageEngine;
use argon2::password_hash::{rand_core::OsRng, PasswordHasher, SaltString};
use argon2::Argon2;
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::Arc;

pub struct UserService {
    tx: TransactionService,
    users: Arc<dyn Repository>,
}

impl UserService {
    pub fn new(
        engine: Arc<dyn StorageEngine>,
        repositories: &RepositoryManager,
    ) -> Result<Self, AdminError> {
        Ok(UserService {
            tx: TransactionService::new(engine),
            users: repositories.get(USERS)?,
        })
    }

    pub async fn create_user(&self, mut attributes: Map<String, Value>) -> Result<Value, AdminError> {
        hash_password_field(&mut attributes)?;
        if !attributes.contains_key("role") {
            attributes.insert("role".to_string(), json!("user"));
        }
        self.tx
            .execute(|| async { self.users.create(attributes).await })
            .await
    }

    pub async fn update_user(
        &self,
        id: i64,
        mut attributes: Map<String, Value>,
    ) -> Result<bool, AdminError> {
        // Blank password means keep the current one.
        if attributes
            .get("password")
            .and_then(Value::as_str)
            .is_some_and(str::is_empty)
        {
            attributes.remove("password");
        }
        hash_password_field(&mut attributes)?;
        self.tx
            .execute(|| async {
                let updated = self.users.update(id, attributes).await?;
                if !updated {
                    return Err(AdminError::NotFound(format!("users {}", id)));
                }
                Ok(updated)
            })
            .await
    }

    pub async fn delete_user(&self, id: i64) -> Result<bool, AdminError> {
        self.tx
            .execute(|| async {
                self.users.find_or_fail(id).await?;
                self.users.delete(id).await
            })
            .await
    }
}

#[async_trait]
impl AdminService for UserService {
    async fn create(&self, attributes: Map<String, Value>) -> Result<Value, AdminError> {
        self.create_user(attributes).await
    }

    async fn update(&self, id: i64, attributes: Map<String, Value>) -> Result<bool, AdminError> {
        self.update_user(id, attributes).await
    }

    async fn delete(&self, id: i64) -> Result<bool, AdminError> {
        self.delete_user(id).await
    }
}

/// Replaces a plaintext `password` attribute with its Argon2 hash, in place.
/// No-op when the attribute is absent.
pub fn hash_password_field(attributes: &mut Map<String, Value>) -> Result<(), AdminError> {
    let Some(plain) = attributes.get("password").and_then(Value::as_str) else {
        return Ok(());
    };
    let hashed = hash_password(plain)?;
    attributes.insert("password".to_string(), json!(hashed));
    Ok(())
}

pub fn hash_password(plain: &str) -> Result<String, AdminError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AdminError::PasswordHash(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landlord::register_repositories;
    use crate::storage::MemoryEngine;
    use argon2::password_hash::PasswordHash;
    use argon2::PasswordVerifier;
    use pretty_assertions::assert_eq;

    fn obj(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    fn service() -> (Arc<MemoryEngine>, UserService) {
        let engine = Arc::new(MemoryEngine::new());
        let mut manager = RepositoryManager::new();
        register_repositories(&mut manager, engine.clone());
        let service = UserService::new(engine.clone(), &manager).unwrap();
        (engine, service)
    }

    #[tokio::test]
    async fn create_hashes_the_password_and_defaults_the_role() {
        let (_, service) = service();
        let user = service
            .create_user(obj(json!({"name": "Ana", "password": "s3cret"})))
            .await
            .unwrap();
        assert_eq!(user["role"], json!("user"));
        let stored = user["password"].as_str().unwrap();
        assert_ne!(stored, "s3cret");
        let parsed = PasswordHash::new(stored).unwrap();
        assert!(Argon2::default()
            .verify_password(b"s3cret", &parsed)
            .is_ok());
    }

    #[tokio::test]
    async fn blank_password_on_update_keeps_the_hash() {
        let (engine, service) = service();
        let user = service
            .create_user(obj(json!({"name": "Ana", "password": "s3cret"})))
            .await
            .unwrap();
        let id = user["id"].as_i64().unwrap();
        let original_hash = user["password"].clone();

        service
            .update_user(id, obj(json!({"name": "Ana María", "password": ""})))
            .await
            .unwrap();
        let stored = engine.fetch("users", id).await.unwrap().unwrap();
        assert_eq!(stored["name"], json!("Ana María"));
        assert_eq!(stored["password"], original_hash);
    }

    #[tokio::test]
    async fn delete_of_missing_user_is_not_found() {
        let (_, service) = service();
        let err = service.delete_user(404).await.unwrap_err();
        assert!(matches!(err, AdminError::NotFound(_)));
    }
}
