//! Registry of repositories keyed by entity kind. Instances are built
//! lazily from registered factories and cached for the process lifetime.

use crate::error::{AdminError, ConfigError};
use crate::repository::Repository;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Typed entity tag. Adapters bind to one of these instead of resolving
/// repositories by class-name strings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EntityKind(pub &'static str);

impl EntityKind {
    pub fn table(self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

type RepositoryFactory = Box<dyn Fn() -> Arc<dyn Repository> + Send + Sync>;

pub struct RepositoryManager {
    factories: HashMap<EntityKind, RepositoryFactory>,
    /// Instance cache; the mutex covers the full check-or-build so two
    /// concurrent first resolutions cannot construct two instances.
    instances: Mutex<HashMap<EntityKind, Arc<dyn Repository>>>,
}

impl RepositoryManager {
    pub fn new() -> Self {
        RepositoryManager {
            factories: HashMap::new(),
            instances: Mutex::new(HashMap::new()),
        }
    }

    pub fn register<F>(&mut self, kind: EntityKind, factory: F)
    where
        F: Fn() -> Arc<dyn Repository> + Send + Sync + 'static,
    {
        self.factories.insert(kind, Box::new(factory));
    }

    pub fn has(&self, kind: EntityKind) -> bool {
        self.factories.contains_key(&kind)
    }

    pub fn get(&self, kind: EntityKind) -> Result<Arc<dyn Repository>, AdminError> {
        let mut instances = self
            .instances
            .lock()
            .map_err(|_| AdminError::Storage("repository cache poisoned".into()))?;
        if let Some(existing) = instances.get(&kind) {
            return Ok(existing.clone());
        }
        let factory = self
            .factories
            .get(&kind)
            .ok_or_else(|| ConfigError::UnregisteredRepository(kind.to_string()))?;
        let instance = factory();
        instances.insert(kind, instance.clone());
        Ok(instance)
    }
}

impl Default for RepositoryManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::EntityRepository;
    use crate::storage::MemoryEngine;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const THINGS: EntityKind = EntityKind("things");

    #[test]
    fn get_builds_once_and_caches() {
        let engine = Arc::new(MemoryEngine::new());
        let built = Arc::new(AtomicUsize::new(0));
        let mut manager = RepositoryManager::new();
        let counter = built.clone();
        manager.register(THINGS, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Arc::new(EntityRepository::new(engine.clone(), "things"))
        });

        let a = manager.get(THINGS).unwrap();
        let b = manager.get(THINGS).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(built.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unregistered_kind_is_a_config_error() {
        let manager = RepositoryManager::new();
        let err = manager.get(EntityKind("missing")).map(|_| ()).unwrap_err();
        assert!(matches!(
            err,
            AdminError::Config(ConfigError::UnregisteredRepository(_))
        ));
    }
}
