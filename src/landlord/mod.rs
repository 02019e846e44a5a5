//! The landlord project: tenant and user administration.

pub mod forms;
pub mod tenant_admin;
pub mod tenant_service;
pub mod user_admin;
pub mod user_service;

use crate::project::{Project, ProjectContext};
use crate::repository::{EntityKind, EntityRepository, RepositoryManager};
use crate::storage::StorageEngine;
use std::sync::Arc;

pub use tenant_admin::TenantAdmin;
pub use tenant_service::TenantService;
pub use user_admin::UserAdmin;
pub use user_service::UserService;

pub const TENANTS: EntityKind = EntityKind("tenants");
pub const USERS: EntityKind = EntityKind("users");
pub const SETTINGS: EntityKind = EntityKind("settings");

pub fn register_repositories(manager: &mut RepositoryManager, engine: Arc<dyn StorageEngine>) {
    for kind in [TENANTS, USERS, SETTINGS] {
        let engine = engine.clone();
        manager.register(kind, move || {
            Arc::new(EntityRepository::new(engine.clone(), kind.table()))
        });
    }
}

pub fn landlord_project() -> Project {
    Project::new(
        ProjectContext::new("landlord", "Landlord"),
        vec![Arc::new(TenantAdmin), Arc::new(UserAdmin)],
    )
}
