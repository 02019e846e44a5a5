//! Backoffice SDK: adapter-driven admin CRUD library.

pub mod admin;
pub mod error;
pub mod handlers;
pub mod landlord;
pub mod migration;
pub mod project;
pub mod repository;
pub mod response;
pub mod routes;
pub mod routing;
pub mod service;
pub mod state;
pub mod storage;
pub mod view;

pub use admin::{AdminAdapter, AdminService};
pub use error::{AdminError, ConfigError};
pub use migration::apply_migrations;
pub use project::{Project, ProjectContext, ProjectRegistry};
pub use repository::{EntityKind, EntityRepository, Repository, RepositoryManager};
pub use response::{error_body, success_many, success_one, success_with_redirect};
pub use routes::{admin_routes, app_router, common_routes};
pub use routing::{EndpointProcessor, RouteTable};
pub use service::TransactionService;
pub use state::AppState;
pub use storage::{MemoryEngine, Page, PgEngine, StorageEngine};
