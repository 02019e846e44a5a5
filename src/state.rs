//! Shared application state.

use crate::project::ProjectRegistry;
use crate::repository::RepositoryManager;
use crate::routing::RouteTable;
use crate::storage::StorageEngine;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<dyn StorageEngine>,
    pub repositories: Arc<RepositoryManager>,
    pub projects: Arc<ProjectRegistry>,
    /// Built once from every registered project.
    pub routes: Arc<RouteTable>,
}

impl AppState {
    pub fn new(
        engine: Arc<dyn StorageEngine>,
        repositories: RepositoryManager,
        projects: ProjectRegistry,
    ) -> Self {
        let routes = Arc::new(projects.route_table());
        AppState {
            engine,
            repositories: Arc::new(repositories),
            projects: Arc::new(projects),
            routes,
        }
    }
}
