//! Projects and the registry that resolves them. The project context is
//! passed explicitly everywhere a URL or title is derived; there is no
//! process-global current project.

use crate::admin::AdminAdapter;
use crate::error::{AdminError, ConfigError};
use crate::routing::{ControllerDescriptor, Endpoint, EndpointProcessor, RouteTable};
use std::collections::HashMap;
use std::sync::Arc;

/// Identity of one project: the URL prefix and the display title.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectContext {
    pub prefix: String,
    pub title: String,
}

impl ProjectContext {
    pub fn new(prefix: &str, title: &str) -> Self {
        ProjectContext {
            prefix: prefix.to_string(),
            title: title.to_string(),
        }
    }
}

/// One project: its context plus the admin adapters mounted under it.
pub struct Project {
    context: ProjectContext,
    admins: Vec<Arc<dyn AdminAdapter>>,
}

impl Project {
    pub fn new(context: ProjectContext, admins: Vec<Arc<dyn AdminAdapter>>) -> Self {
        Project { context, admins }
    }

    pub fn context(&self) -> &ProjectContext {
        &self.context
    }

    pub fn admins(&self) -> &[Arc<dyn AdminAdapter>] {
        &self.admins
    }

    pub fn admin_by_prefix(&self, prefix: &str) -> Result<Arc<dyn AdminAdapter>, AdminError> {
        self.admins
            .iter()
            .find(|a| a.route_prefix() == prefix)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownAdmin(prefix.to_string()).into())
    }

    /// Routing metadata of every mounted adapter.
    pub fn descriptors(&self) -> Vec<ControllerDescriptor> {
        self.admins.iter().map(|a| a.descriptor()).collect()
    }

    pub fn endpoints(&self) -> Vec<Endpoint> {
        EndpointProcessor::process(&self.descriptors(), &self.context.prefix)
    }
}

/// All registered projects, keyed by prefix.
#[derive(Default)]
pub struct ProjectRegistry {
    by_prefix: HashMap<String, Arc<Project>>,
}

impl ProjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, project: Project) {
        self.by_prefix
            .insert(project.context.prefix.clone(), Arc::new(project));
    }

    pub fn get(&self, prefix: &str) -> Result<Arc<Project>, AdminError> {
        self.by_prefix
            .get(prefix)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownProject(prefix.to_string()).into())
    }

    pub fn projects(&self) -> impl Iterator<Item = &Arc<Project>> {
        self.by_prefix.values()
    }

    /// Route table over every project, built once at boot.
    pub fn route_table(&self) -> RouteTable {
        let mut endpoints = Vec::new();
        for project in self.by_prefix.values() {
            endpoints.extend(project.endpoints());
        }
        RouteTable::new(endpoints)
    }
}
