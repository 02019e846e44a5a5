//! The adapter contract. An adapter binds an entity kind to its repository,
//! form definition, view configs and write-side service, and derives every
//! URL from the project context instead of any global state.

use crate::error::AdminError;
use crate::project::ProjectContext;
use crate::repository::{EntityKind, Repository, RepositoryManager};
use crate::routing::{admin_controller_descriptor, ControllerDescriptor, RouteTable};
use crate::storage::StorageEngine;
use crate::view::{
    CreateViewConfig, DeleteViewConfig, EditViewConfig, FormContext, FormDefinition,
    ListViewConfig,
};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Write-side operations behind each admin. Implementations own their
/// transaction boundaries and side effects.
#[async_trait]
pub trait AdminService: Send + Sync {
    async fn create(&self, attributes: Map<String, Value>) -> Result<Value, AdminError>;

    async fn update(&self, id: i64, attributes: Map<String, Value>) -> Result<bool, AdminError>;

    async fn delete(&self, id: i64) -> Result<bool, AdminError>;
}

pub trait AdminAdapter: Send + Sync {
    fn entity(&self) -> EntityKind;

    /// Route segment under `admin`, e.g. `tenants`.
    fn route_prefix(&self) -> &'static str;

    /// Dispatch-target name emitted into the route table.
    fn controller(&self) -> &'static str;

    fn title(&self) -> &str;

    fn form(&self) -> Arc<dyn FormDefinition>;

    fn service(
        &self,
        engine: Arc<dyn StorageEngine>,
        repositories: &RepositoryManager,
    ) -> Result<Arc<dyn AdminService>, AdminError>;

    fn list_view_config(&self, context: &ProjectContext) -> ListViewConfig;

    fn create_view_config(&self) -> CreateViewConfig {
        CreateViewConfig::new(self.form().form(FormContext::Create))
            .title(&format!("Crear {}", self.title()))
    }

    fn edit_view_config(&self, item: Value) -> EditViewConfig {
        EditViewConfig::new(self.form().form(FormContext::Edit), item)
            .title(&format!("Editar {}", self.title()))
    }

    fn delete_view_config(&self, item: Value) -> DeleteViewConfig {
        DeleteViewConfig::new(item).title(&format!("Eliminar {}", self.title()))
    }

    /// The standard action set; adapters with extra actions override this.
    fn descriptor(&self) -> ControllerDescriptor {
        admin_controller_descriptor(self.controller(), self.route_prefix())
    }

    /// Canonical route name: `{project}.admin.{entity}.{action}`.
    fn url_name(&self, context: &ProjectContext, action: &str) -> String {
        format!("{}.admin.{}.{}", context.prefix, self.route_prefix(), action)
    }

    fn url(
        &self,
        routes: &RouteTable,
        context: &ProjectContext,
        action: &str,
        params: &[(&str, String)],
    ) -> Result<String, AdminError> {
        routes.url(&self.url_name(context, action), params)
    }

    fn repository(&self, manager: &RepositoryManager) -> Result<Arc<dyn Repository>, AdminError> {
        manager.get(self.entity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::EndpointProcessor;
    use crate::view::{FieldOptions, FormBuilder};
    use pretty_assertions::assert_eq;

    struct NoopForm;

    impl FormDefinition for NoopForm {
        fn build_create_form(&self) -> FormBuilder {
            FormBuilder::new().text("name", "Nombre", FieldOptions::new())
        }

        fn build_edit_form(&self) -> FormBuilder {
            self.build_create_form()
        }
    }

    struct WidgetAdmin;

    impl AdminAdapter for WidgetAdmin {
        fn entity(&self) -> EntityKind {
            EntityKind("widgets")
        }

        fn route_prefix(&self) -> &'static str {
            "widgets"
        }

        fn controller(&self) -> &'static str {
            "WidgetAdminController"
        }

        fn title(&self) -> &str {
            "Widget"
        }

        fn form(&self) -> Arc<dyn FormDefinition> {
            Arc::new(NoopForm)
        }

        fn service(
            &self,
            _engine: Arc<dyn StorageEngine>,
            _repositories: &RepositoryManager,
        ) -> Result<Arc<dyn AdminService>, AdminError> {
            unimplemented!("not exercised here")
        }

        fn list_view_config(&self, _context: &ProjectContext) -> ListViewConfig {
            ListViewConfig::new()
        }
    }

    #[test]
    fn url_names_follow_the_canonical_shape() {
        let context = ProjectContext::new("landlord", "Landlord");
        assert_eq!(
            WidgetAdmin.url_name(&context, "list"),
            "landlord.admin.widgets.list"
        );
    }

    #[test]
    fn urls_resolve_through_the_route_table() {
        let context = ProjectContext::new("landlord", "Landlord");
        let table = RouteTable::new(EndpointProcessor::process(
            &[WidgetAdmin.descriptor()],
            &context.prefix,
        ));
        let url = WidgetAdmin
            .url(&table, &context, "edit", &[("id", "3".to_string())])
            .unwrap();
        assert_eq!(url, "/landlord/admin/widgets/edit/3");
    }

    #[test]
    fn default_view_configs_derive_titles() {
        let create = WidgetAdmin.create_view_config();
        assert_eq!(create.title, "Crear Widget");
        let edit = WidgetAdmin.edit_view_config(serde_json::json!({"id": 1}));
        assert_eq!(edit.title, "Editar Widget");
        assert_eq!(edit.submit_label, "Actualizar");
    }
}
