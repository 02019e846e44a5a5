//! Admin adapter for tenants.

use crate::admin::{AdminAdapter, AdminService};
use crate::error::AdminError;
use crate::landlord::forms::TenantForm;
use crate::landlord::tenant_service::TenantService;
use crate::landlord::TENANTS;
use crate::project::ProjectContext;
use crate::repository::{EntityKind, RepositoryManager};
use crate::storage::StorageEngine;
use crate::view::{
    ActionDef, ActionKind, ColumnDef, ColumnFormat, FormDefinition, ListViewConfig, StatCardDef,
};
use serde_json::json;
use std::sync::Arc;

pub struct TenantAdmin;

impl AdminAdapter for TenantAdmin {
    fn entity(&self) -> EntityKind {
        TENANTS
    }

    fn route_prefix(&self) -> &'static str {
        "tenants"
    }

    fn controller(&self) -> &'static str {
        "TenantAdminController"
    }

    fn title(&self) -> &str {
        "Tenant"
    }

    fn form(&self) -> Arc<dyn FormDefinition> {
        Arc::new(TenantForm)
    }

    fn service(
        &self,
        engine: Arc<dyn StorageEngine>,
        repositories: &RepositoryManager,
    ) -> Result<Arc<dyn AdminService>, AdminError> {
        Ok(Arc::new(TenantService::new(engine, repositories)?))
    }

    fn list_view_config(&self, context: &ProjectContext) -> ListViewConfig {
        ListViewConfig::new()
            .columns(vec![
                ("id", ColumnDef::new("ID").sortable()),
                ("name", ColumnDef::new("Nombre").sortable().searchable()),
                ("email", "Correo Electrónico".into()),
                ("status", ColumnDef::new("Estado").format(ColumnFormat::Badge)),
                (
                    "created_at",
                    ColumnDef::new("Fecha de Creación").format(ColumnFormat::Date),
                ),
            ])
            .add_stat_card(
                "Total",
                json!(0),
                StatCardDef::new()
                    .icon("bi-buildings")
                    .resolver(|page| json!(page.total)),
            )
            .add_stat_card(
                "Activos",
                json!(0),
                StatCardDef::new()
                    .icon("bi-check-circle")
                    .color("success")
                    .resolver(|page| json!(page.count_where("status", &json!("active")))),
            )
            .add_stat_card(
                "Pendientes",
                json!(0),
                StatCardDef::new()
                    .icon("bi-hourglass-split")
                    .color("warning")
                    .resolver(|page| json!(page.count_where("status", &json!("pending")))),
            )
            .add_action(
                "Editar",
                &self.url_name(context, "edit"),
                ActionDef::new()
                    .icon("bi-pencil")
                    .class("btn btn-sm btn-outline-primary")
                    .param_field("id", "id"),
            )
            .add_action(
                "Eliminar",
                &self.url_name(context, "delete"),
                ActionDef::new()
                    .kind(ActionKind::Button)
                    .icon("bi-trash")
                    .class("btn btn-sm btn-outline-danger")
                    .confirm("¿Eliminar este tenant y todos sus datos relacionados?")
                    .param_field("id", "id"),
            )
            .per_page(15)
            .empty_message("No hay tenants registrados")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn list_config_is_valid_and_ordered() {
        let context = ProjectContext::new("landlord", "Landlord");
        let config = TenantAdmin.list_view_config(&context);
        config.validate().unwrap();
        let keys: Vec<&str> = config.get_columns().iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["id", "name", "email", "status", "created_at"]);
        assert_eq!(config.get_per_page(), 15);
        assert_eq!(config.get_actions()[0].route, "landlord.admin.tenants.edit");
        assert!(config.get_actions()[1].confirm);
    }
}
