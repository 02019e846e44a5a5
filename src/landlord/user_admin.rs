//! Admin adapter for users.

use crate::admin::{AdminAdapter, AdminService};
use crate::error::AdminError;
use crate::landlord::forms::UserForm;
use crate::landlord::user_service::UserService;
use crate::landlord::USERS;
use crate::project::ProjectContext;
use crate::repository::{EntityKind, RepositoryManager};
use crate::storage::StorageEngine;
use crate::view::{
    ActionDef, ActionKind, ColumnDef, ColumnFormat, FormDefinition, ListViewConfig, StatCardDef,
};
use serde_json::{json, Value};
use std::sync::Arc;

pub struct UserAdmin;

impl AdminAdapter for UserAdmin {
    fn entity(&self) -> EntityKind {
        USERS
    }

    fn route_prefix(&self) -> &'static str {
        "users"
    }

    fn controller(&self) -> &'static str {
        "UserAdminController"
    }

    fn title(&self) -> &str {
        "Usuario"
    }

    fn form(&self) -> Arc<dyn FormDefinition> {
        Arc::new(UserForm)
    }

    fn service(
        &self,
        engine: Arc<dyn StorageEngine>,
        repositories: &RepositoryManager,
    ) -> Result<Arc<dyn AdminService>, AdminError> {
        Ok(Arc::new(UserService::new(engine, repositories)?))
    }

    fn list_view_config(&self, context: &ProjectContext) -> ListViewConfig {
        ListViewConfig::new()
            .columns(vec![
                ("id", ColumnDef::new("ID").sortable()),
                ("name", ColumnDef::new("Nombre").sortable().searchable()),
                ("email", ColumnDef::new("Correo Electrónico").searchable()),
                (
                    "role",
                    ColumnDef::new("Rol").formatter(|value: &Value| match value.as_str() {
                        Some("admin") => "Administrador".to_string(),
                        Some("user") => "Usuario".to_string(),
                        Some(other) => other.to_string(),
                        None => "-".to_string(),
                    }),
                ),
                ("is_active", ColumnDef::new("Activo").format(ColumnFormat::Boolean)),
            ])
            .add_stat_card(
                "Total",
                json!(0),
                StatCardDef::new()
                    .icon("bi-people")
                    .resolver(|page| json!(page.total)),
            )
            .add_stat_card(
                "Administradores",
                json!(0),
                StatCardDef::new()
                    .icon("bi-shield-check")
                    .color("info")
                    .resolver(|page| json!(page.count_where("role", &json!("admin")))),
            )
            .add_stat_card(
                "Inactivos",
                json!(0),
                StatCardDef::new()
                    .icon("bi-person-dash")
                    .color("secondary")
                    .resolver(|page| json!(page.count_where("is_active", &json!(false)))),
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
                    .confirm("¿Eliminar este usuario?")
                    .param_field("id", "id"),
            )
            .per_page(20)
            .empty_message("No hay usuarios registrados")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn list_config_uses_the_custom_role_formatter() {
        let context = ProjectContext::new("landlord", "Landlord");
        let config = UserAdmin.list_view_config(&context);
        config.validate().unwrap();
        let role = &config.get_columns()[3];
        assert_eq!(role.format_value(Some(&json!("admin"))), "Administrador");
        assert_eq!(config.get_per_page(), 20);
    }
}
