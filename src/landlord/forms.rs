//! Form definitions for the landlord entities.

use crate::view::{FieldOptions, FormBuilder, FormDefinition};

const TENANT_STATUSES: &[(&str, &str)] = &[
    ("active", "Activo"),
    ("inactive", "Inactivo"),
    ("pending", "Pendiente"),
];

const USER_ROLES: &[(&str, &str)] = &[("admin", "Administrador"), ("user", "Usuario")];

pub struct TenantForm;

impl FormDefinition for TenantForm {
    fn build_create_form(&self) -> FormBuilder {
        FormBuilder::new()
            .text(
                "name",
                "Nombre",
                FieldOptions::new()
                    .required()
                    .placeholder("Nombre del tenant"),
            )
            .email("email", "Correo Electrónico", FieldOptions::new().required())
            .select("status", "Estado", TENANT_STATUSES, FieldOptions::new().required())
            .textarea("description", "Descripción", FieldOptions::new().rows(4))
            .date("start_date", "Fecha de Inicio", FieldOptions::new())
    }

    fn build_edit_form(&self) -> FormBuilder {
        self.build_create_form()
    }
}

pub struct UserForm;

impl FormDefinition for UserForm {
    fn build_create_form(&self) -> FormBuilder {
        FormBuilder::new()
            .text("name", "Nombre", FieldOptions::new().required())
            .email("email", "Correo Electrónico", FieldOptions::new().required())
            .password("password", "Contraseña", FieldOptions::new().required())
            .select("role", "Rol", USER_ROLES, FieldOptions::new().required())
            .checkbox("is_active", "Activo", FieldOptions::new().checked())
    }

    // Password is optional on edit; blank means keep the current hash.
    fn build_edit_form(&self) -> FormBuilder {
        FormBuilder::new()
            .text("name", "Nombre", FieldOptions::new().required())
            .email("email", "Correo Electrónico", FieldOptions::new().required())
            .password(
                "password",
                "Contraseña",
                FieldOptions::new().placeholder("Dejar en blanco para mantener"),
            )
            .select("role", "Rol", USER_ROLES, FieldOptions::new().required())
            .checkbox("is_active", "Activo", FieldOptions::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{FieldType, FormContext};
    use pretty_assertions::assert_eq;

    #[test]
    fn tenant_form_declares_the_expected_fields() {
        let form = TenantForm.form(FormContext::Create);
        let names: Vec<&str> = form.get_fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["name", "email", "status", "description", "start_date"]);
        assert_eq!(form.get_fields()[2].choices.len(), 3);
    }

    #[test]
    fn user_edit_form_makes_password_optional() {
        let create = UserForm.form(FormContext::Create);
        let edit = UserForm.form(FormContext::Edit);
        let password = |form: &crate::view::FormBuilder| {
            form.get_fields()
                .iter()
                .find(|f| f.field_type == FieldType::Password)
                .unwrap()
                .options
                .required
        };
        assert!(password(&create));
        assert!(!password(&edit));
    }
}
