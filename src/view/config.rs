//! Per-action view configuration: the create form, the edit form bound to an
//! item, and the delete confirmation.

use crate::view::form::FormBuilder;
use serde_json::{json, Value};

pub struct CreateViewConfig {
    pub form: FormBuilder,
    pub title: String,
    pub submit_label: String,
}

impl CreateViewConfig {
    pub fn new(form: FormBuilder) -> Self {
        CreateViewConfig {
            form,
            title: "Crear Nuevo".to_string(),
            submit_label: "Guardar".to_string(),
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn submit_label(mut self, label: &str) -> Self {
        self.submit_label = label.to_string();
        self
    }

    pub fn to_value(&self) -> Value {
        json!({
            "title": self.title,
            "submit_label": self.submit_label,
            "form": self.form.to_value(),
        })
    }
}

/// Edit form plus the item being edited, so the renderer can pre-fill fields.
pub struct EditViewConfig {
    pub form: FormBuilder,
    pub title: String,
    pub submit_label: String,
    pub item: Value,
}

impl EditViewConfig {
    pub fn new(form: FormBuilder, item: Value) -> Self {
        EditViewConfig {
            form,
            title: "Editar".to_string(),
            submit_label: "Actualizar".to_string(),
            item,
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn submit_label(mut self, label: &str) -> Self {
        self.submit_label = label.to_string();
        self
    }

    pub fn to_value(&self) -> Value {
        json!({
            "title": self.title,
            "submit_label": self.submit_label,
            "form": self.form.to_value(),
            "item": self.item,
        })
    }
}

/// Delete confirmation. `display_fields` names the item fields shown so the
/// operator can verify the target before confirming.
pub struct DeleteViewConfig {
    pub title: String,
    pub message: String,
    pub submit_label: String,
    pub cancel_label: String,
    pub item: Value,
    pub display_fields: Vec<String>,
}

impl DeleteViewConfig {
    pub fn new(item: Value) -> Self {
        DeleteViewConfig {
            title: "Confirmar Eliminación".to_string(),
            message: "¿Está seguro de que desea eliminar este registro?".to_string(),
            submit_label: "Eliminar".to_string(),
            cancel_label: "Cancelar".to_string(),
            item,
            display_fields: Vec::new(),
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn message(mut self, message: &str) -> Self {
        self.message = message.to_string();
        self
    }

    pub fn submit_label(mut self, label: &str) -> Self {
        self.submit_label = label.to_string();
        self
    }

    pub fn cancel_label(mut self, label: &str) -> Self {
        self.cancel_label = label.to_string();
        self
    }

    pub fn display_fields(mut self, fields: &[&str]) -> Self {
        self.display_fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn to_value(&self) -> Value {
        let shown: Value = match &self.item {
            Value::Object(map) if !self.display_fields.is_empty() => Value::Object(
                self.display_fields
                    .iter()
                    .filter_map(|f| map.get(f).map(|v| (f.clone(), v.clone())))
                    .collect(),
            ),
            other => other.clone(),
        };
        json!({
            "title": self.title,
            "message": self.message,
            "submit_label": self.submit_label,
            "cancel_label": self.cancel_label,
            "item": shown,
        })
    }
}
