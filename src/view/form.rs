//! Fluent form construction: an ordered, typed list of field descriptors.

use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Email,
    Password,
    Textarea,
    Select,
    Checkbox,
    Date,
    Number,
    Hidden,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum FormMethod {
    #[serde(rename = "GET")]
    Get,
    #[default]
    #[serde(rename = "POST")]
    Post,
    #[serde(rename = "PUT")]
    Put,
    #[serde(rename = "PATCH")]
    Patch,
    #[serde(rename = "DELETE")]
    Delete,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct FieldOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    /// Textarea rows.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<u32>,
    /// Checkbox initial state.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub checked: bool,
}

impl FieldOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn placeholder(mut self, text: &str) -> Self {
        self.placeholder = Some(text.to_string());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn rows(mut self, rows: u32) -> Self {
        self.rows = Some(rows);
        self
    }

    pub fn checked(mut self) -> Self {
        self.checked = true;
        self
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct FormField {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub name: String,
    pub label: String,
    pub options: FieldOptions,
    /// Ordered value → label pairs; select fields only.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<(String, String)>,
    /// Hidden fields only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// Accumulates fields through chained calls. Duplicate field names are not
/// rejected; both entries remain in order.
#[derive(Clone, Debug, Default, Serialize)]
pub struct FormBuilder {
    fields: Vec<FormField>,
    method: FormMethod,
    action: String,
    attributes: Vec<(String, String)>,
}

impl FormBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: FormMethod) -> Self {
        self.method = method;
        self
    }

    pub fn action(mut self, action: &str) -> Self {
        self.action = action.to_string();
        self
    }

    pub fn attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.push((name.to_string(), value.to_string()));
        self
    }

    fn push(mut self, field_type: FieldType, name: &str, label: &str, options: FieldOptions) -> Self {
        self.fields.push(FormField {
            field_type,
            name: name.to_string(),
            label: label.to_string(),
            options,
            choices: Vec::new(),
            value: None,
        });
        self
    }

    pub fn text(self, name: &str, label: &str, options: FieldOptions) -> Self {
        self.push(FieldType::Text, name, label, options)
    }

    pub fn email(self, name: &str, label: &str, options: FieldOptions) -> Self {
        self.push(FieldType::Email, name, label, options)
    }

    pub fn password(self, name: &str, label: &str, options: FieldOptions) -> Self {
        self.push(FieldType::Password, name, label, options)
    }

    pub fn textarea(self, name: &str, label: &str, options: FieldOptions) -> Self {
        self.push(FieldType::Textarea, name, label, options)
    }

    pub fn select(
        mut self,
        name: &str,
        label: &str,
        choices: &[(&str, &str)],
        options: FieldOptions,
    ) -> Self {
        self.fields.push(FormField {
            field_type: FieldType::Select,
            name: name.to_string(),
            label: label.to_string(),
            options,
            choices: choices
                .iter()
                .map(|(v, l)| (v.to_string(), l.to_string()))
                .collect(),
            value: None,
        });
        self
    }

    pub fn checkbox(self, name: &str, label: &str, options: FieldOptions) -> Self {
        self.push(FieldType::Checkbox, name, label, options)
    }

    pub fn date(self, name: &str, label: &str, options: FieldOptions) -> Self {
        self.push(FieldType::Date, name, label, options)
    }

    pub fn number(self, name: &str, label: &str, options: FieldOptions) -> Self {
        self.push(FieldType::Number, name, label, options)
    }

    pub fn hidden(mut self, name: &str, value: Value) -> Self {
        self.fields.push(FormField {
            field_type: FieldType::Hidden,
            name: name.to_string(),
            label: String::new(),
            options: FieldOptions::default(),
            choices: Vec::new(),
            value: Some(value),
        });
        self
    }

    pub fn get_fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn get_method(&self) -> FormMethod {
        self.method
    }

    pub fn get_action(&self) -> &str {
        &self.action
    }

    /// Serialized hand-off to the rendering layer.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Form-building context: which variant of an entity form is requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormContext {
    Create,
    Edit,
}

/// One implementation per entity; the adapter's bound form request.
pub trait FormDefinition: Send + Sync {
    fn build_create_form(&self) -> FormBuilder;

    fn build_edit_form(&self) -> FormBuilder;

    fn form(&self, context: FormContext) -> FormBuilder {
        match context {
            FormContext::Create => self.build_create_form(),
            FormContext::Edit => self.build_edit_form(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn chained_fields_keep_declaration_order() {
        let form = FormBuilder::new()
            .text("name", "Name", FieldOptions::new())
            .email("email", "Email", FieldOptions::new())
            .select("role", "Role", &[("admin", "Admin")], FieldOptions::new());
        let types: Vec<FieldType> = form.get_fields().iter().map(|f| f.field_type).collect();
        assert_eq!(
            types,
            vec![FieldType::Text, FieldType::Email, FieldType::Select]
        );
        assert_eq!(form.get_fields()[2].choices, vec![("admin".to_string(), "Admin".to_string())]);
    }

    #[test]
    fn duplicate_names_are_both_kept() {
        let form = FormBuilder::new()
            .text("name", "First", FieldOptions::new())
            .text("name", "Second", FieldOptions::new());
        assert_eq!(form.get_fields().len(), 2);
    }

    #[test]
    fn serializes_method_and_fields() {
        let form = FormBuilder::new()
            .method(FormMethod::Put)
            .action("/landlord/admin/tenants/edit/1")
            .text("name", "Nombre", FieldOptions::new().required())
            .hidden("id", json!(1));
        let v = form.to_value();
        assert_eq!(v["method"], json!("PUT"));
        assert_eq!(v["fields"][0]["type"], json!("text"));
        assert_eq!(v["fields"][0]["options"]["required"], json!(true));
        assert_eq!(v["fields"][1]["value"], json!(1));
    }
}
