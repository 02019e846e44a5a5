//! One resolved (verb, path) → (controller, method) routing entry.

use serde::Serialize;

/// Immutable route-table entry, built once at boot. `path` is a template
/// with `{param}` placeholders and no leading or trailing slash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Endpoint {
    pub path: String,
    pub controller: &'static str,
    pub method: &'static str,
    /// Never empty. The processor emits one endpoint per declared verb, so
    /// entries sharing a name differ only here.
    pub http_methods: Vec<&'static str>,
    pub name: Option<String>,
    pub middleware: Vec<String>,
    #[serde(rename = "where")]
    pub where_: Vec<(String, String)>,
}

impl Endpoint {
    pub fn primary_http_method(&self) -> String {
        self.http_methods
            .first()
            .unwrap_or(&"GET")
            .to_lowercase()
    }

    pub fn supports_http_method(&self, method: &str) -> bool {
        self.http_methods
            .iter()
            .any(|m| m.eq_ignore_ascii_case(method))
    }

    /// Dispatch target in `Controller::method` form.
    pub fn action(&self) -> String {
        format!("{}::{}", self.controller, self.method)
    }
}
