//! List view configuration: columns, row actions and stat cards.

use crate::error::ConfigError;
use crate::routing::RouteTable;
use crate::storage::Page;
use serde_json::{json, Value};
use std::sync::Arc;

/// Custom cell formatter, evaluated against the raw cell value.
pub type Formatter = Arc<dyn Fn(&Value) -> String + Send + Sync>;

/// Stat-card value resolver, evaluated against the paginated result set.
pub type ValueResolver = Arc<dyn Fn(&Page) -> Value + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnFormat {
    Date,
    Datetime,
    Currency,
    Boolean,
    Badge,
}

#[derive(Clone)]
pub struct ListColumn {
    pub key: String,
    pub label: String,
    pub sortable: bool,
    pub searchable: bool,
    pub format: Option<ColumnFormat>,
    pub formatter: Option<Formatter>,
    pub class: Option<String>,
    pub header_class: Option<String>,
    pub visible: bool,
}

impl ListColumn {
    fn new(key: &str, def: ColumnDef) -> Self {
        ListColumn {
            key: key.to_string(),
            label: def.label,
            sortable: def.sortable,
            searchable: def.searchable,
            format: def.format,
            formatter: def.formatter,
            class: def.class,
            header_class: def.header_class,
            visible: def.visible,
        }
    }

    /// Display value for one cell. Custom formatter wins over format kind.
    pub fn format_value(&self, value: Option<&Value>) -> String {
        if let Some(f) = &self.formatter {
            return f(value.unwrap_or(&Value::Null));
        }
        let Some(value) = value.filter(|v| !v.is_null()) else {
            return "-".to_string();
        };
        match self.format {
            Some(ColumnFormat::Date) => format_timestamp(value, "%d/%m/%Y"),
            Some(ColumnFormat::Datetime) => format_timestamp(value, "%d/%m/%Y %H:%M"),
            Some(ColumnFormat::Currency) => match value.as_f64() {
                Some(n) => format!("${:.2}", n),
                None => display(value),
            },
            Some(ColumnFormat::Boolean) => {
                if value.as_bool().unwrap_or(false) {
                    "Sí".to_string()
                } else {
                    "No".to_string()
                }
            }
            Some(ColumnFormat::Badge) => badge_label(value),
            None => display(value),
        }
    }

    pub fn serialized(&self) -> Value {
        json!({
            "key": self.key,
            "label": self.label,
            "sortable": self.sortable,
            "searchable": self.searchable,
            "class": self.class,
            "header_class": self.header_class,
            "visible": self.visible,
        })
    }
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn format_timestamp(value: &Value, pattern: &str) -> String {
    let Some(s) = value.as_str() else {
        return display(value);
    };
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return dt.format(pattern).to_string();
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format(pattern).to_string();
    }
    if let Ok(d) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.format(pattern).to_string();
    }
    s.to_string()
}

fn badge_label(value: &Value) -> String {
    match value.as_str() {
        Some("active") => "Activo".to_string(),
        Some("inactive") => "Inactivo".to_string(),
        Some("pending") => "Pendiente".to_string(),
        Some("completed") => "Completado".to_string(),
        _ => display(value),
    }
}

/// Column options; `From<&str>` gives the label-only shorthand.
#[derive(Clone, Default)]
pub struct ColumnDef {
    pub label: String,
    pub sortable: bool,
    pub searchable: bool,
    pub format: Option<ColumnFormat>,
    pub formatter: Option<Formatter>,
    pub class: Option<String>,
    pub header_class: Option<String>,
    pub visible: bool,
}

impl ColumnDef {
    pub fn new(label: &str) -> Self {
        ColumnDef {
            label: label.to_string(),
            visible: true,
            ..Default::default()
        }
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn searchable(mut self) -> Self {
        self.searchable = true;
        self
    }

    pub fn format(mut self, format: ColumnFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn formatter<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> String + Send + Sync + 'static,
    {
        self.formatter = Some(Arc::new(f));
        self
    }

    pub fn class(mut self, class: &str) -> Self {
        self.class = Some(class.to_string());
        self
    }

    pub fn header_class(mut self, class: &str) -> Self {
        self.header_class = Some(class.to_string());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

impl From<&str> for ColumnDef {
    fn from(label: &str) -> Self {
        ColumnDef::new(label)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    #[default]
    Link,
    Button,
    Form,
}

/// Route-parameter source for a row action: a field of the item, or a
/// computed accessor.
#[derive(Clone)]
pub enum ParamSource {
    Field(String),
    Computed(Arc<dyn Fn(&Value) -> String + Send + Sync>),
}

#[derive(Clone)]
pub struct ListAction {
    pub label: String,
    pub route: String,
    pub kind: ActionKind,
    pub icon: String,
    pub class: String,
    pub confirm: bool,
    pub confirm_message: String,
    pub route_params: Vec<(String, ParamSource)>,
}

/// Action options, consumed by [`ListViewConfig::add_action`].
#[derive(Clone, Default)]
pub struct ActionDef {
    pub kind: ActionKind,
    pub icon: String,
    pub class: Option<String>,
    pub confirm: bool,
    pub confirm_message: Option<String>,
    pub route_params: Vec<(String, ParamSource)>,
}

impl ActionDef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: ActionKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn icon(mut self, icon: &str) -> Self {
        self.icon = icon.to_string();
        self
    }

    pub fn class(mut self, class: &str) -> Self {
        self.class = Some(class.to_string());
        self
    }

    pub fn confirm(mut self, message: &str) -> Self {
        self.confirm = true;
        self.confirm_message = Some(message.to_string());
        self
    }

    pub fn param_field(mut self, param: &str, field: &str) -> Self {
        self.route_params
            .push((param.to_string(), ParamSource::Field(field.to_string())));
        self
    }

    pub fn param_computed<F>(mut self, param: &str, accessor: F) -> Self
    where
        F: Fn(&Value) -> String + Send + Sync + 'static,
    {
        self.route_params
            .push((param.to_string(), ParamSource::Computed(Arc::new(accessor))));
        self
    }
}

impl ListAction {
    /// Resolves the action URL for one listed item.
    pub fn url(&self, routes: &RouteTable, item: &Value) -> Result<String, crate::error::AdminError> {
        let params: Vec<(&str, String)> = self
            .route_params
            .iter()
            .map(|(key, source)| {
                let value = match source {
                    ParamSource::Field(field) => item
                        .get(field)
                        .map(|v| match v {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                        .unwrap_or_default(),
                    ParamSource::Computed(f) => f(item),
                };
                (key.as_str(), value)
            })
            .collect();
        routes.url(&self.route, &params)
    }

    pub fn serialized(&self, routes: &RouteTable, item: &Value) -> Value {
        json!({
            "label": self.label,
            "type": self.kind,
            "icon": self.icon,
            "class": self.class,
            "confirm": self.confirm,
            "confirm_message": if self.confirm { Some(&self.confirm_message) } else { None },
            "url": self.url(routes, item).ok(),
        })
    }
}

#[derive(Clone)]
pub struct StatCard {
    pub title: String,
    pub value: Value,
    pub icon: String,
    pub color: String,
    pub resolver: Option<ValueResolver>,
}

/// Stat-card options.
#[derive(Clone, Default)]
pub struct StatCardDef {
    pub icon: Option<String>,
    pub color: Option<String>,
    pub resolver: Option<ValueResolver>,
}

impl StatCardDef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn icon(mut self, icon: &str) -> Self {
        self.icon = Some(icon.to_string());
        self
    }

    pub fn color(mut self, color: &str) -> Self {
        self.color = Some(color.to_string());
        self
    }

    pub fn resolver<F>(mut self, f: F) -> Self
    where
        F: Fn(&Page) -> Value + Send + Sync + 'static,
    {
        self.resolver = Some(Arc::new(f));
        self
    }
}

impl StatCard {
    /// Resolver wins when a result set is supplied; the static value is the
    /// fallback.
    pub fn resolve(&self, items: Option<&Page>) -> Value {
        match (&self.resolver, items) {
            (Some(f), Some(page)) => f(page),
            _ => self.value.clone(),
        }
    }

    pub fn serialized(&self, items: Option<&Page>) -> Value {
        json!({
            "title": self.title,
            "value": self.resolve(items),
            "icon": self.icon,
            "color": self.color,
        })
    }
}

pub struct ListViewConfig {
    columns: Vec<ListColumn>,
    actions: Vec<ListAction>,
    stat_cards: Vec<StatCard>,
    per_page: u32,
    empty_message: String,
}

impl Default for ListViewConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ListViewConfig {
    pub fn new() -> Self {
        ListViewConfig {
            columns: Vec::new(),
            actions: Vec::new(),
            stat_cards: Vec::new(),
            per_page: 15,
            empty_message: "No hay registros para mostrar".to_string(),
        }
    }

    pub fn add_column(mut self, key: &str, def: impl Into<ColumnDef>) -> Self {
        self.columns.push(ListColumn::new(key, def.into()));
        self
    }

    /// Adds columns in input order. String shorthand declares label only.
    pub fn columns(mut self, columns: Vec<(&str, ColumnDef)>) -> Self {
        for (key, def) in columns {
            self = self.add_column(key, def);
        }
        self
    }

    pub fn add_action(mut self, label: &str, route: &str, def: ActionDef) -> Self {
        self.actions.push(ListAction {
            label: label.to_string(),
            route: route.to_string(),
            kind: def.kind,
            icon: def.icon,
            class: def.class.unwrap_or_else(|| "btn btn-sm btn-primary".to_string()),
            confirm: def.confirm,
            confirm_message: def
                .confirm_message
                .unwrap_or_else(|| "¿Está seguro?".to_string()),
            route_params: def.route_params,
        });
        self
    }

    pub fn add_stat_card(mut self, title: &str, value: Value, def: StatCardDef) -> Self {
        self.stat_cards.push(StatCard {
            title: title.to_string(),
            value,
            icon: def.icon.unwrap_or_else(|| "bi-info-circle".to_string()),
            color: def.color.unwrap_or_else(|| "primary".to_string()),
            resolver: def.resolver,
        });
        self
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    pub fn empty_message(mut self, message: &str) -> Self {
        self.empty_message = message.to_string();
        self
    }

    pub fn get_columns(&self) -> &[ListColumn] {
        &self.columns
    }

    pub fn get_actions(&self) -> &[ListAction] {
        &self.actions
    }

    pub fn get_stat_cards(&self) -> &[StatCard] {
        &self.stat_cards
    }

    pub fn has_stat_cards(&self) -> bool {
        !self.stat_cards.is_empty()
    }

    pub fn get_per_page(&self) -> u32 {
        self.per_page
    }

    pub fn get_empty_message(&self) -> &str {
        &self.empty_message
    }

    /// Invariants checked at first use: unique column keys, positive page
    /// size. Violations are configuration errors, not render-time surprises.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = std::collections::HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.key.as_str()) {
                return Err(ConfigError::DuplicateColumnKey(column.key.clone()));
            }
        }
        if self.per_page == 0 {
            return Err(ConfigError::InvalidPerPage);
        }
        Ok(())
    }
}
