//! View configuration objects handed to the rendering collaborator.

pub mod config;
pub mod form;
pub mod list;

pub use config::{CreateViewConfig, DeleteViewConfig, EditViewConfig};
pub use form::{FieldOptions, FieldType, FormBuilder, FormContext, FormDefinition, FormMethod};
pub use list::{
    ActionDef, ActionKind, ColumnDef, ColumnFormat, ListAction, ListColumn, ListViewConfig,
    ParamSource, StatCard, StatCardDef,
};
