//! Admin CRUD handlers: list, create, edit, delete plus the route index.
//! Every URL in a payload goes through the route table, never through
//! string concatenation at the call site.

use crate::admin::{AdminAdapter, AdminService};
use crate::error::AdminError;
use crate::project::Project;
use crate::response::{success_many, success_one_ok, success_with_redirect};
use crate::state::AppState;
use crate::view::FormMethod;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

fn body_to_map(value: Value) -> Result<Map<String, Value>, AdminError> {
    match value {
        Value::Object(m) => Ok(m),
        _ => Err(AdminError::BadRequest("body must be a JSON object".into())),
    }
}

fn resolve(
    state: &AppState,
    project: &str,
    entity: &str,
) -> Result<(Arc<Project>, Arc<dyn AdminAdapter>), AdminError> {
    let project = state.projects.get(project)?;
    let adapter = project.admin_by_prefix(entity)?;
    Ok((project, adapter))
}

fn service_for(
    state: &AppState,
    adapter: &Arc<dyn AdminAdapter>,
) -> Result<Arc<dyn AdminService>, AdminError> {
    adapter.service(state.engine.clone(), &state.repositories)
}

pub async fn list(
    State(state): State<AppState>,
    Path((project, entity)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AdminError> {
    let (project, adapter) = resolve(&state, &project, &entity)?;
    let context = project.context();
    let config = adapter.list_view_config(context);
    config.validate()?;

    let page_number: u32 = params
        .get("page")
        .and_then(|p| p.parse().ok())
        .unwrap_or(1)
        .max(1);
    let repository = adapter.repository(&state.repositories)?;
    let page = repository.paginate(config.get_per_page(), page_number).await?;

    let columns: Vec<Value> = config.get_columns().iter().map(|c| c.serialized()).collect();
    let rows: Vec<Value> = page
        .items
        .iter()
        .map(|item| {
            let cells: Map<String, Value> = config
                .get_columns()
                .iter()
                .filter(|c| c.visible)
                .map(|c| (c.key.clone(), json!(c.format_value(item.get(&c.key)))))
                .collect();
            let actions: Vec<Value> = config
                .get_actions()
                .iter()
                .map(|a| a.serialized(&state.routes, item))
                .collect();
            json!({ "item": item, "cells": cells, "actions": actions })
        })
        .collect();
    let stats: Vec<Value> = config
        .get_stat_cards()
        .iter()
        .map(|card| card.serialized(Some(&page)))
        .collect();

    Ok(success_one_ok(json!({
        "title": adapter.title(),
        "columns": columns,
        "rows": rows,
        "stats": stats,
        "pagination": {
            "total": page.total,
            "per_page": page.per_page,
            "current_page": page.current_page,
            "last_page": page.last_page(),
        },
        "empty_message": config.get_empty_message(),
    })))
}

pub async fn create_form(
    State(state): State<AppState>,
    Path((project, entity)): Path<(String, String)>,
) -> Result<impl IntoResponse, AdminError> {
    let (project, adapter) = resolve(&state, &project, &entity)?;
    let action = adapter.url(&state.routes, project.context(), "create", &[])?;
    let mut config = adapter.create_view_config();
    config.form = config.form.action(&action).method(FormMethod::Post);
    Ok(success_one_ok(config.to_value()))
}

pub async fn create(
    State(state): State<AppState>,
    Path((project, entity)): Path<(String, String)>,
    axum::Json(body): axum::Json<Value>,
) -> Result<impl IntoResponse, AdminError> {
    let (project, adapter) = resolve(&state, &project, &entity)?;
    let attributes = body_to_map(body)?;
    let created = service_for(&state, &adapter)?.create(attributes).await?;
    let redirect = adapter.url(&state.routes, project.context(), "list", &[])?;
    Ok(success_with_redirect(
        created,
        "Creado correctamente",
        &redirect,
    ))
}

pub async fn edit_form(
    State(state): State<AppState>,
    Path((project, entity, id)): Path<(String, String, i64)>,
) -> Result<impl IntoResponse, AdminError> {
    let (project, adapter) = resolve(&state, &project, &entity)?;
    let item = adapter
        .repository(&state.repositories)?
        .find_or_fail(id)
        .await?;
    let action = adapter.url(
        &state.routes,
        project.context(),
        "edit",
        &[("id", id.to_string())],
    )?;
    let mut config = adapter.edit_view_config(item);
    config.form = config.form.action(&action).method(FormMethod::Put);
    Ok(success_one_ok(config.to_value()))
}

pub async fn update(
    State(state): State<AppState>,
    Path((project, entity, id)): Path<(String, String, i64)>,
    axum::Json(body): axum::Json<Value>,
) -> Result<impl IntoResponse, AdminError> {
    let (project, adapter) = resolve(&state, &project, &entity)?;
    let attributes = body_to_map(body)?;
    service_for(&state, &adapter)?.update(id, attributes).await?;
    let redirect = adapter.url(&state.routes, project.context(), "list", &[])?;
    Ok(success_with_redirect(
        json!({ "id": id }),
        "Actualizado correctamente",
        &redirect,
    ))
}

pub async fn delete_confirm(
    State(state): State<AppState>,
    Path((project, entity, id)): Path<(String, String, i64)>,
) -> Result<impl IntoResponse, AdminError> {
    let (_, adapter) = resolve(&state, &project, &entity)?;
    let item = adapter
        .repository(&state.repositories)?
        .find_or_fail(id)
        .await?;
    Ok(success_one_ok(adapter.delete_view_config(item).to_value()))
}

pub async fn destroy(
    State(state): State<AppState>,
    Path((project, entity, id)): Path<(String, String, i64)>,
) -> Result<impl IntoResponse, AdminError> {
    let (project, adapter) = resolve(&state, &project, &entity)?;
    service_for(&state, &adapter)?.delete(id).await?;
    let redirect = adapter.url(&state.routes, project.context(), "list", &[])?;
    Ok(success_with_redirect(
        json!({ "id": id }),
        "Eliminado correctamente",
        &redirect,
    ))
}

/// Flat listing of every derived endpoint.
pub async fn route_index(State(state): State<AppState>) -> impl IntoResponse {
    success_many(state.routes.endpoints().to_vec())
}
