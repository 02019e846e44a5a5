//! Router assembly.

use crate::handlers::admin;
use crate::state::AppState;
use axum::{
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::limit::RequestBodyLimitLayer;

const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
}

async fn health() -> Json<HealthBody> {
    Json(HealthBody { status: "ok" })
}

async fn version() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Common routes (no state): GET /health, GET /version.
pub fn common_routes() -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
}

/// Admin routes. Path parameters carry the project and entity prefixes; the
/// handlers resolve adapters from them, so one route set serves every
/// registered project.
pub fn admin_routes(state: AppState) -> Router {
    Router::new()
        .route("/:project/admin/:entity/list", get(admin::list))
        .route(
            "/:project/admin/:entity/create",
            get(admin::create_form).post(admin::create),
        )
        .route(
            "/:project/admin/:entity/edit/:id",
            get(admin::edit_form).put(admin::update),
        )
        .route(
            "/:project/admin/:entity/delete/:id",
            get(admin::delete_confirm).delete(admin::destroy),
        )
        .route("/routes", get(admin::route_index))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}

pub fn app_router(state: AppState) -> Router {
    common_routes().merge(admin_routes(state))
}
