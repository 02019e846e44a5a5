//! Demo server: mounts the landlord project over Postgres.

use backoffice_sdk::{
    app_router, apply_migrations,
    landlord::{landlord_project, register_repositories},
    AppState, PgEngine, ProjectRegistry, RepositoryManager,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("backoffice_sdk=info".parse()?),
        )
        .init();

    let engine = Arc::new(PgEngine::from_env().await?);
    apply_migrations(engine.pool()).await?;

    let mut repositories = RepositoryManager::new();
    register_repositories(&mut repositories, engine.clone());

    let mut projects = ProjectRegistry::new();
    projects.register(landlord_project());

    let state = AppState::new(engine, repositories, projects);
    let app = app_router(state);

    let listener = TcpListener::bind("0.0.0.0:3000").await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
