use axum::Router;
use sqlx::SqlitePool;

/// Shared state available to all handlers via Axum's state extractor.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: config::Config,
}

/// All API routes. Every one of them requires an authenticated session.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(features::users::routes())
        .merge(features::organizations::routes())
        .merge(features::aggregates::routes())
        .merge(features::activities::routes())
        .merge(features::social::routes())
        .merge(features::analysis::routes())
}

pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod features;
pub mod scope;
pub mod session;
