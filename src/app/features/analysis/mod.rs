pub mod dashboard;
pub mod download;
pub mod generate;
pub mod reports;
pub mod saved_queries;
pub mod types;

use axum::Router;

use crate::app::AppState;

/// Report, saved query and dashboard routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(reports::routes())
        .merge(generate::routes())
        .merge(download::routes())
        .merge(saved_queries::routes())
        .merge(dashboard::routes())
}
