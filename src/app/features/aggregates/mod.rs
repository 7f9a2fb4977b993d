pub mod by_indicator;
pub mod create;
pub mod detail;
pub mod list;

use axum::Router;

use crate::app::AppState;

/// Aggregate routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(list::routes())
        .merge(create::routes())
        .merge(by_indicator::routes())
        .merge(detail::routes())
}
