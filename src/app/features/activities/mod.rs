pub mod add_participant;
pub mod complete;
pub mod create;
pub mod detail;
pub mod list;
pub mod participants;
pub mod types;

use axum::Router;

use crate::app::AppState;

/// Activity (event) and participant routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(list::routes())
        .merge(create::routes())
        .merge(participants::routes())
        .merge(detail::routes())
        .merge(add_participant::routes())
        .merge(complete::routes())
}
