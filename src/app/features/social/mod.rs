pub mod referrals;
pub mod services;
pub mod transitions;

use axum::Router;

use crate::app::AppState;

/// Social service and referral routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(services::routes())
        .merge(referrals::routes())
        .merge(transitions::routes())
}
