use axum::{routing::get, Json, Router};

use crate::app::{domain::Principal, session::ApiAuthenticatedSession, AppState};

/// GET /api/users/me. The principal every scope is computed from.
pub async fn me(ApiAuthenticatedSession(principal): ApiAuthenticatedSession) -> Json<Principal> {
    Json(principal)
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/users/me", get(me))
}
