use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};

use super::types::EventResponse;
use crate::app::{
    db,
    domain::EventStatus,
    error::AppError,
    scope::{scope, ResourceKind},
    session::ApiAuthenticatedSession,
    AppState,
};

/// POST /api/activities/:id/complete. Valid from any status. Recounts attended participants.
pub async fn complete_event(
    ApiAuthenticatedSession(principal): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EventResponse>, AppError> {
    let scope = scope(&principal, ResourceKind::Event);

    let mut tx = state.db.begin().await?;
    let event = db::events::find_scoped(&mut *tx, &scope, &id)
        .await?
        .ok_or_else(AppError::not_found)?;
    db::events::set_status(&mut *tx, &event.id, &EventStatus::Completed.to_string()).await?;
    let attended = db::events::refresh_actual_participants(&mut *tx, &event.id).await?;
    tx.commit().await?;

    tracing::info!(event_id = %event.id, actual_participants = attended, "event completed");

    let completed = db::events::find_scoped(&state.db, &scope, &event.id)
        .await?
        .ok_or(AppError::Internal)?;
    Ok(Json(completed.into()))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/activities/:id/complete", post(complete_event))
}
