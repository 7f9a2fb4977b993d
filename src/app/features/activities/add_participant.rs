use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use validator::Validate;

use crate::app::{
    db::{self, participants::Participant},
    error::AppError,
    features::{pagination::invalid, references},
    scope::{scope, ResourceKind},
    session::ApiAuthenticatedSession,
    AppState,
};

/// A respondent may be registered once per event.
pub(super) fn registration_error(err: sqlx::Error) -> AppError {
    if db::participants::is_duplicate(&err) {
        AppError::Validation("Invalid input: respondent is already registered for this event".to_string())
    } else {
        AppError::Database(err)
    }
}

fn default_attended() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddParticipantRequest {
    pub respondent: Option<String>,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 20))]
    pub gender: String,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub contact: String,
    #[serde(default = "default_attended")]
    pub attended: bool,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub notes: String,
}

/// POST /api/activities/:id/add_participant. A participant is either a respondent or a named walk-in.
/// The event's `actual_participants` is recounted in the same transaction.
pub async fn add_participant(
    ApiAuthenticatedSession(principal): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<AddParticipantRequest>,
) -> Result<(StatusCode, Json<Participant>), AppError> {
    request.validate()?;
    if request.respondent.is_none() && request.name.trim().is_empty() {
        return Err(invalid("name"));
    }

    let events = scope(&principal, ResourceKind::Event);

    let mut tx = state.db.begin().await?;
    let event = db::events::find_scoped(&mut *tx, &events, &id)
        .await?
        .ok_or_else(AppError::not_found)?;
    if let Some(respondent) = request.respondent.as_deref() {
        references::respondent(&mut *tx, &principal, respondent, "respondent").await?;
    }

    let participant_id = ulid::Ulid::new().to_string();
    let participant = db::participants::NewParticipant {
        id: participant_id.clone(),
        event_id: event.id.clone(),
        respondent_id: request.respondent,
        name: request.name.trim().to_string(),
        gender: request.gender,
        contact: request.contact,
        attended: request.attended,
        notes: request.notes,
    };
    db::participants::insert(&mut *tx, &participant)
        .await
        .map_err(registration_error)?;
    let attended = db::events::refresh_actual_participants(&mut *tx, &event.id).await?;
    tx.commit().await?;

    tracing::info!(event_id = %event.id, participant_id = %participant_id, actual_participants = attended, "participant added");

    let participants = scope(&principal, ResourceKind::Participant);
    let created = db::participants::find_scoped(&state.db, &participants, &participant_id)
        .await?
        .ok_or(AppError::Internal)?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/activities/:id/add_participant", post(add_participant))
}
