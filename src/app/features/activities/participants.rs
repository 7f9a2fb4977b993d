use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use validator::Validate;

use crate::app::{
    db::{self, participants::Participant, ListQuery},
    error::AppError,
    features::{
        pagination::{invalid, Filters, PageParams, Paginated},
        patch::deserialize_optional_option,
        references,
    },
    scope::{scope, ResourceKind},
    session::ApiAuthenticatedSession,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct ParticipantFilters {
    pub event: Option<String>,
    pub attended: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateParticipantRequest {
    /// Omit = unchanged, null = unlink the respondent.
    #[serde(default, deserialize_with = "deserialize_optional_option")]
    pub respondent: Option<Option<String>>,
    #[validate(length(max = 255))]
    pub name: Option<String>,
    #[validate(length(max = 20))]
    pub gender: Option<String>,
    #[validate(length(max = 255))]
    pub contact: Option<String>,
    pub attended: Option<bool>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// GET /api/activities/participants. Scoped through the participant's event.
pub async fn list_participants(
    ApiAuthenticatedSession(principal): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
    Query(filters): Query<ParticipantFilters>,
) -> Result<Json<Paginated<Participant>>, AppError> {
    let scope = scope(&principal, ResourceKind::Participant);
    let page = params.page(&state.config)?;

    let query = ListQuery {
        scope: &scope,
        filters: Filters::new()
            .text("t.event_id", filters.event)
            .flag("t.attended", "attended", filters.attended)?
            .into_vec(),
        search: params.search(db::participants::SEARCH_COLUMNS),
        order_by: params.order_by(db::participants::ORDERING, "created_at"),
        page,
    };

    let (rows, count) = db::participants::list(&state.db, &query).await?;
    Ok(Json(Paginated::new(rows, count, page)))
}

/// GET /api/activities/participants/:id
pub async fn get_participant(
    ApiAuthenticatedSession(principal): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Participant>, AppError> {
    let scope = scope(&principal, ResourceKind::Participant);
    let participant = db::participants::find_scoped(&state.db, &scope, &id)
        .await?
        .ok_or_else(AppError::not_found)?;
    Ok(Json(participant))
}

/// PATCH /api/activities/participants/:id. The event cannot be changed.
pub async fn update_participant(
    ApiAuthenticatedSession(principal): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateParticipantRequest>,
) -> Result<Json<Participant>, AppError> {
    request.validate()?;

    let scope = scope(&principal, ResourceKind::Participant);
    let existing = db::participants::find_scoped(&state.db, &scope, &id)
        .await?
        .ok_or_else(AppError::not_found)?;

    let respondent_id = match request.respondent {
        Some(respondent) => respondent,
        None => existing.respondent_id.clone(),
    };
    let name = request.name.as_deref().map(str::trim).unwrap_or(&existing.name);
    if respondent_id.is_none() && name.is_empty() {
        return Err(invalid("name"));
    }
    if let Some(respondent) = respondent_id.as_deref().filter(|r| Some(*r) != existing.respondent_id.as_deref()) {
        references::respondent(&state.db, &principal, respondent, "respondent").await?;
    }

    let changes = db::participants::ParticipantChanges {
        respondent_id: respondent_id.as_deref(),
        name,
        gender: request.gender.as_deref().unwrap_or(&existing.gender),
        contact: request.contact.as_deref().unwrap_or(&existing.contact),
        attended: request.attended.unwrap_or(existing.attended),
        notes: request.notes.as_deref().unwrap_or(&existing.notes),
    };
    db::participants::update(&state.db, &existing.id, &changes)
        .await
        .map_err(super::add_participant::registration_error)?;

    let updated = db::participants::find_scoped(&state.db, &scope, &existing.id)
        .await?
        .ok_or(AppError::Internal)?;
    Ok(Json(updated))
}

/// DELETE /api/activities/participants/:id
pub async fn delete_participant(
    ApiAuthenticatedSession(principal): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let scope = scope(&principal, ResourceKind::Participant);
    let participant = db::participants::find_scoped(&state.db, &scope, &id)
        .await?
        .ok_or_else(AppError::not_found)?;

    db::participants::delete(&state.db, &participant.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/activities/participants", get(list_participants))
        .route(
            "/api/activities/participants/:id",
            get(get_participant)
                .patch(update_participant)
                .delete(delete_participant),
        )
}
