use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use validator::Validate;

use super::types::{EventDetailResponse, EventResponse};
use crate::app::{
    db,
    domain::{validation_helpers::check_date_order, EventStatus, EventType},
    error::AppError,
    features::{pagination::invalid, patch::deserialize_optional_option, references},
    scope::{scope, ResourceKind},
    session::ApiAuthenticatedSession,
    AppState,
};

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateEventRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub event_type: Option<EventType>,
    pub status: Option<EventStatus>,
    /// Omit = unchanged, null = detach from the project.
    #[serde(default, deserialize_with = "deserialize_optional_option")]
    pub project: Option<Option<String>>,
    pub organization: Option<String>,
    #[validate(custom(function = "crate::app::domain::validation_helpers::validate_iso_date"))]
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_option")]
    #[validate(custom(function = "crate::app::domain::validation_helpers::validate_iso_date"))]
    pub end_date: Option<Option<String>>,
    #[validate(length(max = 255))]
    pub location: Option<String>,
    #[validate(range(min = 0))]
    pub expected_participants: Option<i64>,
    #[validate(range(min = 0))]
    pub actual_participants: Option<i64>,
    #[validate(range(min = 0.0))]
    pub budget: Option<f64>,
    #[validate(range(min = 0.0))]
    pub actual_cost: Option<f64>,
    pub indicators: Option<Vec<String>>,
}

/// GET /api/activities/:id. Includes participants.
pub async fn get_event(
    ApiAuthenticatedSession(principal): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EventDetailResponse>, AppError> {
    let scope = scope(&principal, ResourceKind::Event);
    let event = db::events::find_scoped(&state.db, &scope, &id)
        .await?
        .ok_or_else(AppError::not_found)?;
    let participants = db::participants::for_event(&state.db, &event.id).await?;

    Ok(Json(EventDetailResponse {
        event: event.into(),
        participants,
    }))
}

/// PATCH /api/activities/:id
pub async fn update_event(
    ApiAuthenticatedSession(principal): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateEventRequest>,
) -> Result<Json<EventResponse>, AppError> {
    request.validate()?;

    let scope = scope(&principal, ResourceKind::Event);
    let existing = db::events::find_scoped(&state.db, &scope, &id)
        .await?
        .ok_or_else(AppError::not_found)?;

    let project_id = match request.project {
        Some(project) => project,
        None => existing.project_id.clone(),
    };
    let end_date = match request.end_date {
        Some(end_date) => end_date,
        None => existing.end_date.clone(),
    };
    let event_type = request
        .event_type
        .map(|t| t.to_string())
        .unwrap_or_else(|| existing.event_type.clone());
    let status = request
        .status
        .map(|s| s.to_string())
        .unwrap_or_else(|| existing.status.clone());

    let changes = db::events::EventChanges {
        title: request.title.as_deref().unwrap_or(&existing.title),
        description: request.description.as_deref().unwrap_or(&existing.description),
        event_type: &event_type,
        status: &status,
        project_id: project_id.as_deref(),
        organization_id: request.organization.as_deref().unwrap_or(&existing.organization_id),
        start_date: request.start_date.as_deref().unwrap_or(&existing.start_date),
        end_date: end_date.as_deref(),
        location: request.location.as_deref().unwrap_or(&existing.location),
        expected_participants: request.expected_participants.unwrap_or(existing.expected_participants),
        actual_participants: request.actual_participants.unwrap_or(existing.actual_participants),
        budget: request.budget.unwrap_or(existing.budget),
        actual_cost: request.actual_cost.unwrap_or(existing.actual_cost),
    };

    check_date_order(changes.start_date, changes.end_date).map_err(|_| invalid("end_date"))?;
    if request.organization.is_some() {
        references::organization(&state.db, &scope, changes.organization_id, "organization").await?;
    }
    if let Some(project) = changes.project_id.filter(|p| Some(*p) != existing.project_id.as_deref()) {
        references::project(&state.db, project, "project").await?;
    }
    if let Some(indicators) = request.indicators.as_deref() {
        references::indicators(&state.db, indicators, "indicators").await?;
    }

    let mut tx = state.db.begin().await?;
    db::events::update(&mut *tx, &existing.id, &changes).await?;
    if let Some(indicators) = request.indicators.as_deref() {
        db::events::set_indicators(&mut *tx, &existing.id, indicators).await?;
    }
    tx.commit().await?;

    let updated = db::events::find_scoped(&state.db, &scope, &existing.id)
        .await?
        .ok_or(AppError::Internal)?;
    Ok(Json(updated.into()))
}

/// DELETE /api/activities/:id
pub async fn delete_event(
    ApiAuthenticatedSession(principal): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let scope = scope(&principal, ResourceKind::Event);
    let event = db::events::find_scoped(&state.db, &scope, &id)
        .await?
        .ok_or_else(AppError::not_found)?;

    db::events::delete(&state.db, &event.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/api/activities/:id",
        get(get_event).patch(update_event).delete(delete_event),
    )
}
