use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Deserialize;
use validator::Validate;

use super::types::EventResponse;
use crate::app::{
    db,
    domain::{validation_helpers::check_date_order, EventStatus, EventType},
    error::AppError,
    features::{pagination::invalid, references},
    scope::{scope, ResourceKind},
    session::ApiAuthenticatedSession,
    AppState,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateEventRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub description: String,
    #[serde(rename = "type", default)]
    pub event_type: EventType,
    #[serde(default)]
    pub status: EventStatus,
    pub project: Option<String>,
    pub organization: String,
    #[validate(custom(function = "crate::app::domain::validation_helpers::validate_iso_date"))]
    pub start_date: String,
    #[validate(custom(function = "crate::app::domain::validation_helpers::validate_iso_date"))]
    pub end_date: Option<String>,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub location: String,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub expected_participants: i64,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub budget: f64,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub actual_cost: f64,
    #[serde(default)]
    pub indicators: Vec<String>,
}

/// POST /api/activities. Event and indicator links are written in one transaction.
pub async fn create_event(
    ApiAuthenticatedSession(principal): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Json(request): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<EventResponse>), AppError> {
    request.validate()?;
    check_date_order(&request.start_date, request.end_date.as_deref()).map_err(|_| invalid("end_date"))?;

    let scope = scope(&principal, ResourceKind::Event);
    references::organization(&state.db, &scope, &request.organization, "organization").await?;
    if let Some(project) = request.project.as_deref() {
        references::project(&state.db, project, "project").await?;
    }
    references::indicators(&state.db, &request.indicators, "indicators").await?;

    let id = ulid::Ulid::new().to_string();
    let event = db::events::NewEvent {
        id: id.clone(),
        title: request.title,
        description: request.description,
        event_type: request.event_type.to_string(),
        status: request.status.to_string(),
        project_id: request.project,
        organization_id: request.organization,
        start_date: request.start_date,
        end_date: request.end_date,
        location: request.location,
        expected_participants: request.expected_participants,
        budget: request.budget,
        actual_cost: request.actual_cost,
        created_by: principal.user_id.clone(),
    };

    let mut tx = state.db.begin().await?;
    db::events::insert(&mut *tx, &event).await?;
    db::events::set_indicators(&mut *tx, &id, &request.indicators).await?;
    tx.commit().await?;

    let created = db::events::find_scoped(&state.db, &scope, &id)
        .await?
        .ok_or(AppError::Internal)?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/activities", post(create_event))
}
