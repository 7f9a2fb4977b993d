use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use validator::Validate;

use crate::app::{
    db::{self, aggregates::Aggregate},
    domain::validation_helpers::check_date_order,
    error::AppError,
    features::{pagination::invalid, references},
    scope::{scope, ResourceKind},
    session::ApiAuthenticatedSession,
    AppState,
};

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAggregateRequest {
    pub indicator: Option<String>,
    pub project: Option<String>,
    pub organization: Option<String>,
    #[validate(custom(function = "crate::app::domain::validation_helpers::validate_iso_date"))]
    pub period_start: Option<String>,
    #[validate(custom(function = "crate::app::domain::validation_helpers::validate_iso_date"))]
    pub period_end: Option<String>,
    #[validate(range(min = 0))]
    pub value: Option<i64>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// GET /api/aggregates/:id
pub async fn get_aggregate(
    ApiAuthenticatedSession(principal): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Aggregate>, AppError> {
    let scope = scope(&principal, ResourceKind::Aggregate);
    let aggregate = db::aggregates::find_scoped(&state.db, &scope, &id)
        .await?
        .ok_or_else(AppError::not_found)?;
    Ok(Json(aggregate))
}

/// PATCH /api/aggregates/:id
pub async fn update_aggregate(
    ApiAuthenticatedSession(principal): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateAggregateRequest>,
) -> Result<Json<Aggregate>, AppError> {
    request.validate()?;

    let scope = scope(&principal, ResourceKind::Aggregate);
    let existing = db::aggregates::find_scoped(&state.db, &scope, &id)
        .await?
        .ok_or_else(AppError::not_found)?;

    let changes = db::aggregates::AggregateChanges {
        indicator_id: request.indicator.as_deref().unwrap_or(&existing.indicator_id),
        project_id: request.project.as_deref().unwrap_or(&existing.project_id),
        organization_id: request.organization.as_deref().unwrap_or(&existing.organization_id),
        period_start: request.period_start.as_deref().unwrap_or(&existing.period_start),
        period_end: request.period_end.as_deref().unwrap_or(&existing.period_end),
        value: request.value.unwrap_or(existing.value),
        notes: request.notes.as_deref().unwrap_or(&existing.notes),
    };

    check_date_order(changes.period_start, Some(changes.period_end)).map_err(|_| invalid("period_end"))?;
    if request.organization.is_some() {
        references::organization(&state.db, &scope, changes.organization_id, "organization").await?;
    }
    if request.indicator.is_some() {
        references::indicator(&state.db, changes.indicator_id, "indicator").await?;
    }
    if request.project.is_some() {
        references::project(&state.db, changes.project_id, "project").await?;
    }

    db::aggregates::update(&state.db, &existing.id, &changes).await?;

    let updated = db::aggregates::find_scoped(&state.db, &scope, &existing.id)
        .await?
        .ok_or(AppError::Internal)?;
    Ok(Json(updated))
}

/// DELETE /api/aggregates/:id
pub async fn delete_aggregate(
    ApiAuthenticatedSession(principal): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let scope = scope(&principal, ResourceKind::Aggregate);
    let aggregate = db::aggregates::find_scoped(&state.db, &scope, &id)
        .await?
        .ok_or_else(AppError::not_found)?;

    db::aggregates::delete(&state.db, &aggregate.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/api/aggregates/:id",
        get(get_aggregate).patch(update_aggregate).delete(delete_aggregate),
    )
}
