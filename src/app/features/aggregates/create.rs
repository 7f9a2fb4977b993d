use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
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
pub struct CreateAggregateRequest {
    pub indicator: String,
    pub project: String,
    pub organization: String,
    #[validate(custom(function = "crate::app::domain::validation_helpers::validate_iso_date"))]
    pub period_start: String,
    #[validate(custom(function = "crate::app::domain::validation_helpers::validate_iso_date"))]
    pub period_end: String,
    #[validate(range(min = 0))]
    pub value: i64,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub notes: String,
}

/// POST /api/aggregates. The organization must be inside the caller's scope.
pub async fn create_aggregate(
    ApiAuthenticatedSession(principal): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Json(request): Json<CreateAggregateRequest>,
) -> Result<(StatusCode, Json<Aggregate>), AppError> {
    request.validate()?;
    check_date_order(&request.period_start, Some(&request.period_end)).map_err(|_| invalid("period_end"))?;

    let scope = scope(&principal, ResourceKind::Aggregate);
    references::organization(&state.db, &scope, &request.organization, "organization").await?;
    references::indicator(&state.db, &request.indicator, "indicator").await?;
    references::project(&state.db, &request.project, "project").await?;

    let id = ulid::Ulid::new().to_string();
    let aggregate = db::aggregates::NewAggregate {
        id: id.clone(),
        indicator_id: request.indicator,
        project_id: request.project,
        organization_id: request.organization,
        period_start: request.period_start,
        period_end: request.period_end,
        value: request.value,
        notes: request.notes,
        created_by: principal.user_id.clone(),
    };
    db::aggregates::insert(&state.db, &aggregate).await?;

    let created = db::aggregates::find_scoped(&state.db, &scope, &id)
        .await?
        .ok_or(AppError::Internal)?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/aggregates", post(create_aggregate))
}
