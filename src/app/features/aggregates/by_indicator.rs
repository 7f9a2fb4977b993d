use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::app::{
    db::{self, aggregates::Aggregate},
    error::AppError,
    scope::{scope, ResourceKind},
    session::ApiAuthenticatedSession,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct ByIndicatorParams {
    pub indicator_id: Option<String>,
}

/// GET /api/aggregates/by_indicator?indicator_id=. Unpaged.
pub async fn aggregates_by_indicator(
    ApiAuthenticatedSession(principal): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Query(params): Query<ByIndicatorParams>,
) -> Result<Json<Vec<Aggregate>>, AppError> {
    let indicator_id = params
        .indicator_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::Validation("indicator_id required".to_string()))?;

    let scope = scope(&principal, ResourceKind::Aggregate);
    let rows = db::aggregates::for_indicator(&state.db, &scope, &indicator_id).await?;
    Ok(Json(rows))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/aggregates/by_indicator", get(aggregates_by_indicator))
}
