use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::app::{
    db::{self, aggregates::Aggregate, ListQuery},
    error::AppError,
    features::pagination::{Filters, PageParams, Paginated},
    scope::{scope, ResourceKind},
    session::ApiAuthenticatedSession,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct AggregateFilters {
    pub indicator: Option<String>,
    pub project: Option<String>,
    pub organization: Option<String>,
}

/// GET /api/aggregates
pub async fn list_aggregates(
    ApiAuthenticatedSession(principal): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
    Query(filters): Query<AggregateFilters>,
) -> Result<Json<Paginated<Aggregate>>, AppError> {
    let scope = scope(&principal, ResourceKind::Aggregate);
    let page = params.page(&state.config)?;

    let query = ListQuery {
        scope: &scope,
        filters: Filters::new()
            .text("t.indicator_id", filters.indicator)
            .text("t.project_id", filters.project)
            .text("t.organization_id", filters.organization)
            .into_vec(),
        search: None,
        order_by: params.order_by(db::aggregates::ORDERING, "-period_start"),
        page,
    };

    let (rows, count) = db::aggregates::list(&state.db, &query).await?;
    Ok(Json(Paginated::new(rows, count, page)))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/aggregates", get(list_aggregates))
}
