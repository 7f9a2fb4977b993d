use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use super::types::EventResponse;
use crate::app::{
    db::{self, ListQuery},
    error::AppError,
    features::pagination::{Filters, PageParams, Paginated},
    scope::{scope, ResourceKind},
    session::ApiAuthenticatedSession,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct EventFilters {
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub status: Option<String>,
    pub project: Option<String>,
    pub organization: Option<String>,
}

/// GET /api/activities
pub async fn list_events(
    ApiAuthenticatedSession(principal): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
    Query(filters): Query<EventFilters>,
) -> Result<Json<Paginated<EventResponse>>, AppError> {
    let scope = scope(&principal, ResourceKind::Event);
    let page = params.page(&state.config)?;

    let query = ListQuery {
        scope: &scope,
        filters: Filters::new()
            .text("t.type", filters.event_type)
            .text("t.status", filters.status)
            .text("t.project_id", filters.project)
            .text("t.organization_id", filters.organization)
            .into_vec(),
        search: params.search(db::events::SEARCH_COLUMNS),
        order_by: params.order_by(db::events::ORDERING, "-start_date"),
        page,
    };

    let (rows, count) = db::events::list(&state.db, &query).await?;
    Ok(Json(Paginated::new(rows, count, page).map(EventResponse::from)))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/activities", get(list_events))
}
