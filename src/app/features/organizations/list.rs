use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::app::{
    db::{self, organizations::Organization, ListQuery},
    error::AppError,
    features::pagination::{Filters, PageParams, Paginated},
    scope::{scope, ResourceKind},
    session::ApiAuthenticatedSession,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct OrganizationFilters {
    #[serde(rename = "type")]
    pub org_type: Option<String>,
    pub parent: Option<String>,
    pub is_active: Option<String>,
}

/// GET /api/organizations. The principal's own subtree; everything for admins.
pub async fn list_organizations(
    ApiAuthenticatedSession(principal): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
    Query(filters): Query<OrganizationFilters>,
) -> Result<Json<Paginated<Organization>>, AppError> {
    let scope = scope(&principal, ResourceKind::Organization);
    let page = params.page(&state.config)?;

    let query = ListQuery {
        scope: &scope,
        filters: Filters::new()
            .text("t.type", filters.org_type)
            .text("t.parent_id", filters.parent)
            .flag("t.is_active", "is_active", filters.is_active)?
            .into_vec(),
        search: params.search(db::organizations::SEARCH_COLUMNS),
        order_by: params.order_by(db::organizations::ORDERING, "name"),
        page,
    };

    let (rows, count) = db::organizations::list(&state.db, &query).await?;
    Ok(Json(Paginated::new(rows, count, page)))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/organizations", get(list_organizations))
}
