use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::app::{
    db::{self, events::RecentEvent},
    error::AppError,
    scope::{scope, ResourceKind},
    session::ApiAuthenticatedSession,
    AppState,
};

/// Number of events listed under `recent_activity`.
const RECENT_ACTIVITY_LIMIT: i64 = 5;

/// Dashboard counters. Every count is taken over an already scoped collection,
/// except indicators, which are shared reference data.
#[derive(Debug, Serialize)]
pub struct Overview {
    pub total_respondents: i64,
    pub total_assessments: i64,
    pub active_projects: i64,
    pub total_indicators: i64,
    /// Needs per-project targets, which are not modelled. Always null.
    pub indicators_behind: Option<i64>,
    pub recent_activity: Vec<RecentEvent>,
}

/// GET /api/analysis/dashboard/overview
pub async fn overview(
    ApiAuthenticatedSession(principal): ApiAuthenticatedSession,
    State(state): State<AppState>,
) -> Result<Json<Overview>, AppError> {
    let respondents = scope(&principal, ResourceKind::Respondent);
    let interactions = scope(&principal, ResourceKind::Interaction);
    let projects = scope(&principal, ResourceKind::Project);
    let events = scope(&principal, ResourceKind::Event);

    Ok(Json(Overview {
        total_respondents: db::respondents::count_scoped(&state.db, &respondents).await?,
        total_assessments: db::interactions::count_scoped(&state.db, &interactions).await?,
        active_projects: db::projects::count_active_scoped(&state.db, &projects).await?,
        total_indicators: db::indicators::count_active(&state.db).await?,
        indicators_behind: None,
        recent_activity: db::events::recent_scoped(&state.db, &events, RECENT_ACTIVITY_LIMIT).await?,
    }))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/analysis/dashboard/overview", get(overview))
}
