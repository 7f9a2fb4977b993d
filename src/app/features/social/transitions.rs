//! Referral transitions. Both are plain field assignments on a record resolved through scope.

use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};

use crate::app::{
    db::{self, referrals::Referral},
    domain::{validation_helpers, ReferralStatus},
    error::AppError,
    scope::{scope, ResourceKind},
    session::ApiAuthenticatedSession,
    AppState,
};

async fn transition(
    state: &AppState,
    principal: &crate::app::domain::Principal,
    id: &str,
    status: ReferralStatus,
    completed_date: Option<String>,
) -> Result<Referral, AppError> {
    let scope = scope(principal, ResourceKind::Referral);
    let referral = db::referrals::find_scoped(&state.db, &scope, id)
        .await?
        .ok_or_else(AppError::not_found)?;

    db::referrals::set_status(&state.db, &referral.id, &status.to_string(), completed_date.as_deref()).await?;
    tracing::info!(referral_id = %referral.id, from = %referral.status, to = %status, "referral transition");

    db::referrals::find_scoped(&state.db, &scope, &referral.id)
        .await?
        .ok_or(AppError::Internal)
}

/// POST /api/social/referrals/:id/accept. No precondition on the current status.
pub async fn accept_referral(
    ApiAuthenticatedSession(principal): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Referral>, AppError> {
    let referral = transition(&state, &principal, &id, ReferralStatus::Accepted, None).await?;
    Ok(Json(referral))
}

/// POST /api/social/referrals/:id/complete. Valid from any status; stamps today's date.
pub async fn complete_referral(
    ApiAuthenticatedSession(principal): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Referral>, AppError> {
    let referral = transition(
        &state,
        &principal,
        &id,
        ReferralStatus::Completed,
        Some(validation_helpers::today()),
    )
    .await?;
    Ok(Json(referral))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/social/referrals/:id/accept", post(accept_referral))
        .route("/api/social/referrals/:id/complete", post(complete_referral))
}
