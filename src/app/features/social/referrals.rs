use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use validator::Validate;

use crate::app::{
    db::{self, referrals::Referral, ListQuery},
    domain::{validation_helpers, ReferralStatus},
    error::AppError,
    features::{
        pagination::{invalid, Filters, PageParams, Paginated},
        patch::deserialize_optional_option,
        references::{self, require_admitted},
    },
    scope::{scope, ResourceFacts, ResourceKind},
    session::ApiAuthenticatedSession,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct ReferralFilters {
    pub respondent: Option<String>,
    pub from_organization: Option<String>,
    pub to_organization: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateReferralRequest {
    pub respondent: String,
    pub from_organization: String,
    pub to_organization: String,
    #[validate(length(min = 1, max = 5000))]
    pub reason: String,
    #[serde(default)]
    pub status: ReferralStatus,
    #[validate(custom(function = "crate::app::domain::validation_helpers::validate_iso_date"))]
    pub referred_date: Option<String>,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub notes: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateReferralRequest {
    pub respondent: Option<String>,
    pub from_organization: Option<String>,
    pub to_organization: Option<String>,
    #[validate(length(min = 1, max = 5000))]
    pub reason: Option<String>,
    /// Plain field update. This is the only way to reach `rejected`.
    pub status: Option<ReferralStatus>,
    #[validate(custom(function = "crate::app::domain::validation_helpers::validate_iso_date"))]
    pub referred_date: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_option")]
    #[validate(custom(function = "crate::app::domain::validation_helpers::validate_iso_date"))]
    pub completed_date: Option<Option<String>>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// GET /api/social/referrals. Visible to both the referring and the receiving organization.
pub async fn list_referrals(
    ApiAuthenticatedSession(principal): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
    Query(filters): Query<ReferralFilters>,
) -> Result<Json<Paginated<Referral>>, AppError> {
    let scope = scope(&principal, ResourceKind::Referral);
    let page = params.page(&state.config)?;

    let query = ListQuery {
        scope: &scope,
        filters: Filters::new()
            .text("t.respondent_id", filters.respondent)
            .text("t.from_organization_id", filters.from_organization)
            .text("t.to_organization_id", filters.to_organization)
            .text("t.status", filters.status)
            .into_vec(),
        search: params.search(db::referrals::SEARCH_COLUMNS),
        order_by: params.order_by(db::referrals::ORDERING, "-referred_date"),
        page,
    };

    let (rows, count) = db::referrals::list(&state.db, &query).await?;
    Ok(Json(Paginated::new(rows, count, page)))
}

/// POST /api/social/referrals. Either endpoint may be the caller's organization.
pub async fn create_referral(
    ApiAuthenticatedSession(principal): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Json(request): Json<CreateReferralRequest>,
) -> Result<(StatusCode, Json<Referral>), AppError> {
    request.validate()?;

    let scope = scope(&principal, ResourceKind::Referral);
    references::respondent(&state.db, &principal, &request.respondent, "respondent").await?;
    for (field, organization) in [
        ("from_organization", &request.from_organization),
        ("to_organization", &request.to_organization),
    ] {
        if !db::organizations::exists(&state.db, organization).await? {
            return Err(invalid(field));
        }
    }
    require_admitted(
        &scope,
        &ResourceFacts::reaching([request.from_organization.as_str(), request.to_organization.as_str()]),
        "from_organization",
    )?;

    let id = ulid::Ulid::new().to_string();
    let referral = db::referrals::NewReferral {
        id: id.clone(),
        respondent_id: request.respondent,
        from_organization_id: request.from_organization,
        to_organization_id: request.to_organization,
        reason: request.reason,
        status: request.status.to_string(),
        referred_date: request.referred_date.unwrap_or_else(validation_helpers::today),
        notes: request.notes,
        created_by: principal.user_id.clone(),
    };
    db::referrals::insert(&state.db, &referral).await?;

    let created = db::referrals::find_scoped(&state.db, &scope, &id)
        .await?
        .ok_or(AppError::Internal)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/social/referrals/:id
pub async fn get_referral(
    ApiAuthenticatedSession(principal): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Referral>, AppError> {
    let scope = scope(&principal, ResourceKind::Referral);
    let referral = db::referrals::find_scoped(&state.db, &scope, &id)
        .await?
        .ok_or_else(AppError::not_found)?;
    Ok(Json(referral))
}

/// PATCH /api/social/referrals/:id
pub async fn update_referral(
    ApiAuthenticatedSession(principal): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateReferralRequest>,
) -> Result<Json<Referral>, AppError> {
    request.validate()?;

    let scope = scope(&principal, ResourceKind::Referral);
    let existing = db::referrals::find_scoped(&state.db, &scope, &id)
        .await?
        .ok_or_else(AppError::not_found)?;

    let completed_date = match request.completed_date {
        Some(completed_date) => completed_date,
        None => existing.completed_date.clone(),
    };
    let status = request
        .status
        .map(|s| s.to_string())
        .unwrap_or_else(|| existing.status.clone());

    let changes = db::referrals::ReferralChanges {
        respondent_id: request.respondent.as_deref().unwrap_or(&existing.respondent_id),
        from_organization_id: request
            .from_organization
            .as_deref()
            .unwrap_or(&existing.from_organization_id),
        to_organization_id: request
            .to_organization
            .as_deref()
            .unwrap_or(&existing.to_organization_id),
        reason: request.reason.as_deref().unwrap_or(&existing.reason),
        status: &status,
        referred_date: request.referred_date.as_deref().unwrap_or(&existing.referred_date),
        completed_date: completed_date.as_deref(),
        notes: request.notes.as_deref().unwrap_or(&existing.notes),
    };

    if changes.respondent_id != existing.respondent_id {
        references::respondent(&state.db, &principal, changes.respondent_id, "respondent").await?;
    }
    if request.from_organization.is_some() || request.to_organization.is_some() {
        for (field, organization) in [
            ("from_organization", changes.from_organization_id),
            ("to_organization", changes.to_organization_id),
        ] {
            if !db::organizations::exists(&state.db, organization).await? {
                return Err(invalid(field));
            }
        }
        require_admitted(
            &scope,
            &ResourceFacts::reaching([changes.from_organization_id, changes.to_organization_id]),
            "from_organization",
        )?;
    }

    db::referrals::update(&state.db, &existing.id, &changes).await?;

    let updated = db::referrals::find_scoped(&state.db, &scope, &existing.id)
        .await?
        .ok_or(AppError::Internal)?;
    Ok(Json(updated))
}

/// DELETE /api/social/referrals/:id
pub async fn delete_referral(
    ApiAuthenticatedSession(principal): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let scope = scope(&principal, ResourceKind::Referral);
    let referral = db::referrals::find_scoped(&state.db, &scope, &id)
        .await?
        .ok_or_else(AppError::not_found)?;

    db::referrals::delete(&state.db, &referral.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/social/referrals", get(list_referrals).post(create_referral))
        .route(
            "/api/social/referrals/:id",
            get(get_referral).patch(update_referral).delete(delete_referral),
        )
}
