use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use validator::Validate;

use crate::app::{
    db::{self, social_services::SocialService, ListQuery},
    domain::{validation_helpers::check_date_order, Principal, ServiceStatus},
    error::AppError,
    features::{
        pagination::{invalid, Filters, PageParams, Paginated},
        patch::deserialize_optional_option,
        references::{self, require_admitted},
    },
    scope::{scope, ResourceFacts, ResourceKind, Scope},
    session::ApiAuthenticatedSession,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct ServiceFilters {
    pub respondent: Option<String>,
    pub service_type: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateServiceRequest {
    pub respondent: String,
    #[validate(length(min = 1, max = 100))]
    pub service_type: String,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub description: String,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub provider: String,
    #[validate(custom(function = "crate::app::domain::validation_helpers::validate_iso_date"))]
    pub start_date: String,
    #[validate(custom(function = "crate::app::domain::validation_helpers::validate_iso_date"))]
    pub end_date: Option<String>,
    #[serde(default)]
    pub status: ServiceStatus,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub notes: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateServiceRequest {
    pub respondent: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub service_type: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(length(max = 255))]
    pub provider: Option<String>,
    #[validate(custom(function = "crate::app::domain::validation_helpers::validate_iso_date"))]
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_option")]
    #[validate(custom(function = "crate::app::domain::validation_helpers::validate_iso_date"))]
    pub end_date: Option<Option<String>>,
    pub status: Option<ServiceStatus>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// The respondent must be reachable, and so must the service it would produce.
async fn check_respondent(
    state: &AppState,
    scope: &Scope,
    principal: &Principal,
    respondent: &str,
) -> Result<(), AppError> {
    let organization = references::respondent(&state.db, principal, respondent, "respondent").await?;
    require_admitted(scope, &ResourceFacts::reaching([organization]), "respondent")
}

/// GET /api/social/services
pub async fn list_services(
    ApiAuthenticatedSession(principal): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
    Query(filters): Query<ServiceFilters>,
) -> Result<Json<Paginated<SocialService>>, AppError> {
    let scope = scope(&principal, ResourceKind::SocialService);
    let page = params.page(&state.config)?;

    let query = ListQuery {
        scope: &scope,
        filters: Filters::new()
            .text("t.respondent_id", filters.respondent)
            .text("t.service_type", filters.service_type)
            .text("t.status", filters.status)
            .into_vec(),
        search: params.search(db::social_services::SEARCH_COLUMNS),
        order_by: params.order_by(db::social_services::ORDERING, "-start_date"),
        page,
    };

    let (rows, count) = db::social_services::list(&state.db, &query).await?;
    Ok(Json(Paginated::new(rows, count, page)))
}

/// POST /api/social/services
pub async fn create_service(
    ApiAuthenticatedSession(principal): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Json(request): Json<CreateServiceRequest>,
) -> Result<(StatusCode, Json<SocialService>), AppError> {
    request.validate()?;
    check_date_order(&request.start_date, request.end_date.as_deref()).map_err(|_| invalid("end_date"))?;

    let scope = scope(&principal, ResourceKind::SocialService);
    check_respondent(&state, &scope, &principal, &request.respondent).await?;

    let id = ulid::Ulid::new().to_string();
    let service = db::social_services::NewSocialService {
        id: id.clone(),
        respondent_id: request.respondent,
        service_type: request.service_type,
        description: request.description,
        provider: request.provider,
        start_date: request.start_date,
        end_date: request.end_date,
        status: request.status.to_string(),
        notes: request.notes,
        created_by: principal.user_id.clone(),
    };
    db::social_services::insert(&state.db, &service).await?;

    let created = db::social_services::find_scoped(&state.db, &scope, &id)
        .await?
        .ok_or(AppError::Internal)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/social/services/:id
pub async fn get_service(
    ApiAuthenticatedSession(principal): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SocialService>, AppError> {
    let scope = scope(&principal, ResourceKind::SocialService);
    let service = db::social_services::find_scoped(&state.db, &scope, &id)
        .await?
        .ok_or_else(AppError::not_found)?;
    Ok(Json(service))
}

/// PATCH /api/social/services/:id
pub async fn update_service(
    ApiAuthenticatedSession(principal): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateServiceRequest>,
) -> Result<Json<SocialService>, AppError> {
    request.validate()?;

    let scope = scope(&principal, ResourceKind::SocialService);
    let existing = db::social_services::find_scoped(&state.db, &scope, &id)
        .await?
        .ok_or_else(AppError::not_found)?;

    let end_date = match request.end_date {
        Some(end_date) => end_date,
        None => existing.end_date.clone(),
    };
    let status = request
        .status
        .map(|s| s.to_string())
        .unwrap_or_else(|| existing.status.clone());

    let changes = db::social_services::SocialServiceChanges {
        respondent_id: request.respondent.as_deref().unwrap_or(&existing.respondent_id),
        service_type: request.service_type.as_deref().unwrap_or(&existing.service_type),
        description: request.description.as_deref().unwrap_or(&existing.description),
        provider: request.provider.as_deref().unwrap_or(&existing.provider),
        start_date: request.start_date.as_deref().unwrap_or(&existing.start_date),
        end_date: end_date.as_deref(),
        status: &status,
        notes: request.notes.as_deref().unwrap_or(&existing.notes),
    };

    check_date_order(changes.start_date, changes.end_date).map_err(|_| invalid("end_date"))?;
    if changes.respondent_id != existing.respondent_id {
        check_respondent(&state, &scope, &principal, changes.respondent_id).await?;
    }

    db::social_services::update(&state.db, &existing.id, &changes).await?;

    let updated = db::social_services::find_scoped(&state.db, &scope, &existing.id)
        .await?
        .ok_or(AppError::Internal)?;
    Ok(Json(updated))
}

/// DELETE /api/social/services/:id
pub async fn delete_service(
    ApiAuthenticatedSession(principal): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let scope = scope(&principal, ResourceKind::SocialService);
    let service = db::social_services::find_scoped(&state.db, &scope, &id)
        .await?
        .ok_or_else(AppError::not_found)?;

    db::social_services::delete(&state.db, &service.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/social/services", get(list_services).post(create_service))
        .route(
            "/api/social/services/:id",
            get(get_service).patch(update_service).delete(delete_service),
        )
}
