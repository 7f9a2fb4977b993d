use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

use super::types::{encode_parameters, encode_table, ReportResponse};
use crate::app::{
    db::{self, ListQuery},
    domain::{CachedDataInput, ReportType},
    error::AppError,
    features::{
        pagination::{invalid, Filters, PageParams, Paginated},
        patch::deserialize_optional_option,
        references,
    },
    scope::{scope, ResourceKind, Scope},
    session::ApiAuthenticatedSession,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct ReportFilters {
    pub report_type: Option<String>,
    pub organization: Option<String>,
    pub is_public: Option<String>,
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateReportRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub description: String,
    pub report_type: ReportType,
    pub organization: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default = "empty_object")]
    pub parameters: Value,
    pub cached_data: Option<CachedDataInput>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateReportRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub report_type: Option<ReportType>,
    #[serde(default, deserialize_with = "deserialize_optional_option")]
    pub organization: Option<Option<String>>,
    pub is_public: Option<bool>,
    pub parameters: Option<Value>,
    /// Omit = unchanged, null = drop the stored table.
    #[serde(default, deserialize_with = "deserialize_optional_option")]
    pub cached_data: Option<Option<CachedDataInput>>,
}

/// A report's organization must be one the caller reaches. Principals with no
/// organization cannot own reports at all, since they would never see them.
async fn check_organization(state: &AppState, scope: &Scope, organization: Option<&str>) -> Result<(), AppError> {
    if scope.is_empty() {
        return Err(invalid("organization"));
    }
    match organization {
        Some(organization) => references::organization(&state.db, scope, organization, "organization").await,
        None => Ok(()),
    }
}

/// GET /api/analysis/reports. Organization reports, public reports and the caller's own.
pub async fn list_reports(
    ApiAuthenticatedSession(principal): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
    Query(filters): Query<ReportFilters>,
) -> Result<Json<Paginated<ReportResponse>>, AppError> {
    let scope = scope(&principal, ResourceKind::Report);
    let page = params.page(&state.config)?;

    let query = ListQuery {
        scope: &scope,
        filters: Filters::new()
            .text("t.report_type", filters.report_type)
            .text("t.organization_id", filters.organization)
            .flag("t.is_public", "is_public", filters.is_public)?
            .into_vec(),
        search: params.search(db::reports::SEARCH_COLUMNS),
        order_by: params.order_by(db::reports::ORDERING, "-created_at"),
        page,
    };

    let (rows, count) = db::reports::list(&state.db, &query).await?;
    Ok(Json(Paginated::new(rows, count, page).map(ReportResponse::from)))
}

/// POST /api/analysis/reports
pub async fn create_report(
    ApiAuthenticatedSession(principal): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Json(request): Json<CreateReportRequest>,
) -> Result<(StatusCode, Json<ReportResponse>), AppError> {
    request.validate()?;

    let scope = scope(&principal, ResourceKind::Report);
    check_organization(&state, &scope, request.organization.as_deref()).await?;
    let parameters = encode_parameters(&request.parameters)?;
    let cached_data = request.cached_data.map(encode_table).transpose()?;

    let id = ulid::Ulid::new().to_string();
    let report = db::reports::NewReport {
        id: id.clone(),
        name: request.name,
        description: request.description,
        report_type: request.report_type.to_string(),
        organization_id: request.organization,
        is_public: request.is_public,
        parameters,
        cached_data,
        created_by: principal.user_id.clone(),
    };
    db::reports::insert(&state.db, &report).await?;

    let created = db::reports::find_scoped(&state.db, &scope, &id)
        .await?
        .ok_or(AppError::Internal)?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// GET /api/analysis/reports/:id
pub async fn get_report(
    ApiAuthenticatedSession(principal): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ReportResponse>, AppError> {
    let scope = scope(&principal, ResourceKind::Report);
    let report = db::reports::find_scoped(&state.db, &scope, &id)
        .await?
        .ok_or_else(AppError::not_found)?;
    Ok(Json(report.into()))
}

/// PATCH /api/analysis/reports/:id
pub async fn update_report(
    ApiAuthenticatedSession(principal): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateReportRequest>,
) -> Result<Json<ReportResponse>, AppError> {
    request.validate()?;

    let scope = scope(&principal, ResourceKind::Report);
    let existing = db::reports::find_scoped(&state.db, &scope, &id)
        .await?
        .ok_or_else(AppError::not_found)?;

    let organization_id = match request.organization {
        Some(organization) => {
            check_organization(&state, &scope, organization.as_deref()).await?;
            organization
        }
        None => existing.organization_id.clone(),
    };
    let parameters = match request.parameters.as_ref() {
        Some(parameters) => encode_parameters(parameters)?,
        None => existing.parameters.clone(),
    };
    let cached_data = match request.cached_data {
        Some(Some(input)) => Some(encode_table(input)?),
        Some(None) => None,
        None => existing.cached_data.clone(),
    };
    let report_type = request
        .report_type
        .map(|t| t.to_string())
        .unwrap_or_else(|| existing.report_type.clone());

    let changes = db::reports::ReportChanges {
        name: request.name.as_deref().unwrap_or(&existing.name),
        description: request.description.as_deref().unwrap_or(&existing.description),
        report_type: &report_type,
        organization_id: organization_id.as_deref(),
        is_public: request.is_public.unwrap_or(existing.is_public),
        parameters: &parameters,
        cached_data: cached_data.as_deref(),
    };
    db::reports::update(&state.db, &existing.id, &changes).await?;

    let updated = db::reports::find_scoped(&state.db, &scope, &existing.id)
        .await?
        .ok_or_else(AppError::not_found)?;
    Ok(Json(updated.into()))
}

/// DELETE /api/analysis/reports/:id
pub async fn delete_report(
    ApiAuthenticatedSession(principal): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let scope = scope(&principal, ResourceKind::Report);
    let report = db::reports::find_scoped(&state.db, &scope, &id)
        .await?
        .ok_or_else(AppError::not_found)?;

    db::reports::delete(&state.db, &report.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/analysis/reports", get(list_reports).post(create_report))
        .route(
            "/api/analysis/reports/:id",
            get(get_report).patch(update_report).delete(delete_report),
        )
}
