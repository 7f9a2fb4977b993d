use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use validator::Validate;

use crate::app::{
    db::{self, organizations::Organization},
    domain::OrganizationType,
    error::AppError,
    features::{pagination::invalid, patch::deserialize_optional_option},
    scope::{scope, ResourceKind},
    session::ApiAuthenticatedSession,
    AppState,
};

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateOrganizationRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub code: Option<String>,
    #[serde(rename = "type")]
    pub org_type: Option<OrganizationType>,
    /// Omit = unchanged, null = make this a root.
    #[serde(default, deserialize_with = "deserialize_optional_option")]
    pub parent: Option<Option<String>>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    #[validate(length(max = 255))]
    pub email: Option<String>,
    pub is_active: Option<bool>,
}

/// GET /api/organizations/:id
pub async fn get_organization(
    ApiAuthenticatedSession(principal): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Organization>, AppError> {
    let scope = scope(&principal, ResourceKind::Organization);
    let organization = db::organizations::find_scoped(&state.db, &scope, &id)
        .await?
        .ok_or_else(AppError::not_found)?;
    Ok(Json(organization))
}

/// PATCH /api/organizations/:id. Admin only. A parent may not be the organization itself or one of its descendants.
pub async fn update_organization(
    ApiAuthenticatedSession(principal): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateOrganizationRequest>,
) -> Result<Json<Organization>, AppError> {
    super::require_admin(&principal)?;
    request.validate()?;

    let scope = scope(&principal, ResourceKind::Organization);
    let existing = db::organizations::find_scoped(&state.db, &scope, &id)
        .await?
        .ok_or_else(AppError::not_found)?;

    let code = request
        .code
        .as_deref()
        .map(str::trim)
        .unwrap_or(&existing.code)
        .to_string();
    if code != existing.code && db::organizations::code_taken(&state.db, &code, Some(&existing.id)).await? {
        return Err(invalid("code"));
    }

    let parent_id = match request.parent {
        Some(parent) => parent,
        None => existing.parent_id.clone(),
    };
    if let Some(parent) = parent_id.as_deref() {
        if !db::organizations::exists(&state.db, parent).await? {
            return Err(invalid("parent"));
        }
        let subtree = db::organizations::subtree_ids(&state.db, &existing.id).await?;
        if subtree.iter().any(|descendant| descendant == parent) {
            return Err(invalid("parent"));
        }
    }

    let org_type = match request.org_type {
        Some(org_type) => org_type,
        None => existing
            .org_type
            .parse::<OrganizationType>()
            .unwrap_or_default(),
    };

    let changes = db::organizations::OrganizationChanges {
        name: request.name.as_deref().unwrap_or(&existing.name),
        code: &code,
        org_type,
        parent_id: parent_id.as_deref(),
        description: request.description.as_deref().unwrap_or(&existing.description),
        address: request.address.as_deref().unwrap_or(&existing.address),
        phone: request.phone.as_deref().unwrap_or(&existing.phone),
        email: request.email.as_deref().unwrap_or(&existing.email),
        is_active: request.is_active.unwrap_or(existing.is_active),
    };
    db::organizations::update(&state.db, &existing.id, &changes).await?;

    let updated = db::organizations::find_scoped(&state.db, &scope, &existing.id)
        .await?
        .ok_or(AppError::Internal)?;
    Ok(Json(updated))
}

/// DELETE /api/organizations/:id. Admin only. Children become roots.
pub async fn delete_organization(
    ApiAuthenticatedSession(principal): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    super::require_admin(&principal)?;

    let scope = scope(&principal, ResourceKind::Organization);
    let organization = db::organizations::find_scoped(&state.db, &scope, &id)
        .await?
        .ok_or_else(AppError::not_found)?;

    db::organizations::delete(&state.db, &organization.id).await?;
    tracing::info!(organization_id = %organization.id, "organization deleted");

    Ok(StatusCode::NO_CONTENT)
}

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/api/organizations/:id",
        get(get_organization)
            .patch(update_organization)
            .delete(delete_organization),
    )
}
