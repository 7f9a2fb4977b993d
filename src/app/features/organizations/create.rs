use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Deserialize;
use validator::Validate;

use crate::app::{
    db::{self, organizations::Organization},
    domain::{OrganizationId, OrganizationType},
    error::AppError,
    features::pagination::invalid,
    scope::{scope, ResourceKind},
    session::ApiAuthenticatedSession,
    AppState,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrganizationRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 50))]
    pub code: String,
    #[serde(rename = "type", default)]
    pub org_type: OrganizationType,
    pub parent: Option<String>,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: String,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub address: String,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub phone: String,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub email: String,
}

/// POST /api/organizations. Admin only.
pub async fn create_organization(
    ApiAuthenticatedSession(principal): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Json(request): Json<CreateOrganizationRequest>,
) -> Result<(StatusCode, Json<Organization>), AppError> {
    super::require_admin(&principal)?;
    request.validate()?;

    let code = request.code.trim().to_string();
    if db::organizations::code_taken(&state.db, &code, None).await? {
        return Err(invalid("code"));
    }
    if let Some(parent) = request.parent.as_deref() {
        if !db::organizations::exists(&state.db, parent).await? {
            return Err(invalid("parent"));
        }
    }

    let id = OrganizationId::new();
    let organization = db::organizations::NewOrganization {
        id: id.clone(),
        name: request.name,
        code,
        org_type: request.org_type,
        parent_id: request.parent,
        description: request.description,
        address: request.address,
        phone: request.phone,
        email: request.email,
        created_by: Some(principal.user_id.clone()),
    };
    db::organizations::insert(&state.db, &organization).await?;

    let scope = scope(&principal, ResourceKind::Organization);
    let created = db::organizations::find_scoped(&state.db, &scope, &id.as_str())
        .await?
        .ok_or(AppError::Internal)?;

    tracing::info!(organization_id = %created.id, code = %created.code, "organization created");
    Ok((StatusCode::CREATED, Json(created)))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/organizations", post(create_organization))
}
