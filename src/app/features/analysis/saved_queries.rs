//! Saved queries are private to the user who saved them. Organization scope does not
//! apply; not even administrators see another user's queries.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::app::{
    db::{self, saved_queries::SavedQuery},
    error::AppError,
    features::pagination::{invalid, PageParams, Paginated},
    session::ApiAuthenticatedSession,
    AppState,
};

#[derive(Debug, Serialize)]
pub struct SavedQueryResponse {
    #[serde(flatten)]
    pub saved: SavedQuery,
    pub query: Value,
}

impl From<SavedQuery> for SavedQueryResponse {
    fn from(saved: SavedQuery) -> Self {
        let query = serde_json::from_str(&saved.query).unwrap_or_else(|err| {
            tracing::warn!(saved_query_id = %saved.id, %err, "stored saved query is unreadable");
            Value::Object(Default::default())
        });
        Self { saved, query }
    }
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSavedQueryRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: String,
    #[serde(default = "empty_object")]
    pub query: Value,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSavedQueryRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub query: Option<Value>,
}

fn encode_query(query: &Value) -> Result<String, AppError> {
    if !query.is_object() {
        return Err(invalid("query"));
    }
    Ok(query.to_string())
}

/// GET /api/analysis/saved-queries
pub async fn list_saved_queries(
    ApiAuthenticatedSession(principal): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<Paginated<SavedQueryResponse>>, AppError> {
    let page = params.page(&state.config)?;
    let (rows, count) =
        db::saved_queries::list_for_user(&state.db, &principal.user_id, page.size, page.offset()).await?;
    Ok(Json(Paginated::new(rows, count, page).map(SavedQueryResponse::from)))
}

/// POST /api/analysis/saved-queries
pub async fn create_saved_query(
    ApiAuthenticatedSession(principal): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Json(request): Json<CreateSavedQueryRequest>,
) -> Result<(StatusCode, Json<SavedQueryResponse>), AppError> {
    request.validate()?;
    let query = encode_query(&request.query)?;

    let id = ulid::Ulid::new().to_string();
    let saved = db::saved_queries::NewSavedQuery {
        id: id.clone(),
        user_id: principal.user_id.clone(),
        name: request.name,
        description: request.description,
        query,
    };
    db::saved_queries::insert(&state.db, &saved).await?;

    let created = db::saved_queries::find_owned(&state.db, &principal.user_id, &id)
        .await?
        .ok_or(AppError::Internal)?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// GET /api/analysis/saved-queries/:id
pub async fn get_saved_query(
    ApiAuthenticatedSession(principal): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SavedQueryResponse>, AppError> {
    let saved = db::saved_queries::find_owned(&state.db, &principal.user_id, &id)
        .await?
        .ok_or_else(AppError::not_found)?;
    Ok(Json(saved.into()))
}

/// PATCH /api/analysis/saved-queries/:id
pub async fn update_saved_query(
    ApiAuthenticatedSession(principal): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateSavedQueryRequest>,
) -> Result<Json<SavedQueryResponse>, AppError> {
    request.validate()?;

    let existing = db::saved_queries::find_owned(&state.db, &principal.user_id, &id)
        .await?
        .ok_or_else(AppError::not_found)?;

    let query = match request.query.as_ref() {
        Some(query) => encode_query(query)?,
        None => existing.query.clone(),
    };
    db::saved_queries::update(
        &state.db,
        &existing.id,
        request.name.as_deref().unwrap_or(&existing.name),
        request.description.as_deref().unwrap_or(&existing.description),
        &query,
    )
    .await?;

    let updated = db::saved_queries::find_owned(&state.db, &principal.user_id, &existing.id)
        .await?
        .ok_or(AppError::Internal)?;
    Ok(Json(updated.into()))
}

/// DELETE /api/analysis/saved-queries/:id
pub async fn delete_saved_query(
    ApiAuthenticatedSession(principal): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let saved = db::saved_queries::find_owned(&state.db, &principal.user_id, &id)
        .await?
        .ok_or_else(AppError::not_found)?;

    db::saved_queries::delete(&state.db, &saved.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/analysis/saved-queries",
            get(list_saved_queries).post(create_saved_query),
        )
        .route(
            "/api/analysis/saved-queries/:id",
            get(get_saved_query)
                .patch(update_saved_query)
                .delete(delete_saved_query),
        )
}
