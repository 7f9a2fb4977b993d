//! Request authentication. Sessions are looked up by opaque id, sent either as a
//! bearer token or as the `session_id` cookie.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use axum_extra::extract::cookie::CookieJar;

use crate::app::{db, domain::Principal, error::AppError, AppState};

/// Name of the cookie carrying the session id.
pub const SESSION_COOKIE: &str = "session_id";

/// Extractor for API routes. Rejects with 401 JSON when there is no valid session.
#[derive(Debug, Clone)]
pub struct ApiAuthenticatedSession(pub Principal);

fn session_id_from(parts: &Parts) -> Option<String> {
    let bearer = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty());

    bearer.or_else(|| {
        CookieJar::from_headers(&parts.headers)
            .get(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
    })
}

#[async_trait]
impl FromRequestParts<AppState> for ApiAuthenticatedSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session_id = session_id_from(parts).ok_or(AppError::Unauthorized)?;

        let session = db::sessions::find_valid(&state.db, &session_id)
            .await?
            .ok_or(AppError::Unauthorized)?;

        let user = db::users::find_by_id(&state.db, &session.user_id)
            .await?
            .filter(|user| user.is_active)
            .ok_or(AppError::Unauthorized)?;

        let principal = user.to_principal().ok_or_else(|| {
            tracing::warn!(user_id = %user.id, role = %user.role, "user has an unknown role");
            AppError::Unauthorized
        })?;

        Ok(ApiAuthenticatedSession(principal))
    }
}
