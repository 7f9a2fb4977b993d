use http_body_util::BodyExt;
use tower::ServiceExt;

mod common;

use crate::common::*;
use dataportal::app::domain::UserRole;

#[tokio::test]
async fn api_requires_authentication() {
    let (_pool, app) = setup().await;

    let (status, body) = send(&app, "GET", "/api/social/referrals", None, None).await;
    assert_eq!(status, http::StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
async fn unknown_token_is_unauthorized() {
    let (_pool, app) = setup().await;

    let (status, body) = send(&app, "GET", "/api/users/me", Some("not-a-session"), None).await;
    assert_eq!(status, http::StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
async fn expired_session_is_unauthorized() {
    let (pool, app) = setup().await;
    let org = create_org(&pool, "Org", None).await;
    let user = create_user(&pool, UserRole::Officer, Some(&org)).await;
    sqlx::query("UPDATE sessions SET expires_at = 0")
        .execute(&pool)
        .await
        .unwrap();

    let (status, _) = get(&app, "/api/users/me", &user.token).await;
    assert_eq!(status, http::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn deactivated_user_is_unauthorized() {
    let (pool, app) = setup().await;
    let user = create_admin(&pool).await;
    sqlx::query("UPDATE users SET is_active = 0")
        .execute(&pool)
        .await
        .unwrap();

    let (status, _) = get(&app, "/api/users/me", &user.token).await;
    assert_eq!(status, http::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_returns_principal_for_bearer_token() {
    let (pool, app) = setup().await;
    let org = create_org(&pool, "Org", None).await;
    let user = create_user(&pool, UserRole::Manager, Some(&org)).await;

    let (status, body) = get(&app, "/api/users/me", &user.token).await;
    assert_eq!(status, http::StatusCode::OK);
    assert_eq!(body["user_id"], user.id);
    assert_eq!(body["role"], "manager");
    assert_eq!(body["organization_id"], org);
}

#[tokio::test]
async fn session_cookie_is_accepted() {
    let (pool, app) = setup().await;
    let user = create_admin(&pool).await;

    let request = http::Request::builder()
        .method("GET")
        .uri("/api/users/me")
        .header("cookie", format!("session_id={}", user.token))
        .body(axum::body::Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), http::StatusCode::OK);

    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
    assert_eq!(body["role"], "admin");
    assert!(body["organization_id"].is_null());
}
