#![allow(dead_code)]

use axum::body::Body;
use dataportal::app::{
    config::Config,
    db,
    domain::{OrganizationId, OrganizationType, UserId, UserRole},
    AppState,
};
use dataportal::create_router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use time::{Duration, OffsetDateTime};
use tower::ServiceExt;

/// One connection kept alive for the whole test, so the in-memory database survives.
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    pool
}

pub fn test_router(pool: SqlitePool) -> axum::Router {
    let state = AppState {
        db: pool,
        config: Config::for_tests(),
    };
    create_router(state)
}

/// Pool and router over the same database.
pub async fn setup() -> (SqlitePool, axum::Router) {
    let pool = test_pool().await;
    let app = test_router(pool.clone());
    (pool, app)
}

pub fn unique_code(prefix: &str) -> String {
    format!("{}-{}", prefix, ulid::Ulid::new())
}

/// Create an organization directly in the database. Returns its id.
pub async fn create_org(pool: &SqlitePool, name: &str, parent: Option<&str>) -> String {
    let id = OrganizationId::new();
    let organization = db::organizations::NewOrganization {
        id: id.clone(),
        name: name.to_string(),
        code: unique_code(name),
        org_type: OrganizationType::Ngo,
        parent_id: parent.map(str::to_string),
        description: String::new(),
        address: String::new(),
        phone: String::new(),
        email: String::new(),
        created_by: None,
    };
    db::organizations::insert(pool, &organization).await.unwrap();
    id.as_str()
}

/// A signed-in user.
pub struct TestUser {
    pub id: String,
    pub token: String,
}

/// Create a user with a valid session. Returns the user id and bearer token.
pub async fn create_user(pool: &SqlitePool, role: UserRole, organization: Option<&str>) -> TestUser {
    let id = UserId::new();
    let user = db::NewUser {
        id: id.clone(),
        username: unique_code("user"),
        email: String::new(),
        role,
        organization_id: organization.map(str::to_string),
    };
    db::users::insert(pool, &user).await.unwrap();
    let token = db::sessions::create(pool, &id.as_str(), OffsetDateTime::now_utc() + Duration::hours(1))
        .await
        .unwrap();
    TestUser { id: id.as_str(), token }
}

pub async fn create_admin(pool: &SqlitePool) -> TestUser {
    create_user(pool, UserRole::Admin, None).await
}

pub async fn create_respondent(pool: &SqlitePool, organization: &str, first_name: &str) -> String {
    let id = ulid::Ulid::new().to_string();
    let respondent = db::respondents::NewRespondent {
        id: id.clone(),
        organization_id: organization.to_string(),
        first_name: first_name.to_string(),
        last_name: "Doe".to_string(),
        is_anonymous: false,
        created_by: None,
    };
    db::respondents::insert(pool, &respondent).await.unwrap();
    id
}

pub async fn create_interaction(pool: &SqlitePool, respondent: &str) -> String {
    let id = ulid::Ulid::new().to_string();
    let interaction = db::interactions::NewInteraction {
        id: id.clone(),
        respondent_id: respondent.to_string(),
        interaction_date: "2025-01-15".to_string(),
        created_by: None,
    };
    db::interactions::insert(pool, &interaction).await.unwrap();
    id
}

pub async fn create_project(pool: &SqlitePool, status: &str, organizations: &[&str]) -> String {
    let id = ulid::Ulid::new().to_string();
    let project = db::projects::NewProject {
        id: id.clone(),
        name: "Project".to_string(),
        code: unique_code("proj"),
        status: status.to_string(),
    };
    db::projects::insert(pool, &project).await.unwrap();
    for organization in organizations {
        db::projects::add_organization(pool, &id, organization).await.unwrap();
    }
    id
}

pub async fn create_indicator(pool: &SqlitePool, name: &str) -> String {
    let id = ulid::Ulid::new().to_string();
    let indicator = db::indicators::NewIndicator {
        id: id.clone(),
        name: name.to_string(),
        code: unique_code("ind"),
        is_active: true,
    };
    db::indicators::insert(pool, &indicator).await.unwrap();
    id
}

/// Send a JSON request with a bearer token. Returns status and decoded body (Null when empty).
pub async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (http::StatusCode, Value) {
    let mut builder = http::Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

pub async fn get(app: &axum::Router, uri: &str, token: &str) -> (http::StatusCode, Value) {
    send(app, "GET", uri, Some(token), None).await
}

pub async fn post(app: &axum::Router, uri: &str, token: &str, body: Value) -> (http::StatusCode, Value) {
    send(app, "POST", uri, Some(token), Some(body)).await
}

pub async fn patch(app: &axum::Router, uri: &str, token: &str, body: Value) -> (http::StatusCode, Value) {
    send(app, "PATCH", uri, Some(token), Some(body)).await
}

pub async fn delete(app: &axum::Router, uri: &str, token: &str) -> (http::StatusCode, Value) {
    send(app, "DELETE", uri, Some(token), None).await
}

/// Ids of a list response's `results`, in order.
pub fn result_ids(body: &Value) -> Vec<String> {
    body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["id"].as_str().unwrap().to_string())
        .collect()
}
