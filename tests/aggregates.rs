use serde_json::json;

mod common;

use crate::common::*;
use dataportal::app::domain::UserRole;

struct Fixture {
    org_a: String,
    org_b: String,
    project: String,
    indicator: String,
}

async fn fixture(pool: &sqlx::SqlitePool) -> Fixture {
    let org_a = create_org(pool, "A", None).await;
    let org_b = create_org(pool, "B", None).await;
    let project = create_project(pool, "active", &[&org_a, &org_b]).await;
    let indicator = create_indicator(pool, "People reached").await;
    Fixture {
        org_a,
        org_b,
        project,
        indicator,
    }
}

fn aggregate_body(f: &Fixture, organization: &str, value: i64) -> serde_json::Value {
    json!({
        "indicator": f.indicator,
        "project": f.project,
        "organization": organization,
        "period_start": "2025-01-01",
        "period_end": "2025-03-31",
        "value": value
    })
}

#[tokio::test]
async fn by_indicator_requires_indicator_id() {
    let (pool, app) = setup().await;
    let admin = create_admin(&pool).await;

    let (status, body) = get(&app, "/api/aggregates/by_indicator", &admin.token).await;
    assert_eq!(status, http::StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "indicator_id required");
}

#[tokio::test]
async fn by_indicator_is_scoped() {
    let (pool, app) = setup().await;
    let f = fixture(&pool).await;
    let admin = create_admin(&pool).await;
    post(&app, "/api/aggregates", &admin.token, aggregate_body(&f, &f.org_a, 10)).await;
    post(&app, "/api/aggregates", &admin.token, aggregate_body(&f, &f.org_b, 20)).await;

    let officer_a = create_user(&pool, UserRole::Officer, Some(&f.org_a)).await;
    let uri = format!("/api/aggregates/by_indicator?indicator_id={}", f.indicator);
    let (status, body) = get(&app, &uri, &officer_a.token).await;
    assert_eq!(status, http::StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["organization"], f.org_a);
    assert_eq!(rows[0]["value"], 10);

    let (_, body) = get(&app, &uri, &admin.token).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn create_in_own_organization() {
    let (pool, app) = setup().await;
    let f = fixture(&pool).await;
    let officer_a = create_user(&pool, UserRole::Officer, Some(&f.org_a)).await;

    let (status, body) = post(&app, "/api/aggregates", &officer_a.token, aggregate_body(&f, &f.org_a, 7)).await;
    assert_eq!(status, http::StatusCode::CREATED);
    assert_eq!(body["indicator"], f.indicator);
    assert_eq!(body["indicator_name"], "People reached");
    assert_eq!(body["created_by"], officer_a.id);
}

#[tokio::test]
async fn create_for_other_organization_is_rejected() {
    let (pool, app) = setup().await;
    let f = fixture(&pool).await;
    let officer_a = create_user(&pool, UserRole::Officer, Some(&f.org_a)).await;

    let (status, body) = post(&app, "/api/aggregates", &officer_a.token, aggregate_body(&f, &f.org_b, 7)).await;
    assert_eq!(status, http::StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid input: organization");

    let (_, body) = get(&app, "/api/aggregates", &officer_a.token).await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn create_rejects_reversed_period() {
    let (pool, app) = setup().await;
    let f = fixture(&pool).await;
    let admin = create_admin(&pool).await;
    let mut body = aggregate_body(&f, &f.org_a, 1);
    body["period_end"] = json!("2024-12-31");

    let (status, body) = post(&app, "/api/aggregates", &admin.token, body).await;
    assert_eq!(status, http::StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid input: period_end");
}

#[tokio::test]
async fn update_cannot_move_aggregate_out_of_scope() {
    let (pool, app) = setup().await;
    let f = fixture(&pool).await;
    let officer_a = create_user(&pool, UserRole::Officer, Some(&f.org_a)).await;
    let (_, created) = post(&app, "/api/aggregates", &officer_a.token, aggregate_body(&f, &f.org_a, 3)).await;
    let uri = format!("/api/aggregates/{}", created["id"].as_str().unwrap());

    let (status, _) = patch(&app, &uri, &officer_a.token, json!({ "organization": f.org_b })).await;
    assert_eq!(status, http::StatusCode::BAD_REQUEST);

    let (status, body) = patch(&app, &uri, &officer_a.token, json!({ "value": 9 })).await;
    assert_eq!(status, http::StatusCode::OK);
    assert_eq!(body["value"], 9);
    assert_eq!(body["organization"], f.org_a);
}

#[tokio::test]
async fn list_filters_by_organization() {
    let (pool, app) = setup().await;
    let f = fixture(&pool).await;
    let admin = create_admin(&pool).await;
    post(&app, "/api/aggregates", &admin.token, aggregate_body(&f, &f.org_a, 1)).await;
    let (_, b) = post(&app, "/api/aggregates", &admin.token, aggregate_body(&f, &f.org_b, 2)).await;

    let (status, body) = get(&app, &format!("/api/aggregates?organization={}", f.org_b), &admin.token).await;
    assert_eq!(status, http::StatusCode::OK);
    assert_eq!(result_ids(&body), vec![b["id"].as_str().unwrap().to_string()]);
}

#[tokio::test]
async fn pagination_reports_neighbours() {
    let (pool, app) = setup().await;
    let f = fixture(&pool).await;
    let admin = create_admin(&pool).await;
    for value in 0..3 {
        post(&app, "/api/aggregates", &admin.token, aggregate_body(&f, &f.org_a, value)).await;
    }

    let (status, body) = get(&app, "/api/aggregates?page=2&page_size=2", &admin.token).await;
    assert_eq!(status, http::StatusCode::OK);
    assert_eq!(body["count"], 3);
    assert_eq!(body["results"].as_array().unwrap().len(), 1);
    assert!(body["next"].is_null());
    assert!(!body["previous"].is_null());

    let (status, body) = get(&app, "/api/aggregates?page=0", &admin.token).await;
    assert_eq!(status, http::StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid input: page");

    let uri = format!("/api/aggregates?page={}", i64::MAX);
    let (status, body) = get(&app, &uri, &admin.token).await;
    assert_eq!(status, http::StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid input: page");
}
