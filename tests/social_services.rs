use serde_json::json;

mod common;

use crate::common::*;
use dataportal::app::domain::UserRole;

fn service(respondent: &str) -> serde_json::Value {
    json!({
        "respondent": respondent,
        "service_type": "counselling",
        "start_date": "2025-05-01"
    })
}

#[tokio::test]
async fn services_follow_respondent_organization() {
    let (pool, app) = setup().await;
    let org_a = create_org(&pool, "A", None).await;
    let org_b = create_org(&pool, "B", None).await;
    let respondent_a = create_respondent(&pool, &org_a, "Ann").await;
    let respondent_b = create_respondent(&pool, &org_b, "Ben").await;
    let admin = create_admin(&pool).await;
    let (_, mine) = post(&app, "/api/social/services", &admin.token, service(&respondent_a)).await;
    let (_, theirs) = post(&app, "/api/social/services", &admin.token, service(&respondent_b)).await;

    let officer = create_user(&pool, UserRole::Officer, Some(&org_a)).await;
    let (status, body) = get(&app, "/api/social/services", &officer.token).await;
    assert_eq!(status, http::StatusCode::OK);
    assert_eq!(result_ids(&body), vec![mine["id"].as_str().unwrap().to_string()]);
    assert_eq!(body["results"][0]["respondent_name"], "Ann Doe");
    assert_eq!(body["results"][0]["status"], "active");

    let uri = format!("/api/social/services/{}", theirs["id"].as_str().unwrap());
    let (status, _) = get(&app, &uri, &officer.token).await;
    assert_eq!(status, http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn service_for_foreign_respondent_is_rejected() {
    let (pool, app) = setup().await;
    let org_a = create_org(&pool, "A", None).await;
    let org_b = create_org(&pool, "B", None).await;
    let outsider = create_respondent(&pool, &org_b, "Ben").await;
    let officer = create_user(&pool, UserRole::Officer, Some(&org_a)).await;

    let (status, body) = post(&app, "/api/social/services", &officer.token, service(&outsider)).await;
    assert_eq!(status, http::StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid input: respondent");
}

#[tokio::test]
async fn patch_closes_service() {
    let (pool, app) = setup().await;
    let org = create_org(&pool, "A", None).await;
    let respondent = create_respondent(&pool, &org, "Ann").await;
    let officer = create_user(&pool, UserRole::Officer, Some(&org)).await;
    let (status, created) = post(&app, "/api/social/services", &officer.token, service(&respondent)).await;
    assert_eq!(status, http::StatusCode::CREATED);
    let uri = format!("/api/social/services/{}", created["id"].as_str().unwrap());

    let (status, body) = patch(
        &app,
        &uri,
        &officer.token,
        json!({ "status": "completed", "end_date": "2025-06-01" }),
    )
    .await;
    assert_eq!(status, http::StatusCode::OK);
    assert_eq!(body["status"], "completed");
    assert_eq!(body["end_date"], "2025-06-01");

    let (status, body) = patch(&app, &uri, &officer.token, json!({ "end_date": "2025-04-01" })).await;
    assert_eq!(status, http::StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid input: end_date");

    let (status, _) = delete(&app, &uri, &officer.token).await;
    assert_eq!(status, http::StatusCode::NO_CONTENT);
}
