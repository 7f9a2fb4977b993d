use serde_json::json;

mod common;

use crate::common::*;
use dataportal::app::domain::UserRole;

#[tokio::test]
async fn overview_counts_only_reachable_records() {
    let (pool, app) = setup().await;
    let org_a = create_org(&pool, "A", None).await;
    let org_b = create_org(&pool, "B", None).await;
    let respondent_a = create_respondent(&pool, &org_a, "Ann").await;
    create_respondent(&pool, &org_a, "Abel").await;
    let respondent_b = create_respondent(&pool, &org_b, "Ben").await;
    create_interaction(&pool, &respondent_a).await;
    create_interaction(&pool, &respondent_b).await;
    create_project(&pool, "active", &[&org_a]).await;
    create_project(&pool, "draft", &[&org_a]).await;
    create_project(&pool, "active", &[&org_b]).await;
    create_indicator(&pool, "Shared").await;

    let admin = create_admin(&pool).await;
    let (_, mine) = post(
        &app,
        "/api/activities",
        &admin.token,
        json!({ "title": "Ours", "organization": org_a, "start_date": "2025-04-01" }),
    )
    .await;
    post(
        &app,
        "/api/activities",
        &admin.token,
        json!({ "title": "Theirs", "organization": org_b, "start_date": "2025-04-02" }),
    )
    .await;

    let officer = create_user(&pool, UserRole::Officer, Some(&org_a)).await;
    let (status, body) = get(&app, "/api/analysis/dashboard/overview", &officer.token).await;
    assert_eq!(status, http::StatusCode::OK);
    assert_eq!(body["total_respondents"], 2);
    assert_eq!(body["total_assessments"], 1);
    assert_eq!(body["active_projects"], 1);
    assert_eq!(body["total_indicators"], 1);
    assert!(body["indicators_behind"].is_null());
    let recent = body["recent_activity"].as_array().unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0]["id"], mine["id"]);

    let (_, body) = get(&app, "/api/analysis/dashboard/overview", &admin.token).await;
    assert_eq!(body["total_respondents"], 3);
    assert_eq!(body["active_projects"], 2);
    assert_eq!(body["recent_activity"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn overview_is_empty_without_organization() {
    let (pool, app) = setup().await;
    let org = create_org(&pool, "A", None).await;
    create_respondent(&pool, &org, "Ann").await;
    let loner = create_user(&pool, UserRole::Collector, None).await;

    let (status, body) = get(&app, "/api/analysis/dashboard/overview", &loner.token).await;
    assert_eq!(status, http::StatusCode::OK);
    assert_eq!(body["total_respondents"], 0);
    assert_eq!(body["recent_activity"], json!([]));
}
