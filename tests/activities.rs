use serde_json::json;

mod common;

use crate::common::*;
use dataportal::app::domain::UserRole;

async fn create_event(app: &axum::Router, token: &str, organization: &str, expected: i64) -> serde_json::Value {
    let (status, body) = post(
        app,
        "/api/activities",
        token,
        json!({
            "title": "Community training",
            "type": "training",
            "organization": organization,
            "start_date": "2025-03-01",
            "expected_participants": expected
        }),
    )
    .await;
    assert_eq!(status, http::StatusCode::CREATED, "{}", body);
    body
}

mod events {
    use super::*;

    #[tokio::test]
    async fn create_links_indicators() {
        let (pool, app) = setup().await;
        let org = create_org(&pool, "A", None).await;
        let indicator = create_indicator(&pool, "Trainings held").await;
        let officer = create_user(&pool, UserRole::Officer, Some(&org)).await;

        let (status, body) = post(
            &app,
            "/api/activities",
            &officer.token,
            json!({
                "title": "Workshop",
                "organization": org,
                "start_date": "2025-03-01",
                "end_date": "2025-03-02",
                "indicators": [indicator, indicator]
            }),
        )
        .await;
        assert_eq!(status, http::StatusCode::CREATED);
        assert_eq!(body["type"], "other");
        assert_eq!(body["status"], "planned");
        assert_eq!(body["indicators"], json!([indicator]));
        assert_eq!(body["attendance_rate"], 0);
    }

    #[tokio::test]
    async fn create_rejects_unknown_indicator() {
        let (pool, app) = setup().await;
        let org = create_org(&pool, "A", None).await;
        let admin = create_admin(&pool).await;

        let (status, body) = post(
            &app,
            "/api/activities",
            &admin.token,
            json!({
                "title": "Workshop",
                "organization": org,
                "start_date": "2025-03-01",
                "indicators": ["missing"]
            }),
        )
        .await;
        assert_eq!(status, http::StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid input: indicators");
    }

    #[tokio::test]
    async fn end_before_start_is_rejected() {
        let (pool, app) = setup().await;
        let org = create_org(&pool, "A", None).await;
        let admin = create_admin(&pool).await;

        let (status, body) = post(
            &app,
            "/api/activities",
            &admin.token,
            json!({
                "title": "Backwards",
                "organization": org,
                "start_date": "2025-03-05",
                "end_date": "2025-03-01"
            }),
        )
        .await;
        assert_eq!(status, http::StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid input: end_date");
    }

    #[tokio::test]
    async fn other_organizations_events_are_hidden() {
        let (pool, app) = setup().await;
        let org_a = create_org(&pool, "A", None).await;
        let org_b = create_org(&pool, "B", None).await;
        let admin = create_admin(&pool).await;
        let mine = create_event(&app, &admin.token, &org_a, 0).await;
        let theirs = create_event(&app, &admin.token, &org_b, 0).await;
        let officer = create_user(&pool, UserRole::Officer, Some(&org_a)).await;

        let (_, body) = get(&app, "/api/activities", &officer.token).await;
        assert_eq!(result_ids(&body), vec![mine["id"].as_str().unwrap().to_string()]);

        let uri = format!("/api/activities/{}", theirs["id"].as_str().unwrap());
        let (status, _) = get(&app, &uri, &officer.token).await;
        assert_eq!(status, http::StatusCode::NOT_FOUND);
        let (status, _) = patch(&app, &uri, &officer.token, json!({ "title": "Mine now" })).await;
        assert_eq!(status, http::StatusCode::NOT_FOUND);
        let (status, _) = delete(&app, &uri, &officer.token).await;
        assert_eq!(status, http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn patch_clears_project() {
        let (pool, app) = setup().await;
        let org = create_org(&pool, "A", None).await;
        let project = create_project(&pool, "active", &[&org]).await;
        let admin = create_admin(&pool).await;
        let event = create_event(&app, &admin.token, &org, 0).await;
        let uri = format!("/api/activities/{}", event["id"].as_str().unwrap());

        let (_, body) = patch(&app, &uri, &admin.token, json!({ "project": project })).await;
        assert_eq!(body["project"], project);

        let (status, body) = patch(&app, &uri, &admin.token, json!({ "project": null })).await;
        assert_eq!(status, http::StatusCode::OK);
        assert!(body["project"].is_null());
        assert_eq!(body["title"], "Community training");
    }

    #[tokio::test]
    async fn huge_participant_counts_still_serialise() {
        let (pool, app) = setup().await;
        let org = create_org(&pool, "A", None).await;
        let admin = create_admin(&pool).await;
        let event = create_event(&app, &admin.token, &org, 10).await;
        let uri = format!("/api/activities/{}", event["id"].as_str().unwrap());

        let (status, body) = patch(&app, &uri, &admin.token, json!({ "actual_participants": 100_000_000_000_000_000i64 })).await;
        assert_eq!(status, http::StatusCode::OK);
        assert_eq!(body["attendance_rate"], 1_000_000_000_000_000_000i64);

        let (status, _) = get(&app, "/api/activities", &admin.token).await;
        assert_eq!(status, http::StatusCode::OK);
    }
}

mod participants {
    use super::*;

    #[tokio::test]
    async fn adding_participants_recounts_attendance() {
        let (pool, app) = setup().await;
        let org = create_org(&pool, "A", None).await;
        let respondent = create_respondent(&pool, &org, "Grace").await;
        let officer = create_user(&pool, UserRole::Officer, Some(&org)).await;
        let event = create_event(&app, &officer.token, &org, 3).await;
        let id = event["id"].as_str().unwrap();
        let uri = format!("/api/activities/{}/add_participant", id);

        let (status, body) = post(&app, &uri, &officer.token, json!({ "respondent": respondent })).await;
        assert_eq!(status, http::StatusCode::CREATED);
        assert_eq!(body["respondent"], respondent);
        assert_eq!(body["respondent_name"], "Grace Doe");
        assert_eq!(body["attended"], true);

        post(&app, &uri, &officer.token, json!({ "name": "Walk-in" })).await;
        post(&app, &uri, &officer.token, json!({ "name": "No show", "attended": false })).await;

        let (status, body) = get(&app, &format!("/api/activities/{}", id), &officer.token).await;
        assert_eq!(status, http::StatusCode::OK);
        assert_eq!(body["actual_participants"], 2);
        assert_eq!(body["attendance_rate"], 67);
        assert_eq!(body["participants"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn respondent_registers_once() {
        let (pool, app) = setup().await;
        let org = create_org(&pool, "A", None).await;
        let respondent = create_respondent(&pool, &org, "Grace").await;
        let admin = create_admin(&pool).await;
        let event = create_event(&app, &admin.token, &org, 0).await;
        let uri = format!("/api/activities/{}/add_participant", event["id"].as_str().unwrap());

        let (status, _) = post(&app, &uri, &admin.token, json!({ "respondent": respondent })).await;
        assert_eq!(status, http::StatusCode::CREATED);
        let (status, body) = post(&app, &uri, &admin.token, json!({ "respondent": respondent })).await;
        assert_eq!(status, http::StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid input"));

        let (_, body) = get(&app, &format!("/api/activities/{}", event["id"].as_str().unwrap()), &admin.token).await;
        assert_eq!(body["actual_participants"], 1);
    }

    #[tokio::test]
    async fn anonymous_participant_needs_a_name() {
        let (pool, app) = setup().await;
        let org = create_org(&pool, "A", None).await;
        let admin = create_admin(&pool).await;
        let event = create_event(&app, &admin.token, &org, 0).await;
        let uri = format!("/api/activities/{}/add_participant", event["id"].as_str().unwrap());

        let (status, body) = post(&app, &uri, &admin.token, json!({ "name": "  " })).await;
        assert_eq!(status, http::StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid input: name");
    }

    #[tokio::test]
    async fn respondent_from_another_organization_is_rejected() {
        let (pool, app) = setup().await;
        let org_a = create_org(&pool, "A", None).await;
        let org_b = create_org(&pool, "B", None).await;
        let outsider = create_respondent(&pool, &org_b, "Other").await;
        let officer = create_user(&pool, UserRole::Officer, Some(&org_a)).await;
        let event = create_event(&app, &officer.token, &org_a, 0).await;
        let uri = format!("/api/activities/{}/add_participant", event["id"].as_str().unwrap());

        let (status, body) = post(&app, &uri, &officer.token, json!({ "respondent": outsider })).await;
        assert_eq!(status, http::StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid input: respondent");
    }

    #[tokio::test]
    async fn participant_list_follows_event_scope() {
        let (pool, app) = setup().await;
        let org_a = create_org(&pool, "A", None).await;
        let org_b = create_org(&pool, "B", None).await;
        let admin = create_admin(&pool).await;
        let event_a = create_event(&app, &admin.token, &org_a, 0).await;
        let event_b = create_event(&app, &admin.token, &org_b, 0).await;
        let (_, mine) = post(
            &app,
            &format!("/api/activities/{}/add_participant", event_a["id"].as_str().unwrap()),
            &admin.token,
            json!({ "name": "Ours" }),
        )
        .await;
        post(
            &app,
            &format!("/api/activities/{}/add_participant", event_b["id"].as_str().unwrap()),
            &admin.token,
            json!({ "name": "Theirs" }),
        )
        .await;

        let officer = create_user(&pool, UserRole::Officer, Some(&org_a)).await;
        let (status, body) = get(&app, "/api/activities/participants", &officer.token).await;
        assert_eq!(status, http::StatusCode::OK);
        assert_eq!(result_ids(&body), vec![mine["id"].as_str().unwrap().to_string()]);
    }
}

mod complete {
    use super::*;

    #[tokio::test]
    async fn complete_sets_status_and_recounts() {
        let (pool, app) = setup().await;
        let org = create_org(&pool, "A", None).await;
        let admin = create_admin(&pool).await;
        let event = create_event(&app, &admin.token, &org, 4).await;
        let id = event["id"].as_str().unwrap();
        post(&app, &format!("/api/activities/{}/add_participant", id), &admin.token, json!({ "name": "One" })).await;
        sqlx::query("UPDATE events SET actual_participants = 99")
            .execute(&pool)
            .await
            .unwrap();

        let (status, body) = post(&app, &format!("/api/activities/{}/complete", id), &admin.token, json!({})).await;
        assert_eq!(status, http::StatusCode::OK);
        assert_eq!(body["status"], "completed");
        assert_eq!(body["actual_participants"], 1);
        assert_eq!(body["attendance_rate"], 25);
    }

    #[tokio::test]
    async fn complete_outside_scope_is_not_found() {
        let (pool, app) = setup().await;
        let org_a = create_org(&pool, "A", None).await;
        let org_b = create_org(&pool, "B", None).await;
        let admin = create_admin(&pool).await;
        let event = create_event(&app, &admin.token, &org_b, 0).await;
        let officer = create_user(&pool, UserRole::Officer, Some(&org_a)).await;

        let uri = format!("/api/activities/{}/complete", event["id"].as_str().unwrap());
        let (status, _) = post(&app, &uri, &officer.token, json!({})).await;
        assert_eq!(status, http::StatusCode::NOT_FOUND);
    }
}
