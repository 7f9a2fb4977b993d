use serde_json::json;

mod common;

use crate::common::*;
use dataportal::app::domain::UserRole;

/// Orgs A, B, C, D with a respondent in A and one in C.
struct World {
    a: String,
    b: String,
    c: String,
    d: String,
    respondent_a: String,
    respondent_c: String,
}

async fn world(pool: &sqlx::SqlitePool) -> World {
    let a = create_org(pool, "A", None).await;
    let b = create_org(pool, "B", None).await;
    let c = create_org(pool, "C", None).await;
    let d = create_org(pool, "D", None).await;
    let respondent_a = create_respondent(pool, &a, "Amina").await;
    let respondent_c = create_respondent(pool, &c, "Chidi").await;
    World {
        a,
        b,
        c,
        d,
        respondent_a,
        respondent_c,
    }
}

async fn refer(app: &axum::Router, token: &str, respondent: &str, from: &str, to: &str) -> String {
    let (status, body) = post(
        app,
        "/api/social/referrals",
        token,
        json!({
            "respondent": respondent,
            "from_organization": from,
            "to_organization": to,
            "reason": "Needs counselling",
            "referred_date": "2025-02-01"
        }),
    )
    .await;
    assert_eq!(status, http::StatusCode::CREATED, "{}", body);
    body["id"].as_str().unwrap().to_string()
}

mod visibility {
    use super::*;

    #[tokio::test]
    async fn referring_and_receiving_organizations_see_the_referral() {
        let (pool, app) = setup().await;
        let w = world(&pool).await;
        let admin = create_admin(&pool).await;
        let a_to_b = refer(&app, &admin.token, &w.respondent_a, &w.a, &w.b).await;
        let c_to_d = refer(&app, &admin.token, &w.respondent_c, &w.c, &w.d).await;

        let officer_a = create_user(&pool, UserRole::Officer, Some(&w.a)).await;
        let (status, body) = get(&app, "/api/social/referrals", &officer_a.token).await;
        assert_eq!(status, http::StatusCode::OK);
        assert_eq!(body["count"], 1);
        assert_eq!(result_ids(&body), vec![a_to_b.clone()]);

        let officer_b = create_user(&pool, UserRole::Officer, Some(&w.b)).await;
        let (_, body) = get(&app, "/api/social/referrals", &officer_b.token).await;
        assert_eq!(result_ids(&body), vec![a_to_b.clone()]);

        let (status, body) = get(&app, &format!("/api/social/referrals/{}", c_to_d), &officer_a.token).await;
        assert_eq!(status, http::StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Not found");

        let (_, body) = get(&app, "/api/social/referrals", &admin.token).await;
        assert_eq!(body["count"], 2);
    }

    #[tokio::test]
    async fn principal_without_organization_sees_nothing() {
        let (pool, app) = setup().await;
        let w = world(&pool).await;
        let admin = create_admin(&pool).await;
        let a_to_b = refer(&app, &admin.token, &w.respondent_a, &w.a, &w.b).await;

        let loner = create_user(&pool, UserRole::Officer, None).await;
        let (status, body) = get(&app, "/api/social/referrals", &loner.token).await;
        assert_eq!(status, http::StatusCode::OK);
        assert_eq!(body["count"], 0);
        assert!(body["results"].as_array().unwrap().is_empty());

        let (status, _) = get(&app, &format!("/api/social/referrals/{}", a_to_b), &loner.token).await;
        assert_eq!(status, http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn list_filters_by_status() {
        let (pool, app) = setup().await;
        let w = world(&pool).await;
        let admin = create_admin(&pool).await;
        let first = refer(&app, &admin.token, &w.respondent_a, &w.a, &w.b).await;
        refer(&app, &admin.token, &w.respondent_a, &w.a, &w.c).await;
        post(&app, &format!("/api/social/referrals/{}/accept", first), &admin.token, json!({})).await;

        let (_, body) = get(&app, "/api/social/referrals?status=accepted", &admin.token).await;
        assert_eq!(result_ids(&body), vec![first]);
    }
}

mod writes {
    use super::*;

    #[tokio::test]
    async fn create_outside_scope_is_rejected() {
        let (pool, app) = setup().await;
        let w = world(&pool).await;
        let officer_a = create_user(&pool, UserRole::Officer, Some(&w.a)).await;

        let (status, body) = post(
            &app,
            "/api/social/referrals",
            &officer_a.token,
            json!({
                "respondent": w.respondent_a,
                "from_organization": w.c,
                "to_organization": w.d,
                "reason": "Not ours"
            }),
        )
        .await;
        assert_eq!(status, http::StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid input: from_organization");
    }

    #[tokio::test]
    async fn officer_can_refer_own_respondent_out() {
        let (pool, app) = setup().await;
        let w = world(&pool).await;
        let officer_a = create_user(&pool, UserRole::Officer, Some(&w.a)).await;

        let (status, body) = post(
            &app,
            "/api/social/referrals",
            &officer_a.token,
            json!({
                "respondent": w.respondent_a,
                "from_organization": w.a,
                "to_organization": w.b,
                "reason": "Legal aid"
            }),
        )
        .await;
        assert_eq!(status, http::StatusCode::CREATED);
        assert_eq!(body["status"], "pending");
        assert_eq!(body["from_organization"], w.a);
        assert_eq!(body["created_by"], officer_a.id);
        assert!(body["referred_date"].as_str().unwrap().len() == 10);
    }

    #[tokio::test]
    async fn patch_can_reject() {
        let (pool, app) = setup().await;
        let w = world(&pool).await;
        let admin = create_admin(&pool).await;
        let id = refer(&app, &admin.token, &w.respondent_a, &w.a, &w.b).await;
        let officer_b = create_user(&pool, UserRole::Officer, Some(&w.b)).await;

        let (status, body) = patch(
            &app,
            &format!("/api/social/referrals/{}", id),
            &officer_b.token,
            json!({ "status": "rejected", "notes": "No capacity" }),
        )
        .await;
        assert_eq!(status, http::StatusCode::OK);
        assert_eq!(body["status"], "rejected");
        assert_eq!(body["notes"], "No capacity");
        assert_eq!(body["reason"], "Needs counselling");
    }

    #[tokio::test]
    async fn delete_outside_scope_is_not_found() {
        let (pool, app) = setup().await;
        let w = world(&pool).await;
        let admin = create_admin(&pool).await;
        let id = refer(&app, &admin.token, &w.respondent_c, &w.c, &w.d).await;
        let officer_a = create_user(&pool, UserRole::Officer, Some(&w.a)).await;

        let (status, _) = delete(&app, &format!("/api/social/referrals/{}", id), &officer_a.token).await;
        assert_eq!(status, http::StatusCode::NOT_FOUND);

        let (status, _) = delete(&app, &format!("/api/social/referrals/{}", id), &admin.token).await;
        assert_eq!(status, http::StatusCode::NO_CONTENT);
    }
}

mod transitions {
    use super::*;

    #[tokio::test]
    async fn receiving_organization_accepts() {
        let (pool, app) = setup().await;
        let w = world(&pool).await;
        let admin = create_admin(&pool).await;
        let id = refer(&app, &admin.token, &w.respondent_a, &w.a, &w.b).await;
        let officer_b = create_user(&pool, UserRole::Officer, Some(&w.b)).await;

        let (status, body) = post(&app, &format!("/api/social/referrals/{}/accept", id), &officer_b.token, json!({})).await;
        assert_eq!(status, http::StatusCode::OK);
        assert_eq!(body["status"], "accepted");
        assert!(body["completed_date"].is_null());
    }

    #[tokio::test]
    async fn complete_stamps_date_and_is_repeatable() {
        let (pool, app) = setup().await;
        let w = world(&pool).await;
        let admin = create_admin(&pool).await;
        let id = refer(&app, &admin.token, &w.respondent_a, &w.a, &w.b).await;
        let uri = format!("/api/social/referrals/{}/complete", id);

        let (status, first) = post(&app, &uri, &admin.token, json!({})).await;
        assert_eq!(status, http::StatusCode::OK);
        assert_eq!(first["status"], "completed");
        assert!(first["completed_date"].is_string());

        let (status, second) = post(&app, &uri, &admin.token, json!({})).await;
        assert_eq!(status, http::StatusCode::OK);
        assert_eq!(second["status"], "completed");
        assert_eq!(second["completed_date"], first["completed_date"]);
    }

    #[tokio::test]
    async fn transition_outside_scope_is_not_found() {
        let (pool, app) = setup().await;
        let w = world(&pool).await;
        let admin = create_admin(&pool).await;
        let id = refer(&app, &admin.token, &w.respondent_c, &w.c, &w.d).await;
        let officer_a = create_user(&pool, UserRole::Officer, Some(&w.a)).await;

        let (status, _) = post(&app, &format!("/api/social/referrals/{}/accept", id), &officer_a.token, json!({})).await;
        assert_eq!(status, http::StatusCode::NOT_FOUND);

        let (_, body) = get(&app, &format!("/api/social/referrals/{}", id), &admin.token).await;
        assert_eq!(body["status"], "pending");
    }
}
