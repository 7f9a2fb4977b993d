use serde_json::json;

mod common;

use crate::common::*;
use dataportal::app::domain::UserRole;

#[tokio::test]
async fn only_admins_create_organizations() {
    let (pool, app) = setup().await;
    let org = create_org(&pool, "Head office", None).await;
    let manager = create_user(&pool, UserRole::Manager, Some(&org)).await;

    let (status, body) = post(&app, "/api/organizations", &manager.token, json!({ "name": "New", "code": "NEW" })).await;
    assert_eq!(status, http::StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Only administrators can manage organizations");

    let admin = create_admin(&pool).await;
    let (status, body) = post(
        &app,
        "/api/organizations",
        &admin.token,
        json!({ "name": "New", "code": "NEW", "type": "partner", "parent": org }),
    )
    .await;
    assert_eq!(status, http::StatusCode::CREATED);
    assert_eq!(body["parent"], org);
    assert_eq!(body["type"], "partner");
}

#[tokio::test]
async fn duplicate_code_is_rejected() {
    let (pool, app) = setup().await;
    let admin = create_admin(&pool).await;
    post(&app, "/api/organizations", &admin.token, json!({ "name": "One", "code": "DUP" })).await;

    let (status, body) = post(&app, "/api/organizations", &admin.token, json!({ "name": "Two", "code": "DUP" })).await;
    assert_eq!(status, http::StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid input: code");
}

#[tokio::test]
async fn members_see_their_subtree() {
    let (pool, app) = setup().await;
    let root = create_org(&pool, "Root", None).await;
    let region = create_org(&pool, "Region", Some(&root)).await;
    let district = create_org(&pool, "District", Some(&region)).await;
    let sibling = create_org(&pool, "Sibling", Some(&root)).await;
    let officer = create_user(&pool, UserRole::Officer, Some(&region)).await;

    let (status, body) = get(&app, "/api/organizations?ordering=name", &officer.token).await;
    assert_eq!(status, http::StatusCode::OK);
    assert_eq!(result_ids(&body), vec![district.clone(), region.clone()]);

    let (status, _) = get(&app, &format!("/api/organizations/{}", sibling), &officer.token).await;
    assert_eq!(status, http::StatusCode::NOT_FOUND);
    let (status, _) = get(&app, &format!("/api/organizations/{}", root), &officer.token).await;
    assert_eq!(status, http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn tree_nests_children() {
    let (pool, app) = setup().await;
    let root = create_org(&pool, "Root", None).await;
    let child = create_org(&pool, "Child", Some(&root)).await;
    let grandchild = create_org(&pool, "Grandchild", Some(&child)).await;

    let admin = create_admin(&pool).await;
    let (status, body) = get(&app, "/api/organizations/tree", &admin.token).await;
    assert_eq!(status, http::StatusCode::OK);
    let roots = body.as_array().unwrap();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0]["id"], root);
    assert_eq!(roots[0]["children"][0]["id"], child);
    assert_eq!(roots[0]["children"][0]["children"][0]["id"], grandchild);

    let officer = create_user(&pool, UserRole::Officer, Some(&child)).await;
    let (_, body) = get(&app, "/api/organizations/tree", &officer.token).await;
    let roots = body.as_array().unwrap();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0]["id"], child);
}

#[tokio::test]
async fn parent_cannot_be_a_descendant() {
    let (pool, app) = setup().await;
    let root = create_org(&pool, "Root", None).await;
    let child = create_org(&pool, "Child", Some(&root)).await;
    let admin = create_admin(&pool).await;

    let uri = format!("/api/organizations/{}", root);
    let (status, body) = patch(&app, &uri, &admin.token, json!({ "parent": child })).await;
    assert_eq!(status, http::StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid input: parent");

    let (status, _) = patch(&app, &uri, &admin.token, json!({ "parent": root })).await;
    assert_eq!(status, http::StatusCode::BAD_REQUEST);

    let (status, body) = patch(&app, &format!("/api/organizations/{}", child), &admin.token, json!({ "parent": null })).await;
    assert_eq!(status, http::StatusCode::OK);
    assert!(body["parent"].is_null());
}

#[tokio::test]
async fn non_admin_cannot_delete() {
    let (pool, app) = setup().await;
    let org = create_org(&pool, "Org", None).await;
    let manager = create_user(&pool, UserRole::Manager, Some(&org)).await;

    let (status, _) = delete(&app, &format!("/api/organizations/{}", org), &manager.token).await;
    assert_eq!(status, http::StatusCode::FORBIDDEN);

    let admin = create_admin(&pool).await;
    let (status, _) = delete(&app, &format!("/api/organizations/{}", org), &admin.token).await;
    assert_eq!(status, http::StatusCode::NO_CONTENT);
}
