//! Integration tests for the `/api/v1/projects` routes.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, create_project, delete, get, patch_json, post_json, token_for,
};
use serde_json::json;

#[tokio::test]
async fn routes_require_a_valid_token() {
    let app = build_test_app();

    let missing = get(&app.router, "/api/v1/projects", None).await;
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(missing).await["code"], "UNAUTHORIZED");

    let garbage = get(&app.router, "/api/v1/projects", Some("not-a-jwt")).await;
    assert_eq!(garbage.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_returns_201_with_trimmed_title() {
    let app = build_test_app();
    let token = token_for("owner-1");

    let project = create_project(&app.router, &token, "  The Lighthouse  ").await;

    assert_eq!(project["title"], "The Lighthouse");
    assert_eq!(project["owner_id"], "owner-1");
    assert_eq!(project["story_text"], "Once upon a time.");
    assert!(project["id"].is_string());
    assert!(project["created_at"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn create_rejects_invalid_input() {
    let app = build_test_app();
    let token = token_for("owner-1");

    let short_title = post_json(
        &app.router,
        "/api/v1/projects",
        Some(&token),
        json!({ "title": "ab", "story_text": "story" }),
    )
    .await;
    assert_eq!(short_title.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(short_title).await["code"], "VALIDATION_ERROR");

    let oversized = post_json(
        &app.router,
        "/api/v1/projects",
        Some(&token),
        json!({ "title": "Long one", "story_text": "x".repeat(50_001) }),
    )
    .await;
    assert_eq!(oversized.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let malformed = post_json(&app.router, "/api/v1/projects", Some(&token), json!([1, 2])).await;
    assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(malformed).await["code"], "BAD_REQUEST");

    assert!(app.remote.snapshot().is_empty());
}

#[tokio::test]
async fn list_is_scoped_to_owner_newest_first() {
    let app = build_test_app();
    let alice = token_for("alice");
    let bob = token_for("bob");

    let first = create_project(&app.router, &alice, "First story").await;
    create_project(&app.router, &bob, "Bob's story").await;
    let second = create_project(&app.router, &alice, "Second story").await;

    let response = get(&app.router, "/api/v1/projects", Some(&alice)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let ids: Vec<_> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].clone())
        .collect();
    assert_eq!(ids, vec![second["id"].clone(), first["id"].clone()]);
}

#[tokio::test]
async fn another_owners_project_is_reported_as_missing() {
    let app = build_test_app();
    let alice = token_for("alice");
    let bob = token_for("bob");
    let project = create_project(&app.router, &alice, "Private story").await;
    let uri = format!("/api/v1/projects/{}", project["id"].as_str().unwrap());

    let read = get(&app.router, &uri, Some(&bob)).await;
    assert_eq!(read.status(), StatusCode::NOT_FOUND);
    let body = body_json(read).await;
    assert_eq!(body["code"], "NOT_FOUND");
    assert!(body.get("data").is_none());

    let write = patch_json(&app.router, &uri, Some(&bob), json!({ "title": "Stolen" })).await;
    assert_eq!(write.status(), StatusCode::NOT_FOUND);

    let removal = delete(&app.router, &uri, Some(&bob)).await;
    assert_eq!(removal.status(), StatusCode::NOT_FOUND);

    assert_eq!(app.remote.snapshot()[0].title, "Private story");
}

#[tokio::test]
async fn patch_updates_only_given_fields() {
    let app = build_test_app();
    let token = token_for("owner-1");
    let project = create_project(&app.router, &token, "Draft title").await;
    let uri = format!("/api/v1/projects/{}", project["id"].as_str().unwrap());

    let response = patch_json(
        &app.router,
        &uri,
        Some(&token),
        json!({
            "visual_style": "noir",
            "storyboard": [{ "description": "A rainy street" }]
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await["data"].clone();
    assert_eq!(updated["title"], "Draft title");
    assert_eq!(updated["visual_style"], "noir");
    assert_eq!(updated["storyboard"][0]["description"], "A rainy street");
    assert_eq!(updated["created_at"], project["created_at"]);
}

#[tokio::test]
async fn patch_validates_title() {
    let app = build_test_app();
    let token = token_for("owner-1");
    let project = create_project(&app.router, &token, "Draft title").await;
    let uri = format!("/api/v1/projects/{}", project["id"].as_str().unwrap());

    let response = patch_json(&app.router, &uri, Some(&token), json!({ "title": " x " })).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.remote.snapshot()[0].title, "Draft title");
}

#[tokio::test]
async fn delete_returns_204_then_404() {
    let app = build_test_app();
    let token = token_for("owner-1");
    let project = create_project(&app.router, &token, "Short lived").await;
    let uri = format!("/api/v1/projects/{}", project["id"].as_str().unwrap());

    let first = delete(&app.router, &uri, Some(&token)).await;
    assert_eq!(first.status(), StatusCode::NO_CONTENT);

    let second = delete(&app.router, &uri, Some(&token)).await;
    assert_eq!(second.status(), StatusCode::NOT_FOUND);

    let read = get(&app.router, &uri, Some(&token)).await;
    assert_eq!(read.status(), StatusCode::NOT_FOUND);
}
