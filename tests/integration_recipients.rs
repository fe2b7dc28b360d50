mod common;

use axum::http::StatusCode;
use common::{create_recipient, promote_to_moderator, register_and_login, request, spawn_app};
use serde_json::json;

#[tokio::test]
async fn anonymous_requests_are_rejected() {
    let app = spawn_app().await;
    let (status, _) = request(&app.router, "GET", "/recipients", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn members_only_see_their_own_recipients() {
    let app = spawn_app().await;
    // First account is admin; the two under test are plain members
    register_and_login(&app, "admin@example.com", "pw").await;
    let alice = register_and_login(&app, "alice@example.com", "pw").await;
    let bob = register_and_login(&app, "bob@example.com", "pw").await;

    create_recipient(&app, &alice, "a1@example.com").await;
    create_recipient(&app, &alice, "a2@example.com").await;
    create_recipient(&app, &bob, "b1@example.com").await;

    let (status, body) = request(&app.router, "GET", "/recipients", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r["email"].as_str().unwrap().starts_with("a")));

    let (_, body) = request(&app.router, "GET", "/recipients", Some(&bob), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn moderator_sees_all_recipients() {
    let app = spawn_app().await;
    register_and_login(&app, "admin@example.com", "pw").await;
    let alice = register_and_login(&app, "alice@example.com", "pw").await;
    let mod_token = register_and_login(&app, "mod@example.com", "pw").await;
    promote_to_moderator(&app, "mod@example.com").await;

    create_recipient(&app, &alice, "a1@example.com").await;
    create_recipient(&app, &alice, "a2@example.com").await;

    let (status, body) = request(&app.router, "GET", "/recipients", Some(&mod_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn foreign_rows_are_hidden_or_forbidden() {
    let app = spawn_app().await;
    register_and_login(&app, "admin@example.com", "pw").await;
    let alice = register_and_login(&app, "alice@example.com", "pw").await;
    let bob = register_and_login(&app, "bob@example.com", "pw").await;
    let id = create_recipient(&app, &alice, "a1@example.com").await;

    let (status, _) = request(
        &app.router,
        "GET",
        &format!("/recipients/{id}"),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = request(
        &app.router,
        "PATCH",
        &format!("/recipients/{id}"),
        Some(&bob),
        Some(json!({"email": "x@example.com", "name": "X", "comment": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = request(
        &app.router,
        "DELETE",
        &format!("/recipients/{id}"),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Owner can do all of it
    let (status, body) = request(
        &app.router,
        "PATCH",
        &format!("/recipients/{id}"),
        Some(&alice),
        Some(json!({"email": "a1@example.com", "name": "Renamed", "comment": "vip"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Renamed");

    let (status, _) = request(
        &app.router,
        "DELETE",
        &format!("/recipients/{id}"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn recipient_email_is_unique_per_user() {
    let app = spawn_app().await;
    register_and_login(&app, "admin@example.com", "pw").await;
    let alice = register_and_login(&app, "alice@example.com", "pw").await;
    let bob = register_and_login(&app, "bob@example.com", "pw").await;

    create_recipient(&app, &alice, "shared@example.com").await;

    // Same email again for the same owner is rejected
    let (status, body) = request(
        &app.router,
        "POST",
        "/recipients",
        Some(&alice),
        Some(json!({"email": "shared@example.com", "name": "Dup", "comment": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["ok"], false);

    // Another user may register the same address
    create_recipient(&app, &bob, "shared@example.com").await;
}

#[tokio::test]
async fn missing_recipient_is_404() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "alice@example.com", "pw").await;
    let (status, _) = request(&app.router, "GET", "/recipients/999", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
