mod common;

use axum::http::StatusCode;
use common::{
    create_mailing, create_message, create_recipient, register_and_login, request, spawn_app,
};
use serde_json::json;

#[tokio::test]
async fn mailing_starts_in_created_status() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "owner@example.com", "pw").await;

    let r1 = create_recipient(&app, &token, "a@example.com").await;
    let msg = create_message(&app, &token, "Hello", "Body").await;
    let mailing = create_mailing(&app, &token, msg, &[r1]).await;

    let (status, body) = request(
        &app.router,
        "GET",
        &format!("/mailings/{mailing}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "created");
    assert!(body["start_of_sending"].is_null());
    assert!(body["end_of_sending"].is_null());
    assert_eq!(body["recipient_ids"], json!([r1]));
}

#[tokio::test]
async fn mailing_requires_owned_message_and_recipients() {
    let app = spawn_app().await;
    register_and_login(&app, "admin@example.com", "pw").await;
    let alice = register_and_login(&app, "alice@example.com", "pw").await;
    let bob = register_and_login(&app, "bob@example.com", "pw").await;

    let alice_recipient = create_recipient(&app, &alice, "a@example.com").await;
    let alice_msg = create_message(&app, &alice, "Hello", "Body").await;

    // Bob cannot build a mailing from Alice's message
    let (status, _) = request(
        &app.router,
        "POST",
        "/mailings",
        Some(&bob),
        Some(json!({"message_id": alice_msg, "recipient_ids": []})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Nor reference her recipients from his own message
    let bob_msg = create_message(&app, &bob, "Hi", "Text").await;
    let (status, _) = request(
        &app.router,
        "POST",
        "/mailings",
        Some(&bob),
        Some(json!({"message_id": bob_msg, "recipient_ids": [alice_recipient]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn mailing_update_replaces_recipient_set() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "owner@example.com", "pw").await;

    let r1 = create_recipient(&app, &token, "a@example.com").await;
    let r2 = create_recipient(&app, &token, "b@example.com").await;
    let msg = create_message(&app, &token, "Hello", "Body").await;
    let mailing = create_mailing(&app, &token, msg, &[r1]).await;

    let (status, body) = request(
        &app.router,
        "PATCH",
        &format!("/mailings/{mailing}"),
        Some(&token),
        Some(json!({"recipient_ids": [r2]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recipient_ids"], json!([r2]));
    assert_eq!(body["message_id"], msg);
}

#[tokio::test]
async fn deleting_a_mailing_keeps_other_data() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "owner@example.com", "pw").await;

    let r1 = create_recipient(&app, &token, "a@example.com").await;
    let msg = create_message(&app, &token, "Hello", "Body").await;
    let mailing = create_mailing(&app, &token, msg, &[r1]).await;

    let (status, _) = request(
        &app.router,
        "DELETE",
        &format!("/mailings/{mailing}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = request(
        &app.router,
        "GET",
        &format!("/mailings/{mailing}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Message and recipient survive
    let (status, _) = request(
        &app.router,
        "GET",
        &format!("/messages/{msg}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = request(
        &app.router,
        "GET",
        &format!("/recipients/{r1}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}
