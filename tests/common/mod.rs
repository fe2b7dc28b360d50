#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt; // for `oneshot`

use mailcast::config::Config;
use mailcast::services::cache::ListCache;
use mailcast::smtp::MailSender;
use mailcast::{app, db, AppState};

/// In-memory mail transport. Addresses containing "bounce" fail the send.
#[derive(Clone, Default)]
pub struct StubMailer {
    pub sent: Arc<Mutex<Vec<(String, String, String)>>>,
}

impl MailSender for StubMailer {
    fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        if to.contains("bounce") {
            anyhow::bail!("mailbox unavailable: {to}");
        }
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), subject.to_string(), body.to_string()));
        Ok(())
    }
}

fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".into(),
        bind_addr: "127.0.0.1:0".into(),
        public_base_url: "http://localhost".into(),
        smtp_host: "localhost".into(),
        smtp_port: 587,
        smtp_username: String::new(),
        smtp_password: String::new(),
        smtp_from: "no-reply@test.local".into(),
        cache_enabled: true,
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub mailer: StubMailer,
}

pub async fn spawn_app() -> TestApp {
    // Single connection so the in-memory database is shared
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    db::run_migrations(&pool).await.unwrap();

    let mailer = StubMailer::default();
    let state = AppState {
        pool,
        config: Arc::new(test_config()),
        mailer: Arc::new(mailer.clone()),
        cache: Arc::new(ListCache::default()),
    };
    TestApp {
        router: app(state.clone()),
        state,
        mailer,
    }
}

pub async fn request(
    router: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        builder = builder.header("Authorization", format!("Bearer {t}"));
    }
    let req = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// Register, confirm via the emailed token and log in. Returns the session
/// token. Note the first user registered in a fresh database becomes admin.
pub async fn register_and_login(app: &TestApp, email: &str, password: &str) -> String {
    let (status, _) = request(
        &app.router,
        "POST",
        "/auth/register",
        None,
        Some(json!({"email": email, "password": password})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let confirm: String = sqlx::query_scalar("SELECT confirm_token FROM users WHERE email = ?")
        .bind(email)
        .fetch_one(&app.state.pool)
        .await
        .unwrap();
    let (status, _) = request(
        &app.router,
        "GET",
        &format!("/auth/email-confirm/{confirm}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    login(app, email, password).await
}

pub async fn login(app: &TestApp, email: &str, password: &str) -> String {
    let (status, body) = request(
        &app.router,
        "POST",
        "/auth/login",
        None,
        Some(json!({"email": email, "password": password})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

pub async fn promote_to_moderator(app: &TestApp, email: &str) {
    sqlx::query("UPDATE users SET role = 'moderator' WHERE email = ?")
        .bind(email)
        .execute(&app.state.pool)
        .await
        .unwrap();
}

pub async fn create_recipient(app: &TestApp, token: &str, email: &str) -> i64 {
    let (status, body) = request(
        &app.router,
        "POST",
        "/recipients",
        Some(token),
        Some(json!({"email": email, "name": "Test Recipient", "comment": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

pub async fn create_message(app: &TestApp, token: &str, subject: &str, body_text: &str) -> i64 {
    let (status, body) = request(
        &app.router,
        "POST",
        "/messages",
        Some(token),
        Some(json!({"subject": subject, "body": body_text})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

pub async fn create_mailing(app: &TestApp, token: &str, message_id: i64, recipient_ids: &[i64]) -> i64 {
    let (status, body) = request(
        &app.router,
        "POST",
        "/mailings",
        Some(token),
        Some(json!({"message_id": message_id, "recipient_ids": recipient_ids})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}
