pub mod config;
pub mod db;
pub mod models;
pub mod rbac;
pub mod routes;
pub mod services;
pub mod smtp;

use std::sync::Arc;

use axum::extract::FromRef;
use axum::Router;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Arc<config::Config>,
    pub mailer: Arc<dyn smtp::MailSender>,
    pub cache: Arc<services::cache::ListCache>,
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

pub fn app(state: AppState) -> Router {
    routes::routes()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
