use anyhow::Result;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use mailcast::config::Config;
use mailcast::services::cache::ListCache;
use mailcast::smtp::SmtpMailer;
use mailcast::{app, db, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let pool = db::connect(&config.database_url).await?;
    db::run_migrations(&pool).await?;

    let state = AppState {
        pool,
        mailer: Arc::new(SmtpMailer::from_config(&config)),
        cache: Arc::new(ListCache::default()),
        config: Arc::new(config),
    };

    let addr = state.config.bind_addr.clone();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("listening on {addr}");
    axum::serve(listener, app(state)).await?;
    Ok(())
}
