use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub public_base_url: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub smtp_from: String,
    pub cache_enabled: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:mailcast.db?mode=rwc".into());
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".into());
        let public_base_url =
            env::var("PUBLIC_BASE_URL").unwrap_or_else(|_| format!("http://{bind_addr}"));

        let smtp_host = env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".into());
        let smtp_port = env::var("SMTP_PORT")
            .ok()
            .map(|v| v.parse::<u16>())
            .transpose()
            .context("SMTP_PORT must be a port number")?
            .unwrap_or(587);
        let smtp_username = env::var("SMTP_USERNAME").unwrap_or_default();
        let smtp_password = env::var("SMTP_PASSWORD").unwrap_or_default();
        let smtp_from = env::var("SMTP_FROM").unwrap_or_else(|_| {
            if smtp_username.contains('@') {
                smtp_username.clone()
            } else {
                "no-reply@mailcast.local".into()
            }
        });

        let cache_enabled = env::var("CACHE_ENABLED")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(true);

        Ok(Config {
            database_url,
            bind_addr,
            public_base_url,
            smtp_host,
            smtp_port,
            smtp_username,
            smtp_password,
            smtp_from,
            cache_enabled,
        })
    }
}
