use anyhow::Result;
use tokio::sync::RwLock;

use crate::models::mailing::Mailing;
use crate::models::message::Message;
use crate::models::recipient::Recipient;
use crate::services::{mailing_service, message_service, recipient_service};
use crate::AppState;

/// Read-through cache over the unfiltered list queries. Only the elevated
/// list views go through here; member views always query scoped by owner.
#[derive(Default)]
pub struct ListCache {
    pub recipients: RwLock<Option<Vec<Recipient>>>,
    pub messages: RwLock<Option<Vec<Message>>>,
    pub mailings: RwLock<Option<Vec<Mailing>>>,
}

pub async fn all_recipients(state: &AppState) -> Result<Vec<Recipient>> {
    if !state.config.cache_enabled {
        return recipient_service::list_all(&state.pool).await;
    }
    if let Some(cached) = state.cache.recipients.read().await.clone() {
        return Ok(cached);
    }
    let rows = recipient_service::list_all(&state.pool).await?;
    *state.cache.recipients.write().await = Some(rows.clone());
    Ok(rows)
}

pub async fn all_messages(state: &AppState) -> Result<Vec<Message>> {
    if !state.config.cache_enabled {
        return message_service::list_all(&state.pool).await;
    }
    if let Some(cached) = state.cache.messages.read().await.clone() {
        return Ok(cached);
    }
    let rows = message_service::list_all(&state.pool).await?;
    *state.cache.messages.write().await = Some(rows.clone());
    Ok(rows)
}

pub async fn all_mailings(state: &AppState) -> Result<Vec<Mailing>> {
    if !state.config.cache_enabled {
        return mailing_service::list_all(&state.pool).await;
    }
    if let Some(cached) = state.cache.mailings.read().await.clone() {
        return Ok(cached);
    }
    let rows = mailing_service::list_all(&state.pool).await?;
    *state.cache.mailings.write().await = Some(rows.clone());
    Ok(rows)
}

pub async fn invalidate_recipients(state: &AppState) {
    *state.cache.recipients.write().await = None;
}

pub async fn invalidate_messages(state: &AppState) {
    *state.cache.messages.write().await = None;
}

pub async fn invalidate_mailings(state: &AppState) {
    *state.cache.mailings.write().await = None;
}
