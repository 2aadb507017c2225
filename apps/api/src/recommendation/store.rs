//! Persistence for the recommendation settings override.
//!
//! `AppState` carries an `Arc<dyn SettingsStore>`. Redis is used in deployed
//! environments; the in-memory store backs tests and local runs without Redis.

use async_trait::async_trait;
use redis::AsyncCommands;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::recommendation::settings::{resolve_settings, RecommendationSettings};

pub const DEFAULT_SETTINGS_KEY: &str = "jobportal:recommendation_settings";

#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Effective settings. Read failures degrade to defaults.
    async fn load(&self) -> RecommendationSettings;

    /// Persists the normalized settings as the new override.
    async fn save(&self, settings: &RecommendationSettings) -> Result<(), AppError>;

    /// Drops the override so defaults apply again.
    async fn clear(&self) -> Result<(), AppError>;
}

fn encode(settings: &RecommendationSettings) -> Result<String, AppError> {
    serde_json::to_string(&settings.normalized())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to encode settings: {e}")))
}

// ────────────────────────────────────────────────────────────────────────────
// Redis
// ────────────────────────────────────────────────────────────────────────────

pub struct RedisSettingsStore {
    client: redis::Client,
    key: String,
}

impl RedisSettingsStore {
    pub fn new(client: redis::Client, key: impl Into<String>) -> Self {
        Self {
            client,
            key: key.into(),
        }
    }

    async fn read_raw(&self) -> Result<Option<String>, redis::RedisError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.get(&self.key).await
    }
}

#[async_trait]
impl SettingsStore for RedisSettingsStore {
    async fn load(&self) -> RecommendationSettings {
        match self.read_raw().await {
            Ok(raw) => {
                debug!(key = %self.key, present = raw.is_some(), "Loaded recommendation settings");
                resolve_settings(raw.as_deref())
            }
            Err(e) => {
                warn!("Failed to read recommendation settings from Redis: {e}");
                RecommendationSettings::default()
            }
        }
    }

    async fn save(&self, settings: &RecommendationSettings) -> Result<(), AppError> {
        let raw = encode(settings)?;
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.set::<_, _, ()>(&self.key, raw).await?;
        info!(key = %self.key, "Saved recommendation settings override");
        Ok(())
    }

    async fn clear(&self) -> Result<(), AppError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.del::<_, ()>(&self.key).await?;
        info!(key = %self.key, "Cleared recommendation settings override");
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory
// ────────────────────────────────────────────────────────────────────────────

/// Holds the raw override string so loads go through the same merge path as Redis.
#[derive(Default)]
pub struct InMemorySettingsStore {
    raw: RwLock<Option<String>>,
}

impl InMemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with an arbitrary raw override, valid or not.
    #[cfg(test)]
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: RwLock::new(Some(raw.into())),
        }
    }
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn load(&self) -> RecommendationSettings {
        resolve_settings(self.raw.read().await.as_deref())
    }

    async fn save(&self, settings: &RecommendationSettings) -> Result<(), AppError> {
        let raw = encode(settings)?;
        *self.raw.write().await = Some(raw);
        Ok(())
    }

    async fn clear(&self) -> Result<(), AppError> {
        *self.raw.write().await = None;
        Ok(())
    }
}
