use std::sync::Arc;

use crate::catalog::JobCatalog;
use crate::recommendation::store::SettingsStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Source of active jobs and seeker profiles. Postgres or the portal API.
    pub catalog: Arc<dyn JobCatalog>,
    /// Recommendation settings override. Redis, or in-memory when REDIS_URL is unset.
    pub settings_store: Arc<dyn SettingsStore>,
}
