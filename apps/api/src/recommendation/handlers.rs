//! Axum route handlers for the Recommendation API.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::models::job::{deserialize_job_list, Job};
use crate::recommendation::scorer::{rank_all, recommend, ScoredJob};
use crate::recommendation::settings::RecommendationSettings;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationsResponse {
    pub user_id: String,
    pub recommendations: Vec<ScoredJob>,
    pub candidate_count: usize,
    pub settings: RecommendationSettings,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRequest {
    #[serde(default, deserialize_with = "deserialize_job_list")]
    pub jobs: Vec<Job>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub saved_job_ids: Vec<String>,
    /// Partial override applied on top of the stored settings for this request only.
    #[serde(default)]
    pub settings: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
    pub ranked: Vec<ScoredJob>,
    pub settings: RecommendationSettings,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/recommendations?user_id=
///
/// Top `count` active jobs for the job seeker, best-first, with score breakdowns.
pub async fn handle_get_recommendations(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<RecommendationsResponse>, AppError> {
    let user_id = params.user_id.trim();
    if user_id.is_empty() {
        return Err(AppError::Validation("user_id cannot be empty".to_string()));
    }

    let settings = state.settings_store.load().await;

    let profile = state
        .catalog
        .seeker_profile(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job seeker {user_id} not found")))?;

    let jobs: Vec<Job> = state
        .catalog
        .active_jobs()
        .await?
        .into_iter()
        .filter(Job::is_active)
        .collect();

    let recommendations = recommend(
        &jobs,
        &profile.skills,
        &profile.saved_job_ids,
        &settings,
        Utc::now(),
    );

    info!(
        user_id,
        candidates = jobs.len(),
        returned = recommendations.len(),
        "Computed job recommendations"
    );

    Ok(Json(RecommendationsResponse {
        user_id: user_id.to_string(),
        recommendations,
        candidate_count: jobs.len(),
        settings,
    }))
}

/// POST /api/v1/recommendations/preview
///
/// Ranks a caller-supplied pool without touching the catalog. Lets admins try
/// weight changes before saving them.
pub async fn handle_preview(
    State(state): State<AppState>,
    Json(request): Json<PreviewRequest>,
) -> Result<Json<PreviewResponse>, AppError> {
    let stored = state.settings_store.load().await;
    let settings = match &request.settings {
        None | Some(Value::Null) => stored,
        Some(value) => stored
            .merge_override(value)
            .map_err(|e| AppError::Validation(e.to_string()))?,
    };

    let jobs: Vec<Job> = request.jobs.into_iter().filter(Job::is_active).collect();
    let ranked = rank_all(
        &jobs,
        &request.skills,
        &request.saved_job_ids,
        &settings,
        Utc::now(),
    );

    Ok(Json(PreviewResponse { ranked, settings }))
}

/// GET /api/v1/recommendation-settings
pub async fn handle_get_settings(
    State(state): State<AppState>,
) -> Json<RecommendationSettings> {
    Json(state.settings_store.load().await)
}

/// PUT /api/v1/recommendation-settings
///
/// Merges a partial override over the current settings and persists the result.
pub async fn handle_put_settings(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<RecommendationSettings>, AppError> {
    let current = state.settings_store.load().await;
    let merged = current
        .merge_override(&body)
        .map_err(|e| AppError::Validation(e.to_string()))?
        .normalized();

    state.settings_store.save(&merged).await?;
    info!(count = merged.count, "Recommendation settings updated");

    Ok(Json(merged))
}

/// DELETE /api/v1/recommendation-settings
pub async fn handle_reset_settings(
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.settings_store.clear().await?;
    info!("Recommendation settings reset to defaults");
    Ok(StatusCode::NO_CONTENT)
}
