pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::recommendation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Recommendation API
        .route(
            "/api/v1/recommendations",
            get(handlers::handle_get_recommendations),
        )
        .route(
            "/api/v1/recommendations/preview",
            post(handlers::handle_preview),
        )
        .route(
            "/api/v1/recommendation-settings",
            get(handlers::handle_get_settings)
                .put(handlers::handle_put_settings)
                .delete(handlers::handle_reset_settings),
        )
        .with_state(state)
}
