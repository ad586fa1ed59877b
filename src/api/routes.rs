//! Route definitions mapping the client's URLs to handlers.

use super::handlers::*;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Build the API router with all endpoints.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_handler))
        // Player endpoints
        .route("/players/guest", post(create_guest_handler))
        .route("/players/by-nickname", get(get_player_by_nickname_handler))
        .route("/players/:id", get(get_player_handler))
        // Game endpoints
        .route("/games/cards/play", post(play_cards_handler))
        .route("/games/number/play", post(play_number_handler))
        // Attach shared state
        .with_state(state)
}
