//! Request handlers for the player and game endpoints.

use super::{errors::ApiError, middleware::RequestId, models::*};
use crate::{
    config::CasinoConfig,
    games::{cards::CardEngine, number::NumberEngine},
    ledger::{Player, PlayerLedger},
    session_store::SessionStore,
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use std::sync::Arc;

/// Shared application state: the ledger, the session store and the two
/// engines wired to them.
pub struct AppState {
    pub ledger: Arc<PlayerLedger>,
    pub sessions: Arc<SessionStore>,
    pub cards: CardEngine,
    pub number: NumberEngine,
    pub default_initial_balance: f64,
    pub version: String,
}

impl AppState {
    pub fn new(config: &CasinoConfig) -> Self {
        let ledger = Arc::new(PlayerLedger::new(
            config.games.min_initial_balance,
            config.games.max_initial_balance,
            config.sessions.lock_retry_attempts,
        ));
        let sessions = Arc::new(SessionStore::new(
            config.sessions.idle_timeout(),
            config.sessions.lock_retry_attempts,
        ));

        Self {
            cards: CardEngine::new(ledger.clone(), config.games.card_min_bet),
            number: NumberEngine::new(
                ledger.clone(),
                sessions.clone(),
                config.games.number_min_bet,
            ),
            ledger,
            sessions,
            default_initial_balance: config.games.default_initial_balance,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Liveness probe.
/// GET /health
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "Running".to_string(),
        version: state.version.clone(),
    })
}

/// Register a guest player.
/// POST /players/guest?nickname={string}&balance={number}
pub async fn create_guest_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Query(params): Query<GuestQuery>,
) -> Result<Json<Player>, ApiError> {
    let balance = params.balance.unwrap_or(state.default_initial_balance);
    let player = state
        .ledger
        .create_guest(&params.nickname, balance)
        .map_err(|e| ApiError::new(e, request_id.0))?;
    Ok(Json(player))
}

/// Look up a player by id.
/// GET /players/{id}
pub async fn get_player_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<u64>,
) -> Result<Json<Player>, ApiError> {
    let player = state
        .ledger
        .get(player_id)
        .map_err(|e| ApiError::new(e, request_id.0))?;
    Ok(Json(player))
}

/// Look up a player by nickname.
/// GET /players/by-nickname?nickname={string}
pub async fn get_player_by_nickname_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Query(params): Query<NicknameQuery>,
) -> Result<Json<Player>, ApiError> {
    let player = state
        .ledger
        .get_by_nickname(&params.nickname)
        .map_err(|e| ApiError::new(e, request_id.0))?;
    Ok(Json(player))
}

/// Resolve one card-slot round.
/// POST /games/cards/play
pub async fn play_cards_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<CardPlayRequest>,
) -> Result<Json<CardPlayResponse>, ApiError> {
    let outcome = state
        .cards
        .play_round(request.player_id, request.bet_amount)
        .map_err(|e| ApiError::new(e, request_id.0))?;
    Ok(Json(outcome.into()))
}

/// Process one number-guess attempt, opening a session when none is given.
/// POST /games/number/play
pub async fn play_number_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<NumberPlayRequest>,
) -> Result<Json<NumberPlayResponse>, ApiError> {
    let outcome = state
        .number
        .play_round(
            request.player_id,
            request.bet_amount,
            request.guess,
            request.session_id.as_deref(),
        )
        .map_err(|e| ApiError::new(e, request_id.0))?;
    Ok(Json(outcome.into()))
}
