//! Wire models for the HTTP surface.
//!
//! Field names are camelCase because the browser client consumes the JSON
//! verbatim. Optional fields are omitted, not null, on the wire.

use crate::games::cards::{CardRoundOutcome, Symbol};
use crate::games::number::{Hint, NumberPlayOutcome};
use serde::{Deserialize, Serialize};

/// Query string for `POST /players/guest`.
#[derive(Debug, Deserialize)]
pub struct GuestQuery {
    pub nickname: String,
    pub balance: Option<f64>,
}

/// Query string for `GET /players/by-nickname`.
#[derive(Debug, Deserialize)]
pub struct NicknameQuery {
    pub nickname: String,
}

/// Body of `POST /games/cards/play`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPlayRequest {
    pub player_id: u64,
    pub bet_amount: f64,
}

/// Body of `POST /games/number/play`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberPlayRequest {
    pub player_id: u64,
    pub bet_amount: f64,
    pub guess: i64,
    pub session_id: Option<String>,
}

/// Response of `POST /games/cards/play`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPlayResponse {
    pub symbols: [Symbol; 3],
    pub won: bool,
    pub win_amount: f64,
    pub message: String,
    pub new_balance: f64,
    pub total_games: u64,
    pub wins: u64,
    pub losses: u64,
    pub win_rate: f64,
}

impl From<CardRoundOutcome> for CardPlayResponse {
    fn from(outcome: CardRoundOutcome) -> Self {
        Self {
            symbols: outcome.symbols,
            won: outcome.won,
            win_amount: outcome.win_amount,
            message: outcome.message,
            new_balance: outcome.player.balance,
            total_games: outcome.player.total_games,
            wins: outcome.player.wins,
            losses: outcome.player.losses,
            win_rate: outcome.player.win_rate,
        }
    }
}

/// Response of `POST /games/number/play`. Ledger fields appear only on
/// terminal results; the hint only on non-terminal ones.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberPlayResponse {
    pub session_id: String,
    pub attempts_left: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<Hint>,
    pub won: bool,
    pub game_over: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub win_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_balance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_games: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wins: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub losses: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub win_rate: Option<f64>,
}

impl From<NumberPlayOutcome> for NumberPlayResponse {
    fn from(outcome: NumberPlayOutcome) -> Self {
        let player = outcome.player;
        Self {
            session_id: outcome.session_id,
            attempts_left: outcome.attempts_left,
            hint: outcome.hint,
            won: outcome.won,
            game_over: outcome.game_over,
            message: outcome.message,
            win_amount: outcome.win_amount,
            new_balance: player.as_ref().map(|p| p.balance),
            total_games: player.as_ref().map(|p| p.total_games),
            wins: player.as_ref().map(|p| p.wins),
            losses: player.as_ref().map(|p| p.losses),
            win_rate: player.as_ref().map(|p| p.win_rate),
        }
    }
}

/// `GET /health` body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
