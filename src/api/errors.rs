//! HTTP mapping for the domain error taxonomy.
//!
//! Every rejection becomes a structured JSON body carrying the request id,
//! a stable machine code and the human-readable message.

use crate::errors::GameError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Top-level error body with request tracking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub request_id: String,
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// A domain error bound to the request that triggered it.
#[derive(Debug)]
pub struct ApiError {
    pub error: GameError,
    pub request_id: String,
}

impl ApiError {
    pub fn new(error: GameError, request_id: String) -> Self {
        Self { error, request_id }
    }

    fn status(&self) -> StatusCode {
        match self.error {
            GameError::Validation(_)
            | GameError::InvalidBet { .. }
            | GameError::InvalidGuess(_) => StatusCode::BAD_REQUEST,
            GameError::PlayerNotFound(_) | GameError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            GameError::SessionMismatch { .. } => StatusCode::FORBIDDEN,
            GameError::InsufficientBalance { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            GameError::Contention => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(request_id = self.request_id, error = %self.error, "request rejected");
        }

        let body = Json(ErrorResponse {
            request_id: self.request_id,
            error: ErrorBody {
                code: self.error.code().to_string(),
                message: self.error.to_string(),
            },
        });

        (status, body).into_response()
    }
}
