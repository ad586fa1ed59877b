//! Error taxonomy for the casino engines.
//!
//! Every rejected play surfaces as one of these variants with a
//! human-readable message; nothing is silently swallowed. User-facing
//! text is Portuguese because the client renders it verbatim.

/// Root error type for ledger and game operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GameError {
    /// Malformed nickname or out-of-bounds initial balance.
    #[error("{0}")]
    Validation(String),

    /// Bet below the game's minimum.
    #[error("Aposta mínima: R$ {min:.2}")]
    InvalidBet { min: f64, bet: f64 },

    /// Bet exceeds the player's current balance. Raised both at
    /// validation time and again at commit time under the entry lock.
    #[error("Saldo insuficiente")]
    InsufficientBalance { balance: f64, bet: f64 },

    /// Guess outside the [1, 100] range.
    #[error("Digite um número entre 1 e 100")]
    InvalidGuess(i64),

    #[error("Jogador não encontrado")]
    PlayerNotFound(u64),

    /// Unknown session id, or a session that already expired.
    #[error("Sessão não encontrada ou expirada")]
    SessionNotFound(String),

    /// Session exists but belongs to a different player.
    #[error("Esta sessão pertence a outro jogador")]
    SessionMismatch { session_id: String, player_id: u64 },

    /// Bounded lock retries exhausted on a player or session entry.
    #[error("Não foi possível processar a jogada agora, tente novamente")]
    Contention,
}

impl GameError {
    /// Stable machine-readable code, used by the HTTP error body.
    pub fn code(&self) -> &'static str {
        match self {
            GameError::Validation(_) => "VALIDATION_ERROR",
            GameError::InvalidBet { .. } => "INVALID_BET",
            GameError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            GameError::InvalidGuess(_) => "INVALID_GUESS",
            GameError::PlayerNotFound(_) => "PLAYER_NOT_FOUND",
            GameError::SessionNotFound(_) => "SESSION_NOT_FOUND",
            GameError::SessionMismatch { .. } => "SESSION_MISMATCH",
            GameError::Contention => "CONTENTION",
        }
    }
}

/// Convenience alias for results in the ledger and engines.
pub type CasinoResult<T> = Result<T, GameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_are_user_facing() {
        let err = GameError::InvalidBet { min: 5.0, bet: 1.0 };
        assert_eq!(err.to_string(), "Aposta mínima: R$ 5.00");

        let err = GameError::InsufficientBalance {
            balance: 10.0,
            bet: 50.0,
        };
        assert_eq!(err.to_string(), "Saldo insuficiente");
    }

    #[test]
    fn test_error_codes_stable() {
        assert_eq!(GameError::Contention.code(), "CONTENTION");
        assert_eq!(GameError::PlayerNotFound(7).code(), "PLAYER_NOT_FOUND");
        assert_eq!(GameError::InvalidGuess(0).code(), "INVALID_GUESS");
    }
}
