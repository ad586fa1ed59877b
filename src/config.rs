//! Configuration: defaults, optional TOML file, CLI overrides.

use crate::errors::GameError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level server configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CasinoConfig {
    pub server: ServerConfig,
    pub games: GamesConfig,
    pub sessions: SessionsConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins; `*` (or empty) allows any origin.
    pub allowed_origins: Vec<String>,
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            allowed_origins: vec!["*".to_string()],
            request_timeout_secs: 30,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GamesConfig {
    pub card_min_bet: f64,
    pub number_min_bet: f64,
    pub min_initial_balance: f64,
    pub max_initial_balance: f64,
    /// Balance granted to guests that do not ask for a specific amount.
    pub default_initial_balance: f64,
}

impl Default for GamesConfig {
    fn default() -> Self {
        Self {
            card_min_bet: crate::games::cards::MIN_CARD_BET,
            number_min_bet: crate::games::number::MIN_NUMBER_BET,
            min_initial_balance: 100.0,
            max_initial_balance: 10_000.0,
            default_initial_balance: 1_000.0,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionsConfig {
    /// A session idle this long is expired and reclaimable.
    pub idle_timeout_secs: u64,
    /// Reaper sweep cadence.
    pub sweep_interval_secs: u64,
    /// Try-lock attempts on a contended player/session entry before the
    /// request is surfaced as retryable.
    pub lock_retry_attempts: u32,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: 600,
            sweep_interval_secs: 60,
            lock_retry_attempts: 8,
        }
    }
}

impl SessionsConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl CasinoConfig {
    /// Load from a TOML file; absent keys fall back to defaults.
    pub fn load(path: &Path) -> Result<Self, GameError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            GameError::Validation(format!("Falha ao ler {}: {}", path.display(), e))
        })?;
        let config: CasinoConfig = toml::from_str(&raw).map_err(|e| {
            GameError::Validation(format!("Configuração inválida em {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot run.
    pub fn validate(&self) -> Result<(), GameError> {
        if self.games.card_min_bet <= 0.0 || self.games.number_min_bet <= 0.0 {
            return Err(GameError::Validation(
                "Apostas mínimas devem ser positivas".to_string(),
            ));
        }
        if self.games.min_initial_balance > self.games.max_initial_balance {
            return Err(GameError::Validation(
                "Limites de saldo inicial invertidos".to_string(),
            ));
        }
        if !(self.games.min_initial_balance..=self.games.max_initial_balance)
            .contains(&self.games.default_initial_balance)
        {
            return Err(GameError::Validation(
                "Saldo inicial padrão fora dos limites".to_string(),
            ));
        }
        if self.sessions.idle_timeout_secs == 0 {
            return Err(GameError::Validation(
                "Tempo de expiração de sessão deve ser positivo".to_string(),
            ));
        }
        if self.sessions.lock_retry_attempts == 0 {
            return Err(GameError::Validation(
                "Número de tentativas de lock deve ser positivo".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = CasinoConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.games.card_min_bet, 5.0);
        assert_eq!(config.games.number_min_bet, 10.0);
        assert_eq!(config.sessions.idle_timeout_secs, 600);
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config: CasinoConfig = toml::from_str(
            r#"
            [server]
            port = 9000

            [sessions]
            idle_timeout_secs = 120
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.sessions.idle_timeout_secs, 120);
        assert_eq!(config.games.default_initial_balance, 1_000.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = CasinoConfig::default();
        config.games.card_min_bet = 0.0;
        assert!(config.validate().is_err());

        let mut config = CasinoConfig::default();
        config.games.default_initial_balance = 50_000.0;
        assert!(config.validate().is_err());

        let mut config = CasinoConfig::default();
        config.sessions.idle_timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
