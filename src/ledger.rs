//! Player ledger: identity, balance and cumulative win/loss statistics.
//!
//! Every balance mutation goes through [`PlayerLedger::apply_round_result`],
//! which re-validates the bet against the live balance under the entry lock.
//! Two concurrent bets can therefore never jointly overdraw a stale balance.

use crate::errors::{CasinoResult, GameError};
use chrono::{DateTime, Utc};
use dashmap::mapref::one::RefMut;
use dashmap::try_result::TryResult;
use dashmap::DashMap;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Guest accounts start within these bounds.
pub const MIN_INITIAL_BALANCE: f64 = 100.0;
pub const MAX_INITIAL_BALANCE: f64 = 10_000.0;

/// Default number of try-lock attempts before surfacing contention.
pub const DEFAULT_LOCK_RETRY_ATTEMPTS: u32 = 8;

/// A registered guest player. `win_rate` is derived and kept in sync by the
/// ledger; it is a percentage because the client renders it as one.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: u64,
    pub nickname: String,
    pub balance: f64,
    pub total_games: u64,
    pub wins: u64,
    pub losses: u64,
    pub win_rate: f64,
    pub created_at: DateTime<Utc>,
}

/// Concurrent player store. The nickname index enforces uniqueness and
/// backs the by-nickname lookup the client uses to restore a session.
pub struct PlayerLedger {
    players: DashMap<u64, Player>,
    nicknames: DashMap<String, u64>,
    next_id: AtomicU64,
    min_initial_balance: f64,
    max_initial_balance: f64,
    lock_retry_attempts: u32,
}

impl Default for PlayerLedger {
    fn default() -> Self {
        Self::new(
            MIN_INITIAL_BALANCE,
            MAX_INITIAL_BALANCE,
            DEFAULT_LOCK_RETRY_ATTEMPTS,
        )
    }
}

impl PlayerLedger {
    pub fn new(min_initial_balance: f64, max_initial_balance: f64, lock_retry_attempts: u32) -> Self {
        Self {
            players: DashMap::new(),
            nicknames: DashMap::new(),
            next_id: AtomicU64::new(1),
            min_initial_balance,
            max_initial_balance,
            lock_retry_attempts: lock_retry_attempts.max(1),
        }
    }

    /// Register a new guest player with zero stats.
    pub fn create_guest(&self, nickname: &str, initial_balance: f64) -> CasinoResult<Player> {
        let nickname = nickname.trim();
        if nickname.is_empty() {
            return Err(GameError::Validation(
                "Nickname não pode ser vazio".to_string(),
            ));
        }
        if initial_balance < self.min_initial_balance || initial_balance > self.max_initial_balance {
            return Err(GameError::Validation(format!(
                "Saldo inicial deve estar entre R$ {:.2} e R$ {:.2}",
                self.min_initial_balance, self.max_initial_balance
            )));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);

        // Reserve the nickname first; the vacant entry holds its shard lock,
        // so two racing registrations cannot both claim the same name.
        match self.nicknames.entry(nickname.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                return Err(GameError::Validation(
                    "Nickname já está em uso".to_string(),
                ));
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(id);
            }
        }

        let player = Player {
            id,
            nickname: nickname.to_string(),
            balance: initial_balance,
            total_games: 0,
            wins: 0,
            losses: 0,
            win_rate: 0.0,
            created_at: Utc::now(),
        };
        self.players.insert(id, player.clone());

        tracing::info!(player_id = id, nickname, initial_balance, "guest registered");
        Ok(player)
    }

    pub fn get(&self, id: u64) -> CasinoResult<Player> {
        self.players
            .get(&id)
            .map(|p| p.clone())
            .ok_or(GameError::PlayerNotFound(id))
    }

    pub fn get_by_nickname(&self, nickname: &str) -> CasinoResult<Player> {
        let id = self
            .nicknames
            .get(nickname.trim())
            .map(|entry| *entry.value())
            .ok_or(GameError::PlayerNotFound(0))?;
        self.get(id)
    }

    /// Validation-time check that a bet fits the current balance. The
    /// authoritative check happens again in [`Self::apply_round_result`].
    pub fn ensure_can_bet(&self, player_id: u64, bet: f64) -> CasinoResult<()> {
        let player = self.get(player_id)?;
        if bet > player.balance {
            return Err(GameError::InsufficientBalance {
                balance: player.balance,
                bet,
            });
        }
        Ok(())
    }

    /// Atomically settle one resolved round: debit the bet, credit the
    /// payout (0 on a loss) and update the statistics. Returns the updated
    /// player snapshot.
    pub fn apply_round_result(&self, player_id: u64, bet: f64, payout: f64) -> CasinoResult<Player> {
        let mut player = self.lock_player(player_id)?;

        // Commit-time re-check: the balance may have shrunk since the
        // request was validated.
        if bet > player.balance {
            return Err(GameError::InsufficientBalance {
                balance: player.balance,
                bet,
            });
        }

        player.balance = player.balance - bet + payout;
        player.total_games += 1;
        if payout > 0.0 {
            player.wins += 1;
        } else {
            player.losses += 1;
        }
        player.win_rate = player.wins as f64 / player.total_games as f64 * 100.0;

        tracing::debug!(
            player_id,
            bet,
            payout,
            balance = player.balance,
            "round settled"
        );
        Ok(player.clone())
    }

    /// Bounded try-lock on a player entry. Contention is transient here
    /// (critical sections cover a single round settlement), so a handful of
    /// retries is enough; exhaustion surfaces as a retryable error.
    fn lock_player(&self, player_id: u64) -> CasinoResult<RefMut<'_, u64, Player>> {
        for _ in 0..self.lock_retry_attempts {
            match self.players.try_get_mut(&player_id) {
                TryResult::Present(guard) => return Ok(guard),
                TryResult::Absent => return Err(GameError::PlayerNotFound(player_id)),
                TryResult::Locked => std::thread::yield_now(),
            }
        }
        tracing::warn!(player_id, "player entry lock retries exhausted");
        Err(GameError::Contention)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_guest_validates_bounds() {
        let ledger = PlayerLedger::default();

        assert!(matches!(
            ledger.create_guest("", 1000.0),
            Err(GameError::Validation(_))
        ));
        assert!(matches!(
            ledger.create_guest("anubis", 50.0),
            Err(GameError::Validation(_))
        ));
        assert!(matches!(
            ledger.create_guest("anubis", 20_000.0),
            Err(GameError::Validation(_))
        ));

        let player = ledger.create_guest("anubis", 1000.0).unwrap();
        assert_eq!(player.balance, 1000.0);
        assert_eq!(player.total_games, 0);
        assert_eq!(player.win_rate, 0.0);
    }

    #[test]
    fn test_nickname_uniqueness() {
        let ledger = PlayerLedger::default();
        ledger.create_guest("osiris", 500.0).unwrap();

        let err = ledger.create_guest("osiris", 500.0).unwrap_err();
        assert!(matches!(err, GameError::Validation(_)));

        // Lookup resolves to the original registration.
        let found = ledger.get_by_nickname("osiris").unwrap();
        assert_eq!(found.balance, 500.0);
    }

    #[test]
    fn test_apply_round_result_updates_stats() {
        let ledger = PlayerLedger::default();
        let player = ledger.create_guest("hórus", 100.0).unwrap();

        // A win: bet 50, payout 150 -> balance 200.
        let after = ledger.apply_round_result(player.id, 50.0, 150.0).unwrap();
        assert_eq!(after.balance, 200.0);
        assert_eq!(after.wins, 1);
        assert_eq!(after.win_rate, 100.0);

        // A loss: bet 200, payout 0 -> balance 0, never negative.
        let after = ledger.apply_round_result(player.id, 200.0, 0.0).unwrap();
        assert_eq!(after.balance, 0.0);
        assert_eq!(after.losses, 1);
        assert_eq!(after.win_rate, 50.0);
    }

    #[test]
    fn test_apply_rejects_overdraw_at_commit() {
        let ledger = PlayerLedger::default();
        let player = ledger.create_guest("seth", 100.0).unwrap();

        let err = ledger.apply_round_result(player.id, 150.0, 0.0).unwrap_err();
        assert!(matches!(err, GameError::InsufficientBalance { .. }));

        // Ledger untouched on rejection.
        let unchanged = ledger.get(player.id).unwrap();
        assert_eq!(unchanged.balance, 100.0);
        assert_eq!(unchanged.total_games, 0);
    }

    #[test]
    fn test_unknown_player() {
        let ledger = PlayerLedger::default();
        assert!(matches!(
            ledger.get(42),
            Err(GameError::PlayerNotFound(42))
        ));
        assert!(matches!(
            ledger.get_by_nickname("ninguém"),
            Err(GameError::PlayerNotFound(_))
        ));
    }
}
