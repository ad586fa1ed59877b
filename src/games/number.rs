//! Number-guess session engine.
//!
//! One logical round spans up to five request/response exchanges correlated
//! by an opaque session id. The secret and the frozen bet live server-side;
//! the client only ever sees hints and terminal results.

use crate::errors::{CasinoResult, GameError};
use crate::ledger::{Player, PlayerLedger};
use crate::session_store::SessionStore;
use rand::Rng;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Minimum bet to open a number-guess session.
pub const MIN_NUMBER_BET: f64 = 10.0;

/// Attempts per session.
pub const MAX_ATTEMPTS: u8 = 5;

/// Payout multiplier by winning attempt (1-indexed).
pub const ATTEMPT_MULTIPLIERS: [f64; MAX_ATTEMPTS as usize] = [10.0, 6.0, 4.0, 2.0, 1.5];

/// Directional hint after a wrong guess. Wire values are the literal
/// strings the client pattern-matches on.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Hint {
    Maior,
    Menor,
}

impl Hint {
    /// `Maior` iff the secret is greater than the guess.
    pub fn for_guess(secret: u8, guess: u8) -> Self {
        if secret > guess {
            Hint::Maior
        } else {
            Hint::Menor
        }
    }
}

/// One (guess, hint) exchange kept in the session history.
#[derive(Debug, Clone)]
pub struct GuessRecord {
    pub guess: u8,
    pub hint: Hint,
}

/// In-progress session state. Lives in the [`SessionStore`] between guesses
/// and is removed once terminal.
#[derive(Debug)]
pub struct NumberSession {
    pub id: String,
    pub player_id: u64,
    secret: u8,
    pub bet: f64,
    pub attempts: u8,
    pub history: Vec<GuessRecord>,
    pub terminal: bool,
    last_activity: Instant,
}

impl NumberSession {
    /// New session with a freshly drawn secret in [1, 100].
    pub fn new(player_id: u64, bet: f64) -> Self {
        let secret = rand::thread_rng().gen_range(1..=100);
        Self::with_secret(player_id, bet, secret)
    }

    pub(crate) fn with_secret(player_id: u64, bet: f64, secret: u8) -> Self {
        debug_assert!((1..=100).contains(&secret));
        Self {
            id: Uuid::new_v4().to_string(),
            player_id,
            secret,
            bet,
            attempts: 0,
            history: Vec::new(),
            terminal: false,
            last_activity: Instant::now(),
        }
    }

    pub fn expired(&self, idle_timeout: Duration) -> bool {
        self.last_activity.elapsed() >= idle_timeout
    }

    fn touch(&mut self) {
        self.last_activity = Instant::now();
    }
}

/// Result of one guess, terminal or not.
#[derive(Debug, Clone)]
pub struct NumberPlayOutcome {
    pub session_id: String,
    pub attempts_left: u8,
    pub hint: Option<Hint>,
    pub won: bool,
    pub game_over: bool,
    pub message: String,
    pub win_amount: Option<f64>,
    /// Updated ledger snapshot, present only on terminal results.
    pub player: Option<Player>,
}

/// Multi-attempt guessing engine backed by the session store and ledger.
pub struct NumberEngine {
    ledger: Arc<PlayerLedger>,
    store: Arc<SessionStore>,
    min_bet: f64,
}

impl NumberEngine {
    pub fn new(ledger: Arc<PlayerLedger>, store: Arc<SessionStore>, min_bet: f64) -> Self {
        Self {
            ledger,
            store,
            min_bet,
        }
    }

    /// Process one guess. Without a session id this opens a new session;
    /// with one it continues (and possibly resolves) the existing round.
    pub fn play_round(
        &self,
        player_id: u64,
        bet: f64,
        guess: i64,
        session_id: Option<&str>,
    ) -> CasinoResult<NumberPlayOutcome> {
        // An out-of-range guess never consumes an attempt or opens a session.
        let guess = parse_guess(guess)?;

        match session_id {
            None => self.start_session(player_id, bet, guess),
            Some(id) => self.continue_session(player_id, id, guess),
        }
    }

    fn start_session(&self, player_id: u64, bet: f64, guess: u8) -> CasinoResult<NumberPlayOutcome> {
        if bet < self.min_bet {
            return Err(GameError::InvalidBet {
                min: self.min_bet,
                bet,
            });
        }
        self.ledger.ensure_can_bet(player_id, bet)?;

        let mut session = NumberSession::new(player_id, bet);
        session.attempts = 1;

        if guess == session.secret {
            // Won on the very first guess; the session never reaches the store.
            return self.resolve_won(session, 1);
        }

        let hint = Hint::for_guess(session.secret, guess);
        session.history.push(GuessRecord { guess, hint });
        let message = hint_message(hint, guess);
        let session_id = session.id.clone();
        self.store.create(session);

        tracing::info!(player_id, bet, session_id = %session_id, "number session opened");
        Ok(NumberPlayOutcome {
            session_id,
            attempts_left: MAX_ATTEMPTS - 1,
            hint: Some(hint),
            won: false,
            game_over: false,
            message,
            win_amount: None,
            player: None,
        })
    }

    fn continue_session(
        &self,
        player_id: u64,
        session_id: &str,
        guess: u8,
    ) -> CasinoResult<NumberPlayOutcome> {
        // The bet was frozen when the session opened; the amount on the
        // wire is ignored from the second guess on.
        let mut guard = self.store.try_lock(session_id)?;

        if guard.player_id != player_id {
            return Err(GameError::SessionMismatch {
                session_id: session_id.to_string(),
                player_id,
            });
        }

        guard.attempts += 1;
        let attempts = guard.attempts;

        if guess == guard.secret {
            // Mark terminal under the lock so a racing guess sees a dead
            // session, then detach before touching the ledger.
            guard.terminal = true;
            let session = detach(guard, &self.store, session_id);
            return self.resolve_won(session, attempts);
        }

        if attempts >= MAX_ATTEMPTS {
            guard.terminal = true;
            let session = detach(guard, &self.store, session_id);
            return self.resolve_lost(session);
        }

        let hint = Hint::for_guess(guard.secret, guess);
        guard.history.push(GuessRecord { guess, hint });
        guard.touch();
        drop(guard);

        Ok(NumberPlayOutcome {
            session_id: session_id.to_string(),
            attempts_left: MAX_ATTEMPTS - attempts,
            hint: Some(hint),
            won: false,
            game_over: false,
            message: hint_message(hint, guess),
            win_amount: None,
            player: None,
        })
    }

    fn resolve_won(&self, session: NumberSession, attempts: u8) -> CasinoResult<NumberPlayOutcome> {
        let multiplier = ATTEMPT_MULTIPLIERS[(attempts - 1) as usize];
        let payout = session.bet * multiplier;
        let player = self
            .ledger
            .apply_round_result(session.player_id, session.bet, payout)?;

        tracing::info!(
            player_id = session.player_id,
            session_id = %session.id,
            attempts,
            payout,
            "number session won"
        );
        Ok(NumberPlayOutcome {
            session_id: session.id,
            attempts_left: MAX_ATTEMPTS - attempts,
            hint: None,
            won: true,
            game_over: true,
            message: format!(
                "Você acertou em {} tentativa(s)! Prêmio: R$ {:.2}",
                attempts, payout
            ),
            win_amount: Some(payout),
            player: Some(player),
        })
    }

    fn resolve_lost(&self, session: NumberSession) -> CasinoResult<NumberPlayOutcome> {
        let player = self
            .ledger
            .apply_round_result(session.player_id, session.bet, 0.0)?;

        tracing::info!(
            player_id = session.player_id,
            session_id = %session.id,
            "number session lost"
        );
        Ok(NumberPlayOutcome {
            session_id: session.id,
            attempts_left: 0,
            hint: None,
            won: false,
            game_over: true,
            message: format!("Suas tentativas acabaram! O número era {}", session.secret),
            win_amount: None,
            player: Some(player),
        })
    }
}

/// Release the entry lock and remove the terminal session from the store,
/// handing back an owned copy for resolution.
fn detach(
    guard: dashmap::mapref::one::RefMut<'_, String, NumberSession>,
    store: &SessionStore,
    session_id: &str,
) -> NumberSession {
    let session = NumberSession {
        id: guard.id.clone(),
        player_id: guard.player_id,
        secret: guard.secret,
        bet: guard.bet,
        attempts: guard.attempts,
        history: guard.history.clone(),
        terminal: true,
        last_activity: guard.last_activity,
    };
    drop(guard);
    store.remove(session_id);
    session
}

fn parse_guess(guess: i64) -> CasinoResult<u8> {
    if (1..=100).contains(&guess) {
        Ok(guess as u8)
    } else {
        Err(GameError::InvalidGuess(guess))
    }
}

fn hint_message(hint: Hint, guess: u8) -> String {
    match hint {
        Hint::Maior => format!("Errou! O número secreto é MAIOR do que {}", guess),
        Hint::Menor => format!("Errou! O número secreto é MENOR do que {}", guess),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> (Arc<PlayerLedger>, Arc<SessionStore>, NumberEngine) {
        let ledger = Arc::new(PlayerLedger::default());
        let store = Arc::new(SessionStore::new(Duration::from_secs(600), 8));
        let engine = NumberEngine::new(ledger.clone(), store.clone(), MIN_NUMBER_BET);
        (ledger, store, engine)
    }

    /// Seed a session with a known secret, as the engine would after a
    /// first wrong guess.
    fn seed_session(
        store: &SessionStore,
        player_id: u64,
        bet: f64,
        secret: u8,
        attempts: u8,
    ) -> String {
        let mut session = NumberSession::with_secret(player_id, bet, secret);
        session.attempts = attempts;
        store.create(session)
    }

    #[test]
    fn test_hint_direction() {
        for secret in 1..=100u8 {
            for guess in 1..=100u8 {
                if secret == guess {
                    continue;
                }
                let hint = Hint::for_guess(secret, guess);
                assert_eq!(hint == Hint::Maior, secret > guess);
            }
        }
    }

    #[test]
    fn test_guess_validated_before_anything_else() {
        let (ledger, store, engine) = engine();
        let player = ledger.create_guest("bastet", 100.0).unwrap();

        for bad in [0, -1, 101, 1000] {
            let err = engine.play_round(player.id, 10.0, bad, None).unwrap_err();
            assert!(matches!(err, GameError::InvalidGuess(_)));
        }
        // No session leaked, no attempt consumed.
        assert!(store.is_empty());
        assert_eq!(ledger.get(player.id).unwrap().total_games, 0);
    }

    #[test]
    fn test_new_session_validates_bet() {
        let (ledger, _, engine) = engine();
        let player = ledger.create_guest("tot", 100.0).unwrap();

        assert!(matches!(
            engine.play_round(player.id, 5.0, 50, None),
            Err(GameError::InvalidBet { .. })
        ));
        assert!(matches!(
            engine.play_round(player.id, 500.0, 50, None),
            Err(GameError::InsufficientBalance { .. })
        ));
    }

    #[test]
    fn test_worked_example() {
        // balance=100, bet=50, secret=42: guess 50 -> MENOR, 4 left;
        // guess 42 on attempt 2 -> payout 300, balance 350.
        let (ledger, store, engine) = engine();
        let player = ledger.create_guest("maat", 100.0).unwrap();
        let session_id = seed_session(&store, player.id, 50.0, 42, 0);

        let first = engine
            .play_round(player.id, 50.0, 50, Some(&session_id))
            .unwrap();
        assert!(!first.game_over);
        assert_eq!(first.hint, Some(Hint::Menor));
        assert_eq!(first.attempts_left, 4);

        let second = engine
            .play_round(player.id, 50.0, 42, Some(&session_id))
            .unwrap();
        assert!(second.won && second.game_over);
        assert_eq!(second.win_amount, Some(300.0));
        let player = second.player.unwrap();
        assert_eq!(player.balance, 350.0);
        assert_eq!(player.wins, 1);

        // Terminal sessions vanish from the store.
        assert!(!store.contains(&session_id));
    }

    #[test]
    fn test_attempt_multiplier_table() {
        for (attempt, expected) in [(1u8, 10.0), (2, 6.0), (3, 4.0), (4, 2.0), (5, 1.5)] {
            let (ledger, store, engine) = engine();
            let player = ledger.create_guest("sobek", 1000.0).unwrap();
            let session_id = seed_session(&store, player.id, 20.0, 77, attempt - 1);

            let outcome = engine
                .play_round(player.id, 20.0, 77, Some(&session_id))
                .unwrap();
            assert!(outcome.won);
            assert_eq!(outcome.win_amount, Some(20.0 * expected));
        }
    }

    #[test]
    fn test_losing_after_five_attempts() {
        let (ledger, store, engine) = engine();
        let player = ledger.create_guest("khepri", 100.0).unwrap();
        let session_id = seed_session(&store, player.id, 20.0, 90, 0);

        // Four wrong guesses, monotonically fewer attempts left.
        for (i, guess) in [10, 20, 30, 40].iter().enumerate() {
            let outcome = engine
                .play_round(player.id, 20.0, *guess, Some(&session_id))
                .unwrap();
            assert!(!outcome.game_over);
            assert_eq!(outcome.hint, Some(Hint::Maior));
            assert_eq!(outcome.attempts_left, MAX_ATTEMPTS - 1 - i as u8);
        }

        // Fifth miss resolves the session as a loss.
        let last = engine
            .play_round(player.id, 20.0, 50, Some(&session_id))
            .unwrap();
        assert!(last.game_over && !last.won);
        assert_eq!(last.attempts_left, 0);
        assert_eq!(last.win_amount, None);

        let player = last.player.unwrap();
        assert_eq!(player.balance, 80.0);
        assert_eq!(player.losses, 1);
        assert!(!store.contains(&session_id));
    }

    #[test]
    fn test_session_ownership() {
        let (ledger, store, engine) = engine();
        let owner = ledger.create_guest("néftis", 100.0).unwrap();
        let intruder = ledger.create_guest("apófis", 100.0).unwrap();
        let session_id = seed_session(&store, owner.id, 20.0, 55, 1);

        let err = engine
            .play_round(intruder.id, 20.0, 50, Some(&session_id))
            .unwrap_err();
        assert!(matches!(err, GameError::SessionMismatch { .. }));

        // The owner's session is untouched by the rejected probe.
        let guard = store.try_lock(&session_id).unwrap();
        assert_eq!(guard.attempts, 1);
    }

    #[test]
    fn test_unknown_session() {
        let (ledger, _, engine) = engine();
        let player = ledger.create_guest("amon", 100.0).unwrap();

        let err = engine
            .play_round(player.id, 20.0, 50, Some("no-such-session"))
            .unwrap_err();
        assert!(matches!(err, GameError::SessionNotFound(_)));
    }

    #[test]
    fn test_first_guess_win_skips_store() {
        let (ledger, store, engine) = engine();
        let player = ledger.create_guest("hathor", 100.0).unwrap();

        // Drive the public path until a first-guess win occurs; each loop
        // iteration abandons the opened session, which the sweep reclaims.
        let mut won = None;
        for _ in 0..2000 {
            let outcome = engine.play_round(player.id, 10.0, 50, None).unwrap();
            if outcome.game_over {
                won = Some(outcome);
                break;
            }
            store.remove(&outcome.session_id);
        }

        let outcome = won.expect("a first-guess win in 2000 rounds");
        assert!(outcome.won);
        assert_eq!(outcome.win_amount, Some(10.0 * ATTEMPT_MULTIPLIERS[0]));
        assert!(store.is_empty());
    }
}
