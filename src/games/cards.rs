//! Card-slot round engine.
//!
//! A round is stateless: three symbols are drawn, the outcome is classified
//! and settled against the ledger, and nothing survives the response.

use crate::errors::{CasinoResult, GameError};
use crate::ledger::{Player, PlayerLedger};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Minimum bet for a card round.
pub const MIN_CARD_BET: f64 = 5.0;

/// The six Duat symbols, ordered by multiplier. Wire names are the
/// upper-case identifiers the client maps to emoji.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Symbol {
    Flame,
    Ankh,
    Eye,
    Scarab,
    Moon,
    Star,
}

impl Symbol {
    pub const ALL: [Symbol; 6] = [
        Symbol::Flame,
        Symbol::Ankh,
        Symbol::Eye,
        Symbol::Scarab,
        Symbol::Moon,
        Symbol::Star,
    ];

    /// Payout multiplier, strictly increasing with rarity intent.
    pub fn multiplier(self) -> f64 {
        match self {
            Symbol::Flame => 2.0,
            Symbol::Ankh => 3.0,
            Symbol::Eye => 4.0,
            Symbol::Scarab => 5.0,
            Symbol::Moon => 6.0,
            Symbol::Star => 10.0,
        }
    }

    /// Portuguese display name, used in result messages.
    pub fn display_name(self) -> &'static str {
        match self {
            Symbol::Flame => "Chama",
            Symbol::Ankh => "Ankh",
            Symbol::Eye => "Olho",
            Symbol::Scarab => "Escaravelho",
            Symbol::Moon => "Lua",
            Symbol::Star => "Estrela",
        }
    }

    /// Uniform draw over the symbol set. Uniformity is the documented
    /// default; there is no hidden rarity weighting.
    fn draw<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Win classification for a drawn triple.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WinClass {
    /// Three of a kind: bet x multiplier x 2.
    Triple(Symbol),
    /// Exactly two matching: bet x multiplier.
    Pair(Symbol),
    /// No match, bet lost.
    None,
}

/// Classify three drawn symbols.
pub fn classify(symbols: [Symbol; 3]) -> WinClass {
    let [a, b, c] = symbols;
    if a == b && b == c {
        WinClass::Triple(a)
    } else if a == b || a == c {
        WinClass::Pair(a)
    } else if b == c {
        WinClass::Pair(b)
    } else {
        WinClass::None
    }
}

/// Payout for a classified outcome.
pub fn payout_for(class: WinClass, bet: f64) -> f64 {
    match class {
        WinClass::Triple(symbol) => bet * symbol.multiplier() * 2.0,
        WinClass::Pair(symbol) => bet * symbol.multiplier(),
        WinClass::None => 0.0,
    }
}

/// Resolved card round, returned to the API layer and then dropped.
#[derive(Debug, Clone)]
pub struct CardRoundOutcome {
    pub symbols: [Symbol; 3],
    pub won: bool,
    pub win_amount: f64,
    pub message: String,
    pub player: Player,
}

/// Stateless round engine; the ledger is its only collaborator.
pub struct CardEngine {
    ledger: Arc<PlayerLedger>,
    min_bet: f64,
}

impl CardEngine {
    pub fn new(ledger: Arc<PlayerLedger>, min_bet: f64) -> Self {
        Self { ledger, min_bet }
    }

    /// Play one round: validate the bet, draw, settle, respond.
    pub fn play_round(&self, player_id: u64, bet: f64) -> CasinoResult<CardRoundOutcome> {
        if bet < self.min_bet {
            return Err(GameError::InvalidBet {
                min: self.min_bet,
                bet,
            });
        }
        self.ledger.ensure_can_bet(player_id, bet)?;

        let mut rng = rand::thread_rng();
        let symbols = [
            Symbol::draw(&mut rng),
            Symbol::draw(&mut rng),
            Symbol::draw(&mut rng),
        ];

        let class = classify(symbols);
        let payout = payout_for(class, bet);

        // The ledger re-checks the balance under the entry lock; a
        // concurrent round may have drained it since validation.
        let player = self.ledger.apply_round_result(player_id, bet, payout)?;

        let message = match class {
            WinClass::Triple(symbol) => format!(
                "Três {}! Prêmio máximo: R$ {:.2}",
                symbol.display_name(),
                payout
            ),
            WinClass::Pair(symbol) => format!(
                "Dois {}! Você ganhou R$ {:.2}",
                symbol.display_name(),
                payout
            ),
            WinClass::None => "Nenhuma combinação. Não foi dessa vez!".to_string(),
        };

        tracing::info!(
            player_id,
            bet,
            ?symbols,
            payout,
            balance = player.balance,
            "card round resolved"
        );

        Ok(CardRoundOutcome {
            symbols,
            won: payout > 0.0,
            win_amount: payout,
            message,
            player,
        })
    }
}
