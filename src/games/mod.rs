//! Game engines: stateless card-slot rounds and stateful number-guess
//! sessions. Both settle exclusively through the player ledger.

pub mod cards;
pub mod number;
