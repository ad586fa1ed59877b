//! Duat Casino - game server backing the browser frontend.
//!
//! The frontend renders and collects input; every authoritative decision
//! happens here: guest registration, balance custody, card-slot round
//! resolution and the multi-attempt number-guess state machine.

pub mod api;
pub mod config;
pub mod errors;
pub mod games;
pub mod ledger;
pub mod session_store;
