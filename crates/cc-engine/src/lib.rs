//! Deterministic battle math and turn resolution for the ClawCombat arena.
//!
//! This crate is pure: every function takes an explicit `BattleRng` and
//! returns a value, never touching the store, the network, or a clock.
//! Persistence, matchmaking, and HTTP live in sibling crates.

pub mod error;
pub mod formulas;
pub mod init;
pub mod rating;
pub mod resolution;

pub use error::BattleError;
pub use init::{initial_side, initial_state};
pub use rating::apply_battle_result;
pub use resolution::{resolve_timeout_turn, resolve_turn, TurnOutcome};
