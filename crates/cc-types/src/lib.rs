//! Core types for the ClawCombat arena — zero game logic, just data
//! definitions shared by the catalog, engine, store, matchmaker, webhook
//! dispatcher, and HTTP server crates.

pub mod agent;
pub mod battle;
pub mod effect;
pub mod enums;
pub mod error;
pub mod events;
pub mod ids;
pub mod rng;

// Re-export commonly used types at crate root.
pub use agent::{Agent, BaseStats};
pub use battle::{
    Battle, BattleSideState, BattleStateBlob, BattleStats, BattleTurnLog, MoveSlot,
    PersistentFlags, PerTurnFlags, QueueEntry, SocialToken, StatusCounters,
};
pub use effect::MoveEffect;
pub use enums::*;
pub use error::ApiError;
pub use events::{BattleEndReason, TurnEvent};
pub use ids::*;
pub use rng::BattleRng;
