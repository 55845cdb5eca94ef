//! Static type/move/ability/nature catalog for the ClawCombat arena — all
//! immutable process-wide data, zero battle logic (that lives in `cc-engine`).

pub mod abilities;
pub mod moves;
pub mod natures;
pub mod stat_stage;
pub mod types;

pub use abilities::{AbilityDefinition, AbilityEffect};
pub use moves::MoveDefinition;
pub use natures::NatureDefinition;
