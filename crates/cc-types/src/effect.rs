//! Move effect descriptors — §4.1's tagged variants.
//!
//! A move carries at most one `MoveEffect`. Each variant carries exactly the
//! payload the resolution algorithm in `cc-engine` needs to apply it; there is
//! no open-ended parameter map.

use serde::{Deserialize, Serialize};

use crate::enums::Stat;
use crate::ids::AbilityId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MoveEffect {
    /// Attacker takes recoil damage equal to `fraction` of the damage dealt.
    Recoil { fraction: f64 },
    /// Attacker heals `fraction` of the damage dealt.
    Drain { fraction: f64 },
    /// Defender flinches with probability `chance` (only matters if defender
    /// has not already acted this turn).
    Flinch { chance: f64 },
    /// Defender is inflicted with `status` with probability `chance`.
    StatusInflict {
        status: crate::enums::StatusCondition,
        chance: f64,
    },
    /// Raise one of the mover's own stat stages by `stages`.
    StatBoost { stat: Stat, stages: i8 },
    /// Lower one of the opponent's stat stages by `stages`.
    StatDrop { stat: Stat, stages: i8 },
    /// Heal the mover for `fraction` of its max HP, optionally deferred to
    /// the start of next turn (Wish).
    Heal { fraction: f64, deferred: bool },
    /// Seed the opponent; at each end of turn it loses HP transferred to the
    /// seeder.
    LeechSeed,
    /// Mover sacrifices `self_fraction` of its own HP to curse the opponent.
    Curse { self_fraction: f64 },
    /// Reset every stat stage on both sides to zero.
    ResetStats,
    /// Multiply base power by `max(floor_fraction, currentHP / maxHP)`.
    HpScaling { floor_fraction: f64 },
    /// Double base power if the defender is poisoned.
    DoubleIfPoisoned,
    /// Re-select the defender's Defense stat even for a special move.
    UsePhysicalDef,
    /// Elevated critical-hit rate (~12.5% instead of the 6.25% default).
    HighCrit,
    /// One-hit KO: sets defender HP to 0 outright (subject to Sturdy).
    Ohko,
    /// Two-turn "charge then release" move; fails outright if interrupted.
    Focus,
}

/// A passive trigger declared by an ability definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityRef {
    pub id: AbilityId,
}
