//! Turn-log event taxonomy — §4.3's event sequence, stable across
//! reimplementations so that a turn log can be replayed or diffed.

use serde::{Deserialize, Serialize};

use crate::enums::{Side, StatusCondition};
use crate::ids::MoveId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnEvent {
    UseMove { side: Side, move_id: MoveId },
    Flinch { side: Side },
    Status { side: Side, status: StatusCondition },
    Dodge { side: Side },
    Immune { side: Side },
    Miss { side: Side },
    Ohko { side: Side },
    Damage {
        side: Side,
        amount: u32,
        crit: bool,
        type_effectiveness: f64,
    },
    Recoil { side: Side, amount: u32 },
    Drain { side: Side, amount: u32 },
    Heal { side: Side, amount: u32 },
    Wish { side: Side },
    LeechSeed { side: Side },
    StatBoost { side: Side, stat: crate::enums::Stat, stages: i8 },
    StatDrop { side: Side, stat: crate::enums::Stat, stages: i8 },
    StatusInflict { side: Side, status: StatusCondition },
    BurnDamage { side: Side, amount: u32 },
    PoisonDamage { side: Side, amount: u32 },
    LeechSeedDamage { side: Side, amount: u32, healed_side: Side },
    CurseDamage { side: Side, amount: u32 },
    WishHeal { side: Side, amount: u32 },
    Ability { side: Side, ability: String },
    ConfusionSelfHit { side: Side, amount: u32 },
    BattleEnd { winner: Side, reason: BattleEndReason },
    Timeout { side: Side },
    FocusFail { side: Side },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleEndReason {
    Knockout,
    MutualKnockout,
    OpponentSurrendered,
    ConsecutiveTimeouts,
}
