//! The `Battle` entity and its in-memory/serialized state blob — §3.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::agent::BaseStats;
use crate::enums::{BattlePhase, BattleStatus, Side, StatusCondition};
use crate::events::TurnEvent;
use crate::ids::{AbilityId, AgentId, BattleId, MoveId, SocialTokenId, TypeId};
use crate::rng::BattleRng;

/// A single move slot's mutable battle state: which move, how much PP is
/// left. Power/accuracy/effect are looked up from the static catalog by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveSlot {
    pub move_id: MoveId,
    pub current_pp: u8,
    pub max_pp: u8,
}

impl MoveSlot {
    pub fn has_pp(&self) -> bool {
        self.current_pp > 0
    }
}

/// Per-status turn counters, only the relevant one is ever nonzero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounters {
    pub freeze_turns: u8,
    pub sleep_turns: u8,
    pub confusion_turns: u8,
    pub woke_from_damage: bool,
}

/// Per-turn flags, reset at the start of every turn (§4.3 step 1).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerTurnFlags {
    pub flinched: bool,
    pub took_damage_this_turn: bool,
}

/// Flags that persist across turns until consumed or the battle ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistentFlags {
    pub sturdy_used: bool,
    pub wish_pending: bool,
    pub wish_turn: u32,
    pub leech_seeded: bool,
    pub cursed: bool,
}

/// One side's full mutable battle state — the per-side half of the opaque
/// state blob described in §3.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleSideState {
    pub agent_id: AgentId,
    pub primary_type: TypeId,
    pub ability: AbilityId,
    pub level: u32,
    pub base_stats: BaseStats,
    /// Snapshot of effective stats computed at battle start; mutated only by
    /// `battle_start`-triggered abilities, never recomputed mid-battle.
    pub effective_stats: BattleStats,
    pub stat_stages: BTreeMap<crate::enums::Stat, i8>,
    pub max_hp: u32,
    pub current_hp: u32,
    pub status: StatusCondition,
    pub status_counters: StatusCounters,
    pub moves: Vec<MoveSlot>,
    pub per_turn: PerTurnFlags,
    pub persistent: PersistentFlags,
    pub consecutive_timeouts: u8,
}

/// Effective (post-level, post-nature, pre-stage) stat snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleStats {
    pub attack: u32,
    pub defense: u32,
    pub sp_atk: u32,
    pub sp_def: u32,
    pub speed: u32,
}

impl BattleSideState {
    pub fn stage(&self, stat: crate::enums::Stat) -> i8 {
        *self.stat_stages.get(&stat).unwrap_or(&0)
    }

    pub fn bump_stage(&mut self, stat: crate::enums::Stat, delta: i8) -> i8 {
        let current = self.stage(stat);
        let next = (current + delta).clamp(-6, 6);
        self.stat_stages.insert(stat, next);
        next
    }

    pub fn is_fainted(&self) -> bool {
        self.current_hp == 0
    }

    pub fn is_full_hp(&self) -> bool {
        self.current_hp == self.max_hp
    }

    pub fn hp_fraction(&self) -> f64 {
        if self.max_hp == 0 {
            0.0
        } else {
            self.current_hp as f64 / self.max_hp as f64
        }
    }
}

/// The opaque per-battle state blob, serialized into a single `BLOB` column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleStateBlob {
    pub side_a: BattleSideState,
    pub side_b: BattleSideState,
    pub rng: BattleRng,
    /// Side that moved first in the most recently resolved turn; used only
    /// to break mutual-KO ties (§4.3.7).
    pub last_first_side: Option<Side>,
}

impl BattleStateBlob {
    pub fn side(&self, side: Side) -> &BattleSideState {
        match side {
            Side::A => &self.side_a,
            Side::B => &self.side_b,
        }
    }

    pub fn side_mut(&mut self, side: Side) -> &mut BattleSideState {
        match side {
            Side::A => &mut self.side_a,
            Side::B => &mut self.side_b,
        }
    }
}

/// Persistent battle row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Battle {
    pub id: BattleId,
    pub display_number: u64,
    pub agent_a: AgentId,
    pub agent_b: AgentId,
    pub status: BattleStatus,
    pub current_phase: BattlePhase,
    pub turn_number: u32,
    pub pending_move_a: Option<MoveId>,
    pub pending_move_b: Option<MoveId>,
    pub state: Option<BattleStateBlob>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    pub last_turn_at: Option<chrono::DateTime<chrono::Utc>>,
    pub ended_at: Option<chrono::DateTime<chrono::Utc>>,
    pub winner: Option<AgentId>,
}

impl Battle {
    pub fn side_of(&self, agent: AgentId) -> Option<Side> {
        if agent == self.agent_a {
            Some(Side::A)
        } else if agent == self.agent_b {
            Some(Side::B)
        } else {
            None
        }
    }

    pub fn agent_of(&self, side: Side) -> AgentId {
        match side {
            Side::A => self.agent_a,
            Side::B => self.agent_b,
        }
    }

    pub fn pending_move(&self, side: Side) -> &Option<MoveId> {
        match side {
            Side::A => &self.pending_move_a,
            Side::B => &self.pending_move_b,
        }
    }

    pub fn set_pending_move(&mut self, side: Side, mv: MoveId) {
        match side {
            Side::A => self.pending_move_a = Some(mv),
            Side::B => self.pending_move_b = Some(mv),
        }
    }

    pub fn clear_pending_moves(&mut self) {
        self.pending_move_a = None;
        self.pending_move_b = None;
    }
}

/// Append-only per-turn log row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleTurnLog {
    pub battle_id: BattleId,
    pub turn_number: u32,
    pub move_a: Option<MoveId>,
    pub move_b: Option<MoveId>,
    pub events: Vec<TurnEvent>,
    pub hp_a: u32,
    pub hp_b: u32,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Matchmaking queue row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueEntry {
    pub agent_id: AgentId,
    pub joined_at: chrono::DateTime<chrono::Utc>,
}

/// One-shot post-battle social handle, consumed by the (out-of-scope) social
/// collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialToken {
    pub id: SocialTokenId,
    pub agent_id: AgentId,
    pub battle_id: BattleId,
    pub issued_at: chrono::DateTime<chrono::Utc>,
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_side() -> BattleSideState {
        BattleSideState {
            agent_id: AgentId::new(),
            primary_type: TypeId::from("FIRE"),
            ability: AbilityId::from("blaze"),
            level: 1,
            base_stats: BaseStats {
                hp: 16,
                attack: 17,
                defense: 17,
                sp_atk: 17,
                sp_def: 17,
                speed: 16,
            },
            effective_stats: BattleStats {
                attack: 20,
                defense: 20,
                sp_atk: 20,
                sp_def: 20,
                speed: 20,
            },
            stat_stages: BTreeMap::new(),
            max_hp: 30,
            current_hp: 30,
            status: StatusCondition::None,
            status_counters: StatusCounters::default(),
            moves: vec![],
            per_turn: PerTurnFlags::default(),
            persistent: PersistentFlags::default(),
            consecutive_timeouts: 0,
        }
    }

    #[test]
    fn stat_stage_clamps_to_bounds() {
        let mut side = sample_side();
        for _ in 0..10 {
            side.bump_stage(crate::enums::Stat::Attack, 1);
        }
        assert_eq!(side.stage(crate::enums::Stat::Attack), 6);
        for _ in 0..20 {
            side.bump_stage(crate::enums::Stat::Attack, -1);
        }
        assert_eq!(side.stage(crate::enums::Stat::Attack), -6);
    }

    #[test]
    fn hp_fraction_full_and_zero() {
        let mut side = sample_side();
        assert_eq!(side.hp_fraction(), 1.0);
        side.current_hp = 0;
        assert!(side.is_fainted());
        assert_eq!(side.hp_fraction(), 0.0);
    }
}
