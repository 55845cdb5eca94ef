//! Builds the initial per-side battle state from a persisted `Agent` — used
//! wherever a battle transitions into `active`: the Matchmaker's `match()`
//! and the Battle Coordinator's challenge `accept`.

use std::collections::BTreeMap;

use cc_data::{moves, natures};
use cc_types::enums::StatusCondition;
use cc_types::{Agent, BattleRng, BattleSideState, BattleStateBlob, BattleStats, MoveSlot};

use crate::formulas;

/// One side's opening snapshot: max HP, effective stats (post-nature,
/// pre-stage), and a fresh move slot per move with full PP.
pub fn initial_side(agent: &Agent) -> BattleSideState {
    let nature = natures::get_nature(agent.nature.as_str());
    let nature_mult = |stat| {
        nature
            .map(|n| natures::nature_multiplier(n, stat))
            .unwrap_or(1.0)
    };
    let max_hp = formulas::max_hp(agent.base_stats.hp, agent.level);

    BattleSideState {
        agent_id: agent.id,
        primary_type: agent.primary_type.clone(),
        ability: agent.ability.clone(),
        level: agent.level,
        base_stats: agent.base_stats,
        effective_stats: BattleStats {
            attack: formulas::effective_stat(
                agent.base_stats.attack,
                agent.level,
                nature_mult(cc_types::enums::Stat::Attack),
            ),
            defense: formulas::effective_stat(
                agent.base_stats.defense,
                agent.level,
                nature_mult(cc_types::enums::Stat::Defense),
            ),
            sp_atk: formulas::effective_stat(
                agent.base_stats.sp_atk,
                agent.level,
                nature_mult(cc_types::enums::Stat::SpAtk),
            ),
            sp_def: formulas::effective_stat(
                agent.base_stats.sp_def,
                agent.level,
                nature_mult(cc_types::enums::Stat::SpDef),
            ),
            speed: formulas::effective_stat(
                agent.base_stats.speed,
                agent.level,
                nature_mult(cc_types::enums::Stat::Speed),
            ),
        },
        stat_stages: BTreeMap::new(),
        max_hp,
        current_hp: max_hp,
        status: StatusCondition::None,
        status_counters: Default::default(),
        moves: agent
            .moves
            .iter()
            .map(|id| {
                let pp = moves::get_move(id.as_str()).map(|m| m.pp).unwrap_or(0);
                MoveSlot { move_id: id.clone(), current_pp: pp, max_pp: pp }
            })
            .collect(),
        per_turn: Default::default(),
        persistent: Default::default(),
        consecutive_timeouts: 0,
    }
}

/// A fresh state blob for two agents entering combat, seeded for this one
/// battle so its turns replay deterministically from the stored seed.
pub fn initial_state(agent_a: &Agent, agent_b: &Agent, seed: u32) -> BattleStateBlob {
    BattleStateBlob {
        side_a: initial_side(agent_a),
        side_b: initial_side(agent_b),
        rng: BattleRng::new(seed),
        last_first_side: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cc_types::enums::{AgentStatus, PlayMode};
    use cc_types::ids::{AbilityId, AgentId, MoveId, NatureId, TypeId};
    use cc_types::BaseStats;

    fn sample_agent() -> Agent {
        Agent {
            id: AgentId::new(),
            name: "ember".to_string(),
            credential_digest: [0u8; 32],
            owner_human_id: None,
            webhook_url: None,
            webhook_secret: None,
            primary_type: TypeId::from("FIRE"),
            base_stats: BaseStats { hp: 16, attack: 17, defense: 17, sp_atk: 17, sp_def: 17, speed: 16 },
            nature: NatureId::from("fierce"),
            ability: AbilityId::from("blaze"),
            moves: [
                MoveId::from("fire_blast"),
                MoveId::from("flamethrower"),
                MoveId::from("fire_punch"),
                MoveId::from("recover"),
            ],
            level: 5,
            xp: 0,
            elo: 1000,
            wins: 0,
            fights: 0,
            win_streak: 0,
            status: AgentStatus::Active,
            play_mode: PlayMode::Auto,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn nature_boost_raises_the_boosted_stat() {
        let agent = sample_agent();
        let side = initial_side(&agent);
        let neutral = formulas::effective_stat(agent.base_stats.attack, agent.level, 1.0);
        assert!(side.effective_stats.attack >= neutral);
    }

    #[test]
    fn move_slots_start_at_full_pp() {
        let agent = sample_agent();
        let side = initial_side(&agent);
        assert_eq!(side.moves.len(), 4);
        assert!(side.moves.iter().all(|m| m.current_pp == m.max_pp && m.max_pp > 0));
    }

    #[test]
    fn initial_state_seeds_both_sides_from_zero_draws() {
        let a = sample_agent();
        let mut b = sample_agent();
        b.id = AgentId::new();
        let state = initial_state(&a, &b, 7);
        assert_eq!(state.rng.counter, 0);
        assert_eq!(state.side_a.current_hp, state.side_a.max_hp);
        assert!(state.last_first_side.is_none());
    }
}
