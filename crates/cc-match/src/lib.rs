//! The Matchmaker — C5, §4.5.
//!
//! `join_queue`/`leave_queue` are thin wrappers over `cc_store::queue`;
//! `run_match` is the widening-ELO-window pairing scan, executed entirely
//! inside one locked connection so it is the serialization point the spec
//! requires — two concurrent callers can never pair the same agent twice.

pub mod error;

use cc_store::{agents, battles, queue, Store};
use cc_types::ids::AgentId;
use cc_types::{Battle, BattleStatus};
use chrono::{DateTime, Utc};

pub use error::MatchError;

/// §4.5's widening bands, tried in order; the first pair found in the
/// narrowest satisfied window wins, so `run_match` never looks past it.
const ELO_WINDOWS: [i32; 5] = [100, 200, 350, 500, i32::MAX];

pub fn join_queue(store: &Store, agent_id: AgentId, now: DateTime<Utc>) -> Result<(), MatchError> {
    store.with_conn(|conn| {
        if battles::active_battle_for_agent(conn, agent_id)?.is_some() {
            return Err(cc_store::Error::Conflict(format!("agent {agent_id} is already in a battle")));
        }
        queue::join(conn, agent_id, now)
    })
    .map_err(|e| match e {
        cc_store::Error::Conflict(_) => MatchError::AlreadyInBattle(agent_id),
        other => MatchError::Store(other),
    })
}

pub fn leave_queue(store: &Store, agent_id: AgentId) -> Result<(), MatchError> {
    store.with_conn(|conn| queue::leave(conn, agent_id)).map_err(MatchError::Store)
}

/// Runs one pairing scan and returns the newly created battle, if any.
/// Only ever creates at most one battle per call, matching §4.5's "stop at
/// the first successful pair."
pub fn run_match(store: &Store, now: DateTime<Utc>) -> Result<Option<Battle>, MatchError> {
    store
        .with_conn(|conn| {
            let snapshot = queue::snapshot(conn)?;
            for window in ELO_WINDOWS {
                for i in 0..snapshot.len() {
                    for j in (i + 1)..snapshot.len() {
                        if (snapshot[i].elo - snapshot[j].elo).abs() > window {
                            continue;
                        }
                        let agent_a = agents::get(conn, snapshot[i].agent_id)?
                            .ok_or_else(|| cc_store::Error::NotFound(snapshot[i].agent_id.to_string()))?;
                        let agent_b = agents::get(conn, snapshot[j].agent_id)?
                            .ok_or_else(|| cc_store::Error::NotFound(snapshot[j].agent_id.to_string()))?;

                        queue::remove_pair(conn, agent_a.id, agent_b.id)?;

                        let seed: u32 = rand::random();
                        let battle = Battle {
                            id: cc_types::ids::BattleId::new(),
                            display_number: battles::next_display_number(conn)?,
                            agent_a: agent_a.id,
                            agent_b: agent_b.id,
                            status: BattleStatus::Active,
                            current_phase: cc_types::enums::BattlePhase::Waiting,
                            turn_number: 0,
                            pending_move_a: None,
                            pending_move_b: None,
                            state: Some(cc_engine::initial_state(&agent_a, &agent_b, seed)),
                            created_at: now,
                            started_at: Some(now),
                            last_turn_at: Some(now),
                            ended_at: None,
                            winner: None,
                        };
                        battles::insert(conn, &battle)?;
                        return Ok(Some(battle));
                    }
                }
            }
            Ok(None)
        })
        .map_err(MatchError::Store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cc_types::enums::{AgentStatus, PlayMode};
    use cc_types::ids::{AbilityId, MoveId, NatureId, TypeId};
    use cc_types::{Agent, BaseStats};

    fn agent_with_elo(elo: i32) -> Agent {
        Agent {
            id: AgentId::new(),
            name: format!("agent-{elo}"),
            credential_digest: [elo as u8; 32],
            owner_human_id: None,
            webhook_url: None,
            webhook_secret: None,
            primary_type: TypeId::from("FIRE"),
            base_stats: BaseStats { hp: 16, attack: 17, defense: 17, sp_atk: 17, sp_def: 17, speed: 16 },
            nature: NatureId::from("balanced"),
            ability: AbilityId::from("blaze"),
            moves: [
                MoveId::from("fire_blast"),
                MoveId::from("flamethrower"),
                MoveId::from("fire_punch"),
                MoveId::from("recover"),
            ],
            level: 5,
            xp: 0,
            elo,
            wins: 0,
            fights: 0,
            win_streak: 0,
            status: AgentStatus::Active,
            play_mode: PlayMode::Auto,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn pairs_the_narrowest_elo_gap_first() {
        let store = Store::open_in_memory().unwrap();
        let elos = [1000, 1050, 1400, 1405, 2000];
        let mut agents_by_elo = Vec::new();
        for (i, elo) in elos.iter().enumerate() {
            let mut agent = agent_with_elo(*elo);
            agent.credential_digest = [i as u8 + 1; 32];
            store.with_conn(|c| agents::insert(c, &agent)).unwrap();
            let joined_at = Utc::now() + chrono::Duration::milliseconds(i as i64);
            join_queue(&store, agent.id, joined_at).unwrap();
            agents_by_elo.push(agent);
        }

        let first = run_match(&store, Utc::now()).unwrap().expect("1000 and 1050 should pair");
        let pair = [agents_by_elo[0].id, agents_by_elo[1].id];
        assert!(pair.contains(&first.agent_a));
        assert!(pair.contains(&first.agent_b));

        let second = run_match(&store, Utc::now()).unwrap().expect("1400 and 1405 should pair");
        let pair2 = [agents_by_elo[2].id, agents_by_elo[3].id];
        assert!(pair2.contains(&second.agent_a));
        assert!(pair2.contains(&second.agent_b));

        // 2000 remains alone until a new arrival falls inside the infinite window.
        assert!(run_match(&store, Utc::now()).unwrap().is_none());
    }

    #[test]
    fn joining_while_already_in_a_battle_is_rejected() {
        let store = Store::open_in_memory().unwrap();
        let a = agent_with_elo(1000);
        let b = agent_with_elo(1010);
        store.with_conn(|c| agents::insert(c, &a)).unwrap();
        store.with_conn(|c| agents::insert(c, &b)).unwrap();
        join_queue(&store, a.id, Utc::now()).unwrap();
        join_queue(&store, b.id, Utc::now() + chrono::Duration::milliseconds(1)).unwrap();
        run_match(&store, Utc::now()).unwrap().expect("should pair immediately");

        let result = join_queue(&store, a.id, Utc::now());
        assert!(matches!(result, Err(MatchError::AlreadyInBattle(_))));
    }

    #[test]
    fn leave_queue_removes_the_entry() {
        let store = Store::open_in_memory().unwrap();
        let a = agent_with_elo(1000);
        store.with_conn(|c| agents::insert(c, &a)).unwrap();
        join_queue(&store, a.id, Utc::now()).unwrap();
        leave_queue(&store, a.id).unwrap();
        assert!(!store.with_conn(|c| queue::is_queued(c, a.id)).unwrap());
    }
}
