//! Timeout Scheduler — §4.7: a background tick that forces progress on
//! battles where a side has gone quiet, so a stalled agent can never hold
//! its opponent hostage indefinitely.

use cc_store::battles;
use cc_types::enums::{BattlePhase, BattleStatus, Side};
use cc_types::{Battle, BattleEndReason, BattleTurnLog, TurnEvent};
use chrono::Utc;
use std::time::Duration;

use crate::coordinator::{self, ResolvedTurn};
use crate::error::AppError;
use crate::state::AppState;

pub const TICK_PERIOD: Duration = Duration::from_secs(10);
pub const TURN_TIMEOUT: Duration = Duration::from_secs(30);
pub const MAX_CONSECUTIVE_TIMEOUTS: u8 = 3;
/// Not spelled out in §4.5/§4.6 beyond "anything else times out the pending
/// challenge (treated as cancelled by the scheduler)" — two minutes gives a
/// human or automated responder a fair window without leaving a challenged
/// agent's queue cluttered indefinitely.
pub const CHALLENGE_TIMEOUT: Duration = Duration::from_secs(120);

/// Runs forever, ticking every `TICK_PERIOD`. Spawned once from `main`.
pub async fn run(app: AppState) {
    let mut interval = tokio::time::interval(TICK_PERIOD);
    loop {
        interval.tick().await;
        if let Err(err) = tick(&app) {
            tracing::error!(error = %err.0, "timeout scheduler tick failed");
        }
    }
}

/// One scheduler pass: advances every battle that has been waiting on a
/// move past `TURN_TIMEOUT`. Returns how many battles it touched.
pub fn tick(app: &AppState) -> Result<usize, AppError> {
    let now = Utc::now();
    let cutoff = now - chrono::Duration::from_std(TURN_TIMEOUT).expect("constant duration fits");
    let stale = app.store.with_conn(|conn| battles::stale_waiting_battles(conn, cutoff))?;

    let mut resolved_turns = Vec::new();
    for battle in stale {
        if let Some(resolved) = app.store.with_conn(|conn| resolve_one(conn, battle, now))? {
            resolved_turns.push(resolved);
        }
    }

    let count = resolved_turns.len();
    for resolved in &resolved_turns {
        coordinator::enqueue_turn_webhooks(app, resolved);
    }

    let challenge_cutoff = now - chrono::Duration::from_std(CHALLENGE_TIMEOUT).expect("constant duration fits");
    let expired = app.store.with_conn(|conn| battles::stale_pending_challenges(conn, challenge_cutoff))?;
    for battle in &expired {
        app.store.with_conn(|conn| battles::cancel_challenge(conn, battle.id, now))?;
        tracing::debug!(battle_id = %battle.id, "pending challenge expired, cancelled");
    }

    Ok(count)
}

fn resolve_one(conn: &rusqlite::Connection, mut battle: Battle, now: chrono::DateTime<Utc>) -> Result<Option<ResolvedTurn>, AppError> {
    let mut state = battle
        .state
        .take()
        .ok_or_else(|| AppError(cc_types::ApiError::Internal("stale battle is missing its state blob".into())))?;

    let missing_a = battle.pending_move_a.is_none();
    let missing_b = battle.pending_move_b.is_none();

    for (side, missing) in [(Side::A, missing_a), (Side::B, missing_b)] {
        if missing {
            state.side_mut(side).consecutive_timeouts = state.side(side).consecutive_timeouts.saturating_add(1);
        } else {
            state.side_mut(side).consecutive_timeouts = 0;
        }
    }

    let forfeiting_side = [Side::A, Side::B]
        .into_iter()
        .find(|&s| state.side(s).consecutive_timeouts >= MAX_CONSECUTIVE_TIMEOUTS);

    if let Some(forfeiting_side) = forfeiting_side {
        let winner_side = forfeiting_side.opposite();
        let turn_log = BattleTurnLog {
            battle_id: battle.id,
            turn_number: battle.turn_number + 1,
            move_a: battle.pending_move_a.clone(),
            move_b: battle.pending_move_b.clone(),
            events: vec![TurnEvent::BattleEnd { winner: winner_side, reason: BattleEndReason::ConsecutiveTimeouts }],
            hp_a: state.side_a.current_hp,
            hp_b: state.side_b.current_hp,
            created_at: now,
        };
        let winner = battle.agent_of(winner_side);
        battles::record_resolved_turn(conn, battle.id, &state, &turn_log, BattleStatus::Timeout, BattlePhase::Finished, Some(winner), now)?;

        battle.turn_number = turn_log.turn_number;
        battle.status = BattleStatus::Timeout;
        battle.current_phase = BattlePhase::Finished;
        battle.winner = Some(winner);
        battle.ended_at = Some(now);
        battle.last_turn_at = Some(now);
        battle.clear_pending_moves();
        battle.state = Some(state);

        let pre_ratings = Some(coordinator::apply_terminal_rating(conn, &battle, winner_side, now)?);
        return Ok(Some(ResolvedTurn { battle, events: turn_log.events, terminal: true, pre_ratings, notify_only: None }));
    }

    let (events, outcome) = cc_engine::resolve_timeout_turn(&mut state, battle.pending_move_a.as_ref(), battle.pending_move_b.as_ref());

    let turn_log = BattleTurnLog {
        battle_id: battle.id,
        turn_number: battle.turn_number + 1,
        move_a: battle.pending_move_a.clone(),
        move_b: battle.pending_move_b.clone(),
        events: events.clone(),
        hp_a: state.side_a.current_hp,
        hp_b: state.side_b.current_hp,
        created_at: now,
    };

    let (status, phase, winner) = match outcome {
        Some((winner_side, _)) => (BattleStatus::Finished, BattlePhase::Finished, Some(battle.agent_of(winner_side))),
        None => (BattleStatus::Active, BattlePhase::Waiting, None),
    };
    battles::record_resolved_turn(conn, battle.id, &state, &turn_log, status, phase, winner, now)?;

    battle.turn_number = turn_log.turn_number;
    battle.status = status;
    battle.current_phase = phase;
    battle.winner = winner;
    battle.clear_pending_moves();
    battle.last_turn_at = Some(now);
    if status.is_terminal() {
        battle.ended_at = Some(now);
    }
    battle.state = Some(state);

    let pre_ratings = match outcome {
        Some((winner_side, _)) => Some(coordinator::apply_terminal_rating(conn, &battle, winner_side, now)?),
        None => None,
    };

    Ok(Some(ResolvedTurn { battle, events, terminal: outcome.is_some(), pre_ratings, notify_only: None }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cc_store::agents;
    use cc_types::enums::{AgentStatus, PlayMode};
    use cc_types::ids::{AbilityId, AgentId, MoveId, NatureId, TypeId};
    use cc_types::BaseStats;
    use cc_webhook::Dispatcher;

    fn test_app() -> AppState {
        let store = std::sync::Arc::new(cc_store::Store::open_in_memory().unwrap());
        let (dispatcher, _handle) = Dispatcher::spawn(8);
        let config = std::sync::Arc::new(crate::config::Config {
            port: 0,
            database_path: ":memory:".into(),
            development: true,
            cors_allowed_origins: vec![],
        });
        AppState { store, dispatcher, config }
    }

    fn agent(name: &str, credential: u8, primary_type: &str, ability: &str, moves: [&str; 4]) -> cc_types::Agent {
        cc_types::Agent {
            id: AgentId::new(),
            name: name.to_string(),
            credential_digest: [credential; 32],
            owner_human_id: None,
            webhook_url: None,
            webhook_secret: None,
            primary_type: TypeId::from(primary_type),
            base_stats: BaseStats { hp: 16, attack: 17, defense: 17, sp_atk: 17, sp_def: 17, speed: 16 },
            nature: NatureId::from("balanced"),
            ability: AbilityId::from(ability),
            moves: [
                MoveId::from(moves[0]),
                MoveId::from(moves[1]),
                MoveId::from(moves[2]),
                MoveId::from(moves[3]),
            ],
            level: 5,
            xp: 0,
            elo: 1000,
            wins: 0,
            fights: 0,
            win_streak: 0,
            status: AgentStatus::Active,
            play_mode: PlayMode::Auto,
            created_at: Utc::now(),
        }
    }

    fn stalled_battle(app: &AppState, agent_a: &cc_types::Agent, agent_b: &cc_types::Agent, pending_a: Option<&str>) -> Battle {
        app.store.with_conn(|conn| agents::insert(conn, agent_a)).unwrap();
        app.store.with_conn(|conn| agents::insert(conn, agent_b)).unwrap();

        let state = cc_engine::initial_state(agent_a, agent_b, 42);
        let stale_at = Utc::now() - chrono::Duration::minutes(5);
        let battle = Battle {
            id: cc_types::ids::BattleId::new(),
            display_number: 1,
            agent_a: agent_a.id,
            agent_b: agent_b.id,
            status: BattleStatus::Active,
            current_phase: BattlePhase::Waiting,
            turn_number: 0,
            pending_move_a: pending_a.map(MoveId::from),
            pending_move_b: None,
            state: Some(state),
            created_at: stale_at,
            started_at: Some(stale_at),
            last_turn_at: Some(stale_at),
            ended_at: None,
            winner: None,
        };
        app.store.with_conn(|conn| battles::insert(conn, &battle)).unwrap();
        battle
    }

    #[test]
    fn tick_applies_the_present_side_and_logs_a_timeout_for_the_absent_one() {
        let app = test_app();
        let agent_a = agent("agent-a", 1, "FIRE", "blaze", ["fire_blast", "flamethrower", "fire_punch", "recover"]);
        let agent_b = agent("agent-b", 2, "WATER", "torrent", ["hydro_pump", "surf", "aqua_jet", "recover"]);
        let battle = stalled_battle(&app, &agent_a, &agent_b, Some("fire_blast"));

        let count = tick(&app).unwrap();
        assert_eq!(count, 1);

        let updated = app.store.with_conn(|conn| battles::get(conn, battle.id)).unwrap().unwrap();
        assert_eq!(updated.status, BattleStatus::Active);
        assert_eq!(updated.turn_number, 1);
        let state = updated.state.unwrap();
        assert_eq!(state.side_b.consecutive_timeouts, 1);
        assert_eq!(state.side_a.consecutive_timeouts, 0);
    }

    #[test]
    fn three_consecutive_timeouts_forfeit_the_silent_side() {
        let app = test_app();
        let agent_a = agent("agent-a", 3, "FIRE", "blaze", ["fire_blast", "flamethrower", "fire_punch", "recover"]);
        let agent_b = agent("agent-b", 4, "WATER", "torrent", ["hydro_pump", "surf", "aqua_jet", "recover"]);
        let battle = stalled_battle(&app, &agent_a, &agent_b, None);

        for _ in 0..MAX_CONSECUTIVE_TIMEOUTS {
            tick(&app).unwrap();
            let refreshed = app.store.with_conn(|conn| battles::get(conn, battle.id)).unwrap().unwrap();
            if refreshed.status.is_terminal() {
                break;
            }
            app.store
                .with_conn(|conn| {
                    conn.execute(
                        "UPDATE battles SET last_turn_at = ?1 WHERE id = ?2",
                        rusqlite::params![
                            (Utc::now() - chrono::Duration::minutes(5)).to_rfc3339(),
                            battle.id.to_string(),
                        ],
                    )
                })
                .unwrap();
        }

        let finished = app.store.with_conn(|conn| battles::get(conn, battle.id)).unwrap().unwrap();
        assert_eq!(finished.status, BattleStatus::Timeout);
        assert_eq!(finished.winner, Some(agent_a.id));
    }

    #[test]
    fn pending_challenge_past_the_expiry_window_is_cancelled() {
        let app = test_app();
        let challenger = agent("challenger", 5, "FIRE", "blaze", ["fire_blast", "flamethrower", "fire_punch", "recover"]);
        let target = agent("target", 6, "WATER", "torrent", ["hydro_pump", "surf", "aqua_jet", "recover"]);
        app.store.with_conn(|conn| agents::insert(conn, &challenger)).unwrap();
        app.store.with_conn(|conn| agents::insert(conn, &target)).unwrap();

        let created_at = Utc::now() - chrono::Duration::minutes(10);
        let battle = Battle {
            id: cc_types::ids::BattleId::new(),
            display_number: 1,
            agent_a: challenger.id,
            agent_b: target.id,
            status: BattleStatus::Pending,
            current_phase: BattlePhase::Challenge,
            turn_number: 0,
            pending_move_a: None,
            pending_move_b: None,
            state: None,
            created_at,
            started_at: None,
            last_turn_at: None,
            ended_at: None,
            winner: None,
        };
        app.store.with_conn(|conn| battles::insert(conn, &battle)).unwrap();

        tick(&app).unwrap();

        let cancelled = app.store.with_conn(|conn| battles::get(conn, battle.id)).unwrap().unwrap();
        assert_eq!(cancelled.status, BattleStatus::Cancelled);
    }
}
