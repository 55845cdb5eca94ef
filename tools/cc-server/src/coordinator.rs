//! Battle Coordinator — §4.6's `submitMove`, `surrender`, `challenge`, and
//! `accept` flows. Every multi-statement mutation here runs inside a single
//! `Store::with_conn` closure so the store's connection mutex is the only
//! serialization point a concurrent double-submit needs: a second caller
//! for the same battle simply waits for the lock rather than racing the
//! first caller's read-modify-write.

use cc_engine::rating::{self, AgentRatingState};
use cc_store::{agents, battles, social};
use cc_types::enums::{BattlePhase, BattleStatus, Side};
use cc_types::ids::{AgentId, BattleId, MoveId, SocialTokenId};
use cc_types::{Agent, ApiError, Battle, BattleEndReason, BattleTurnLog, SocialToken, TurnEvent};
use chrono::{DateTime, Utc};
use serde_json::json;

use crate::error::AppError;
use crate::state::AppState;

const SOCIAL_TOKEN_TTL_SECONDS: i64 = 3600;

/// What a caller of `submit_move`/`surrender`/timeout resolution needs in
/// order to enqueue the right webhook events afterward.
#[derive(Debug)]
pub struct ResolvedTurn {
    pub battle: Battle,
    pub events: Vec<TurnEvent>,
    pub terminal: bool,
    /// Winner/loser snapshots as they stood immediately before
    /// `apply_terminal_rating` committed this battle's rating update, so the
    /// `battle_end` milestone context can detect a threshold crossing
    /// instead of re-deriving it from the already-updated row.
    pub pre_ratings: Option<RatingSnapshot>,
    /// When set, `enqueue_turn_webhooks` dispatches only to this side — used
    /// by `surrender` (§4.6, §8 scenario 5): the surrendering side is not
    /// notified of its own `battle_end`.
    pub notify_only: Option<Side>,
}

#[derive(Debug)]
pub struct RatingSnapshot {
    pub winner_side: Side,
    pub winner: Agent,
    pub loser: Agent,
}

pub fn submit_move(
    app: &AppState,
    battle_id: BattleId,
    caller: &Agent,
    move_id: MoveId,
) -> Result<ResolvedTurn, AppError> {
    let now = Utc::now();
    let resolved = app.store.with_conn(|conn| -> Result<Option<ResolvedTurn>, AppError> {
        let mut battle = battles::get(conn, battle_id)?
            .ok_or_else(|| AppError(ApiError::NotFound(format!("battle {battle_id} not found"))))?;

        if battle.status != BattleStatus::Active {
            return Err(AppError(ApiError::Conflict("battle is not active".into())));
        }
        let side = battle
            .side_of(caller.id)
            .ok_or_else(|| AppError(ApiError::Authorization("caller is not a participant in this battle".into())))?;

        if battle.pending_move(side).is_some() {
            return Err(AppError(ApiError::Conflict("a move was already submitted for this turn".into())));
        }

        let state = battle
            .state
            .as_ref()
            .ok_or_else(|| AppError(ApiError::Internal("active battle is missing its state blob".into())))?;
        let slot = state
            .side(side)
            .moves
            .iter()
            .find(|m| m.move_id == move_id)
            .ok_or_else(|| AppError::from(cc_engine::BattleError::UnknownMove(move_id.clone())))?;
        if !slot.has_pp() {
            return Err(AppError::from(cc_engine::BattleError::NoPp(move_id.clone())));
        }

        battles::set_pending_move(conn, battle_id, side, &move_id)?;
        battle.set_pending_move(side, move_id);

        if battle.pending_move(side.opposite()).is_none() {
            return Ok(None);
        }
        let move_a = battle.pending_move_a.clone().expect("both sides checked present");
        let move_b = battle.pending_move_b.clone().expect("both sides checked present");

        let mut state = battle.state.take().expect("checked above");
        let (events, outcome) = cc_engine::resolve_turn(&mut state, &move_a, &move_b);

        let turn_log = BattleTurnLog {
            battle_id,
            turn_number: battle.turn_number + 1,
            move_a: Some(move_a),
            move_b: Some(move_b),
            events: events.clone(),
            hp_a: state.side_a.current_hp,
            hp_b: state.side_b.current_hp,
            created_at: now,
        };

        let (status, phase, winner) = match outcome {
            Some((winner_side, _)) => (BattleStatus::Finished, BattlePhase::Finished, Some(battle.agent_of(winner_side))),
            None => (BattleStatus::Active, BattlePhase::Waiting, None),
        };

        battles::record_resolved_turn(conn, battle_id, &state, &turn_log, status, phase, winner, now)?;

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
            Some((winner_side, _reason)) => Some(apply_terminal_rating(conn, &battle, winner_side, now)?),
            None => None,
        };

        Ok(Some(ResolvedTurn { battle, events, terminal: outcome.is_some(), pre_ratings, notify_only: None }))
    })?;

    match resolved {
        Some(resolved) => {
            enqueue_turn_webhooks(app, &resolved);
            Ok(resolved)
        }
        None => {
            let battle = app.store.with_conn(|conn| battles::get(conn, battle_id))?
                .ok_or_else(|| AppError(ApiError::NotFound(format!("battle {battle_id} not found"))))?;
            Ok(ResolvedTurn { battle, events: vec![], terminal: false, pre_ratings: None, notify_only: None })
        }
    }
}

pub fn surrender(app: &AppState, battle_id: BattleId, caller: &Agent) -> Result<ResolvedTurn, AppError> {
    let now = Utc::now();
    let resolved = app.store.with_conn(|conn| -> Result<ResolvedTurn, AppError> {
        let mut battle = battles::get(conn, battle_id)?
            .ok_or_else(|| AppError(ApiError::NotFound(format!("battle {battle_id} not found"))))?;

        if battle.status != BattleStatus::Active {
            return Err(AppError(ApiError::Conflict("battle is not active".into())));
        }
        let side = battle
            .side_of(caller.id)
            .ok_or_else(|| AppError(ApiError::Authorization("caller is not a participant in this battle".into())))?;
        let winner_side = side.opposite();

        let turn_log = BattleTurnLog {
            battle_id,
            turn_number: battle.turn_number + 1,
            move_a: None,
            move_b: None,
            events: vec![TurnEvent::BattleEnd { winner: winner_side, reason: BattleEndReason::OpponentSurrendered }],
            hp_a: battle.state.as_ref().map(|s| s.side_a.current_hp).unwrap_or(0),
            hp_b: battle.state.as_ref().map(|s| s.side_b.current_hp).unwrap_or(0),
            created_at: now,
        };
        let state = battle.state.clone().ok_or_else(|| AppError(ApiError::Internal("battle is missing its state blob".into())))?;
        let winner = battle.agent_of(winner_side);
        battles::record_resolved_turn(conn, battle_id, &state, &turn_log, BattleStatus::Forfeited, BattlePhase::Finished, Some(winner), now)?;

        battle.turn_number = turn_log.turn_number;
        battle.status = BattleStatus::Forfeited;
        battle.current_phase = BattlePhase::Finished;
        battle.winner = Some(winner);
        battle.ended_at = Some(now);
        battle.last_turn_at = Some(now);
        battle.clear_pending_moves();

        let pre_ratings = Some(apply_terminal_rating(conn, &battle, winner_side, now)?);

        Ok(ResolvedTurn { battle, events: turn_log.events, terminal: true, pre_ratings, notify_only: Some(winner_side) })
    })?;

    enqueue_turn_webhooks(app, &resolved);
    Ok(resolved)
}

pub fn challenge(app: &AppState, challenger: AgentId, target: AgentId) -> Result<Battle, AppError> {
    if challenger == target {
        return Err(AppError(ApiError::Validation("an agent cannot challenge itself".into())));
    }
    let now = Utc::now();
    let battle = app.store.with_conn(|conn| -> Result<Battle, AppError> {
        if battles::active_battle_for_agent(conn, challenger)?.is_some() {
            return Err(AppError(ApiError::Conflict(format!("agent {challenger} is already in a battle"))));
        }
        if battles::active_battle_for_agent(conn, target)?.is_some() {
            return Err(AppError(ApiError::Conflict(format!("agent {target} is already in a battle"))));
        }
        let battle = Battle {
            id: BattleId::new(),
            display_number: battles::next_display_number(conn)?,
            agent_a: challenger,
            agent_b: target,
            status: BattleStatus::Pending,
            current_phase: BattlePhase::Challenge,
            turn_number: 0,
            pending_move_a: None,
            pending_move_b: None,
            state: None,
            created_at: now,
            started_at: None,
            last_turn_at: None,
            ended_at: None,
            winner: None,
        };
        battles::insert(conn, &battle)?;
        Ok(battle)
    })?;

    if let Some(target_agent) = app.store.with_conn(|conn| agents::get(conn, target))? {
        dispatch_to(app, &target_agent, cc_webhook::EventKind::BattleChallenge, json!({
            "battle_id": battle.id.to_string(),
            "challenger_id": challenger.to_string(),
        }));
    }

    Ok(battle)
}

pub fn accept(app: &AppState, battle_id: BattleId, caller: &Agent) -> Result<Battle, AppError> {
    let now = Utc::now();
    app.store.with_conn(|conn| -> Result<Battle, AppError> {
        let mut battle = battles::get(conn, battle_id)?
            .ok_or_else(|| AppError(ApiError::NotFound(format!("battle {battle_id} not found"))))?;
        if battle.status != BattleStatus::Pending {
            return Err(AppError(ApiError::Conflict("battle is not pending acceptance".into())));
        }
        if battle.agent_b != caller.id {
            return Err(AppError(ApiError::Authorization("only the challenged agent may accept".into())));
        }
        let agent_a = agents::get(conn, battle.agent_a)?
            .ok_or_else(|| AppError(ApiError::Internal("challenger agent vanished".into())))?;

        let seed: u32 = rand::random();
        let state = cc_engine::initial_state(&agent_a, caller, seed);
        battles::accept_challenge(conn, battle_id, &state, now)?;

        battle.status = BattleStatus::Active;
        battle.current_phase = BattlePhase::Waiting;
        battle.started_at = Some(now);
        battle.last_turn_at = Some(now);
        battle.state = Some(state);
        Ok(battle)
    })
}

pub(crate) fn apply_terminal_rating(conn: &rusqlite::Connection, battle: &Battle, winner_side: Side, now: DateTime<Utc>) -> Result<RatingSnapshot, AppError> {
    let winner_id = battle.agent_of(winner_side);
    let loser_id = battle.agent_of(winner_side.opposite());
    let winner_agent = agents::get(conn, winner_id)?.ok_or_else(|| AppError(ApiError::Internal("winner agent vanished".into())))?;
    let loser_agent = agents::get(conn, loser_id)?.ok_or_else(|| AppError(ApiError::Internal("loser agent vanished".into())))?;

    let (winner_update, loser_update) = rating::apply_battle_result(
        AgentRatingState {
            elo: winner_agent.elo,
            xp: winner_agent.xp,
            level: winner_agent.level,
            wins: winner_agent.wins,
            fights: winner_agent.fights,
            win_streak: winner_agent.win_streak,
        },
        AgentRatingState {
            elo: loser_agent.elo,
            xp: loser_agent.xp,
            level: loser_agent.level,
            wins: loser_agent.wins,
            fights: loser_agent.fights,
            win_streak: loser_agent.win_streak,
        },
    );

    agents::apply_battle_result(
        conn, winner_id, winner_update.elo, winner_update.xp, winner_update.level,
        winner_update.wins, winner_update.fights, winner_update.win_streak,
    )?;
    agents::apply_battle_result(
        conn, loser_id, loser_update.elo, loser_update.xp, loser_update.level,
        loser_update.wins, loser_update.fights, loser_update.win_streak,
    )?;

    for agent_id in [winner_id, loser_id] {
        social::issue(conn, &SocialToken {
            id: SocialTokenId::new(),
            agent_id,
            battle_id: battle.id,
            issued_at: now,
            expires_at: now + chrono::Duration::seconds(SOCIAL_TOKEN_TTL_SECONDS),
        })?;
    }

    Ok(RatingSnapshot { winner_side, winner: winner_agent, loser: loser_agent })
}

/// §4.6 step 7: dispatch `battle_turn` to both sides for a non-terminal
/// resolution, or `battle_end` (enriched with matchup/rank/head-to-head
/// context) for a terminal one. A surrender sets `notify_only` so only the
/// opponent is dispatched to — §8 scenario 5, the surrendering side gets no
/// `battle_end` of its own.
pub(crate) fn enqueue_turn_webhooks(app: &AppState, resolved: &ResolvedTurn) {
    let battle = &resolved.battle;
    let Ok(Some(agent_a)) = app.store.with_conn(|conn| agents::get(conn, battle.agent_a)) else { return };
    let Ok(Some(agent_b)) = app.store.with_conn(|conn| agents::get(conn, battle.agent_b)) else { return };

    let event = if resolved.terminal { cc_webhook::EventKind::BattleEnd } else { cc_webhook::EventKind::BattleTurn };

    for (own, opponent, side) in [(&agent_a, &agent_b, Side::A), (&agent_b, &agent_a, Side::B)] {
        if resolved.notify_only.is_some_and(|only| only != side) {
            continue;
        }
        let mut body = base_turn_payload(battle, &resolved.events, side);
        if resolved.terminal {
            let own_pre = resolved.pre_ratings.as_ref().map(|r| if r.winner_side == side { &r.winner } else { &r.loser });
            if let Ok(context) = build_end_context(app, battle, own, opponent, own_pre) {
                body.as_object_mut().expect("json! object literal").insert("context".to_string(), context);
            }
        }
        dispatch_to(app, own, event, body);
    }
}

fn base_turn_payload(battle: &Battle, events: &[TurnEvent], side: Side) -> serde_json::Value {
    let state = battle.state.as_ref();
    json!({
        "battle_id": battle.id.to_string(),
        "turn_number": battle.turn_number,
        "status": battle.status,
        "side": side,
        "events": events,
        "own": state.map(|s| side_view(s.side(side))),
        "opponent": state.map(|s| opponent_view(s.side(side.opposite()))),
        "winner_id": battle.winner.map(|w| w.to_string()),
    })
}

fn side_view(side: &cc_types::BattleSideState) -> serde_json::Value {
    json!({
        "current_hp": side.current_hp,
        "max_hp": side.max_hp,
        "status": side.status,
        "effective_stats": side.effective_stats,
        "stat_stages": side.stat_stages,
        "moves": side.moves,
    })
}

fn opponent_view(side: &cc_types::BattleSideState) -> serde_json::Value {
    json!({
        "current_hp": side.current_hp,
        "max_hp": side.max_hp,
        "status": side.status,
        "primary_type": side.primary_type,
    })
}

fn build_end_context(
    app: &AppState,
    battle: &Battle,
    own: &Agent,
    opponent: &Agent,
    own_pre: Option<&Agent>,
) -> Result<serde_json::Value, AppError> {
    let won = battle.winner == Some(own.id);
    let close_match = battle
        .state
        .as_ref()
        .map(|s| {
            let a = s.side_a.hp_fraction();
            let b = s.side_b.hp_fraction();
            (a - b).abs() < 0.1
        })
        .unwrap_or(false);

    let matchup = cc_data::types::effectiveness(own.primary_type.as_str(), opponent.primary_type.as_str());
    let rank = app.store.with_conn(|conn| agents::rank_by_elo(conn, own.elo))?;
    let history = app.store.with_conn(|conn| battles::head_to_head(conn, own.id, opponent.id))?;

    let prior_losses_to_opponent = history
        .iter()
        .filter(|b| b.id != battle.id && b.winner == Some(opponent.id))
        .count();
    let revenge_win = won && prior_losses_to_opponent > 0;
    let upset = won && own.elo < opponent.elo - 100;

    // `own` already reflects the rating update `apply_terminal_rating`
    // committed before this function runs, so `own.win_streak`/`own.level`
    // are the post-battle values — no `+1`/extra XP needed to "predict" them.
    // `own_pre` is the snapshot from immediately before that update, used
    // only to detect whether this battle is what crossed a level threshold.
    let mut milestones = Vec::new();
    if won {
        let streak = own.win_streak;
        if streak == 3 {
            milestones.push("win_streak_3");
        } else if streak == 5 {
            milestones.push("win_streak_5");
        } else if streak == 10 {
            milestones.push("win_streak_10");
        }
    }
    if let Some(pre) = own_pre {
        for level in [5u32, 10, 20] {
            if pre.level < level && own.level >= level {
                milestones.push(match level {
                    5 => "level_5",
                    10 => "level_10",
                    _ => "level_20",
                });
            }
        }
    }
    if rank <= 10 && app.store.with_conn(|conn| agents::rank_by_elo(conn, opponent.elo)).unwrap_or(u32::MAX) <= 10 {
        milestones.push("top_10_clash");
    }
    if revenge_win {
        milestones.push("revenge_win");
    }

    Ok(json!({
        "close_match": close_match,
        "type_matchup": matchup,
        "rank": rank,
        "head_to_head_count": history.len(),
        "revenge_win": revenge_win,
        "upset": upset,
        "milestones": milestones,
    }))
}

fn dispatch_to(app: &AppState, agent: &Agent, event: cc_webhook::EventKind, body: serde_json::Value) {
    let (Some(url), Some(secret)) = (agent.webhook_url.clone(), agent.webhook_secret.clone()) else {
        return;
    };
    let request = cc_webhook::WebhookRequest::new(url, secret, event, body);
    if let Err(err) = app.dispatcher.enqueue(request) {
        tracing::warn!(agent_id = %agent.id, error = %err, "failed to enqueue webhook");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cc_types::enums::{AgentStatus, PlayMode};
    use cc_types::ids::{AbilityId, NatureId, TypeId};
    use cc_types::BaseStats;

    fn test_app() -> AppState {
        let store = std::sync::Arc::new(cc_store::Store::open_in_memory().unwrap());
        let (dispatcher, _handle) = cc_webhook::Dispatcher::spawn(8);
        let config = std::sync::Arc::new(crate::config::Config {
            port: 0,
            database_path: ":memory:".into(),
            development: true,
            cors_allowed_origins: vec![],
        });
        AppState { store, dispatcher, config }
    }

    fn fire_agent(name: &str, credential: u8) -> Agent {
        Agent {
            id: AgentId::new(),
            name: name.to_string(),
            credential_digest: [credential; 32],
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
            elo: 1000,
            wins: 0,
            fights: 0,
            win_streak: 0,
            status: AgentStatus::Active,
            play_mode: PlayMode::Manual,
            created_at: Utc::now(),
        }
    }

    fn water_agent(name: &str, credential: u8) -> Agent {
        let mut agent = fire_agent(name, credential);
        agent.primary_type = TypeId::from("WATER");
        agent.ability = AbilityId::from("torrent");
        agent.moves = [
            MoveId::from("hydro_pump"),
            MoveId::from("surf"),
            MoveId::from("aqua_jet"),
            MoveId::from("recover"),
        ];
        agent
    }

    fn active_battle(app: &AppState, agent_a: &Agent, agent_b: &Agent) -> Battle {
        app.store.with_conn(|conn| agents::insert(conn, agent_a)).unwrap();
        app.store.with_conn(|conn| agents::insert(conn, agent_b)).unwrap();

        let state = cc_engine::initial_state(agent_a, agent_b, 7);
        let battle = Battle {
            id: BattleId::new(),
            display_number: 1,
            agent_a: agent_a.id,
            agent_b: agent_b.id,
            status: BattleStatus::Active,
            current_phase: BattlePhase::Waiting,
            turn_number: 0,
            pending_move_a: None,
            pending_move_b: None,
            state: Some(state),
            created_at: Utc::now(),
            started_at: Some(Utc::now()),
            last_turn_at: Some(Utc::now()),
            ended_at: None,
            winner: None,
        };
        app.store.with_conn(|conn| battles::insert(conn, &battle)).unwrap();
        battle
    }

    #[test]
    fn submit_move_waits_for_the_other_side_then_resolves() {
        let app = test_app();
        let agent_a = fire_agent("agent-a", 1);
        let agent_b = water_agent("agent-b", 2);
        let battle = active_battle(&app, &agent_a, &agent_b);

        let first = submit_move(&app, battle.id, &agent_a, MoveId::from("fire_blast")).unwrap();
        assert!(first.events.is_empty());
        assert!(!first.terminal);

        let second = submit_move(&app, battle.id, &agent_b, MoveId::from("surf")).unwrap();
        assert!(!second.events.is_empty());
        assert_eq!(second.battle.turn_number, 1);
        assert!(second.battle.pending_move_a.is_none());
        assert!(second.battle.pending_move_b.is_none());
    }

    #[test]
    fn submit_move_rejects_a_non_participant() {
        let app = test_app();
        let agent_a = fire_agent("agent-a", 3);
        let agent_b = water_agent("agent-b", 4);
        let battle = active_battle(&app, &agent_a, &agent_b);
        let bystander = fire_agent("bystander", 5);

        let err = submit_move(&app, battle.id, &bystander, MoveId::from("fire_blast")).unwrap_err();
        assert!(matches!(err.0, ApiError::Authorization(_)));
    }

    #[test]
    fn submit_move_rejects_a_double_submission_from_the_same_side() {
        let app = test_app();
        let agent_a = fire_agent("agent-a", 6);
        let agent_b = water_agent("agent-b", 7);
        let battle = active_battle(&app, &agent_a, &agent_b);

        submit_move(&app, battle.id, &agent_a, MoveId::from("fire_blast")).unwrap();
        let err = submit_move(&app, battle.id, &agent_a, MoveId::from("fire_punch")).unwrap_err();
        assert!(matches!(err.0, ApiError::Conflict(_)));
    }

    #[test]
    fn surrender_awards_the_win_to_the_opponent() {
        let app = test_app();
        let agent_a = fire_agent("agent-a", 8);
        let agent_b = water_agent("agent-b", 9);
        let battle = active_battle(&app, &agent_a, &agent_b);

        let resolved = surrender(&app, battle.id, &agent_a).unwrap();
        assert!(resolved.terminal);
        assert_eq!(resolved.battle.status, BattleStatus::Forfeited);
        assert_eq!(resolved.battle.winner, Some(agent_b.id));

        let winner = app.store.with_conn(|conn| agents::get(conn, agent_b.id)).unwrap().unwrap();
        assert_eq!(winner.wins, 1);
        assert_eq!(winner.fights, 1);
    }

    #[test]
    fn challenge_then_accept_starts_an_active_battle_with_state() {
        let app = test_app();
        let challenger = fire_agent("challenger", 10);
        let target = water_agent("target", 11);
        app.store.with_conn(|conn| agents::insert(conn, &challenger)).unwrap();
        app.store.with_conn(|conn| agents::insert(conn, &target)).unwrap();

        let pending = challenge(&app, challenger.id, target.id).unwrap();
        assert_eq!(pending.status, BattleStatus::Pending);

        let started = accept(&app, pending.id, &target).unwrap();
        assert_eq!(started.status, BattleStatus::Active);
        assert!(started.state.is_some());
    }

    #[test]
    fn challenging_oneself_is_rejected() {
        let app = test_app();
        let agent = fire_agent("solo", 12);
        let err = challenge(&app, agent.id, agent.id).unwrap_err();
        assert!(matches!(err.0, ApiError::Validation(_)));
    }
}
