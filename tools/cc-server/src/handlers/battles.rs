//! Battle lifecycle routes — §6: queueing, challenges, move submission,
//! surrender, and the read endpoints used to poll a battle's state.

use axum::extract::{Path, State};
use axum::Json;
use cc_store::{agents, battles};
use cc_types::ids::{AgentId, BattleId, MoveId};
use cc_types::{Agent, ApiError, Battle, BattleTurnLog};
use serde::{Deserialize, Serialize};

use crate::auth::AuthenticatedAgent;
use crate::coordinator;
use crate::error::AppError;
use crate::state::AppState;

pub async fn join_queue(
    State(app): State<AppState>,
    AuthenticatedAgent(caller): AuthenticatedAgent,
) -> Result<(), AppError> {
    cc_match::join_queue(&app.store, caller.id, chrono::Utc::now())?;
    crate::matchmaker::tick(&app);
    Ok(())
}

pub async fn leave_queue(
    State(app): State<AppState>,
    AuthenticatedAgent(caller): AuthenticatedAgent,
) -> Result<(), AppError> {
    cc_match::leave_queue(&app.store, caller.id)?;
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct ChallengeRequest {
    pub target_agent_id: AgentId,
}

#[derive(Debug, Serialize)]
pub struct ChallengeResponse {
    pub battle_id: String,
    pub status: cc_types::enums::BattleStatus,
}

pub async fn challenge(
    State(app): State<AppState>,
    AuthenticatedAgent(caller): AuthenticatedAgent,
    Json(req): Json<ChallengeRequest>,
) -> Result<Json<ChallengeResponse>, AppError> {
    let battle = coordinator::challenge(&app, caller.id, req.target_agent_id)?;
    Ok(Json(ChallengeResponse { battle_id: battle.id.to_string(), status: battle.status }))
}

#[derive(Debug, Serialize)]
pub struct AcceptResponse {
    pub status: &'static str,
    pub battle_id: String,
    pub battle_state: BattleSnapshot,
}

pub async fn accept(
    State(app): State<AppState>,
    AuthenticatedAgent(caller): AuthenticatedAgent,
    Path(battle_id): Path<BattleId>,
) -> Result<Json<AcceptResponse>, AppError> {
    let battle = coordinator::accept(&app, battle_id, &caller)?;
    Ok(Json(AcceptResponse {
        status: "battle_started",
        battle_id: battle.id.to_string(),
        battle_state: BattleSnapshot::from_battle(&app, &battle, Some(caller.id))?,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ChooseMoveRequest {
    pub move_id: String,
}

#[derive(Debug, Serialize)]
pub struct ChooseMoveResponse {
    pub battle_id: String,
    pub status: cc_types::enums::BattleStatus,
    pub events: Vec<cc_types::TurnEvent>,
}

pub async fn choose_move(
    State(app): State<AppState>,
    AuthenticatedAgent(caller): AuthenticatedAgent,
    Path(battle_id): Path<BattleId>,
    Json(req): Json<ChooseMoveRequest>,
) -> Result<Json<ChooseMoveResponse>, AppError> {
    let resolved = coordinator::submit_move(&app, battle_id, &caller, MoveId::from(req.move_id))?;
    Ok(Json(ChooseMoveResponse {
        battle_id: resolved.battle.id.to_string(),
        status: resolved.battle.status,
        events: resolved.events,
    }))
}

pub async fn surrender(
    State(app): State<AppState>,
    AuthenticatedAgent(caller): AuthenticatedAgent,
    Path(battle_id): Path<BattleId>,
) -> Result<Json<ChooseMoveResponse>, AppError> {
    let resolved = coordinator::surrender(&app, battle_id, &caller)?;
    Ok(Json(ChooseMoveResponse {
        battle_id: resolved.battle.id.to_string(),
        status: resolved.battle.status,
        events: resolved.events,
    }))
}

pub async fn active(
    State(app): State<AppState>,
    AuthenticatedAgent(caller): AuthenticatedAgent,
) -> Result<Json<Option<BattleSnapshot>>, AppError> {
    let Some(battle) = app.store.with_conn(|conn| battles::active_battle_for_agent(conn, caller.id))? else {
        return Ok(Json(None));
    };
    Ok(Json(Some(BattleSnapshot::from_battle(&app, &battle, Some(caller.id))?)))
}

/// Public, no auth required per §6 — enriched with the caller's own side
/// view when a valid bearer credential happens to be attached.
pub async fn get(
    State(app): State<AppState>,
    Path(battle_id): Path<BattleId>,
    headers: axum::http::HeaderMap,
) -> Result<Json<BattleSnapshot>, AppError> {
    let battle = app
        .store
        .with_conn(|conn| battles::get(conn, battle_id))?
        .ok_or_else(|| AppError(ApiError::NotFound(format!("battle {battle_id} not found"))))?;

    let caller_id = caller_agent_id(&app, &headers)?;
    Ok(Json(BattleSnapshot::from_battle(&app, &battle, caller_id)?))
}

/// Best-effort bearer lookup for the public `GET /battles/{id}` route: an
/// absent or invalid credential just means no participant enrichment, not
/// an error, since the route itself requires no authentication.
fn caller_agent_id(app: &AppState, headers: &axum::http::HeaderMap) -> Result<Option<AgentId>, AppError> {
    let Some(header) = headers.get(axum::http::header::AUTHORIZATION).and_then(|v| v.to_str().ok()) else {
        return Ok(None);
    };
    let Some(token) = header.strip_prefix("Bearer ") else {
        return Ok(None);
    };
    let digest = crate::auth::digest_credential(token);
    let agent = app.store.with_conn(|conn| agents::get_by_credential_digest(conn, &digest))?;
    Ok(agent.map(|a| a.id))
}

pub async fn history(
    State(app): State<AppState>,
    Path(battle_id): Path<BattleId>,
) -> Result<Json<Vec<BattleTurnLog>>, AppError> {
    app.store
        .with_conn(|conn| battles::get(conn, battle_id))?
        .ok_or_else(|| AppError(ApiError::NotFound(format!("battle {battle_id} not found"))))?;
    let turns = app.store.with_conn(|conn| battles::history(conn, battle_id))?;
    Ok(Json(turns))
}

/// The wire shape for a battle snapshot: always the public fields, plus a
/// `your_side`/`state` block when the caller is a participant.
#[derive(Debug, Serialize)]
pub struct BattleSnapshot {
    pub battle_id: String,
    pub display_number: u64,
    pub status: cc_types::enums::BattleStatus,
    pub current_phase: cc_types::enums::BattlePhase,
    pub turn_number: u32,
    pub agent_a: AgentSummary,
    pub agent_b: AgentSummary,
    pub winner_id: Option<String>,
    pub your_side: Option<cc_types::enums::Side>,
    pub state: Option<cc_types::BattleStateBlob>,
}

#[derive(Debug, Serialize)]
pub struct AgentSummary {
    pub agent_id: String,
    pub name: String,
    pub elo: i32,
    pub level: u32,
}

impl BattleSnapshot {
    fn from_battle(app: &AppState, battle: &Battle, caller_id: Option<AgentId>) -> Result<Self, AppError> {
        let agent_a = load_summary(app, battle.agent_a)?;
        let agent_b = load_summary(app, battle.agent_b)?;
        let your_side = caller_id.and_then(|id| battle.side_of(id));

        Ok(BattleSnapshot {
            battle_id: battle.id.to_string(),
            display_number: battle.display_number,
            status: battle.status,
            current_phase: battle.current_phase,
            turn_number: battle.turn_number,
            agent_a,
            agent_b,
            winner_id: battle.winner.map(|w| w.to_string()),
            your_side,
            state: if your_side.is_some() { battle.state.clone() } else { None },
        })
    }
}

fn load_summary(app: &AppState, id: AgentId) -> Result<AgentSummary, AppError> {
    let agent: Agent = app
        .store
        .with_conn(|conn| agents::get(conn, id))?
        .ok_or_else(|| AppError(ApiError::Internal("battle references a vanished agent".into())))?;
    Ok(AgentSummary { agent_id: agent.id.to_string(), name: agent.name, elo: agent.elo, level: agent.level })
}
