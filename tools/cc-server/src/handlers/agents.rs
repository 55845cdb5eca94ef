//! `POST /agents/register` and `POST /agents/connect` — §6/§3's agent
//! creation contract: validate the full creation budget up front, mint a
//! credential, return it exactly once.

use axum::extract::State;
use axum::Json;
use cc_data::{abilities, natures, types};
use cc_store::agents;
use cc_types::enums::{AgentStatus, PlayMode};
use cc_types::ids::{AbilityId, AgentId, MoveId, NatureId, TypeId};
use cc_types::{Agent, ApiError, BaseStats};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BaseStatsWire {
    pub hp: u8,
    pub attack: u8,
    pub defense: u8,
    pub sp_atk: u8,
    pub sp_def: u8,
    pub speed: u8,
}

impl From<BaseStatsWire> for BaseStats {
    fn from(w: BaseStatsWire) -> Self {
        BaseStats { hp: w.hp, attack: w.attack, defense: w.defense, sp_atk: w.sp_atk, sp_def: w.sp_def, speed: w.speed }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateAgentRequest {
    pub name: String,
    pub primary_type: String,
    pub base_stats: BaseStatsWire,
    pub nature: String,
    pub ability: String,
    pub moves: [String; 4],
    pub webhook_url: Option<String>,
    pub webhook_secret: Option<String>,
    pub owner_human_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateAgentResponse {
    pub agent_id: String,
    pub name: String,
    pub credential: String,
    pub primary_type: String,
    pub elo: i32,
    pub level: u32,
    pub status: AgentStatus,
    pub play_mode: PlayMode,
}

pub async fn register(
    State(app): State<AppState>,
    Json(req): Json<CreateAgentRequest>,
) -> Result<Json<CreateAgentResponse>, AppError> {
    create_agent(app, req, PlayMode::Manual).await
}

pub async fn connect(
    State(app): State<AppState>,
    Json(mut req): Json<CreateAgentRequest>,
) -> Result<Json<CreateAgentResponse>, AppError> {
    req.owner_human_id = None;
    create_agent(app, req, PlayMode::Auto).await
}

async fn create_agent(app: AppState, req: CreateAgentRequest, play_mode: PlayMode) -> Result<Json<CreateAgentResponse>, AppError> {
    let name = req.name.trim().to_string();
    if !(3..=32).contains(&name.len()) || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return Err(AppError(ApiError::Validation(
            "name must be 3-32 characters of letters, digits, '_' or '-'".into(),
        )));
    }

    let primary_type = req.primary_type.to_uppercase();
    if !types::is_known_type(&primary_type) {
        return Err(AppError(ApiError::Validation(format!("unknown type {primary_type}"))));
    }

    let base_stats: BaseStats = req.base_stats.into();
    if !base_stats.is_valid_creation_budget() {
        return Err(AppError(ApiError::Validation(
            "base stats must each be 1-35 and sum to exactly 100".into(),
        )));
    }

    if !natures::is_known_nature(&req.nature) {
        return Err(AppError(ApiError::Validation(format!("unknown nature {}", req.nature))));
    }

    let ability_id = AbilityId::from(req.ability.as_str());
    if !abilities::is_ability_allowed_for_type(&primary_type, &ability_id) {
        return Err(AppError(ApiError::Validation(format!(
            "ability {} is not available to type {primary_type}",
            req.ability
        ))));
    }

    let pool = cc_data::moves::moves_for_type(&primary_type);
    let mut moves: [MoveId; 4] = Default::default();
    let mut seen = std::collections::HashSet::new();
    for (slot, raw) in req.moves.iter().enumerate() {
        let move_id = MoveId::from(raw.as_str());
        if !pool.contains(&move_id) {
            return Err(AppError(ApiError::Validation(format!("move {raw} is not in type {primary_type}'s pool"))));
        }
        if !seen.insert(move_id.clone()) {
            return Err(AppError(ApiError::Validation(format!("move {raw} is assigned to more than one slot"))));
        }
        moves[slot] = move_id;
    }

    if let Some(url) = &req.webhook_url {
        cc_webhook::validate_webhook_url(url, app.config.development)
            .map_err(|e| AppError(ApiError::Validation(e.to_string())))?;
        if req.webhook_secret.as_deref().unwrap_or("").is_empty() {
            return Err(AppError(ApiError::Validation("webhook_secret is required when webhook_url is set".into())));
        }
    }

    if app.store.with_conn(|conn| agents::name_taken(conn, &name))? {
        return Err(AppError(ApiError::Conflict(format!("name {name} is already taken"))));
    }

    let credential = generate_credential();
    let credential_digest = crate::auth::digest_credential(&credential);

    let agent = Agent {
        id: AgentId::new(),
        name,
        credential_digest,
        owner_human_id: req.owner_human_id,
        webhook_url: req.webhook_url,
        webhook_secret: req.webhook_secret,
        primary_type: TypeId::from(primary_type.as_str()),
        base_stats,
        nature: NatureId::from(req.nature),
        ability: ability_id,
        moves,
        level: 1,
        xp: 0,
        elo: 1000,
        wins: 0,
        fights: 0,
        win_streak: 0,
        status: AgentStatus::Active,
        play_mode,
        created_at: chrono::Utc::now(),
    };

    app.store.with_conn(|conn| agents::insert(conn, &agent))?;

    if let (Some(url), Some(secret)) = (agent.webhook_url.clone(), agent.webhook_secret.clone()) {
        let ping = cc_webhook::WebhookRequest::new(url, secret, cc_webhook::EventKind::Ping, serde_json::json!({
            "agent_id": agent.id.to_string(),
        }));
        if let Err(err) = app.dispatcher.send_now(&ping).await {
            tracing::warn!(agent_id = %agent.id, error = %err, "ping webhook failed at registration");
        }
    }

    Ok(Json(CreateAgentResponse {
        agent_id: agent.id.to_string(),
        name: agent.name,
        credential,
        primary_type: agent.primary_type.to_string(),
        elo: agent.elo,
        level: agent.level,
        status: agent.status,
        play_mode: agent.play_mode,
    }))
}

fn generate_credential() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
