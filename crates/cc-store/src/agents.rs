//! Agent table access — §3's `Agent` entity.

use cc_types::enums::AgentStatus;
use cc_types::ids::{AbilityId, AgentId, MoveId, NatureId, TypeId};
use cc_types::{Agent, BaseStats};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::convert::{enum_to_text, text_to_enum, timestamp_to_text};
use crate::error::Result;

pub fn insert(conn: &Connection, agent: &Agent) -> Result<()> {
    conn.execute(
        "INSERT INTO agents (
            id, name, credential_digest, owner_human_id, webhook_url, webhook_secret,
            primary_type, base_hp, base_attack, base_defense, base_sp_atk, base_sp_def, base_speed,
            nature, ability, move_1, move_2, move_3, move_4,
            level, xp, elo, wins, fights, win_streak, status, play_mode, created_at
        ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18,?19,?20,?21,?22,?23,?24,?25,?26,?27,?28)",
        params![
            agent.id.to_string(),
            agent.name,
            agent.credential_digest.as_slice(),
            agent.owner_human_id,
            agent.webhook_url,
            agent.webhook_secret,
            agent.primary_type.as_str(),
            agent.base_stats.hp,
            agent.base_stats.attack,
            agent.base_stats.defense,
            agent.base_stats.sp_atk,
            agent.base_stats.sp_def,
            agent.base_stats.speed,
            agent.nature.as_str(),
            agent.ability.as_str(),
            agent.moves[0].as_str(),
            agent.moves[1].as_str(),
            agent.moves[2].as_str(),
            agent.moves[3].as_str(),
            agent.level,
            agent.xp as i64,
            agent.elo,
            agent.wins,
            agent.fights,
            agent.win_streak,
            enum_to_text(&agent.status)?,
            enum_to_text(&agent.play_mode)?,
            timestamp_to_text(agent.created_at),
        ],
    )?;
    Ok(())
}

pub fn get(conn: &Connection, id: AgentId) -> Result<Option<Agent>> {
    conn.query_row(
        "SELECT * FROM agents WHERE id = ?1",
        params![id.to_string()],
        from_row,
    )
    .optional()
    .map_err(Into::into)
}

/// §3's uniqueness invariant over agent names, checked before insert so the
/// caller gets a clean `Conflict` rather than a raw constraint violation.
pub fn name_taken(conn: &Connection, name: &str) -> Result<bool> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM agents WHERE name = ?1", params![name], |r| r.get(0))?;
    Ok(count > 0)
}

pub fn get_by_credential_digest(conn: &Connection, digest: &[u8; 32]) -> Result<Option<Agent>> {
    conn.query_row(
        "SELECT * FROM agents WHERE credential_digest = ?1",
        params![digest.as_slice()],
        from_row,
    )
    .optional()
    .map_err(Into::into)
}

/// 1-indexed rank among active agents, by ELO descending — backed by the
/// `(status, elo desc)` index.
pub fn rank_by_elo(conn: &Connection, elo: i32) -> Result<u32> {
    let higher: u32 = conn.query_row(
        "SELECT COUNT(*) FROM agents WHERE status = ?1 AND elo > ?2",
        params![enum_to_text(&AgentStatus::Active)?, elo],
        |row| row.get(0),
    )?;
    Ok(higher + 1)
}

/// Applied after a battle resolves: new ELO, win/fight counters, streak, and
/// XP/level (the shared award formula lives in `cc_engine` or the
/// coordinator that calls this — this is the plain column write).
#[allow(clippy::too_many_arguments)]
pub fn apply_battle_result(
    conn: &Connection,
    id: AgentId,
    elo: i32,
    xp: u64,
    level: u32,
    wins: u32,
    fights: u32,
    win_streak: u32,
) -> Result<()> {
    conn.execute(
        "UPDATE agents SET elo = ?1, xp = ?2, level = ?3, wins = ?4, fights = ?5, win_streak = ?6
         WHERE id = ?7",
        params![elo, xp as i64, level, wins, fights, win_streak, id.to_string()],
    )?;
    Ok(())
}

pub fn update_webhook(
    conn: &Connection,
    id: AgentId,
    webhook_url: Option<&str>,
    webhook_secret: Option<&str>,
) -> Result<()> {
    conn.execute(
        "UPDATE agents SET webhook_url = ?1, webhook_secret = ?2 WHERE id = ?3",
        params![webhook_url, webhook_secret, id.to_string()],
    )?;
    Ok(())
}

fn from_row(row: &Row) -> rusqlite::Result<Agent> {
    let id: String = row.get("id")?;
    let credential_digest: Vec<u8> = row.get("credential_digest")?;
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&credential_digest[..32.min(credential_digest.len())]);

    let status: String = row.get("status")?;
    let play_mode: String = row.get("play_mode")?;
    let created_at: String = row.get("created_at")?;

    Ok(Agent {
        id: id.parse().map_err(|e| rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(e),
        ))?,
        name: row.get("name")?,
        credential_digest: digest,
        owner_human_id: row.get("owner_human_id")?,
        webhook_url: row.get("webhook_url")?,
        webhook_secret: row.get("webhook_secret")?,
        primary_type: TypeId::from(row.get::<_, String>("primary_type")?),
        base_stats: BaseStats {
            hp: row.get("base_hp")?,
            attack: row.get("base_attack")?,
            defense: row.get("base_defense")?,
            sp_atk: row.get("base_sp_atk")?,
            sp_def: row.get("base_sp_def")?,
            speed: row.get("base_speed")?,
        },
        nature: NatureId::from(row.get::<_, String>("nature")?),
        ability: AbilityId::from(row.get::<_, String>("ability")?),
        moves: [
            MoveId::from(row.get::<_, String>("move_1")?),
            MoveId::from(row.get::<_, String>("move_2")?),
            MoveId::from(row.get::<_, String>("move_3")?),
            MoveId::from(row.get::<_, String>("move_4")?),
        ],
        level: row.get("level")?,
        xp: row.get::<_, i64>("xp")? as u64,
        elo: row.get("elo")?,
        wins: row.get("wins")?,
        fights: row.get("fights")?,
        win_streak: row.get("win_streak")?,
        status: text_to_enum(&status).map_err(|e| rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())),
        ))?,
        play_mode: text_to_enum(&play_mode).map_err(|e| rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())),
        ))?,
        created_at: crate::convert::text_to_timestamp(&created_at).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())),
            )
        })?,
    })
}
