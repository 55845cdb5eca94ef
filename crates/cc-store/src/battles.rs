//! Battle and turn-log table access — §3's `Battle`/`BattleTurnLog`, and
//! §4.6 step 6's atomic turn-resolution write.

use cc_types::enums::{BattlePhase, BattleStatus, Side};
use cc_types::ids::{AgentId, BattleId, MoveId};
use cc_types::{Battle, BattleStateBlob, BattleTurnLog, TurnEvent};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::convert::{enum_to_text, opt_timestamp_to_text, text_to_enum, timestamp_to_text};
use crate::error::Result;

pub fn insert(conn: &Connection, battle: &Battle) -> Result<()> {
    let state_blob = battle
        .state
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;
    conn.execute(
        "INSERT INTO battles (
            id, display_number, agent_a_id, agent_b_id, status, current_phase, turn_number,
            pending_move_a, pending_move_b, state_blob,
            created_at, started_at, last_turn_at, ended_at, winner_id
        ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15)",
        params![
            battle.id.to_string(),
            battle.display_number as i64,
            battle.agent_a.to_string(),
            battle.agent_b.to_string(),
            enum_to_text(&battle.status)?,
            enum_to_text(&battle.current_phase)?,
            battle.turn_number,
            battle.pending_move_a.as_ref().map(|m| m.as_str()),
            battle.pending_move_b.as_ref().map(|m| m.as_str()),
            state_blob,
            timestamp_to_text(battle.created_at),
            opt_timestamp_to_text(battle.started_at),
            opt_timestamp_to_text(battle.last_turn_at),
            opt_timestamp_to_text(battle.ended_at),
            battle.winner.map(|w| w.to_string()),
        ],
    )?;
    Ok(())
}

/// Next `display_number`, scoped to this write transaction so two
/// concurrent inserts never collide (the store's single-writer mutex makes
/// this safe without a dedicated sequence table).
pub fn next_display_number(conn: &Connection) -> Result<u64> {
    let max: Option<i64> = conn.query_row("SELECT MAX(display_number) FROM battles", [], |r| r.get(0))?;
    Ok(max.unwrap_or(0) as u64 + 1)
}

pub fn get(conn: &Connection, id: BattleId) -> Result<Option<Battle>> {
    conn.query_row("SELECT * FROM battles WHERE id = ?1", params![id.to_string()], from_row)
        .optional()
        .map_err(Into::into)
}

/// The active (non-terminal) battle an agent is currently in, if any —
/// backed by the `(agent_a_id, status)` / `(agent_b_id, status)` indices.
pub fn active_battle_for_agent(conn: &Connection, agent: AgentId) -> Result<Option<Battle>> {
    let non_terminal = [
        enum_to_text(&BattleStatus::Pending)?,
        enum_to_text(&BattleStatus::Active)?,
    ];
    conn.query_row(
        "SELECT * FROM battles
         WHERE (agent_a_id = ?1 OR agent_b_id = ?1) AND status IN (?2, ?3)
         LIMIT 1",
        params![agent.to_string(), non_terminal[0], non_terminal[1]],
        from_row,
    )
    .optional()
    .map_err(Into::into)
}

pub fn set_pending_move(conn: &Connection, battle_id: BattleId, side: Side, move_id: &MoveId) -> Result<()> {
    let column = match side {
        Side::A => "pending_move_a",
        Side::B => "pending_move_b",
    };
    conn.execute(
        &format!("UPDATE battles SET {column} = ?1 WHERE id = ?2"),
        params![move_id.as_str(), battle_id.to_string()],
    )?;
    Ok(())
}

pub fn accept_challenge(conn: &Connection, battle_id: BattleId, state: &BattleStateBlob, now: DateTime<Utc>) -> Result<()> {
    conn.execute(
        "UPDATE battles SET status = ?1, current_phase = ?2, state_blob = ?3, started_at = ?4, last_turn_at = ?4
         WHERE id = ?5",
        params![
            enum_to_text(&BattleStatus::Active)?,
            enum_to_text(&BattlePhase::Waiting)?,
            serde_json::to_string(state)?,
            timestamp_to_text(now),
            battle_id.to_string(),
        ],
    )?;
    Ok(())
}

/// §4.6 step 6 / §4.7 step 2: one atomic write per resolved turn — new
/// state blob, appended turn log row, cleared pending moves, refreshed
/// timestamps, and (when the battle just ended) the terminal fields.
#[allow(clippy::too_many_arguments)]
pub fn record_resolved_turn(
    conn: &Connection,
    battle_id: BattleId,
    state: &BattleStateBlob,
    turn_log: &BattleTurnLog,
    status: BattleStatus,
    phase: BattlePhase,
    winner: Option<AgentId>,
    now: DateTime<Utc>,
) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO battle_turns (battle_id, turn_number, move_a, move_b, events, hp_a, hp_b, created_at)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8)",
        params![
            battle_id.to_string(),
            turn_log.turn_number,
            turn_log.move_a.as_ref().map(|m| m.as_str()),
            turn_log.move_b.as_ref().map(|m| m.as_str()),
            serde_json::to_string(&turn_log.events)?,
            turn_log.hp_a,
            turn_log.hp_b,
            timestamp_to_text(turn_log.created_at),
        ],
    )?;
    let ended_at = if status.is_terminal() { Some(now) } else { None };
    tx.execute(
        "UPDATE battles SET
            state_blob = ?1, status = ?2, current_phase = ?3, turn_number = ?4,
            pending_move_a = NULL, pending_move_b = NULL,
            winner_id = ?5, last_turn_at = ?6, ended_at = ?7
         WHERE id = ?8",
        params![
            serde_json::to_string(state)?,
            enum_to_text(&status)?,
            enum_to_text(&phase)?,
            turn_log.turn_number,
            winner.map(|w| w.to_string()),
            timestamp_to_text(now),
            opt_timestamp_to_text(ended_at),
            battle_id.to_string(),
        ],
    )?;
    tx.commit()?;
    Ok(())
}

/// Battles the Timeout Scheduler should inspect this tick: active, waiting
/// on at least one move, and idle past `TURN_TIMEOUT`.
pub fn stale_waiting_battles(conn: &Connection, older_than: DateTime<Utc>) -> Result<Vec<Battle>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM battles
         WHERE status = ?1 AND current_phase = ?2 AND last_turn_at < ?3
           AND (pending_move_a IS NULL OR pending_move_b IS NULL)",
    )?;
    let rows = stmt.query_map(
        params![
            enum_to_text(&BattleStatus::Active)?,
            enum_to_text(&BattlePhase::Waiting)?,
            timestamp_to_text(older_than),
        ],
        from_row,
    )?;
    rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
}

/// Challenges left unanswered past `CHALLENGE_TIMEOUT` — never accepted, so
/// there is no state blob or opponent action to roll back, just the row.
pub fn stale_pending_challenges(conn: &Connection, older_than: DateTime<Utc>) -> Result<Vec<Battle>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM battles WHERE status = ?1 AND current_phase = ?2 AND created_at < ?3",
    )?;
    let rows = stmt.query_map(
        params![
            enum_to_text(&BattleStatus::Pending)?,
            enum_to_text(&BattlePhase::Challenge)?,
            timestamp_to_text(older_than),
        ],
        from_row,
    )?;
    rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
}

pub fn cancel_challenge(conn: &Connection, battle_id: BattleId, now: DateTime<Utc>) -> Result<()> {
    conn.execute(
        "UPDATE battles SET status = ?1, current_phase = ?2, ended_at = ?3 WHERE id = ?4",
        params![
            enum_to_text(&BattleStatus::Cancelled)?,
            enum_to_text(&BattlePhase::Finished)?,
            timestamp_to_text(now),
            battle_id.to_string(),
        ],
    )?;
    Ok(())
}

pub fn list_active(conn: &Connection) -> Result<Vec<Battle>> {
    let mut stmt = conn.prepare("SELECT * FROM battles WHERE status IN (?1, ?2)")?;
    let rows = stmt.query_map(
        params![enum_to_text(&BattleStatus::Pending)?, enum_to_text(&BattleStatus::Active)?],
        from_row,
    )?;
    rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
}

/// Finished battles between this exact pair of agents, most recent first —
/// used to build the `battle_end` webhook's head-to-head/revenge context.
pub fn head_to_head(conn: &Connection, a: AgentId, b: AgentId) -> Result<Vec<Battle>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM battles
         WHERE ((agent_a_id = ?1 AND agent_b_id = ?2) OR (agent_a_id = ?2 AND agent_b_id = ?1))
           AND status NOT IN (?3, ?4)
         ORDER BY created_at DESC",
    )?;
    let rows = stmt.query_map(
        params![
            a.to_string(),
            b.to_string(),
            enum_to_text(&BattleStatus::Pending)?,
            enum_to_text(&BattleStatus::Active)?,
        ],
        from_row,
    )?;
    rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
}

pub fn history(conn: &Connection, battle_id: BattleId) -> Result<Vec<BattleTurnLog>> {
    let mut stmt = conn.prepare(
        "SELECT battle_id, turn_number, move_a, move_b, events, hp_a, hp_b, created_at
         FROM battle_turns WHERE battle_id = ?1 ORDER BY turn_number ASC",
    )?;
    let rows = stmt.query_map(params![battle_id.to_string()], |row| {
        let battle_id: String = row.get(0)?;
        let move_a: Option<String> = row.get(2)?;
        let move_b: Option<String> = row.get(3)?;
        let events: String = row.get(4)?;
        let created_at: String = row.get(7)?;
        Ok(BattleTurnLog {
            battle_id: parse_battle_id(&battle_id)?,
            turn_number: row.get(1)?,
            move_a: move_a.map(MoveId::from),
            move_b: move_b.map(MoveId::from),
            events: parse_json::<Vec<TurnEvent>>(&events)?,
            hp_a: row.get(5)?,
            hp_b: row.get(6)?,
            created_at: parse_timestamp(&created_at)?,
        })
    })?;
    rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
}

fn from_row(row: &Row) -> rusqlite::Result<Battle> {
    let id: String = row.get("id")?;
    let agent_a: String = row.get("agent_a_id")?;
    let agent_b: String = row.get("agent_b_id")?;
    let status: String = row.get("status")?;
    let current_phase: String = row.get("current_phase")?;
    let pending_move_a: Option<String> = row.get("pending_move_a")?;
    let pending_move_b: Option<String> = row.get("pending_move_b")?;
    let state_blob: Option<String> = row.get("state_blob")?;
    let created_at: String = row.get("created_at")?;
    let started_at: Option<String> = row.get("started_at")?;
    let last_turn_at: Option<String> = row.get("last_turn_at")?;
    let ended_at: Option<String> = row.get("ended_at")?;
    let winner_id: Option<String> = row.get("winner_id")?;

    Ok(Battle {
        id: parse_battle_id(&id)?,
        display_number: row.get::<_, i64>("display_number")? as u64,
        agent_a: parse_agent_id(&agent_a)?,
        agent_b: parse_agent_id(&agent_b)?,
        status: text_to_enum(&status).map_err(sql_err)?,
        current_phase: text_to_enum(&current_phase).map_err(sql_err)?,
        turn_number: row.get("turn_number")?,
        pending_move_a: pending_move_a.map(MoveId::from),
        pending_move_b: pending_move_b.map(MoveId::from),
        state: state_blob.map(|s| parse_json(&s)).transpose()?,
        created_at: parse_timestamp(&created_at)?,
        started_at: started_at.map(|s| parse_timestamp(&s)).transpose()?,
        last_turn_at: last_turn_at.map(|s| parse_timestamp(&s)).transpose()?,
        ended_at: ended_at.map(|s| parse_timestamp(&s)).transpose()?,
        winner: winner_id.map(|s| parse_agent_id(&s)).transpose()?,
    })
}

fn sql_err(e: crate::error::Error) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        rusqlite::types::Type::Text,
        Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())),
    )
}

fn parse_agent_id(s: &str) -> rusqlite::Result<AgentId> {
    s.parse().map_err(|e: uuid::Error| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn parse_battle_id(s: &str) -> rusqlite::Result<BattleId> {
    s.parse().map_err(|e: uuid::Error| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn parse_timestamp(s: &str) -> rusqlite::Result<DateTime<Utc>> {
    crate::convert::text_to_timestamp(s).map_err(sql_err)
}

fn parse_json<T: serde::de::DeserializeOwned>(s: &str) -> rusqlite::Result<T> {
    serde_json::from_str(s).map_err(|e| sql_err(e.into()))
}
