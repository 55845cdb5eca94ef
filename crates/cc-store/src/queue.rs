//! Matchmaking queue table access — §4.5's `joinQueue` / `leaveQueue` and
//! the snapshot `match()` scans to pair agents.

use cc_types::ids::AgentId;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use crate::convert::timestamp_to_text;
use crate::error::Result;

pub fn join(conn: &Connection, agent_id: AgentId, joined_at: DateTime<Utc>) -> Result<()> {
    conn.execute(
        "INSERT INTO queue_entries (agent_id, joined_at) VALUES (?1, ?2)",
        params![agent_id.to_string(), timestamp_to_text(joined_at)],
    )?;
    Ok(())
}

pub fn leave(conn: &Connection, agent_id: AgentId) -> Result<()> {
    conn.execute("DELETE FROM queue_entries WHERE agent_id = ?1", params![agent_id.to_string()])?;
    Ok(())
}

pub fn is_queued(conn: &Connection, agent_id: AgentId) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM queue_entries WHERE agent_id = ?1",
        params![agent_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// One row per queued agent, joined against `agents` for the ELO/level the
/// matchmaker's widening-window scan needs — ordered by `joined_at` per
/// §4.5 so earlier arrivals are tried first.
pub struct QueuedAgent {
    pub agent_id: AgentId,
    pub joined_at: DateTime<Utc>,
    pub elo: i32,
    pub level: u32,
}

pub fn snapshot(conn: &Connection) -> Result<Vec<QueuedAgent>> {
    let mut stmt = conn.prepare(
        "SELECT q.agent_id, q.joined_at, a.elo, a.level
         FROM queue_entries q JOIN agents a ON a.id = q.agent_id
         ORDER BY q.joined_at ASC",
    )?;
    let rows = stmt.query_map([], |row| {
        let agent_id: String = row.get(0)?;
        let joined_at: String = row.get(1)?;
        Ok((agent_id, joined_at, row.get::<_, i32>(2)?, row.get::<_, u32>(3)?))
    })?;

    let mut out = Vec::new();
    for row in rows {
        let (agent_id, joined_at, elo, level) = row?;
        out.push(QueuedAgent {
            agent_id: agent_id
                .parse()
                .map_err(|e: uuid::Error| rusqlite::Error::FromSqlConversionFailure(
                    0,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                ))?,
            joined_at: crate::convert::text_to_timestamp(&joined_at).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    0,
                    rusqlite::types::Type::Text,
                    Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())),
                )
            })?,
            elo,
            level,
        });
    }
    Ok(out)
}

/// Removes both matched agents from the queue in one statement, inside the
/// caller's write transaction — the serialization point §4.5 requires.
pub fn remove_pair(conn: &Connection, a: AgentId, b: AgentId) -> Result<()> {
    conn.execute(
        "DELETE FROM queue_entries WHERE agent_id IN (?1, ?2)",
        params![a.to_string(), b.to_string()],
    )?;
    Ok(())
}
