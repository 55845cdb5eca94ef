//! Social-token table access — the one-shot handle issued to each side when
//! a battle ends (§4.6), consumed by the out-of-scope social collaborator.

use cc_types::ids::{AgentId, BattleId, SocialTokenId};
use cc_types::SocialToken;
use rusqlite::{params, OptionalExtension};

use crate::convert::timestamp_to_text;
use crate::error::Result;

pub fn issue(conn: &rusqlite::Connection, token: &SocialToken) -> Result<()> {
    conn.execute(
        "INSERT INTO social_tokens (id, agent_id, battle_id, issued_at, expires_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            token.id.to_string(),
            token.agent_id.to_string(),
            token.battle_id.to_string(),
            timestamp_to_text(token.issued_at),
            timestamp_to_text(token.expires_at),
        ],
    )?;
    Ok(())
}

pub fn get(conn: &rusqlite::Connection, id: SocialTokenId) -> Result<Option<SocialToken>> {
    conn.query_row(
        "SELECT id, agent_id, battle_id, issued_at, expires_at FROM social_tokens WHERE id = ?1",
        params![id.to_string()],
        |row| {
            let id: String = row.get(0)?;
            let agent_id: String = row.get(1)?;
            let battle_id: String = row.get(2)?;
            let issued_at: String = row.get(3)?;
            let expires_at: String = row.get(4)?;
            Ok(SocialToken {
                id: parse_id(&id)?,
                agent_id: parse_agent(&agent_id)?,
                battle_id: parse_battle(&battle_id)?,
                issued_at: parse_ts(&issued_at)?,
                expires_at: parse_ts(&expires_at)?,
            })
        },
    )
    .optional()
    .map_err(Into::into)
}

fn parse_id(s: &str) -> rusqlite::Result<SocialTokenId> {
    s.parse().map_err(|e: uuid::Error| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn parse_agent(s: &str) -> rusqlite::Result<AgentId> {
    s.parse().map_err(|e: uuid::Error| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn parse_battle(s: &str) -> rusqlite::Result<BattleId> {
    s.parse().map_err(|e: uuid::Error| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn parse_ts(s: &str) -> rusqlite::Result<chrono::DateTime<chrono::Utc>> {
    crate::convert::text_to_timestamp(s).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())),
        )
    })
}
