//! Transactional SQLite persistence for the ClawCombat arena — C4.
//!
//! `Store` wraps a single `rusqlite::Connection` behind a `Mutex`: SQLite
//! already serializes concurrent writers at the file level, so collapsing
//! to one guarded connection costs nothing in practice and gives the
//! Matchmaker and turn-resolution paths the single serialization point
//! §4.4/§4.5 require for free. Every multi-statement write in this crate
//! goes through `Connection::unchecked_transaction` so a crash or early
//! return can never leave related rows partially updated.

pub mod agents;
pub mod battles;
pub mod convert;
pub mod error;
pub mod queue;
pub mod social;

use std::sync::Mutex;

use rusqlite::Connection;

pub use error::{Error, Result};
pub use queue::QueuedAgent;

const SCHEMA: &str = include_str!("schema.sql");

pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Opens (creating if absent) the database at `path`, enables WAL and
    /// foreign keys per SPEC_FULL.md §B, and applies the embedded schema.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// An ephemeral in-memory store, used by the test suite.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        // journal_mode returns the resulting mode as a row even on a SET,
        // unlike most PRAGMAs, so it needs the `_and_check` variant.
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))?;
        conn.pragma_update(None, "foreign_keys", true)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Runs `f` with the guarded connection, holding the lock for its whole
    /// duration — the serialization point multi-statement callers (the
    /// Matchmaker, the Battle Coordinator's submit-move flow) rely on.
    /// Generic in the error type so a caller crate can fold its own
    /// richer error enum's `?` conversions in directly rather than
    /// round-tripping through `cc_store::Error`. Panics only if the mutex
    /// was poisoned by an earlier panicking writer, matching the rest of
    /// the ambient stack's "never silently swallow a poisoned lock" stance.
    pub fn with_conn<T, E>(&self, f: impl FnOnce(&Connection) -> std::result::Result<T, E>) -> std::result::Result<T, E> {
        let conn = self.conn.lock().expect("cc-store connection mutex poisoned");
        f(&conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cc_types::enums::{AgentStatus, PlayMode};
    use cc_types::ids::{AbilityId, AgentId, MoveId, NatureId, TypeId};
    use cc_types::{Agent, BaseStats};

    fn sample_agent() -> Agent {
        Agent {
            id: AgentId::new(),
            name: "ember".to_string(),
            credential_digest: [7u8; 32],
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
            created_at: chrono::DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
                .unwrap()
                .with_timezone(&chrono::Utc),
        }
    }

    #[test]
    fn insert_and_fetch_agent_round_trips() {
        let store = Store::open_in_memory().unwrap();
        let agent = sample_agent();
        store.with_conn(|c| agents::insert(c, &agent)).unwrap();

        let fetched = store.with_conn(|c| agents::get(c, agent.id)).unwrap().unwrap();
        assert_eq!(fetched.name, "ember");
        assert_eq!(fetched.moves[0].as_str(), "fire_blast");
        assert_eq!(fetched.status, AgentStatus::Active);
    }

    #[test]
    fn credential_digest_lookup_finds_the_agent() {
        let store = Store::open_in_memory().unwrap();
        let agent = sample_agent();
        store.with_conn(|c| agents::insert(c, &agent)).unwrap();

        let found = store
            .with_conn(|c| agents::get_by_credential_digest(c, &[7u8; 32]))
            .unwrap()
            .unwrap();
        assert_eq!(found.id, agent.id);
    }

    #[test]
    fn queue_join_leave_and_snapshot() {
        let store = Store::open_in_memory().unwrap();
        let agent = sample_agent();
        store.with_conn(|c| agents::insert(c, &agent)).unwrap();

        let now = chrono::Utc::now();
        store.with_conn(|c| queue::join(c, agent.id, now)).unwrap();
        assert!(store.with_conn(|c| queue::is_queued(c, agent.id)).unwrap());

        let snapshot = store.with_conn(queue::snapshot).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].elo, 1000);

        store.with_conn(|c| queue::leave(c, agent.id)).unwrap();
        assert!(!store.with_conn(|c| queue::is_queued(c, agent.id)).unwrap());
    }

    #[test]
    fn rank_by_elo_counts_higher_active_agents() {
        let store = Store::open_in_memory().unwrap();
        let mut a = sample_agent();
        a.elo = 1200;
        let mut b = sample_agent();
        b.id = AgentId::new();
        b.elo = 1500;
        store.with_conn(|c| agents::insert(c, &a)).unwrap();
        store.with_conn(|c| agents::insert(c, &b)).unwrap();

        assert_eq!(store.with_conn(|c| agents::rank_by_elo(c, 1200)).unwrap(), 2);
        assert_eq!(store.with_conn(|c| agents::rank_by_elo(c, 1500)).unwrap(), 1);
    }
}
