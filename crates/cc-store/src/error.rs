//! Store-internal error taxonomy, converted to `cc_types::ApiError` at the
//! HTTP handler boundary — mirrors how `cc_engine::BattleError` stays
//! separate from the wire-level shape.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to (de)serialize a stored value: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),
}

pub type Result<T> = std::result::Result<T, Error>;
