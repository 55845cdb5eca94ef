//! Internal battle-logic errors — distinct from `cc_types::ApiError`, which
//! is the HTTP-facing shape the server maps these into.

use cc_types::MoveId;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BattleError {
    #[error("move {0} is not in the agent's move set")]
    UnknownMove(MoveId),
    #[error("move {0} has no PP remaining")]
    NoPp(MoveId),
    #[error("battle is not active")]
    NotActive,
}
