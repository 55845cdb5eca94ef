use cc_types::ids::AgentId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("agent {0} is already in a non-terminal battle")]
    AlreadyInBattle(AgentId),

    #[error("agent {0} is not registered")]
    UnknownAgent(AgentId),

    #[error(transparent)]
    Store(#[from] cc_store::Error),
}
