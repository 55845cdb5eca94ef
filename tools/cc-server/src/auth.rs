//! Bearer credential authentication — §7's Authentication error kind.
//! The credential is never stored in plaintext; a request's bearer token is
//! hashed the same way at lookup time and compared against the stored
//! digest.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use cc_types::{Agent, ApiError};
use sha2::{Digest, Sha256};

use crate::error::AppError;
use crate::state::AppState;

pub fn digest_credential(credential: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(credential.as_bytes());
    hasher.finalize().into()
}

/// An axum extractor: pulls `Authorization: Bearer <credential>`, hashes it,
/// and loads the matching active agent. Any handler that takes this
/// argument is implicitly agent-authenticated.
pub struct AuthenticatedAgent(pub Agent);

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for AuthenticatedAgent
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError(ApiError::Authentication("missing bearer credential".into())))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError(ApiError::Authentication("authorization header must be a bearer token".into())))?;

        let digest = digest_credential(token);
        let agent = app_state
            .store
            .with_conn(|c| cc_store::agents::get_by_credential_digest(c, &digest))?
            .ok_or_else(|| AppError(ApiError::Authentication("unknown credential".into())))?;

        if !agent.is_playable() {
            return Err(AppError(ApiError::Authentication("agent is not active".into())));
        }

        Ok(AuthenticatedAgent(agent))
    }
}
