//! Maps every internal error taxonomy into the one shape that ever reaches
//! a client — §7's `{"error": "...", "code": "..."}` — via `cc_types::ApiError`.
//! `AppError` exists only because `axum::response::IntoResponse` and
//! `ApiError` are both foreign to this crate; everything else is a thin
//! `From` impl per collaborator error type, mirroring how the teacher keeps
//! `CombatError` separate from its wire-level `ApplyError`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use cc_types::ApiError;

#[derive(Debug)]
pub struct AppError(pub ApiError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self.0 {
            tracing::error!(error = %detail, "internal error");
        }
        let status = StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.0.to_body())).into_response()
    }
}

impl From<ApiError> for AppError {
    fn from(e: ApiError) -> Self {
        AppError(e)
    }
}

impl From<cc_store::Error> for AppError {
    fn from(e: cc_store::Error) -> Self {
        let api = match e {
            cc_store::Error::NotFound(msg) => ApiError::NotFound(msg),
            cc_store::Error::Conflict(msg) => ApiError::Conflict(msg),
            other => ApiError::Internal(other.to_string()),
        };
        AppError(api)
    }
}

impl From<cc_engine::BattleError> for AppError {
    fn from(e: cc_engine::BattleError) -> Self {
        AppError(ApiError::Validation(e.to_string()))
    }
}

impl From<cc_match::MatchError> for AppError {
    fn from(e: cc_match::MatchError) -> Self {
        let api = match e {
            cc_match::MatchError::AlreadyInBattle(id) => ApiError::Conflict(format!("agent {id} is already in a battle")),
            cc_match::MatchError::UnknownAgent(id) => ApiError::NotFound(format!("agent {id} not found")),
            cc_match::MatchError::Store(inner) => return AppError::from(inner),
        };
        AppError(api)
    }
}
