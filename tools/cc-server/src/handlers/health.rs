//! `GET /health` — SPEC_FULL.md §C's liveness probe. No auth, no body.

pub async fn health() -> &'static str {
    "ok"
}
