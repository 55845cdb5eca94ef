//! Per-request id propagation — SPEC_FULL.md §A.1/§C: every response carries
//! `X-Request-Id`, and a tracing span wraps the handler so a logged `500`
//! can be correlated back to this id.

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use tracing::Instrument;
use uuid::Uuid;

pub async fn attach_request_id(request: Request, next: Next) -> Response {
    let req_id = Uuid::new_v4().to_string();
    let span = tracing::info_span!("request", req_id = %req_id, method = %request.method(), path = %request.uri().path());

    let mut response = next.run(request).instrument(span).await;
    if let Ok(value) = HeaderValue::from_str(&req_id) {
        response.headers_mut().insert("X-Request-Id", value);
    }
    response
}
