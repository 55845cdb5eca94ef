//! Queued, retried delivery — §4.8. Dispatch is decoupled from the caller:
//! `enqueue` hands the request to a background worker and returns
//! immediately; failures are logged and dropped, never surfaced to the
//! request that triggered them.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::DispatchError;
use crate::payload::WebhookRequest;
use crate::signature::sign;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Delay before each retry after the initial attempt; three retries total,
/// matching §4.8's "1 s / 2 s / 4 s" exactly.
const RETRY_DELAYS: [Duration; 3] = [Duration::from_secs(1), Duration::from_secs(2), Duration::from_secs(4)];

fn build_client() -> Client {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(CONNECT_TIMEOUT)
        .build()
        .expect("webhook http client config is static and valid")
}

fn is_retryable(status: StatusCode) -> bool {
    status.is_server_error()
}

async fn attempt(client: &Client, request: &WebhookRequest) -> Result<StatusCode, DispatchError> {
    let body = serde_json::to_vec(&request.body)?;
    let signature = sign(&body, &request.secret);
    let response = client
        .post(&request.url)
        .header("Content-Type", "application/json")
        .header("X-ClawCombat-Signature", signature)
        .header("X-ClawCombat-Event", request.event.wire_name())
        .body(body)
        .send()
        .await?;
    Ok(response.status())
}

/// Delivers one request, retrying 5xx/network failures per `RETRY_DELAYS`
/// and treating any 4xx as terminal. Returns the final outcome for logging.
async fn deliver_with_retry(client: &Client, request: &WebhookRequest) {
    let mut delays = RETRY_DELAYS.iter();
    loop {
        match attempt(client, request).await {
            Ok(status) if status.is_success() => {
                debug!(event = request.event.wire_name(), url = %request.url, "webhook delivered");
                return;
            }
            Ok(status) if is_retryable(status) => {
                match delays.next() {
                    Some(delay) => {
                        debug!(event = request.event.wire_name(), status = %status, "retrying webhook after backoff");
                        tokio::time::sleep(*delay).await;
                    }
                    None => {
                        warn!(event = request.event.wire_name(), url = %request.url, status = %status, "webhook delivery exhausted retries");
                        return;
                    }
                }
            }
            Ok(status) => {
                warn!(event = request.event.wire_name(), url = %request.url, status = %status, "webhook delivery failed terminally");
                return;
            }
            Err(e) => match delays.next() {
                Some(delay) => {
                    debug!(event = request.event.wire_name(), error = %e, "retrying webhook after network error");
                    tokio::time::sleep(*delay).await;
                }
                None => {
                    warn!(event = request.event.wire_name(), url = %request.url, error = %e, "webhook delivery exhausted retries");
                    return;
                }
            },
        }
    }
}

async fn worker_loop(client: Client, mut rx: mpsc::Receiver<WebhookRequest>) {
    while let Some(request) = rx.recv().await {
        if request.url.is_empty() {
            continue;
        }
        deliver_with_retry(&client, &request).await;
    }
    debug!("webhook dispatcher worker drained and stopped");
}

/// Handle to the background delivery worker. Cloning shares the same queue.
#[derive(Clone)]
pub struct Dispatcher {
    client: Client,
    tx: mpsc::Sender<WebhookRequest>,
}

impl Dispatcher {
    /// Spawns the background worker and returns a handle plus its join
    /// handle, so the caller can await a bounded drain on shutdown.
    pub fn spawn(queue_capacity: usize) -> (Self, JoinHandle<()>) {
        let client = build_client();
        let (tx, rx) = mpsc::channel(queue_capacity);
        let handle = tokio::spawn(worker_loop(client.clone(), rx));
        (Self { client, tx }, handle)
    }

    /// Enqueues a request for background delivery; returns immediately.
    /// Skips silently if the target url is empty, matching §4.8.
    pub fn enqueue(&self, request: WebhookRequest) -> Result<(), DispatchError> {
        if request.url.is_empty() {
            return Ok(());
        }
        self.tx.try_send(request).map_err(|_| DispatchError::QueueClosed)
    }

    /// Delivers one request synchronously, single attempt, no retry — used
    /// for the idempotent `ping` sent at webhook registration time.
    pub async fn send_now(&self, request: &WebhookRequest) -> Result<(), DispatchError> {
        if request.url.is_empty() {
            return Ok(());
        }
        let status = attempt(&self.client, request).await?;
        if status.is_success() {
            Ok(())
        } else {
            Err(DispatchError::InvalidUrl(format!("webhook endpoint returned {status}")))
        }
    }

    /// Drops this handle's sender; once every clone is dropped the worker
    /// drains its queue and its `JoinHandle` resolves.
    pub fn close(self) {
        drop(self.tx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::EventKind;
    use serde_json::json;

    #[test]
    fn server_errors_are_retryable_client_errors_are_not() {
        assert!(is_retryable(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(is_retryable(StatusCode::BAD_GATEWAY));
        assert!(!is_retryable(StatusCode::BAD_REQUEST));
        assert!(!is_retryable(StatusCode::NOT_FOUND));
        assert!(!is_retryable(StatusCode::OK));
    }

    #[tokio::test]
    async fn enqueue_skips_silently_when_url_is_empty() {
        let (dispatcher, handle) = Dispatcher::spawn(8);
        let request = WebhookRequest::new("", "secret", EventKind::Ping, json!({"event": "ping"}));
        dispatcher.enqueue(request).unwrap();
        dispatcher.close();
        tokio::time::timeout(Duration::from_secs(1), handle).await.unwrap().unwrap();
    }
}
