use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("webhook url rejected: {0}")]
    InvalidUrl(String),

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to serialize webhook payload: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("webhook queue is closed")]
    QueueClosed,
}
