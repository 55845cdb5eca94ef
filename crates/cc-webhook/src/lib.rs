//! Signed, retried webhook fan-out to agents' HTTPS endpoints — §4.8.

pub mod dispatcher;
pub mod error;
pub mod payload;
pub mod signature;
pub mod ssrf;

pub use dispatcher::Dispatcher;
pub use error::DispatchError;
pub use payload::{EventKind, WebhookRequest};
pub use signature::sign;
pub use ssrf::validate_webhook_url;
