//! The outbound event envelope — §6's wire format enum. Body construction
//! (per-side views, enriched `battle_end` context) is the Battle
//! Coordinator's job; this crate only transports and signs whatever JSON
//! value it is handed.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    BattleStart,
    BattleTurn,
    BattleEnd,
    BattleChallenge,
    Ping,
}

impl EventKind {
    pub fn wire_name(&self) -> &'static str {
        match self {
            EventKind::BattleStart => "battle_start",
            EventKind::BattleTurn => "battle_turn",
            EventKind::BattleEnd => "battle_end",
            EventKind::BattleChallenge => "battle_challenge",
            EventKind::Ping => "ping",
        }
    }
}

/// One queued delivery attempt: target, secret, and the already-built body.
#[derive(Debug, Clone)]
pub struct WebhookRequest {
    pub url: String,
    pub secret: String,
    pub event: EventKind,
    pub body: serde_json::Value,
}

impl WebhookRequest {
    pub fn new(url: impl Into<String>, secret: impl Into<String>, event: EventKind, body: serde_json::Value) -> Self {
        Self { url: url.into(), secret: secret.into(), event, body }
    }
}
