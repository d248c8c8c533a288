use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one live WebSocket connection, as issued by API Gateway.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConnectionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ConnectionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Envelope pushed to every subscriber.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BroadcastMessage {
    /// Seconds since the Unix epoch at construction time
    pub ts: i64,
    pub source: String,
    pub data: serde_json::Value,
}

impl BroadcastMessage {
    /// Wrap an inbound event, stamped with the current time.
    pub fn new(source: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            ts: chrono::Utc::now().timestamp(),
            source: source.into(),
            data,
        }
    }

    /// Compact UTF-8 JSON encoding sent over the wire.
    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

/// Result of posting a message to one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    /// The endpoint reported the connection no longer exists (HTTP 410)
    Gone,
    /// Any other failure; aborts the broadcast
    Failed(String),
}

/// Aggregate counts of a completed broadcast pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastSummary {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub sent: usize,
    pub stale_cleaned: usize,
}

impl Default for BroadcastSummary {
    fn default() -> Self {
        Self {
            status_code: 200,
            sent: 0,
            stale_cleaned: 0,
        }
    }
}
