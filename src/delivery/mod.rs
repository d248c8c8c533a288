/// Delivery channel
///
/// Pushes an encoded message to a single connection and reports a tagged
/// outcome instead of an error, so callers match on gone vs. other failures.
use crate::models::{ConnectionId, DeliveryOutcome};
use async_trait::async_trait;

pub mod apigw;

pub use apigw::ApiGatewayChannel;

/// HTTP status the management API returns for a closed connection
pub const GONE_STATUS: u16 = 410;

#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    async fn post_to_connection(&self, connection_id: &ConnectionId, payload: &[u8])
        -> DeliveryOutcome;
}

/// Map a failed response's HTTP status to an outcome.
pub fn classify_failure(status: Option<u16>, detail: impl Into<String>) -> DeliveryOutcome {
    match status {
        Some(GONE_STATUS) => DeliveryOutcome::Gone,
        _ => DeliveryOutcome::Failed(detail.into()),
    }
}
