/// Broadcast-and-reap
///
/// Delivers one message to every registered connection and removes the
/// connections the delivery channel reports as gone. Any other delivery or
/// registry failure aborts the pass: no further deliveries are started and
/// no summary is produced.
use crate::config::BroadcastConfig;
use crate::delivery::DeliveryChannel;
use crate::error::{FanoutError, Result};
use crate::models::{BroadcastMessage, BroadcastSummary, ConnectionId, DeliveryOutcome};
use crate::registry::ConnectionRegistry;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument};

/// Per-connection tally after classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tally {
    Sent,
    StaleCleaned,
}

pub struct Broadcaster {
    registry: Arc<dyn ConnectionRegistry>,
    channel: Arc<dyn DeliveryChannel>,
    config: BroadcastConfig,
}

impl Broadcaster {
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        channel: Arc<dyn DeliveryChannel>,
        config: BroadcastConfig,
    ) -> Self {
        Self {
            registry,
            channel,
            config,
        }
    }

    pub fn config(&self) -> &BroadcastConfig {
        &self.config
    }

    /// Wrap an inbound event in a [`BroadcastMessage`] and broadcast it.
    pub async fn handle_event(&self, event: serde_json::Value) -> Result<BroadcastSummary> {
        let message = BroadcastMessage::new(self.config.source.clone(), event);
        self.broadcast(&message).await
    }

    /// Deliver `message` to every registered connection.
    #[instrument(skip_all, fields(source = %message.source, ts = message.ts))]
    pub async fn broadcast(&self, message: &BroadcastMessage) -> Result<BroadcastSummary> {
        let payload = message.to_bytes()?;
        let connection_ids = self.registry.list_all().await?;

        if connection_ids.is_empty() {
            info!("No connections registered, nothing to broadcast");
            return Ok(BroadcastSummary::default());
        }

        let handles = connection_ids.len();
        let started = Instant::now();
        info!(
            handles,
            concurrency = self.config.concurrency,
            bytes = payload.len(),
            "Broadcasting message"
        );

        let payload = payload.as_slice();
        let summary = stream::iter(connection_ids)
            .map(|connection_id| self.deliver_one(connection_id, payload))
            .buffer_unordered(self.config.concurrency.max(1))
            .try_fold(BroadcastSummary::default(), |mut summary, tally| async move {
                match tally {
                    Tally::Sent => summary.sent += 1,
                    Tally::StaleCleaned => summary.stale_cleaned += 1,
                }
                Ok(summary)
            })
            .await
            .map_err(|e| {
                error!(handles, error = %e, "Broadcast aborted");
                e
            })?;

        info!(
            sent = summary.sent,
            stale_cleaned = summary.stale_cleaned,
            elapsed = ?started.elapsed(),
            "Broadcast complete"
        );

        Ok(summary)
    }

    async fn deliver_one(&self, connection_id: ConnectionId, payload: &[u8]) -> Result<Tally> {
        match self.channel.post_to_connection(&connection_id, payload).await {
            DeliveryOutcome::Delivered => {
                debug!(connection_id = %connection_id, "Delivered");
                Ok(Tally::Sent)
            }
            DeliveryOutcome::Gone => {
                self.registry.remove(&connection_id).await?;
                info!(connection_id = %connection_id, "Removed stale connection");
                Ok(Tally::StaleCleaned)
            }
            DeliveryOutcome::Failed(detail) => Err(FanoutError::Delivery {
                connection_id: connection_id.to_string(),
                detail,
            }),
        }
    }
}
