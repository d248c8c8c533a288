//! Fan-out of inbound events to live API Gateway WebSocket connections.
//!
//! A [`Broadcaster`] lists every connection id from a [`ConnectionRegistry`],
//! posts the encoded message to each one through a [`DeliveryChannel`] and
//! deletes the connections that the channel reports as gone.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use ws_fanout::{Broadcaster, InMemoryRegistry, ApiGatewayChannel, BroadcastConfig};
//!
//! # async fn run(sdk_config: aws_config::SdkConfig) -> ws_fanout::Result<()> {
//! let registry = Arc::new(InMemoryRegistry::with_connections(["conn-a", "conn-b"]));
//! let channel = Arc::new(ApiGatewayChannel::from_sdk_config(
//!     &sdk_config,
//!     "https://abc123.execute-api.us-east-1.amazonaws.com/production",
//! ));
//!
//! let broadcaster = Broadcaster::new(registry, channel, BroadcastConfig::default());
//! let summary = broadcaster.handle_event(serde_json::json!({"temp": 21.5})).await?;
//! println!("sent={} stale_cleaned={}", summary.sent, summary.stale_cleaned);
//! # Ok(())
//! # }
//! ```

pub mod broadcaster;
pub mod config;
pub mod delivery;
pub mod error;
pub mod logging;
pub mod models;
pub mod registry;

pub use broadcaster::Broadcaster;
pub use config::{BroadcastConfig, Config};
pub use delivery::{ApiGatewayChannel, DeliveryChannel};
pub use error::{FanoutError, Result};
pub use models::{BroadcastMessage, BroadcastSummary, ConnectionId, DeliveryOutcome};
pub use registry::{ConnectionRegistry, DynamoConnectionRegistry, InMemoryRegistry};
