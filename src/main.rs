use anyhow::{Context, Result};
use aws_config::{BehaviorVersion, Region};
use std::io::Read;
use std::sync::Arc;
use ws_fanout::{
    logging, ApiGatewayChannel, Broadcaster, Config, DynamoConnectionRegistry, FanoutError,
};

/// Reads one JSON event (from the file named by the first argument, or stdin),
/// broadcasts it and prints the summary to stdout.
#[tokio::main]
async fn main() -> Result<()> {
    logging::init_tracing();

    let config = Config::from_env().context("Failed to load configuration")?;
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = config.aws_region.clone() {
        loader = loader.region(Region::new(region));
    }
    let sdk_config = loader.load().await;

    let registry = DynamoConnectionRegistry::new(
        Arc::new(aws_sdk_dynamodb::Client::new(&sdk_config)),
        config.registry.table_name.clone(),
    );
    tracing::info!(
        table = %registry.table_name(),
        endpoint = %config.gateway.endpoint,
        concurrency = config.broadcast.concurrency,
        "Starting ws-fanout"
    );

    let channel = ApiGatewayChannel::from_sdk_config(&sdk_config, &config.gateway.endpoint);
    let broadcaster = Broadcaster::new(
        Arc::new(registry),
        Arc::new(channel),
        config.broadcast.clone(),
    );

    let event = read_event(std::env::args().nth(1)).context("Failed to read event")?;

    match broadcaster.handle_event(event).await {
        Ok(summary) => {
            println!("{}", serde_json::to_string(&summary)?);
            Ok(())
        }
        Err(e) => {
            if e.is_registry_error() {
                tracing::error!(error = %e, "Connection registry failure");
            } else if let FanoutError::Delivery { connection_id, .. } = &e {
                tracing::error!(connection_id = %connection_id, error = %e, "Unexpected delivery failure");
            }
            Err(e).context("Broadcast failed")
        }
    }
}

fn read_event(path: Option<String>) -> Result<serde_json::Value> {
    let raw = match path {
        Some(path) => {
            std::fs::read_to_string(&path).with_context(|| format!("Failed to read {path}"))?
        }
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    serde_json::from_str(&raw).context("Event is not valid JSON")
}
