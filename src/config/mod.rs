use crate::error::{FanoutError, Result};
use std::env;

const DEFAULT_TABLE_NAME: &str = "wand-ws-connections";
const DEFAULT_SOURCE: &str = "iot";
const DEFAULT_CONCURRENCY: usize = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub registry: RegistryConfig,
    pub gateway: GatewayConfig,
    pub broadcast: BroadcastConfig,
    /// Region override; the AWS default provider chain is used when unset
    pub aws_region: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// DynamoDB table keyed by `connectionId`
    pub table_name: String,
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// API Gateway management endpoint, e.g. https://{api-id}.execute-api.{region}.amazonaws.com/{stage}
    pub endpoint: String,
}

#[derive(Debug, Clone)]
pub struct BroadcastConfig {
    /// Tag written to the `source` field of every message
    pub source: String,
    /// Maximum number of deliveries in flight; 1 delivers sequentially
    pub concurrency: usize,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE.to_string(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint = lookup("WS_API_ENDPOINT")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| FanoutError::Config("WS_API_ENDPOINT must be set".to_string()))?;

        if !endpoint.starts_with("https://") && !endpoint.starts_with("http://") {
            return Err(FanoutError::Config(format!(
                "WS_API_ENDPOINT must be an http(s) URL, got {endpoint}"
            )));
        }

        let concurrency = match lookup("BROADCAST_CONCURRENCY") {
            Some(raw) => raw.trim().parse::<usize>().map_err(|e| {
                FanoutError::Config(format!("BROADCAST_CONCURRENCY is not a number: {e}"))
            })?,
            None => DEFAULT_CONCURRENCY,
        };
        if concurrency == 0 {
            return Err(FanoutError::Config(
                "BROADCAST_CONCURRENCY must be at least 1".to_string(),
            ));
        }

        Ok(Config {
            registry: RegistryConfig {
                table_name: lookup("CONNECTIONS_TABLE")
                    .unwrap_or_else(|| DEFAULT_TABLE_NAME.to_string()),
            },
            gateway: GatewayConfig {
                endpoint: endpoint.trim_end_matches('/').to_string(),
            },
            broadcast: BroadcastConfig {
                source: lookup("MESSAGE_SOURCE").unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
                concurrency,
            },
            aws_region: lookup("AWS_REGION").filter(|v| !v.is_empty()),
        })
    }
}
