use thiserror::Error;

pub type Result<T> = std::result::Result<T, FanoutError>;

/// Fatal failures of a broadcast invocation.
///
/// A gone recipient is not represented here: it is an expected outcome that
/// is resolved by removing the connection from the registry.
#[derive(Debug, Error)]
pub enum FanoutError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to list connections: {0}")]
    RegistryList(String),

    #[error("failed to remove connection {connection_id}: {detail}")]
    RegistryRemove {
        connection_id: String,
        detail: String,
    },

    #[error("delivery to {connection_id} failed: {detail}")]
    Delivery {
        connection_id: String,
        detail: String,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FanoutError {
    /// Whether the error came from the registry storage layer
    pub fn is_registry_error(&self) -> bool {
        matches!(
            self,
            FanoutError::RegistryList(_) | FanoutError::RegistryRemove { .. }
        )
    }
}
