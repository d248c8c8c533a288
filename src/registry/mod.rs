/// Connection registry
///
/// Authoritative set of live connection ids. The registry is shared with the
/// connect/disconnect handlers that own registration, so reads are a snapshot
/// and removals must be idempotent.
use crate::error::Result;
use crate::models::ConnectionId;
use async_trait::async_trait;

pub mod dynamo;
pub mod memory;

pub use dynamo::DynamoConnectionRegistry;
pub use memory::InMemoryRegistry;

#[async_trait]
pub trait ConnectionRegistry: Send + Sync {
    /// Every stored connection id, in no particular order.
    ///
    /// Implementations backed by paginated stores drain all pages before returning.
    async fn list_all(&self) -> Result<Vec<ConnectionId>>;

    /// Delete a connection id. Removing an unknown id succeeds.
    async fn remove(&self, connection_id: &ConnectionId) -> Result<()>;
}
