use super::ConnectionRegistry;
use crate::error::Result;
use crate::models::ConnectionId;
use async_trait::async_trait;
use dashmap::DashSet;
use std::sync::Arc;

/// Process-local registry for local runs and tests.
#[derive(Clone, Default)]
pub struct InMemoryRegistry {
    connections: Arc<DashSet<ConnectionId>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_connections<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ConnectionId>,
    {
        let registry = Self::new();
        for id in ids {
            registry.insert(id);
        }
        registry
    }

    /// Register a connection; returns false if it was already present.
    pub fn insert(&self, id: impl Into<ConnectionId>) -> bool {
        self.connections.insert(id.into())
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.connections.contains(id)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Sorted copy of the current contents
    pub fn snapshot(&self) -> Vec<ConnectionId> {
        let mut ids: Vec<ConnectionId> = self.connections.iter().map(|id| id.clone()).collect();
        ids.sort();
        ids
    }
}

#[async_trait]
impl ConnectionRegistry for InMemoryRegistry {
    async fn list_all(&self) -> Result<Vec<ConnectionId>> {
        Ok(self.connections.iter().map(|id| id.clone()).collect())
    }

    async fn remove(&self, connection_id: &ConnectionId) -> Result<()> {
        self.connections.remove(connection_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_all_returns_every_connection() {
        let registry = InMemoryRegistry::with_connections(["a", "b", "c"]);
        let mut listed = tokio_test::block_on(registry.list_all()).unwrap();
        listed.sort();
        assert_eq!(listed, registry.snapshot());
        assert_eq!(listed.len(), 3);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let registry = InMemoryRegistry::with_connections(["a", "b"]);
        let a = ConnectionId::from("a");

        tokio_test::block_on(registry.remove(&a)).unwrap();
        let once = registry.snapshot();
        tokio_test::block_on(registry.remove(&a)).unwrap();

        assert_eq!(registry.snapshot(), once);
        assert_eq!(once, vec![ConnectionId::from("b")]);
    }

    #[test]
    fn test_remove_unknown_is_not_an_error() {
        let registry = InMemoryRegistry::new();
        assert!(tokio_test::block_on(registry.remove(&ConnectionId::from("ghost"))).is_ok());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_insert_reports_duplicates() {
        let registry = InMemoryRegistry::new();
        assert!(registry.insert("a"));
        assert!(!registry.insert("a"));
        assert_eq!(registry.len(), 1);
    }
}
