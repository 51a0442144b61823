//! Connection record provider boundary.
//!
//! The store holding persisted connection records is an external
//! collaborator: the core reads one record per operation and never mutates
//! it. An in-memory implementation backs the CLI and tests.

use crate::error::{AskDbError, AskDbResult};
use crate::models::ConnectionRecord;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Read access to persisted connection records.
#[async_trait]
pub trait ConnectionStore: Send + Sync {
    /// Fetch a connection record by id, or `ConnectionNotFound`.
    async fn get_connection(&self, connection_id: &str) -> AskDbResult<ConnectionRecord>;
}

/// In-memory connection store.
#[derive(Debug, Default)]
pub struct InMemoryConnectionStore {
    records: RwLock<HashMap<String, ConnectionRecord>>,
}

impl InMemoryConnectionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record, keyed by its id.
    pub async fn insert(&self, record: ConnectionRecord) {
        let mut records = self.records.write().await;
        records.insert(record.id.clone(), record);
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl ConnectionStore for InMemoryConnectionStore {
    async fn get_connection(&self, connection_id: &str) -> AskDbResult<ConnectionRecord> {
        let records = self.records.read().await;
        records
            .get(connection_id)
            .cloned()
            .ok_or_else(|| AskDbError::connection_not_found(connection_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccessMode, EngineKind};

    fn record(id: &str) -> ConnectionRecord {
        ConnectionRecord {
            id: id.to_string(),
            name: "test".to_string(),
            host: "localhost".to_string(),
            port: 5432,
            database: "db".to_string(),
            username: "u".to_string(),
            password: "p".to_string(),
            engine: EngineKind::PostgreSql,
            access_mode: AccessMode::Read,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = InMemoryConnectionStore::new();
        store.insert(record("c1")).await;
        let fetched = store.get_connection("c1").await.unwrap();
        assert_eq!(fetched.id, "c1");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_missing_record_is_not_found() {
        let store = InMemoryConnectionStore::new();
        let err = store.get_connection("missing").await.unwrap_err();
        assert!(matches!(err, AskDbError::ConnectionNotFound { .. }));
    }
}
