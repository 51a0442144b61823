//! Orchestrator-level behavior: the overall pipeline deadline and
//! connection resolution failures surface as typed errors.

use askdb::db::{QueryExecutor, SchemaIntrospector};
use askdb::error::{AskDbError, AskDbResult};
use askdb::llm::{OpenAiCompatibleClient, SqlGenerator};
use askdb::models::ConnectionRecord;
use askdb::store::{ConnectionStore, InMemoryConnectionStore};
use askdb::QueryOrchestrator;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Store whose lookups hang long enough to trip any reasonable deadline.
struct SlowStore;

#[async_trait]
impl ConnectionStore for SlowStore {
    async fn get_connection(&self, _connection_id: &str) -> AskDbResult<ConnectionRecord> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Err(AskDbError::connection_not_found("never"))
    }
}

fn generator() -> SqlGenerator {
    // Never reached in these tests; any syntactically valid endpoint works.
    let client =
        OpenAiCompatibleClient::new("test-key", "http://127.0.0.1:9/v1").unwrap();
    SqlGenerator::new(Arc::new(client), vec!["model".to_string()])
}

fn orchestrator(store: Arc<dyn ConnectionStore>, deadline: Duration) -> QueryOrchestrator {
    let connect_timeout = Duration::from_secs(1);
    QueryOrchestrator::new(
        store.clone(),
        SchemaIntrospector::new(store, connect_timeout),
        QueryExecutor::new(connect_timeout),
        generator(),
        deadline,
    )
}

#[tokio::test]
async fn pipeline_deadline_fires_instead_of_hanging() {
    let orchestrator = orchestrator(Arc::new(SlowStore), Duration::from_millis(100));

    let err = orchestrator
        .execute_query("how many users?", "c1", None)
        .await
        .unwrap_err();

    match err {
        AskDbError::Timeout { operation, .. } => {
            assert_eq!(operation, "query pipeline");
        }
        other => panic!("expected Timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn unknown_connection_id_is_not_found() {
    let store = Arc::new(InMemoryConnectionStore::new());
    let orchestrator = orchestrator(store, Duration::from_secs(5));

    let err = orchestrator
        .execute_query("how many users?", "missing", None)
        .await
        .unwrap_err();

    assert!(matches!(err, AskDbError::ConnectionNotFound { .. }));
}
