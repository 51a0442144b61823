//! NL→SQL pipeline orchestration.
//!
//! Sequences one query attempt: resolve connection → introspect schema →
//! render schema context → generate SQL → guardrail validation →
//! sanitization → access-mode enforcement → execution. Stages are strictly
//! sequential and none is re-entered; guardrail and access failures are
//! terminal, not transient. The whole pipeline runs under one deadline.
//! Once a remote query has been dispatched it cannot be aborted from this
//! side; the deadline stops waiting, not the remote work.

use crate::db::{resolver, QueryExecutor, SchemaIntrospector};
use crate::error::{AskDbError, AskDbResult};
use crate::guard;
use crate::llm::SqlGenerator;
use crate::models::{AccessMode, QueryResult};
use crate::store::ConnectionStore;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Coordinates the full natural-language query pipeline.
pub struct QueryOrchestrator {
    store: Arc<dyn ConnectionStore>,
    introspector: SchemaIntrospector,
    executor: QueryExecutor,
    generator: SqlGenerator,
    deadline: Duration,
}

impl QueryOrchestrator {
    /// Assemble the pipeline from its components.
    pub fn new(
        store: Arc<dyn ConnectionStore>,
        introspector: SchemaIntrospector,
        executor: QueryExecutor,
        generator: SqlGenerator,
        deadline: Duration,
    ) -> Self {
        Self {
            store,
            introspector,
            executor,
            generator,
            deadline,
        }
    }

    /// Execute a natural-language query against a stored connection.
    ///
    /// `access_override` replaces the connection's stored access mode for
    /// this call when given. The returned result's `execution_time_ms`
    /// covers the whole pipeline, not just the driver round trip.
    pub async fn execute_query(
        &self,
        natural_language_query: &str,
        connection_id: &str,
        access_override: Option<AccessMode>,
    ) -> AskDbResult<QueryResult> {
        let deadline = self.deadline;
        match tokio::time::timeout(
            deadline,
            self.run_pipeline(natural_language_query, connection_id, access_override),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(AskDbError::timeout(
                "query pipeline",
                deadline.as_secs() as u32,
            )),
        }
    }

    async fn run_pipeline(
        &self,
        natural_language_query: &str,
        connection_id: &str,
        access_override: Option<AccessMode>,
    ) -> AskDbResult<QueryResult> {
        let started = Instant::now();

        let record = self.store.get_connection(connection_id).await?;
        let mut profile = resolver::profile_from_record(&record);
        if let Some(mode) = access_override {
            profile.access_mode = mode;
        }

        let tables = self.introspector.metadata_for_profile(&profile).await?;
        let schema_context = self.introspector.render_schema_context(&tables);
        debug!(
            connection_id = %connection_id,
            tables = tables.len(),
            "Schema context assembled"
        );

        let sql = self
            .generator
            .generate_sql(natural_language_query, &schema_context)
            .await?;
        debug!(sql = %sql, "SQL generated");

        guard::check(&sql)?;
        let sanitized = guard::sanitize(&sql);
        self.executor.enforce_access(&sanitized, profile.access_mode)?;

        let mut result = self.executor.execute(&profile, &sanitized).await?;
        result.execution_time_ms = started.elapsed().as_millis() as u64;

        info!(
            connection_id = %connection_id,
            row_count = result.row_count,
            execution_time_ms = result.execution_time_ms,
            "Pipeline completed"
        );

        Ok(result)
    }

    /// Ask the LLM for a plain-English explanation of a SQL query.
    pub async fn explain_sql(&self, sql: &str) -> AskDbResult<String> {
        Ok(self.generator.explain_sql(sql).await?)
    }
}
