//! Query execution engine.
//!
//! Executes sanitized SQL against a per-request pool and translates common
//! driver failures into actionable messages. When the TLS heuristic guessed
//! wrong and the server rejects a plaintext connection, the attempt is
//! retried once with TLS forced on; if TLS was already in use the failure is
//! surfaced with a distinct message. The pool is torn down on every exit
//! path.

use crate::db::pool::{self, is_tls_error};
use crate::db::types::{column_names, row_to_json_map};
use crate::error::{AskDbError, AskDbResult};
use crate::guard::AccessPolicy;
use crate::models::{ConnectionProfile, ConnectionStatus, QueryResult};
use sqlx::postgres::{PgPool, PgRow};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Which call site a failure is reported from; picks the error label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailureContext {
    Query,
    ConnectionTest,
}

/// Query executor over per-request ephemeral pools.
pub struct QueryExecutor {
    connect_timeout: Duration,
    policy: AccessPolicy,
}

impl QueryExecutor {
    /// Create an executor with the given connect timeout and the default
    /// access policy.
    pub fn new(connect_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            policy: AccessPolicy::default(),
        }
    }

    /// Create an executor with a custom access policy.
    pub fn with_policy(connect_timeout: Duration, policy: AccessPolicy) -> Self {
        Self {
            connect_timeout,
            policy,
        }
    }

    /// Run the access-mode gate alone, without executing anything.
    pub fn enforce_access(
        &self,
        sql: &str,
        access_mode: crate::models::AccessMode,
    ) -> AskDbResult<()> {
        self.policy.enforce(sql, access_mode)
    }

    /// Execute sanitized SQL on the profile's database.
    ///
    /// The access-mode gate runs here as well as in the orchestrator so a
    /// direct call is still policy-checked. `execution_time_ms` in the
    /// returned result covers only this attempt; the orchestrator re-stamps
    /// it with the full pipeline window.
    pub async fn execute(
        &self,
        profile: &ConnectionProfile,
        sql: &str,
    ) -> AskDbResult<QueryResult> {
        self.policy.enforce(sql, profile.access_mode)?;

        let with_tls = profile.tls_required;
        match self.attempt_query(profile, sql, with_tls).await {
            Ok(result) => Ok(result),
            Err(err) => self.handle_failure(profile, err, with_tls, FailureContext::Query, || {
                self.attempt_query(profile, sql, true)
            })
            .await,
        }
    }

    /// Probe the profile's database with SELECT 1, applying the same SSL
    /// fallback retry as query execution.
    pub async fn test_connection(&self, profile: &ConnectionProfile) -> AskDbResult<()> {
        let with_tls = profile.tls_required;
        match self.attempt_probe(profile, with_tls).await {
            Ok(()) => Ok(()),
            Err(err) => self
                .handle_failure(
                    profile,
                    err,
                    with_tls,
                    FailureContext::ConnectionTest,
                    || self.attempt_probe(profile, true),
                )
                .await,
        }
    }

    /// Probe the connection and report a status suitable for display.
    pub async fn connection_status(&self, profile: &ConnectionProfile) -> ConnectionStatus {
        match self.test_connection(profile).await {
            Ok(()) => ConnectionStatus::connected(),
            Err(err) => ConnectionStatus::error(err.to_string()),
        }
    }

    /// One open-use-close cycle executing the SQL.
    async fn attempt_query(
        &self,
        profile: &ConnectionProfile,
        sql: &str,
        use_tls: bool,
    ) -> AskDbResult<QueryResult> {
        let pool = pool::open_pool(profile, use_tls, self.connect_timeout).await?;
        let result = run_query(&pool, sql).await;
        pool::close_quietly(pool).await;
        result
    }

    /// One open-probe-close cycle.
    async fn attempt_probe(&self, profile: &ConnectionProfile, use_tls: bool) -> AskDbResult<()> {
        let pool = pool::open_pool(profile, use_tls, self.connect_timeout).await?;
        let result = pool::probe(&pool).await;
        pool::close_quietly(pool).await;
        result
    }

    /// Decide between the SSL retry, the "failed even with SSL" message, and
    /// plain error translation.
    async fn handle_failure<T, F, Fut>(
        &self,
        profile: &ConnectionProfile,
        err: AskDbError,
        tls_attempted: bool,
        context: FailureContext,
        retry: F,
    ) -> AskDbResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = AskDbResult<T>>,
    {
        let message = err.to_string();

        if is_tls_error(&message) {
            if tls_attempted {
                return Err(AskDbError::connection(
                    "Connection failed even with SSL enabled",
                    "Verify the host, port, credentials, and the server's TLS settings",
                ));
            }
            info!(
                host = %profile.host,
                "Plaintext connection rejected, retrying with TLS"
            );
            return match retry().await {
                Ok(value) => Ok(value),
                Err(retry_err) => Err(translate_error(retry_err, profile, context)),
            };
        }

        Err(translate_error(err, profile, context))
    }
}

/// Execute the SQL on an open pool and materialize the result.
async fn run_query(pool: &PgPool, sql: &str) -> AskDbResult<QueryResult> {
    let started = Instant::now();
    debug!(sql = %sql, "Executing query");

    let rows: Vec<PgRow> = sqlx::query(sql).fetch_all(pool).await.map_err(AskDbError::from)?;

    let columns = rows.first().map(column_names).unwrap_or_default();
    let json_rows: Vec<_> = rows.iter().map(row_to_json_map).collect();
    let row_count = json_rows.len();
    let execution_time_ms = started.elapsed().as_millis() as u64;

    info!(
        row_count = row_count,
        execution_time_ms = execution_time_ms,
        "Query executed"
    );

    Ok(QueryResult {
        columns,
        rows: json_rows,
        row_count,
        execution_time_ms,
        sql: sql.to_string(),
    })
}

/// Translate common driver failures into user-facing guidance.
fn translate_error(
    err: AskDbError,
    profile: &ConnectionProfile,
    context: FailureContext,
) -> AskDbError {
    // Policy rejections pass through untouched.
    if err.is_policy_rejection() {
        return err;
    }

    let message = err.to_string();

    if message.contains("ENOTFOUND")
        || message.contains("failed to lookup address")
        || message.contains("Name or service not known")
    {
        return AskDbError::connection(
            format!(
                "Cannot reach database host: {}. Please check the hostname.",
                profile.host
            ),
            "Verify the hostname resolves from this machine",
        );
    }

    if message.contains("password authentication failed") {
        return AskDbError::connection(
            "Authentication failed. Please check your username and password.",
            "Verify the credentials stored for this connection",
        );
    }

    if message.contains("does not exist") {
        return AskDbError::connection(
            format!(
                "Database \"{}\" does not exist. Please check the database name.",
                profile.database
            ),
            "Verify the database name stored for this connection",
        );
    }

    warn!(error = %message, "Untranslated driver failure");
    match context {
        FailureContext::Query => AskDbError::query_failed(message),
        FailureContext::ConnectionTest => AskDbError::connection(
            format!("Connection test failed: {}", message),
            "Check the connection settings",
        ),
    }
}
