//! Per-request connection pool lifecycle.
//!
//! Pools are scoped to a single operation: created, probed, used, and torn
//! down within one call. Nothing is shared across requests, so credentials
//! never leak between users; the cost is one TCP+auth handshake per query.

use crate::error::{AskDbError, AskDbResult};
use crate::models::{ConnectionProfile, EngineKind};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgSslMode};
use std::time::Duration;
use tracing::debug;

/// One pooled connection is enough: all pipeline stages run sequentially
/// within a single request.
const PER_REQUEST_MAX_CONNECTIONS: u32 = 1;

/// Error fragments that indicate the server rejected a plaintext connection
/// and TLS should be retried.
const TLS_ERROR_FRAGMENTS: &[&str] = &[
    "connection is insecure",
    "sslmode",
    "SSL connection",
    "server does not support SSL",
];

/// Check whether a driver error message suggests the server requires TLS.
pub fn is_tls_error(message: &str) -> bool {
    TLS_ERROR_FRAGMENTS.iter().any(|f| message.contains(f))
}

/// Open a pool for the profile with an explicit TLS posture.
///
/// `use_tls` maps to `PgSslMode::Require`, which does not verify server
/// certificates - remote databases here are arbitrary user-supplied hosts
/// with no CA configuration available.
pub async fn open_pool(
    profile: &ConnectionProfile,
    use_tls: bool,
    connect_timeout: Duration,
) -> AskDbResult<PgPool> {
    if profile.engine != EngineKind::PostgreSql {
        return Err(AskDbError::invalid_input(
            "Only PostgreSQL connections are currently supported",
        ));
    }

    let ssl_mode = if use_tls {
        PgSslMode::Require
    } else {
        PgSslMode::Disable
    };

    let options = PgConnectOptions::new()
        .host(&profile.host)
        .port(profile.port)
        .database(&profile.database)
        .username(&profile.username)
        .password(&profile.password)
        .ssl_mode(ssl_mode);

    debug!(
        target = %profile.redacted_display(),
        tls = use_tls,
        "Opening connection pool"
    );

    let pool = PgPoolOptions::new()
        .max_connections(PER_REQUEST_MAX_CONNECTIONS)
        .acquire_timeout(connect_timeout)
        .connect_with(options)
        .await
        .map_err(|e| AskDbError::connection(e.to_string(), "Check host, port, and credentials"))?;

    Ok(pool)
}

/// Fail fast on unreachable or misbehaving hosts.
pub async fn probe(pool: &PgPool) -> AskDbResult<()> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Best-effort pool close for all exit paths. sqlx's close never errors, so
/// this exists to make the unconditional-teardown call sites read clearly.
pub async fn close_quietly(pool: PgPool) {
    pool.close().await;
}
