//! Connection-related data models.
//!
//! This module defines types for database connection records, normalized
//! connection profiles, and access-mode tiers. Profiles carry plaintext
//! credentials for the duration of a single operation and are never cached,
//! logged, or serialized with the password included.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Supported database engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    PostgreSql,
    MySql,
    Sqlite,
}

impl EngineKind {
    /// Parse an engine kind from a stored type string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "postgresql" | "postgres" => Some(Self::PostgreSql),
            "mysql" => Some(Self::MySql),
            "sqlite" => Some(Self::Sqlite),
            _ => None,
        }
    }

    /// Get the display name for this engine.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::PostgreSql => "postgresql",
            Self::MySql => "mysql",
            Self::Sqlite => "sqlite",
        }
    }

    /// Get the default port for this engine.
    pub fn default_port(&self) -> u16 {
        match self {
            Self::PostgreSql => 5432,
            Self::MySql => 3306,
            Self::Sqlite => 0,
        }
    }
}

impl std::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Per-connection access tier controlling which SQL operation categories
/// are permitted. Default is `read` for safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessMode {
    #[default]
    Read,
    Write,
    Update,
    Full,
}

impl AccessMode {
    /// Parse an access mode from a stored string, falling back to `read`.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "write" => Self::Write,
            "update" => Self::Update,
            "full" => Self::Full,
            _ => Self::Read,
        }
    }
}

impl std::fmt::Display for AccessMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::Write => write!(f, "write"),
            Self::Update => write!(f, "update"),
            Self::Full => write!(f, "full"),
        }
    }
}

/// A stored connection record, as returned by the connection record provider.
///
/// The core treats this as authoritative and never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionRecord {
    pub id: String,
    pub name: String,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    /// Contains sensitive data - never log or echo
    #[serde(skip_serializing)]
    pub password: String,
    pub engine: EngineKind,
    #[serde(default)]
    pub access_mode: AccessMode,
}

/// A normalized connection profile, derived on demand from a stored record
/// or a parsed connection string. Scoped to a single operation.
#[derive(Debug, Clone)]
pub struct ConnectionProfile {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    /// Contains sensitive data - never log or echo
    pub password: String,
    pub engine: EngineKind,
    /// Best-effort TLS requirement; the executor retries with TLS forced on
    /// when this guess turns out to be wrong.
    pub tls_required: bool,
    pub access_mode: AccessMode,
}

impl ConnectionProfile {
    /// Get a display-safe description of this profile (no credentials).
    pub fn redacted_display(&self) -> String {
        format!(
            "{}://{}@{}:{}/{}",
            self.engine, self.username, self.host, self.port, self.database
        )
    }
}

/// Result of probing a connection's reachability.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionStatus {
    pub connected: bool,
    pub status: &'static str,
    pub message: String,
    pub last_checked: DateTime<Utc>,
}

impl ConnectionStatus {
    /// Create a successful status report.
    pub fn connected() -> Self {
        Self {
            connected: true,
            status: "connected",
            message: "Connection successful".to_string(),
            last_checked: Utc::now(),
        }
    }

    /// Create a failed status report with the translated error message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            connected: false,
            status: "error",
            message: message.into(),
            last_checked: Utc::now(),
        }
    }
}
