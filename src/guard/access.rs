//! Access-mode enforcement.
//!
//! A second gate behind the guardrail validator: each connection carries an
//! access tier (read/write/update/full) and this policy rejects SQL whose
//! upper-cased text contains a keyword restricted for that tier. The check
//! is independent of the validator so it still rejects correctly when
//! invoked directly.
//!
//! Which keywords the non-read tiers should restrict is a deployment policy
//! decision; the default policy restricts only `read` and leaves the other
//! tiers open, matching the upstream behavior.

use crate::error::{AskDbError, AskDbResult};
use crate::models::AccessMode;
use std::collections::HashMap;

/// Keywords restricted for read-only connections.
const READ_RESTRICTED_KEYWORDS: &[&str] = &[
    "INSERT", "UPDATE", "DELETE", "DROP", "CREATE", "ALTER", "TRUNCATE",
];

/// Per-mode restricted keyword lists.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    restricted: HashMap<AccessMode, Vec<String>>,
}

impl AccessPolicy {
    /// Create an empty policy with no restrictions for any mode.
    pub fn permissive() -> Self {
        Self {
            restricted: HashMap::new(),
        }
    }

    /// Set the restricted keyword list for a mode.
    pub fn with_restricted(mut self, mode: AccessMode, keywords: Vec<String>) -> Self {
        self.restricted.insert(mode, keywords);
        self
    }

    /// Get the restricted keywords for a mode, if any.
    pub fn restricted_keywords(&self, mode: AccessMode) -> &[String] {
        self.restricted
            .get(&mode)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Enforce this policy: reject SQL containing a keyword restricted for
    /// the given access mode (case-insensitive substring match).
    pub fn enforce(&self, sql: &str, mode: AccessMode) -> AskDbResult<()> {
        let upper = sql.to_uppercase();
        for keyword in self.restricted_keywords(mode) {
            if upper.contains(keyword.as_str()) {
                return Err(AskDbError::operation_not_allowed(
                    keyword.as_str(),
                    mode.to_string(),
                ));
            }
        }
        Ok(())
    }
}

impl Default for AccessPolicy {
    /// The default policy restricts only `read`; write/update/full perform
    /// no additional restriction.
    fn default() -> Self {
        Self::permissive().with_restricted(
            AccessMode::Read,
            READ_RESTRICTED_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_mode_allows_select() {
        let policy = AccessPolicy::default();
        assert!(policy.enforce("SELECT * FROM t", AccessMode::Read).is_ok());
    }

    #[test]
    fn test_read_mode_rejects_update() {
        let policy = AccessPolicy::default();
        let err = policy
            .enforce("UPDATE t SET x=1", AccessMode::Read)
            .unwrap_err();
        match err {
            AskDbError::OperationNotAllowed { keyword, mode } => {
                assert_eq!(keyword, "UPDATE");
                assert_eq!(mode, "read");
            }
            other => panic!("expected OperationNotAllowed, got {other:?}"),
        }
    }

    #[test]
    fn test_read_mode_rejects_all_restricted_keywords() {
        let policy = AccessPolicy::default();
        for sql in [
            "INSERT INTO t VALUES (1)",
            "DELETE FROM t",
            "DROP TABLE t",
            "CREATE TABLE t (id INT)",
            "ALTER TABLE t ADD c INT",
            "TRUNCATE t",
        ] {
            assert!(
                policy.enforce(sql, AccessMode::Read).is_err(),
                "expected rejection for {sql:?}"
            );
        }
    }

    #[test]
    fn test_non_read_modes_unrestricted_by_default() {
        let policy = AccessPolicy::default();
        for mode in [AccessMode::Write, AccessMode::Update, AccessMode::Full] {
            assert!(policy.enforce("UPDATE t SET x=1", mode).is_ok());
        }
    }

    #[test]
    fn test_custom_policy_can_tighten_write_mode() {
        let policy = AccessPolicy::default()
            .with_restricted(AccessMode::Write, vec!["DROP".to_string()]);
        assert!(policy.enforce("UPDATE t SET x=1", AccessMode::Write).is_ok());
        assert!(policy.enforce("DROP TABLE t", AccessMode::Write).is_err());
    }

    #[test]
    fn test_enforcement_is_case_insensitive() {
        let policy = AccessPolicy::default();
        assert!(policy.enforce("update t set x=1", AccessMode::Read).is_err());
    }
}
