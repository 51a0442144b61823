//! Query-related data models.
//!
//! This module defines the result shape returned by the execution pipeline
//! and the transient validation result produced by the guardrail validator.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// The result of one executed query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    /// Column names in result order.
    pub columns: Vec<String>,
    /// Result rows as key-value maps.
    pub rows: Vec<serde_json::Map<String, JsonValue>>,
    pub row_count: usize,
    /// Wall-clock time for the whole pipeline attempt in milliseconds,
    /// stamped by the orchestrator (covers schema loading, LLM generation,
    /// guardrails, and execution - not just the driver round trip).
    pub execution_time_ms: u64,
    /// The final sanitized SQL text that was executed.
    pub sql: String,
}

impl QueryResult {
    /// Check if the result is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Transient result of guardrail validation.
///
/// Produced by the validator and consumed immediately by the orchestrator;
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidationResult {
    /// A passing validation.
    pub fn valid() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    /// A failing validation with its rejection message.
    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_result_counts() {
        let mut row = serde_json::Map::new();
        row.insert("id".to_string(), JsonValue::Number(1.into()));

        let result = QueryResult {
            columns: vec!["id".to_string()],
            rows: vec![row],
            row_count: 1,
            execution_time_ms: 12,
            sql: "SELECT id FROM t".to_string(),
        };
        assert_eq!(result.row_count, 1);
        assert!(!result.is_empty());
    }

    #[test]
    fn test_validation_result_shapes() {
        assert!(ValidationResult::valid().valid);
        let invalid = ValidationResult::invalid("Multiple statements detected");
        assert!(!invalid.valid);
        assert!(invalid.error.unwrap().contains("Multiple"));
    }

    #[test]
    fn test_valid_result_serializes_without_error_field() {
        let json = serde_json::to_string(&ValidationResult::valid()).unwrap();
        assert!(!json.contains("error"));
    }
}
