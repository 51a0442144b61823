//! Lexical SQL guardrails.
//!
//! Validation is substring/pattern based, not a tokenizer: a dangerous
//! keyword inside a string literal or identifier is still rejected. That is
//! an accepted false-positive tradeoff. Checks run in a fixed order and the
//! first failing check wins. Comment stripping happens only after validation
//! succeeds, so keywords hidden inside comments are still caught.

use crate::models::ValidationResult;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Keywords that are never allowed, matched as case-insensitive substrings.
const DANGEROUS_KEYWORDS: &[&str] = &[
    "DROP", "DELETE", "UPDATE", "TRUNCATE", "ALTER", "CREATE", "INSERT", "GRANT", "REVOKE",
    "EXEC", "EXECUTE", "CALL",
];

/// Injection patterns checked against the raw SQL.
static INJECTION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)UNION.*SELECT",
        r"(?i)OR\s+1\s*=\s*1",
        r"(?i)OR\s+'1'\s*=\s*'1'",
        r"(?i)EXEC\s*\(",
        r"(?i)xp_",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("injection pattern must compile"))
    .collect()
});

static LINE_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)--.*$").expect("line comment pattern must compile"));

static BLOCK_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/\*[\s\S]*?\*/").expect("block comment pattern must compile"));

/// A guardrail rejection. Always surfaced verbatim to the caller and never
/// retried or downgraded to a warning.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GuardrailViolation {
    #[error("Dangerous operation detected: {keyword}. Only SELECT queries are allowed.")]
    DangerousOperation { keyword: &'static str },

    #[error("Only SELECT queries are allowed. Query must start with SELECT.")]
    NotASelectStatement,

    #[error("Potential SQL injection detected. Query rejected for security.")]
    PotentialInjection,

    #[error("Multiple statements detected. Only single SELECT queries are allowed.")]
    MultipleStatements,
}

/// Check a candidate SQL string against all guardrails.
///
/// Check order: dangerous keywords, SELECT prefix, injection patterns,
/// multi-statement split. The first failing check wins.
pub fn check(sql: &str) -> Result<(), GuardrailViolation> {
    let upper = sql.to_uppercase();
    let upper = upper.trim();

    for &keyword in DANGEROUS_KEYWORDS {
        if upper.contains(keyword) {
            return Err(GuardrailViolation::DangerousOperation { keyword });
        }
    }

    if !upper.starts_with("SELECT") {
        return Err(GuardrailViolation::NotASelectStatement);
    }

    if INJECTION_PATTERNS.iter().any(|p| p.is_match(sql)) {
        return Err(GuardrailViolation::PotentialInjection);
    }

    let statements = sql.split(';').filter(|s| !s.trim().is_empty()).count();
    if statements > 1 {
        return Err(GuardrailViolation::MultipleStatements);
    }

    Ok(())
}

/// Validate a candidate SQL string, returning the transient result shape.
pub fn validate(sql: &str) -> ValidationResult {
    match check(sql) {
        Ok(()) => ValidationResult::valid(),
        Err(violation) => ValidationResult::invalid(violation.to_string()),
    }
}

/// Strip line and block comments and trim whitespace.
///
/// Applied only after validation succeeds, never before.
pub fn sanitize(sql: &str) -> String {
    let without_line_comments = LINE_COMMENT.replace_all(sql, "");
    let without_comments = BLOCK_COMMENT.replace_all(&without_line_comments, "");
    without_comments.trim().to_string()
}
