//! Prompt construction and LLM output cleanup.

use regex::Regex;
use std::sync::LazyLock;

/// System instruction for SQL generation.
pub const SQL_SYSTEM_INSTRUCTION: &str =
    "You are a SQL expert. Generate only valid SQL queries without any explanations or markdown formatting.";

/// System instruction for SQL explanation.
pub const EXPLAIN_SYSTEM_INSTRUCTION: &str =
    "You are a SQL expert who explains queries in plain English.";

static LEADING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^```sql\n?").expect("fence pattern must compile"));

static TRAILING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```\n?$").expect("fence pattern must compile"));

/// Build the NL→SQL prompt from the question and rendered schema context.
pub fn nl_to_sql_prompt(
    natural_language_query: &str,
    schema_context: &str,
    examples: Option<&[String]>,
) -> String {
    let examples_section = match examples {
        Some(examples) if !examples.is_empty() => {
            let list = examples
                .iter()
                .map(|ex| format!("- {}", ex))
                .collect::<Vec<_>>()
                .join("\n");
            format!("\n\nHere are some examples:\n{}", list)
        }
        _ => String::new(),
    };

    format!(
        "You are a SQL expert. Convert the following natural language question into a safe, optimized SQL query.\n\
        \n\
        Database Schema:\n\
        {schema_context}\n\
        {examples_section}\n\
        Natural Language Query: {natural_language_query}\n\
        \n\
        Requirements:\n\
        1. Generate ONLY valid SQL (PostgreSQL syntax)\n\
        2. Do NOT include any explanations or markdown formatting\n\
        3. Use proper table and column names from the schema\n\
        4. Include appropriate JOINs when needed\n\
        5. Use parameterized queries where possible (use $1, $2, etc. for parameters)\n\
        6. Do NOT include any destructive operations (DROP, DELETE, UPDATE, TRUNCATE, ALTER)\n\
        7. Only SELECT queries are allowed\n\
        8. Ensure the query is optimized and uses indexes when available\n\
        \n\
        SQL Query:"
    )
}

/// Build the explain-SQL prompt.
pub fn explain_sql_prompt(sql_query: &str) -> String {
    format!(
        "Explain the following SQL query in plain English, describing what data it retrieves and how:\n\
        \n\
        {sql_query}\n\
        \n\
        Explanation:"
    )
}

/// Strip a markdown code-fence wrapper (```sql ... ```) from raw LLM output.
pub fn strip_code_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_leading = LEADING_FENCE.replace(trimmed, "");
    let without_fences = TRAILING_FENCE.replace(&without_leading, "");
    without_fences.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_schema_and_question() {
        let prompt = nl_to_sql_prompt("how many users?", "Table: users", None);
        assert!(prompt.contains("Table: users"));
        assert!(prompt.contains("Natural Language Query: how many users?"));
        assert!(prompt.contains("Only SELECT queries are allowed"));
        assert!(prompt.ends_with("SQL Query:"));
    }

    #[test]
    fn test_prompt_includes_examples_when_given() {
        let examples = vec!["SELECT 1".to_string()];
        let prompt = nl_to_sql_prompt("q", "schema", Some(&examples));
        assert!(prompt.contains("Here are some examples:"));
        assert!(prompt.contains("- SELECT 1"));
    }

    #[test]
    fn test_prompt_omits_examples_section_when_empty() {
        let prompt = nl_to_sql_prompt("q", "schema", Some(&[]));
        assert!(!prompt.contains("Here are some examples"));
    }

    #[test]
    fn test_strip_sql_fence() {
        assert_eq!(
            strip_code_fences("```sql\nSELECT 1\n```"),
            "SELECT 1"
        );
    }

    #[test]
    fn test_strip_fence_case_insensitive() {
        assert_eq!(strip_code_fences("```SQL\nSELECT 1\n```"), "SELECT 1");
    }

    #[test]
    fn test_unfenced_output_unchanged() {
        assert_eq!(strip_code_fences("  SELECT 1  "), "SELECT 1");
    }
}
