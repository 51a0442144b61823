//! Schema-related data models.
//!
//! This module defines the types produced by catalog introspection and the
//! plain-text rendering used as LLM context. Rendering is deterministic for
//! a given input so prompts stay reproducible.

use serde::{Deserialize, Serialize};

/// Metadata for one table in the target schema's public namespace.
///
/// Produced fresh on every introspection call; never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableMetadata {
    pub table_name: String,
    /// Ordered by physical column position.
    pub columns: Vec<ColumnMetadata>,
    pub primary_keys: Vec<String>,
    pub foreign_keys: Vec<ForeignKeyMetadata>,
    /// Non-primary indexes only.
    pub indexes: Vec<IndexMetadata>,
}

impl TableMetadata {
    /// Create an empty table metadata entry.
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            columns: Vec::new(),
            primary_keys: Vec::new(),
            foreign_keys: Vec::new(),
            indexes: Vec::new(),
        }
    }

    /// Add a column definition.
    pub fn with_column(mut self, column: ColumnMetadata) -> Self {
        self.columns.push(column);
        self
    }

    /// Set the primary key columns.
    pub fn with_primary_keys(mut self, columns: Vec<String>) -> Self {
        self.primary_keys = columns;
        self
    }

    /// Add a foreign key.
    pub fn with_foreign_key(mut self, fk: ForeignKeyMetadata) -> Self {
        self.foreign_keys.push(fk);
        self
    }

    /// Add an index.
    pub fn with_index(mut self, index: IndexMetadata) -> Self {
        self.indexes.push(index);
        self
    }

    /// Render this table as a deterministic plain-text block for LLM context.
    ///
    /// Format: table name line, column list with type/length/nullability,
    /// primary key line when present, then foreign key and index lines.
    pub fn schema_text(&self) -> String {
        let mut parts: Vec<String> = Vec::new();

        parts.push(format!("Table: {}", self.table_name));

        parts.push("Columns:".to_string());
        for col in &self.columns {
            let nullable = if col.is_nullable { "nullable" } else { "not null" };
            let length = col
                .character_maximum_length
                .map(|len| format!("({})", len))
                .unwrap_or_default();
            parts.push(format!(
                "  - {}: {}{} {}",
                col.column_name, col.data_type, length, nullable
            ));
        }

        if !self.primary_keys.is_empty() {
            parts.push(format!("Primary Key: {}", self.primary_keys.join(", ")));
        }

        if !self.foreign_keys.is_empty() {
            parts.push("Foreign Keys:".to_string());
            for fk in &self.foreign_keys {
                parts.push(format!(
                    "  - {} -> {}.{}",
                    fk.column_name, fk.referenced_table, fk.referenced_column
                ));
            }
        }

        if !self.indexes.is_empty() {
            parts.push("Indexes:".to_string());
            for idx in &self.indexes {
                let unique = if idx.is_unique { "UNIQUE " } else { "" };
                parts.push(format!(
                    "  - {}{} on ({})",
                    unique,
                    idx.index_name,
                    idx.column_names.join(", ")
                ));
            }
        }

        parts.join("\n")
    }
}

/// Metadata for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    pub column_name: String,
    /// Declared data type as reported by the catalog (e.g., "character varying")
    pub data_type: String,
    pub is_nullable: bool,
    /// Opaque default expression, e.g. "nextval('users_id_seq'::regclass)"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character_maximum_length: Option<i32>,
}

impl ColumnMetadata {
    /// Create new column metadata.
    pub fn new(
        column_name: impl Into<String>,
        data_type: impl Into<String>,
        is_nullable: bool,
    ) -> Self {
        Self {
            column_name: column_name.into(),
            data_type: data_type.into(),
            is_nullable,
            default_value: None,
            character_maximum_length: None,
        }
    }

    /// Set the default value expression.
    pub fn with_default(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = Some(default_value.into());
        self
    }

    /// Set the maximum character length.
    pub fn with_max_length(mut self, length: i32) -> Self {
        self.character_maximum_length = Some(length);
        self
    }
}

/// A foreign key reference from a local column to another table's column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKeyMetadata {
    pub column_name: String,
    pub referenced_table: String,
    pub referenced_column: String,
}

impl ForeignKeyMetadata {
    /// Create a new foreign key entry.
    pub fn new(
        column_name: impl Into<String>,
        referenced_table: impl Into<String>,
        referenced_column: impl Into<String>,
    ) -> Self {
        Self {
            column_name: column_name.into(),
            referenced_table: referenced_table.into(),
            referenced_column: referenced_column.into(),
        }
    }
}

/// A non-primary index with its ordered column list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexMetadata {
    pub index_name: String,
    /// Ordered by index key position.
    pub column_names: Vec<String>,
    pub is_unique: bool,
}

impl IndexMetadata {
    /// Create a new index entry.
    pub fn new(index_name: impl Into<String>, column_names: Vec<String>, is_unique: bool) -> Self {
        Self {
            index_name: index_name.into(),
            column_names,
            is_unique,
        }
    }
}

/// One table paired with its row count.
///
/// A row count of -1 is the sentinel for a table whose count query failed
/// (e.g. permission denied); the table is still listed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRowCount {
    pub table_name: String,
    pub row_count: i64,
}
