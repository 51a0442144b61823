//! Schema introspection.
//!
//! Queries the target database's catalog for tables, columns, keys, and
//! indexes in the public schema. Metadata is produced fresh on every call.
//! Per-table failures are isolated: a table whose metadata or row count
//! cannot be read is skipped (or given a -1 sentinel) and introspection
//! continues; only a connectivity failure fails the whole call.

use crate::db::pool;
use crate::error::AskDbResult;
use crate::models::{
    ColumnMetadata, ConnectionProfile, ForeignKeyMetadata, IndexMetadata, TableMetadata,
    TableRowCount,
};
use crate::store::ConnectionStore;
use sqlx::postgres::PgPool;
use sqlx::Row;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Row-count sentinel for tables whose count query failed.
pub const ROW_COUNT_UNAVAILABLE: i64 = -1;

// =============================================================================
// SQL Query Templates
// =============================================================================
//
// Catalog queries for the public schema. System tables (pg_* prefix) and
// migration bookkeeping tables are excluded from discovery.

mod queries {
    pub const LIST_TABLES: &str = r#"
        SELECT table_name
        FROM information_schema.tables
        WHERE table_schema = 'public'
        AND table_type = 'BASE TABLE'
        AND table_name NOT LIKE 'pg_%'
        AND table_name NOT IN ('_prisma_migrations', '_prisma_migrations_lock')
        ORDER BY table_name
        "#;

    pub const TABLE_COLUMNS: &str = r#"
        SELECT
            column_name,
            data_type,
            is_nullable,
            column_default,
            character_maximum_length
        FROM information_schema.columns
        WHERE table_schema = 'public' AND table_name = $1
        ORDER BY ordinal_position
        "#;

    pub const PRIMARY_KEYS: &str = r#"
        SELECT kcu.column_name
        FROM information_schema.table_constraints tc
        JOIN information_schema.key_column_usage kcu
            ON tc.constraint_name = kcu.constraint_name
            AND tc.table_schema = kcu.table_schema
        WHERE tc.constraint_type = 'PRIMARY KEY'
            AND tc.table_schema = 'public'
            AND tc.table_name = $1
        "#;

    pub const FOREIGN_KEYS: &str = r#"
        SELECT
            kcu.column_name,
            ccu.table_name AS referenced_table,
            ccu.column_name AS referenced_column
        FROM information_schema.table_constraints AS tc
        JOIN information_schema.key_column_usage AS kcu
            ON tc.constraint_name = kcu.constraint_name
        JOIN information_schema.constraint_column_usage AS ccu
            ON ccu.constraint_name = tc.constraint_name
        WHERE tc.constraint_type = 'FOREIGN KEY'
            AND tc.table_schema = 'public'
            AND tc.table_name = $1
        "#;

    /// Non-primary indexes with columns ordered by index key position.
    pub const INDEXES: &str = r#"
        SELECT
            i.relname AS index_name,
            array_agg(a.attname::text ORDER BY k.n) AS column_names,
            ix.indisunique AS is_unique
        FROM pg_index ix
        JOIN pg_class i ON i.oid = ix.indexrelid
        JOIN pg_class t ON t.oid = ix.indrelid
        JOIN pg_namespace n ON n.oid = t.relnamespace
        JOIN LATERAL unnest(ix.indkey) WITH ORDINALITY AS k(attnum, n) ON true
        JOIN pg_attribute a ON a.attrelid = t.oid AND a.attnum = k.attnum
        WHERE n.nspname = 'public'
            AND t.relname = $1
            AND NOT ix.indisprimary
        GROUP BY i.relname, ix.indisunique
        "#;
}

/// Schema inspector over per-request pools.
pub struct SchemaIntrospector {
    store: Arc<dyn ConnectionStore>,
    connect_timeout: Duration,
}

impl SchemaIntrospector {
    /// Create an introspector backed by a connection record store.
    pub fn new(store: Arc<dyn ConnectionStore>, connect_timeout: Duration) -> Self {
        Self {
            store,
            connect_timeout,
        }
    }

    /// Collect full metadata for every table in the connection's public schema.
    pub async fn get_database_metadata(
        &self,
        connection_id: &str,
    ) -> AskDbResult<Vec<TableMetadata>> {
        let record = self.store.get_connection(connection_id).await?;
        let profile = crate::db::resolver::profile_from_record(&record);
        self.metadata_for_profile(&profile).await
    }

    /// Collect metadata for a resolved profile.
    pub async fn metadata_for_profile(
        &self,
        profile: &ConnectionProfile,
    ) -> AskDbResult<Vec<TableMetadata>> {
        let pool = pool::open_pool(profile, profile.tls_required, self.connect_timeout).await?;
        let result = collect_metadata(&pool).await;
        pool::close_quietly(pool).await;
        result
    }

    /// List every table with its row count. A failing count yields the -1
    /// sentinel for that table instead of aborting the batch.
    pub async fn get_tables_with_row_counts(
        &self,
        connection_id: &str,
    ) -> AskDbResult<Vec<TableRowCount>> {
        let record = self.store.get_connection(connection_id).await?;
        let profile = crate::db::resolver::profile_from_record(&record);
        self.row_counts_for_profile(&profile).await
    }

    /// Row counts for a resolved profile.
    pub async fn row_counts_for_profile(
        &self,
        profile: &ConnectionProfile,
    ) -> AskDbResult<Vec<TableRowCount>> {
        let pool = pool::open_pool(profile, profile.tls_required, self.connect_timeout).await?;
        let result = collect_row_counts(&pool).await;
        pool::close_quietly(pool).await;
        result
    }

    /// Render every table's schema text joined with blank-line separators,
    /// in table order - the LLM context block.
    pub fn render_schema_context(&self, tables: &[TableMetadata]) -> String {
        tables
            .iter()
            .map(TableMetadata::schema_text)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Quote a PostgreSQL identifier, doubling embedded quote characters.
fn quote_identifier(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

async fn list_tables(pool: &PgPool) -> AskDbResult<Vec<String>> {
    let tables = sqlx::query_scalar::<_, String>(queries::LIST_TABLES)
        .fetch_all(pool)
        .await?;
    debug!(count = tables.len(), "Discovered tables");
    Ok(tables)
}

async fn collect_metadata(pool: &PgPool) -> AskDbResult<Vec<TableMetadata>> {
    pool::probe(pool).await?;

    let tables = list_tables(pool).await?;
    let mut metadata = Vec::with_capacity(tables.len());

    for table_name in tables {
        match table_metadata(pool, &table_name).await {
            Ok(table) => metadata.push(table),
            Err(e) => {
                warn!(
                    table = %table_name,
                    error = %e,
                    "Skipping table with unreadable metadata"
                );
            }
        }
    }

    Ok(metadata)
}

async fn table_metadata(pool: &PgPool, table_name: &str) -> AskDbResult<TableMetadata> {
    let columns = table_columns(pool, table_name).await?;
    let primary_keys = primary_keys(pool, table_name).await?;
    let foreign_keys = foreign_keys(pool, table_name).await?;
    let indexes = indexes(pool, table_name).await?;

    Ok(TableMetadata {
        table_name: table_name.to_string(),
        columns,
        primary_keys,
        foreign_keys,
        indexes,
    })
}

async fn table_columns(pool: &PgPool, table_name: &str) -> AskDbResult<Vec<ColumnMetadata>> {
    let rows = sqlx::query(queries::TABLE_COLUMNS)
        .bind(table_name)
        .fetch_all(pool)
        .await?;

    rows.iter()
        .map(|row| {
            Ok(ColumnMetadata {
                column_name: row.try_get("column_name")?,
                data_type: row.try_get("data_type")?,
                is_nullable: row.try_get::<String, _>("is_nullable")? == "YES",
                default_value: row.try_get("column_default")?,
                character_maximum_length: row.try_get("character_maximum_length")?,
            })
        })
        .collect()
}

async fn primary_keys(pool: &PgPool, table_name: &str) -> AskDbResult<Vec<String>> {
    let keys = sqlx::query_scalar::<_, String>(queries::PRIMARY_KEYS)
        .bind(table_name)
        .fetch_all(pool)
        .await?;
    Ok(keys)
}

async fn foreign_keys(pool: &PgPool, table_name: &str) -> AskDbResult<Vec<ForeignKeyMetadata>> {
    let rows = sqlx::query(queries::FOREIGN_KEYS)
        .bind(table_name)
        .fetch_all(pool)
        .await?;

    rows.iter()
        .map(|row| {
            Ok(ForeignKeyMetadata {
                column_name: row.try_get("column_name")?,
                referenced_table: row.try_get("referenced_table")?,
                referenced_column: row.try_get("referenced_column")?,
            })
        })
        .collect()
}

async fn indexes(pool: &PgPool, table_name: &str) -> AskDbResult<Vec<IndexMetadata>> {
    let rows = sqlx::query(queries::INDEXES)
        .bind(table_name)
        .fetch_all(pool)
        .await?;

    rows.iter()
        .map(|row| {
            Ok(IndexMetadata {
                index_name: row.try_get("index_name")?,
                column_names: row.try_get("column_names")?,
                is_unique: row.try_get("is_unique")?,
            })
        })
        .collect()
}

async fn collect_row_counts(pool: &PgPool) -> AskDbResult<Vec<TableRowCount>> {
    pool::probe(pool).await?;

    let tables = list_tables(pool).await?;
    let mut counts = Vec::with_capacity(tables.len());

    for table_name in tables {
        let count_sql = format!(
            "SELECT COUNT(*) AS count FROM {}",
            quote_identifier(&table_name)
        );
        let row_count = match sqlx::query_scalar::<_, i64>(&count_sql).fetch_one(pool).await {
            Ok(count) => count,
            Err(e) => {
                warn!(
                    table = %table_name,
                    error = %e,
                    "Row count failed, reporting sentinel"
                );
                ROW_COUNT_UNAVAILABLE
            }
        };
        counts.push(TableRowCount {
            table_name,
            row_count,
        });
    }

    Ok(counts)
}
