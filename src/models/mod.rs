//! Data models for the askdb pipeline.

pub mod connection;
pub mod query;
pub mod schema;

pub use connection::{AccessMode, ConnectionProfile, ConnectionRecord, ConnectionStatus, EngineKind};
pub use query::{QueryResult, ValidationResult};
pub use schema::{
    ColumnMetadata, ForeignKeyMetadata, IndexMetadata, TableMetadata, TableRowCount,
};
