//! Database access layer.
//!
//! Connection-string resolution, per-request pool lifecycle, query execution
//! with SSL fallback, and catalog introspection. PostgreSQL is the validated
//! execution path; other engines are parsed and typed but rejected at
//! execution time.

pub mod executor;
pub mod introspect;
pub mod pool;
pub mod resolver;
pub mod types;

pub use executor::QueryExecutor;
pub use introspect::SchemaIntrospector;
pub use resolver::{
    determine_tls_requirement, parse_connection_string, profile_from_fields, profile_from_record,
    ParsedConnectionString, UrlEngine,
};
