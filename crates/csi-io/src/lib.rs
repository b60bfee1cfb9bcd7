//! Loading and first-look inspection of the CSI application table.

pub mod reader;
pub mod schema;

pub use reader::{read_frame, TableFormat};
pub use schema::{describe_schema, require_columns, ColumnInfo, SchemaSummary};
