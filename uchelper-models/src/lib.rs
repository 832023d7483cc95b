//! Typed records for the Unity Catalog metadata service.

pub mod catalog;
pub mod column;
pub mod data_type;
pub mod error;
pub mod modes;
pub mod name;
pub mod schema;
pub mod table;

mod serde_util;

pub use catalog::Catalog;
pub use column::Column;
pub use data_type::DataType;
pub use error::ModelError;
pub use modes::{SchemaEvolution, WriteMode};
pub use name::{FullName, SchemaName};
pub use schema::Schema;
pub use table::{FileType, Table, TableType, DEFAULT_MERGE_COLUMNS_PROPERTY};
