//! Client library for Unity Catalog: metadata over REST, table data through
//! DataFusion and Delta Lake, and read-only SQL across catalogs.

pub mod client;
pub mod error;

pub use client::{CreateTableOptions, UcClient};
pub use error::{Error, Result};

pub use uchelper_frames::{
    DeltaTable, FilterValue, MergeBuilder, MergeOptions, PartitionFilter, WriteOptions,
};
pub use uchelper_logger::init as init_logging;
pub use uchelper_models::{
    Catalog, Column, DataType, FileType, FullName, Schema, SchemaEvolution, SchemaName, Table,
    TableType, WriteMode,
};
pub use uchelper_rest::{TableUpdate, UnityCatalogApi};
