//! Reading and writing table data, dispatched on the table's storage format.

pub mod error;
pub mod formats;
pub mod location;
pub mod merge;
pub mod read;
pub mod schema;
pub mod write;

pub use error::FrameError;
pub use merge::{delta_properties, merge_table, open_delta_table, MergeOptions};
pub use read::{assign_partitions, collect_batch, infer_columns, read_table, scan_table, table_provider};
pub use schema::{ensure_schema_matches, schema_to_columns, schemas_match};
pub use write::{write_table, FilterValue, PartitionFilter, WriteOptions};

pub use deltalake::{operations::merge::MergeBuilder, DeltaTable};
