use std::{collections::HashMap, path::Path, sync::Arc};

use arrow::{array::RecordBatch, datatypes::Schema};
use datafusion::prelude::{DataFrame, SessionContext};
use deltalake::{operations::write::SchemaMode, protocol::SaveMode, DeltaOps, DeltaTable};
use uchelper_models::Column;

use crate::{error::FrameError, location::path_str, schema::schema_to_columns};

const DELTA_PROPERTY_PREFIX: &str = "delta.";

pub async fn open(path: &Path) -> Result<DeltaTable, FrameError> {
    Ok(deltalake::open_table(path_str(path)?).await?)
}

pub async fn scan(ctx: &SessionContext, path: &Path) -> Result<DataFrame, FrameError> {
    let table = open(path).await?;
    Ok(ctx.read_table(Arc::new(table))?)
}

/// A single Delta write. The table is created when `path` holds no Delta log yet.
pub struct DeltaWrite {
    pub save_mode: SaveMode,
    pub schema_mode: Option<SchemaMode>,
    pub partition_columns: Vec<String>,
    pub replace_where: Option<String>,
}

impl DeltaWrite {
    pub fn new(save_mode: SaveMode, partition_columns: Vec<String>) -> Self {
        Self {
            save_mode,
            schema_mode: None,
            partition_columns,
            replace_where: None,
        }
    }

    pub fn with_schema_mode(mut self, schema_mode: SchemaMode) -> Self {
        self.schema_mode = Some(schema_mode);
        self
    }

    pub fn with_replace_where(mut self, predicate: Option<String>) -> Self {
        self.replace_where = predicate;
        self
    }

    pub async fn execute(self, path: &Path, batch: RecordBatch) -> Result<DeltaTable, FrameError> {
        let mut builder = DeltaOps::try_from_uri(path_str(path)?)
            .await?
            .write(vec![batch])
            .with_save_mode(self.save_mode);
        if !self.partition_columns.is_empty() {
            builder = builder.with_partition_columns(self.partition_columns);
        }
        if let Some(schema_mode) = self.schema_mode {
            builder = builder.with_schema_mode(schema_mode);
        }
        if let Some(predicate) = self.replace_where {
            builder = builder.with_replace_where(predicate);
        }
        Ok(builder.await?)
    }
}

/// Columns of the current Delta schema, in log order, with partition indices from the log.
pub fn table_columns(table: &DeltaTable) -> Result<Vec<Column>, FrameError> {
    let schema = Schema::try_from(table.get_schema()?)?;
    let partition_columns = &table.metadata()?.partition_columns;

    let mut columns = schema_to_columns(&schema)?;
    for column in columns.iter_mut() {
        column.partition_index = partition_columns
            .iter()
            .position(|p| p == &column.name)
            .map(|i| i as i32);
    }
    Ok(columns)
}

/// Configuration entries of the Delta log whose keys start with `delta.`.
pub fn properties(table: &DeltaTable) -> Result<HashMap<String, String>, FrameError> {
    Ok(table
        .metadata()?
        .configuration
        .iter()
        .filter(|(key, _)| key.starts_with(DELTA_PROPERTY_PREFIX))
        .filter_map(|(key, value)| value.as_ref().map(|v| (key.clone(), v.clone())))
        .collect())
}
