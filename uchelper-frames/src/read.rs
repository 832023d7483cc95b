use std::sync::Arc;

use arrow::{
    array::RecordBatch,
    compute::{cast_with_options, concat_batches, CastOptions},
    datatypes::DataType as ArrowDataType,
};
use datafusion::{
    catalog::TableProvider,
    prelude::{DataFrame, SessionContext},
};
use uchelper_models::{Column, DataType, FileType, Table};

use crate::{
    error::FrameError,
    formats::{avro, csv, delta, parquet, select_as},
    location::table_path,
    schema::{columns_to_schema, schema_to_columns, uc_type_to_arrow_type},
};

/// Lazily scans the data of `table` into a frame bound to `ctx`.
pub async fn scan_table(ctx: &SessionContext, table: &Table) -> Result<DataFrame, FrameError> {
    let path = table_path(table)?;
    tracing::debug!("Scanning {} table at {}", table.file_type, path.display());

    match table.file_type {
        FileType::Delta => delta::scan(ctx, &path).await,
        FileType::Parquet => {
            let partitions = partition_fields(table)?;
            if partitions.is_empty() {
                return parquet::scan(ctx, &path, partitions).await;
            }
            // Hive columns come last, the frame follows the stored column order.
            let df = parquet::scan(ctx, &path, partitions).await?;
            select_as(df, &columns_to_schema(&table.columns)?)
        }
        FileType::Csv => csv::scan(ctx, &path, &table.columns).await,
        FileType::Avro => avro::scan(ctx, &path, &table.columns).await,
        other => Err(FrameError::UnsupportedFormat(other)),
    }
}

/// Reads the full data of `table` into a single batch.
pub async fn read_table(table: &Table) -> Result<RecordBatch, FrameError> {
    let ctx = SessionContext::new();
    collect_batch(scan_table(&ctx, table).await?).await
}

/// Table provider over the data of `table`, used to expose it to SQL.
pub async fn table_provider(
    ctx: &SessionContext,
    table: &Table,
) -> Result<Arc<dyn TableProvider>, FrameError> {
    match table.file_type {
        FileType::Delta => Ok(Arc::new(delta::open(&table_path(table)?).await?)),
        _ => Ok(scan_table(ctx, table).await?.into_view()),
    }
}

pub async fn collect_batch(df: DataFrame) -> Result<RecordBatch, FrameError> {
    let schema = df.schema().inner().clone();
    let batches = df.collect().await?;
    Ok(concat_batches(&schema, &batches)?)
}

fn partition_fields(table: &Table) -> Result<Vec<(String, ArrowDataType)>, FrameError> {
    table
        .partition_columns()
        .into_iter()
        .map(|c| Ok((c.name.clone(), uc_type_to_arrow_type(c)?)))
        .collect()
}

/// Derives the columns of an unregistered table by reading its data.
///
/// Partition columns of a hive layout are read as strings and typed LONG when
/// every value parses as an integer, STRING otherwise. Delta tables without
/// explicit `partition_cols` keep the partitioning recorded in their log.
pub async fn infer_columns(
    table: &Table,
    partition_cols: &[String],
) -> Result<Vec<Column>, FrameError> {
    let columns = match table.file_type {
        FileType::Delta => {
            let delta_table = delta::open(&table_path(table)?).await?;
            let columns = delta::table_columns(&delta_table)?;
            if partition_cols.is_empty() {
                return Ok(columns);
            }
            columns
        }
        FileType::Parquet if !partition_cols.is_empty() => {
            infer_hive_columns(table, partition_cols).await?
        }
        _ => {
            let batch = read_table(table).await?;
            schema_to_columns(&batch.schema())?
        }
    };
    assign_partitions(columns, table.file_type, partition_cols)
}

async fn infer_hive_columns(
    table: &Table,
    partition_cols: &[String],
) -> Result<Vec<Column>, FrameError> {
    let ctx = SessionContext::new();
    let fields = partition_cols
        .iter()
        .map(|c| (c.clone(), ArrowDataType::Utf8))
        .collect();
    let df = parquet::scan(&ctx, &table_path(table)?, fields).await?;
    let batch = collect_batch(df).await?;

    let mut columns = schema_to_columns(&batch.schema())?;
    let strict = CastOptions {
        safe: false,
        ..Default::default()
    };
    for column in columns.iter_mut().filter(|c| partition_cols.contains(&c.name)) {
        if let Some(values) = batch.column_by_name(&column.name) {
            if cast_with_options(values, &ArrowDataType::Int64, &strict).is_ok() {
                column.data_type = DataType::Long;
            }
        }
    }
    Ok(columns)
}

/// Sets the partition index of every column named in `partition_cols`, in that order.
pub fn assign_partitions(
    mut columns: Vec<Column>,
    file_type: FileType,
    partition_cols: &[String],
) -> Result<Vec<Column>, FrameError> {
    if partition_cols.is_empty() {
        return Ok(columns);
    }
    if !matches!(file_type, FileType::Delta | FileType::Parquet) {
        return Err(FrameError::unsupported(
            "Partitioned tables only supported for DELTA and PARQUET.",
        ));
    }
    if let Some(missing) = partition_cols
        .iter()
        .find(|p| !columns.iter().any(|c| c.name == **p))
    {
        return Err(FrameError::InvalidArgument(format!(
            "Partition column {missing} does not exist in the data"
        )));
    }

    for column in columns.iter_mut() {
        column.partition_index = partition_cols
            .iter()
            .position(|p| p == &column.name)
            .map(|i| i as i32);
    }
    Ok(columns)
}
