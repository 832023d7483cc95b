use std::{collections::BTreeSet, fs::File, path::Path, sync::Arc};

use arrow::{
    array::{Array, AsArray, RecordBatch},
    compute::cast,
    datatypes::{DataType as ArrowDataType, Field, Schema},
};
use datafusion::{
    dataframe::DataFrameWriteOptions,
    parquet::arrow::ArrowWriter,
    prelude::{DataFrame, ParquetReadOptions, SessionContext},
};
use object_store::path::PathPart;

use crate::{
    error::FrameError,
    location::{dotted_extension, path_str},
};

const PARQUET_EXTENSION: &str = ".parquet";

/// Scans a single Parquet file, or a hive layout when `partition_cols` is not empty.
pub async fn scan(
    ctx: &SessionContext,
    path: &Path,
    partition_cols: Vec<(String, ArrowDataType)>,
) -> Result<DataFrame, FrameError> {
    let extension = dotted_extension(path, PARQUET_EXTENSION);
    let partitioned = !partition_cols.is_empty();
    let options = ParquetReadOptions {
        file_extension: &extension,
        table_partition_cols: partition_cols,
        ..Default::default()
    };

    if partitioned {
        let directory = format!("{}/", path_str(path)?.trim_end_matches('/'));
        Ok(ctx.read_parquet(directory, options).await?)
    } else {
        Ok(ctx.read_parquet(path_str(path)?, options).await?)
    }
}

/// Writes `batch` as the only content of the file at `path`.
pub fn write_file(path: &Path, batch: &RecordBatch) -> Result<(), FrameError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(batch)?;
    writer.close()?;
    Ok(())
}

/// Writes `batch` into the hive layout under `path` with new uniquely named files.
///
/// With `replace_partitions` the partitions present in `batch` are removed first,
/// leaving every other partition untouched.
pub async fn write_partitioned(
    path: &Path,
    batch: RecordBatch,
    partition_cols: &[String],
    replace_partitions: bool,
) -> Result<(), FrameError> {
    let batch = stringify_partitions(batch, partition_cols)?;

    if replace_partitions {
        for partition in partition_dirs(&batch, partition_cols)? {
            let partition_path = path.join(&partition);
            if partition_path.exists() {
                tracing::debug!("Replacing partition {}", partition_path.display());
                std::fs::remove_dir_all(&partition_path)?;
            }
        }
    }

    let directory = format!("{}/", path_str(path)?.trim_end_matches('/'));
    let ctx = SessionContext::new();
    ctx.read_batch(batch)?
        .write_parquet(
            &directory,
            DataFrameWriteOptions::new().with_partition_by(partition_cols.to_vec()),
            None,
        )
        .await?;
    Ok(())
}

// Hive directory names are the string form of the value.
fn stringify_partitions(batch: RecordBatch, partition_cols: &[String]) -> Result<RecordBatch, FrameError> {
    let schema = batch.schema();
    let mut fields = Vec::with_capacity(schema.fields().len());
    let mut columns = Vec::with_capacity(batch.num_columns());

    for (field, column) in schema.fields().iter().zip(batch.columns()) {
        if partition_cols.contains(field.name()) {
            if column.null_count() > 0 {
                return Err(FrameError::InvalidArgument(format!(
                    "Partition column {} contains null values",
                    field.name()
                )));
            }
            columns.push(cast(column, &ArrowDataType::Utf8)?);
            fields.push(Arc::new(Field::new(field.name(), ArrowDataType::Utf8, false)));
        } else {
            columns.push(column.clone());
            fields.push(field.clone());
        }
    }

    Ok(RecordBatch::try_new(
        Arc::new(Schema::new(fields)),
        columns,
    )?)
}

// Encoded the way the object store path of each written file encodes it.
fn partition_dir(name: &str, value: &str) -> String {
    PathPart::from(format!("{name}={value}")).as_ref().to_string()
}

fn partition_dirs(batch: &RecordBatch, partition_cols: &[String]) -> Result<BTreeSet<String>, FrameError> {
    let columns = partition_cols
        .iter()
        .map(|name| {
            batch
                .column_by_name(name)
                .map(|c| (name, c.as_string::<i32>()))
                .ok_or_else(|| {
                    FrameError::InvalidArgument(format!("Partition column {name} is missing from the data"))
                })
        })
        .collect::<Result<Vec<_>, FrameError>>()?;

    Ok((0..batch.num_rows())
        .map(|row| {
            columns
                .iter()
                .map(|(name, values)| partition_dir(name, values.value(row)))
                .collect::<Vec<_>>()
                .join("/")
        })
        .collect())
}
