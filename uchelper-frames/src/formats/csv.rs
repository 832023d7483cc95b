use std::path::Path;

use arrow::array::RecordBatch;
use datafusion::{
    config::CsvOptions,
    dataframe::DataFrameWriteOptions,
    prelude::{CsvReadOptions, DataFrame, SessionContext},
};
use uchelper_models::Column;

use crate::{
    error::FrameError,
    location::{dotted_extension, path_str},
    schema::columns_to_schema,
};

const CSV_EXTENSION: &str = ".csv";

/// Scans a CSV file with the stored columns as schema, inferring it when none are stored.
pub async fn scan(
    ctx: &SessionContext,
    path: &Path,
    columns: &[Column],
) -> Result<DataFrame, FrameError> {
    let extension = dotted_extension(path, CSV_EXTENSION);
    let schema = if columns.is_empty() {
        None
    } else {
        Some(columns_to_schema(columns)?)
    };

    let mut options = CsvReadOptions::new()
        .has_header(true)
        .file_extension(&extension);
    if let Some(schema) = &schema {
        options = options.schema(schema);
    }
    Ok(ctx.read_csv(path_str(path)?, options).await?)
}

pub async fn write(path: &Path, batch: RecordBatch) -> Result<(), FrameError> {
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    let ctx = SessionContext::new();
    ctx.read_batch(batch)?
        .write_csv(
            path_str(path)?,
            DataFrameWriteOptions::new().with_single_file_output(true),
            Some(CsvOptions::default().with_has_header(true)),
        )
        .await?;
    Ok(())
}
