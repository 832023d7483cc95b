use arrow::array::RecordBatch;
use deltalake::{operations::write::SchemaMode, protocol::SaveMode};
use uchelper_models::{Column, FileType, SchemaEvolution, Table, WriteMode};

use crate::{
    error::FrameError,
    formats::{avro, csv, delta, parquet},
    location::table_path,
    schema::{ensure_schema_matches, keep_partition_indices, schema_to_columns, schemas_match},
};

const APPEND_UNSUPPORTED: &str =
    "Write mode APPEND is only supported for DELTA and partitioned PARQUET.";
const MERGE_UNSUPPORTED: &str = "Schema evolution MERGE is only supported for DELTA.";
const OVERWRITE_UNSUPPORTED: &str =
    "Schema evolution OVERWRITE is only supported when write mode is also OVERWRITE.";

/// Comparison operators accepted in a [`PartitionFilter`].
const FILTER_OPERATORS: [&str; 6] = ["=", "!=", "<", "<=", ">", ">="];

#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    String(String),
    Int(i64),
    Float(f64),
    Boolean(bool),
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::String(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::String(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Int(value)
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        FilterValue::Float(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Boolean(value)
    }
}

impl std::fmt::Display for FilterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterValue::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            FilterValue::Int(i) => write!(f, "{i}"),
            FilterValue::Float(v) => write!(f, "{v}"),
            FilterValue::Boolean(b) => write!(f, "{b}"),
        }
    }
}

/// A `(column, operator, value)` condition selecting the partitions an overwrite replaces.
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionFilter {
    pub column: String,
    pub op: String,
    pub value: FilterValue,
}

impl PartitionFilter {
    pub fn new(column: impl Into<String>, op: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self {
            column: column.into(),
            op: op.into(),
            value: value.into(),
        }
    }

    fn to_predicate(&self) -> Result<String, FrameError> {
        if !FILTER_OPERATORS.contains(&self.op.as_str()) {
            return Err(FrameError::InvalidArgument(format!(
                "Unsupported partition filter operator {}, expected one of {}",
                self.op,
                FILTER_OPERATORS.join(" ")
            )));
        }
        Ok(format!("\"{}\" {} {}", self.column, self.op, self.value))
    }
}

/// Options only understood by DELTA writes.
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    pub replace_where: Option<String>,
    pub partition_filters: Vec<PartitionFilter>,
}

impl WriteOptions {
    pub fn replace_where(mut self, predicate: impl Into<String>) -> Self {
        self.replace_where = Some(predicate.into());
        self
    }

    pub fn partition_filter(mut self, filter: PartitionFilter) -> Self {
        self.partition_filters.push(filter);
        self
    }

    fn is_empty(&self) -> bool {
        self.replace_where.is_none() && self.partition_filters.is_empty()
    }

    /// Conjunction of `replace_where` and all partition filters.
    pub fn predicate(&self) -> Result<Option<String>, FrameError> {
        let mut parts = self
            .partition_filters
            .iter()
            .map(PartitionFilter::to_predicate)
            .collect::<Result<Vec<_>, _>>()?;
        if let Some(predicate) = &self.replace_where {
            parts.insert(0, format!("({predicate})"));
        }
        Ok((!parts.is_empty()).then(|| parts.join(" AND ")))
    }
}

/// Writes `batch` to the location of `table`.
///
/// Returns the columns to store in Unity Catalog when the write changed the
/// table's schema, `None` when the stored schema is still correct.
pub async fn write_table(
    table: &Table,
    batch: RecordBatch,
    mode: WriteMode,
    evolution: SchemaEvolution,
    options: &WriteOptions,
) -> Result<Option<Vec<Column>>, FrameError> {
    let path = table_path(table)?;
    if table.file_type != FileType::Delta && !options.is_empty() {
        return Err(FrameError::unsupported(
            "replace_where and partition_filters are only supported for DELTA.",
        ));
    }
    if mode != WriteMode::Overwrite && !options.is_empty() {
        return Err(FrameError::unsupported(
            "replace_where and partition_filters are only supported with write mode OVERWRITE.",
        ));
    }
    let partition_cols: Vec<String> = table
        .partition_columns()
        .iter()
        .map(|c| c.name.clone())
        .collect();
    tracing::debug!(
        "Writing {} rows to {} table at {} ({}, {})",
        batch.num_rows(),
        table.file_type,
        path.display(),
        mode,
        evolution
    );

    match (table.file_type, mode, evolution) {
        (FileType::Delta, _, SchemaEvolution::Strict) => {
            ensure_schema_matches(&batch.schema(), &table.columns)?;
            delta::DeltaWrite::new(save_mode(mode), partition_cols)
                .with_replace_where(options.predicate()?)
                .execute(&path, batch)
                .await?;
            Ok(None)
        }
        (FileType::Delta, WriteMode::Overwrite, _) => {
            let written = delta::DeltaWrite::new(SaveMode::Overwrite, partition_cols)
                .with_schema_mode(SchemaMode::Overwrite)
                .with_replace_where(options.predicate()?)
                .execute(&path, batch)
                .await?;
            Ok(changed_columns(table, delta::table_columns(&written)?))
        }
        (FileType::Delta, WriteMode::Append, SchemaEvolution::Merge) => {
            let written = delta::DeltaWrite::new(SaveMode::Append, partition_cols)
                .with_schema_mode(SchemaMode::Merge)
                .execute(&path, batch)
                .await?;
            Ok(changed_columns(table, delta::table_columns(&written)?))
        }
        (FileType::Delta, WriteMode::Append, SchemaEvolution::Overwrite) => {
            Err(FrameError::unsupported(OVERWRITE_UNSUPPORTED))
        }
        (FileType::Parquet, WriteMode::Append, SchemaEvolution::Strict)
            if !partition_cols.is_empty() =>
        {
            ensure_schema_matches(&batch.schema(), &table.columns)?;
            parquet::write_partitioned(&path, batch, &partition_cols, false).await?;
            Ok(None)
        }
        (FileType::Parquet, WriteMode::Overwrite, _) => {
            if evolution == SchemaEvolution::Strict {
                ensure_schema_matches(&batch.schema(), &table.columns)?;
            }
            let columns = keep_partition_indices(schema_to_columns(&batch.schema())?, &table.columns);
            if partition_cols.is_empty() {
                parquet::write_file(&path, &batch)?;
            } else {
                parquet::write_partitioned(&path, batch, &partition_cols, true).await?;
            }
            Ok(changed_columns(table, columns))
        }
        (FileType::Csv, WriteMode::Overwrite, SchemaEvolution::Strict | SchemaEvolution::Overwrite) => {
            if evolution == SchemaEvolution::Strict {
                ensure_schema_matches(&batch.schema(), &table.columns)?;
            }
            let columns = schema_to_columns(&batch.schema())?;
            csv::write(&path, batch).await?;
            Ok(changed_columns(table, columns))
        }
        (FileType::Avro, WriteMode::Overwrite, SchemaEvolution::Strict | SchemaEvolution::Overwrite) => {
            if evolution == SchemaEvolution::Strict {
                ensure_schema_matches(&batch.schema(), &table.columns)?;
            }
            let columns = schema_to_columns(&batch.schema())?;
            avro::write(&path, &batch)?;
            Ok(changed_columns(table, columns))
        }
        (_, WriteMode::Append, _) => Err(FrameError::unsupported(APPEND_UNSUPPORTED)),
        (_, _, SchemaEvolution::Merge) => Err(FrameError::unsupported(MERGE_UNSUPPORTED)),
        (_, _, SchemaEvolution::Overwrite) => Err(FrameError::unsupported(OVERWRITE_UNSUPPORTED)),
        (file_type, mode, evolution) => Err(FrameError::unsupported(format!(
            "Unsupported parameters: {file_type}, {mode}, {evolution}"
        ))),
    }
}

fn save_mode(mode: WriteMode) -> SaveMode {
    match mode {
        WriteMode::Append => SaveMode::Append,
        WriteMode::Overwrite => SaveMode::Overwrite,
    }
}

// Comments of surviving columns are kept.
fn changed_columns(table: &Table, mut columns: Vec<Column>) -> Option<Vec<Column>> {
    if schemas_match(&columns, &table.columns) {
        return None;
    }
    for column in columns.iter_mut() {
        column.comment = table.column(&column.name).and_then(|c| c.comment.clone());
    }
    Some(columns)
}
