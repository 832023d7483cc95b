use std::collections::HashMap;

use arrow::array::RecordBatch;
use datafusion::prelude::SessionContext;
use deltalake::{operations::merge::MergeBuilder, DeltaOps, DeltaTable};
use uchelper_models::{FileType, Table};

use crate::{error::FrameError, formats::delta, location::table_path, schema::ensure_schema_matches};

pub const DEFAULT_SOURCE_ALIAS: &str = "s";
pub const DEFAULT_TARGET_ALIAS: &str = "t";

#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Join condition between source and target. Defaults to the table's merge columns.
    pub condition: Option<String>,
    pub source_alias: String,
    pub target_alias: String,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            condition: None,
            source_alias: DEFAULT_SOURCE_ALIAS.to_string(),
            target_alias: DEFAULT_TARGET_ALIAS.to_string(),
        }
    }
}

impl MergeOptions {
    pub fn condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn aliases(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.source_alias = source.into();
        self.target_alias = target.into();
        self
    }
}

/// Prepares a merge of `batch` into the Delta table behind `table`.
///
/// The returned builder still needs its `when_*` clauses before it is awaited.
/// The frame must match the stored schema exactly.
pub async fn merge_table(
    table: &Table,
    batch: RecordBatch,
    options: &MergeOptions,
) -> Result<MergeBuilder, FrameError> {
    let delta_table = open_delta_table(table).await?;
    ensure_schema_matches(&batch.schema(), &table.columns)?;

    let condition = match &options.condition {
        Some(condition) => condition.clone(),
        None if !table.default_merge_columns.is_empty() => default_condition(
            &table.default_merge_columns,
            &options.source_alias,
            &options.target_alias,
        ),
        None => {
            return Err(FrameError::InvalidArgument(format!(
                "No merge condition given and table {} has no default merge columns",
                table.name
            )))
        }
    };
    tracing::debug!("Merging into {} on {}", table.name, condition);

    let source = SessionContext::new().read_batch(batch)?;
    Ok(DeltaOps(delta_table)
        .merge(source, condition)
        .with_source_alias(&options.source_alias)
        .with_target_alias(&options.target_alias))
}

pub fn default_condition(columns: &[String], source_alias: &str, target_alias: &str) -> String {
    columns
        .iter()
        .map(|c| format!("{target_alias}.{c} = {source_alias}.{c}"))
        .collect::<Vec<_>>()
        .join(" AND ")
}

pub async fn open_delta_table(table: &Table) -> Result<DeltaTable, FrameError> {
    if table.file_type != FileType::Delta {
        return Err(FrameError::unsupported(format!(
            "Table {} is {}, only DELTA tables can be opened as Delta tables.",
            table.name, table.file_type
        )));
    }
    delta::open(&table_path(table)?).await
}

/// `delta.*` configuration of the Delta log behind `table`.
pub async fn delta_properties(table: &Table) -> Result<HashMap<String, String>, FrameError> {
    delta::properties(&open_delta_table(table).await?)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::{
        array::{Int64Array, StringArray},
        datatypes::{DataType as ArrowDataType, Field, Schema},
    };
    use uchelper_models::{Column, DataType, FullName, SchemaEvolution, TableType, WriteMode};

    use super::*;
    use crate::{read::read_table, write::{write_table, WriteOptions}};

    fn batch(ids: Vec<i64>, values: Vec<&str>) -> RecordBatch {
        RecordBatch::try_new(
            Arc::new(Schema::new(vec![
                Field::new("id", ArrowDataType::Int64, true),
                Field::new("value", ArrowDataType::Utf8, true),
            ])),
            vec![
                Arc::new(Int64Array::from(ids)),
                Arc::new(StringArray::from(values)),
            ],
        )
        .unwrap()
    }

    fn delta_table(location: &str) -> Table {
        let name = FullName::new("unity", "default", "merged").unwrap();
        Table::new(
            &name,
            TableType::External,
            FileType::Delta,
            vec![
                Column::new("id", DataType::Long, 0, true),
                Column::new("value", DataType::String, 1, true),
            ],
        )
        .with_storage_location(format!("file://{location}"))
    }

    #[test]
    fn test_default_condition() {
        let cols = vec!["a".to_string(), "b".to_string()];
        assert_eq!(default_condition(&cols, "s", "t"), "t.a = s.a AND t.b = s.b");
    }

    #[tokio::test]
    async fn test_merge_requires_condition() {
        let dir = tempfile::tempdir().unwrap();
        let table = delta_table(dir.path().to_str().unwrap());
        write_table(&table, batch(vec![1], vec!["a"]), WriteMode::Overwrite, SchemaEvolution::Strict, &WriteOptions::default())
            .await
            .unwrap();

        let err = merge_table(&table, batch(vec![1], vec!["b"]), &MergeOptions::default())
            .await
            .err().unwrap();
        assert!(matches!(err, FrameError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_merge_rejects_other_formats() {
        let mut table = delta_table("/tmp/not-used.csv");
        table.file_type = FileType::Csv;
        let err = merge_table(&table, batch(vec![1], vec!["a"]), &MergeOptions::default())
            .await
            .err().unwrap();
        assert!(matches!(err, FrameError::UnsupportedOperation(_)));
    }

    #[tokio::test]
    async fn test_merge_with_default_columns_upserts() {
        let dir = tempfile::tempdir().unwrap();
        let mut table = delta_table(dir.path().to_str().unwrap());
        table.default_merge_columns = vec!["id".to_string()];
        write_table(
            &table,
            batch(vec![1, 2], vec!["a", "b"]),
            WriteMode::Overwrite,
            SchemaEvolution::Strict,
            &WriteOptions::default(),
        )
        .await
        .unwrap();

        let (_, metrics) = merge_table(&table, batch(vec![2, 3], vec!["B", "c"]), &MergeOptions::default())
            .await
            .unwrap()
            .when_matched_update(|update| update.update("value", "s.value"))
            .unwrap()
            .when_not_matched_insert(|insert| insert.set("id", "s.id").set("value", "s.value"))
            .unwrap()
            .await
            .unwrap();
        assert_eq!(metrics.num_target_rows_updated, 1);
        assert_eq!(metrics.num_target_rows_inserted, 1);

        assert_eq!(read_table(&table).await.unwrap().num_rows(), 3);
    }

    #[tokio::test]
    async fn test_delta_properties_only_delta_keys() {
        let dir = tempfile::tempdir().unwrap();
        let table = delta_table(dir.path().to_str().unwrap());
        write_table(&table, batch(vec![1], vec!["a"]), WriteMode::Overwrite, SchemaEvolution::Strict, &WriteOptions::default())
            .await
            .unwrap();

        let properties = delta_properties(&table).await.unwrap();
        assert!(properties.keys().all(|k| k.starts_with("delta.")));
    }
}
