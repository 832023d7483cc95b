use std::sync::Arc;

use arrow::{
    array::{Int64Array, RecordBatch, StringArray},
    datatypes::{DataType as ArrowDataType, Field, Schema},
};
use uchelper_frames::{infer_columns, write_table, WriteOptions};
use uchelper_models::{
    Column, DataType, FileType, FullName, SchemaEvolution, Table, TableType, WriteMode,
};

fn batch() -> RecordBatch {
    RecordBatch::try_new(
        Arc::new(Schema::new(vec![
            Field::new("id", ArrowDataType::Utf8, true),
            Field::new("ints", ArrowDataType::Int64, true),
            Field::new("part1", ArrowDataType::Int64, true),
            Field::new("part2", ArrowDataType::Utf8, true),
        ])),
        vec![
            Arc::new(StringArray::from(vec!["a", "b", "c", "d"])),
            Arc::new(Int64Array::from(vec![10, 20, 30, 40])),
            Arc::new(Int64Array::from(vec![0, 1, 2, 0])),
            Arc::new(StringArray::from(vec!["x", "y", "x", "z"])),
        ],
    )
    .unwrap()
}

fn table(file_type: FileType, location: &str, columns: Vec<Column>) -> Table {
    let name = FullName::new("unity", "default", "registered").unwrap();
    Table::new(&name, TableType::External, file_type, columns)
        .with_storage_location(format!("file://{location}"))
}

#[tokio::test]
async fn infers_hive_partition_types() {
    let dir = tempfile::tempdir().unwrap();
    let location = dir.path().to_str().unwrap();
    let columns = vec![
        Column::new("id", DataType::String, 0, true),
        Column::new("ints", DataType::Long, 1, true),
        Column::new("part1", DataType::Long, 2, true).with_partition_index(0),
        Column::new("part2", DataType::String, 3, true).with_partition_index(1),
    ];
    write_table(
        &table(FileType::Parquet, location, columns),
        batch(),
        WriteMode::Overwrite,
        SchemaEvolution::Strict,
        &WriteOptions::default(),
    )
    .await
    .unwrap();

    let partition_cols = vec!["part1".to_string(), "part2".to_string()];
    let inferred = infer_columns(&table(FileType::Parquet, location, vec![]), &partition_cols)
        .await
        .unwrap();

    let part1 = inferred.iter().find(|c| c.name == "part1").unwrap();
    let part2 = inferred.iter().find(|c| c.name == "part2").unwrap();
    assert_eq!(part1.data_type, DataType::Long);
    assert_eq!(part1.partition_index, Some(0));
    assert_eq!(part2.data_type, DataType::String);
    assert_eq!(part2.partition_index, Some(1));
    assert_eq!(inferred.len(), 4);
}

#[tokio::test]
async fn infers_csv_columns() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("t.csv");
    let location = path.to_str().unwrap();
    write_table(
        &table(FileType::Csv, location, vec![]),
        batch(),
        WriteMode::Overwrite,
        SchemaEvolution::Overwrite,
        &WriteOptions::default(),
    )
    .await
    .unwrap();

    let inferred = infer_columns(&table(FileType::Csv, location, vec![]), &[])
        .await
        .unwrap();
    let names: Vec<&str> = inferred.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["id", "ints", "part1", "part2"]);
    assert_eq!(inferred[1].data_type, DataType::Long);
    assert!(inferred.iter().all(|c| c.partition_index.is_none()));
}

#[tokio::test]
async fn delta_keeps_logged_partitioning() {
    let dir = tempfile::tempdir().unwrap();
    let location = dir.path().to_str().unwrap();
    let columns = vec![
        Column::new("id", DataType::String, 0, true),
        Column::new("ints", DataType::Long, 1, true),
        Column::new("part1", DataType::Long, 2, true).with_partition_index(0),
        Column::new("part2", DataType::String, 3, true),
    ];
    write_table(
        &table(FileType::Delta, location, columns),
        batch(),
        WriteMode::Overwrite,
        SchemaEvolution::Strict,
        &WriteOptions::default(),
    )
    .await
    .unwrap();

    let inferred = infer_columns(&table(FileType::Delta, location, vec![]), &[])
        .await
        .unwrap();
    assert_eq!(inferred.len(), 4);
    assert_eq!(inferred[2].name, "part1");
    assert_eq!(inferred[2].partition_index, Some(0));
    assert_eq!(inferred[3].partition_index, None);
}
