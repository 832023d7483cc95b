use std::{collections::HashMap, str::FromStr};

use chrono::{DateTime, Utc};

use crate::{
    column::{partition_columns, Column},
    error::ModelError,
    name::{validate_identifier, FullName},
    serde_util::null_as_default,
};

/// Property key under which the default merge columns are stored in the service.
pub const DEFAULT_MERGE_COLUMNS_PROPERTY: &str = "uchelper.default_merge_columns";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TableType {
    Managed,
    External,
}

/// Storage format of a table. Corresponding Unity Catalog model: `DataSourceFormat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FileType {
    Delta,
    Csv,
    Json,
    Avro,
    Parquet,
    Orc,
    Text,
}

impl FromStr for TableType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "managed" => Ok(TableType::Managed),
            "external" => Ok(TableType::External),
            _ => Err(ModelError::InvalidLiteral {
                kind: "TableType",
                literal: s.to_string(),
            }),
        }
    }
}

impl FromStr for FileType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "delta" => Ok(FileType::Delta),
            "csv" => Ok(FileType::Csv),
            "json" => Ok(FileType::Json),
            "avro" => Ok(FileType::Avro),
            "parquet" => Ok(FileType::Parquet),
            "orc" => Ok(FileType::Orc),
            "text" => Ok(FileType::Text),
            _ => Err(ModelError::InvalidLiteral {
                kind: "FileType",
                literal: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for TableType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableType::Managed => f.write_str("MANAGED"),
            TableType::External => f.write_str("EXTERNAL"),
        }
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FileType::Delta => "DELTA",
            FileType::Csv => "CSV",
            FileType::Json => "JSON",
            FileType::Avro => "AVRO",
            FileType::Parquet => "PARQUET",
            FileType::Orc => "ORC",
            FileType::Text => "TEXT",
        };
        f.write_str(s)
    }
}

/// A table in Unity Catalog.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "TableWire", into = "TableWire")]
pub struct Table {
    pub name: String,
    pub catalog_name: String,
    pub schema_name: String,
    pub table_type: TableType,
    pub file_type: FileType,
    pub columns: Vec<Column>,
    pub storage_location: Option<String>,
    pub comment: Option<String>,
    /// User properties. Never contains [`DEFAULT_MERGE_COLUMNS_PROPERTY`].
    pub properties: HashMap<String, String>,
    pub default_merge_columns: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub table_id: Option<uuid::Uuid>,
}

impl Table {
    pub fn new(
        name: &FullName,
        table_type: TableType,
        file_type: FileType,
        columns: Vec<Column>,
    ) -> Self {
        Self {
            name: name.table.clone(),
            catalog_name: name.catalog.clone(),
            schema_name: name.schema.clone(),
            table_type,
            file_type,
            columns,
            storage_location: None,
            comment: None,
            properties: HashMap::new(),
            default_merge_columns: Vec::new(),
            created_at: None,
            updated_at: None,
            table_id: None,
        }
    }

    pub fn with_storage_location(mut self, location: impl Into<String>) -> Self {
        self.storage_location = Some(location.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_properties(mut self, properties: HashMap<String, String>) -> Self {
        self.properties = properties;
        self
    }

    pub fn full_name(&self) -> Result<FullName, ModelError> {
        FullName::new(&self.catalog_name, &self.schema_name, &self.name)
    }

    pub fn validate_name(&self) -> Result<(), ModelError> {
        validate_identifier("catalog", &self.catalog_name)?;
        validate_identifier("schema", &self.schema_name)?;
        validate_identifier("table", &self.name)
    }

    pub fn partition_columns(&self) -> Vec<&Column> {
        partition_columns(&self.columns)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Properties as stored in the service, including the merge columns entry.
    pub fn service_properties(&self) -> HashMap<String, String> {
        let mut properties = self.properties.clone();
        properties.remove(DEFAULT_MERGE_COLUMNS_PROPERTY);
        if !self.default_merge_columns.is_empty() {
            properties.insert(
                DEFAULT_MERGE_COLUMNS_PROPERTY.to_string(),
                serde_json::Value::from(self.default_merge_columns.clone()).to_string(),
            );
        }
        properties
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
struct TableWire {
    name: String,
    catalog_name: String,
    schema_name: String,
    table_type: TableType,
    data_source_format: FileType,
    #[serde(default, deserialize_with = "null_as_default")]
    columns: Vec<Column>,
    #[serde(default)]
    storage_location: Option<String>,
    #[serde(default)]
    comment: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    properties: HashMap<String, String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    table_id: Option<uuid::Uuid>,
}

impl TryFrom<TableWire> for Table {
    type Error = ModelError;

    fn try_from(mut wire: TableWire) -> Result<Self, Self::Error> {
        let default_merge_columns = match wire.properties.remove(DEFAULT_MERGE_COLUMNS_PROPERTY) {
            Some(raw) => serde_json::from_str(&raw).map_err(|e| {
                ModelError::InvalidProperty(DEFAULT_MERGE_COLUMNS_PROPERTY.to_string(), e)
            })?,
            None => Vec::new(),
        };

        Ok(Table {
            name: wire.name,
            catalog_name: wire.catalog_name,
            schema_name: wire.schema_name,
            table_type: wire.table_type,
            file_type: wire.data_source_format,
            columns: wire.columns,
            storage_location: wire.storage_location,
            comment: wire.comment,
            properties: wire.properties,
            default_merge_columns,
            created_at: wire.created_at,
            updated_at: wire.updated_at,
            table_id: wire.table_id,
        })
    }
}

impl From<Table> for TableWire {
    fn from(table: Table) -> Self {
        TableWire {
            properties: table.service_properties(),
            name: table.name,
            catalog_name: table.catalog_name,
            schema_name: table.schema_name,
            table_type: table.table_type,
            data_source_format: table.file_type,
            columns: table.columns,
            storage_location: table.storage_location,
            comment: table.comment,
            created_at: table.created_at,
            updated_at: table.updated_at,
            table_id: table.table_id,
        }
    }
}
