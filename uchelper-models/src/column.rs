use crate::data_type::DataType;

/// A column of a table in Unity Catalog.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(into = "ColumnWire")]
pub struct Column {
    pub name: String,
    #[serde(rename = "type_name")]
    pub data_type: DataType,
    #[serde(default)]
    pub type_precision: i32,
    #[serde(default)]
    pub type_scale: i32,
    #[serde(default)]
    pub type_interval_type: Option<String>,
    pub position: i32,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    #[serde(default)]
    pub partition_index: Option<i32>,
}

fn default_nullable() -> bool {
    true
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: DataType, position: i32, nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type,
            type_precision: 0,
            type_scale: 0,
            type_interval_type: None,
            position,
            comment: None,
            nullable,
            partition_index: None,
        }
    }

    pub fn with_partition_index(mut self, index: i32) -> Self {
        self.partition_index = Some(index);
        self
    }

    pub fn with_precision(mut self, precision: i32, scale: i32) -> Self {
        self.type_precision = precision;
        self.type_scale = scale;
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn type_text(&self) -> String {
        self.data_type.type_text(self.type_precision, self.type_scale)
    }

    pub fn type_json(&self) -> String {
        serde_json::json!({
            "name": self.name,
            "type": self.data_type.json_type(self.type_precision, self.type_scale),
            "nullable": self.nullable,
            "metadata": {},
        })
        .to_string()
    }

    pub fn is_partition(&self) -> bool {
        self.partition_index.is_some()
    }
}

/// Partition columns of `columns`, ordered by their partition index.
pub fn partition_columns(columns: &[Column]) -> Vec<&Column> {
    let mut partition_cols: Vec<&Column> = columns.iter().filter(|c| c.is_partition()).collect();
    partition_cols.sort_by_key(|c| c.partition_index);
    partition_cols
}

/// Wire representation, carrying the derived `type_text`/`type_json` fields.
#[derive(serde::Serialize)]
struct ColumnWire {
    name: String,
    type_name: DataType,
    type_text: String,
    type_json: String,
    type_precision: i32,
    type_scale: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    type_interval_type: Option<String>,
    position: i32,
    comment: Option<String>,
    nullable: bool,
    partition_index: Option<i32>,
}

impl From<Column> for ColumnWire {
    fn from(column: Column) -> Self {
        ColumnWire {
            type_text: column.type_text(),
            type_json: column.type_json(),
            name: column.name,
            type_name: column.data_type,
            type_precision: column.type_precision,
            type_scale: column.type_scale,
            type_interval_type: column.type_interval_type,
            position: column.position,
            comment: column.comment,
            nullable: column.nullable,
            partition_index: column.partition_index,
        }
    }
}
