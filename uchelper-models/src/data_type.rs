use std::fmt::Display;

/// Datatype of a column. Corresponding Unity Catalog model: `ColumnTypeName`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataType {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Date,
    Timestamp,
    TimestampNtz,
    String,
    Binary,
    Decimal,
    Interval,
    Array,
    Struct,
    Map,
    Char,
    Null,
    UserDefinedType,
    TableType,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Boolean => "BOOLEAN",
            DataType::Byte => "BYTE",
            DataType::Short => "SHORT",
            DataType::Int => "INT",
            DataType::Long => "LONG",
            DataType::Float => "FLOAT",
            DataType::Double => "DOUBLE",
            DataType::Date => "DATE",
            DataType::Timestamp => "TIMESTAMP",
            DataType::TimestampNtz => "TIMESTAMP_NTZ",
            DataType::String => "STRING",
            DataType::Binary => "BINARY",
            DataType::Decimal => "DECIMAL",
            DataType::Interval => "INTERVAL",
            DataType::Array => "ARRAY",
            DataType::Struct => "STRUCT",
            DataType::Map => "MAP",
            DataType::Char => "CHAR",
            DataType::Null => "NULL",
            DataType::UserDefinedType => "USER_DEFINED_TYPE",
            DataType::TableType => "TABLE_TYPE",
        }
    }

    /// SQL spelling used for the `type_text` column field.
    pub fn type_text(&self, precision: i32, scale: i32) -> String {
        match self {
            DataType::Long => "bigint".to_string(),
            DataType::Short => "smallint".to_string(),
            DataType::Byte => "tinyint".to_string(),
            DataType::Decimal => format!("decimal({precision},{scale})"),
            other => other.as_str().to_lowercase(),
        }
    }

    /// Delta/Spark schema spelling used inside the `type_json` column field.
    pub fn json_type(&self, precision: i32, scale: i32) -> String {
        match self {
            DataType::Int => "integer".to_string(),
            DataType::Decimal => format!("decimal({precision},{scale})"),
            other => other.as_str().to_lowercase(),
        }
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        assert_eq!(
            serde_json::to_string(&DataType::TimestampNtz).unwrap(),
            "\"TIMESTAMP_NTZ\""
        );
        assert_eq!(
            serde_json::from_str::<DataType>("\"USER_DEFINED_TYPE\"").unwrap(),
            DataType::UserDefinedType
        );
        assert_eq!(DataType::Long.to_string(), "LONG");
    }

    #[test]
    fn test_type_text() {
        assert_eq!(DataType::Long.type_text(0, 0), "bigint");
        assert_eq!(DataType::Short.type_text(0, 0), "smallint");
        assert_eq!(DataType::Byte.type_text(0, 0), "tinyint");
        assert_eq!(DataType::Int.type_text(0, 0), "int");
        assert_eq!(DataType::Decimal.type_text(10, 2), "decimal(10,2)");
    }

    #[test]
    fn test_json_type() {
        assert_eq!(DataType::Int.json_type(0, 0), "integer");
        assert_eq!(DataType::Long.json_type(0, 0), "long");
        assert_eq!(DataType::String.json_type(0, 0), "string");
    }
}
