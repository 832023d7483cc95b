//! Conversions between Arrow schemas and Unity Catalog columns.

use arrow::datatypes::{DataType as ArrowDataType, Field, Schema, TimeUnit};
use uchelper_models::{Column, DataType};

use crate::error::FrameError;

pub const UTC: &str = "UTC";

/// Maps an Arrow type onto a UC type, with precision and scale for decimals.
pub fn arrow_type_to_uc_type(data_type: &ArrowDataType) -> Result<(DataType, i32, i32), FrameError> {
    let uc_type = match data_type {
        ArrowDataType::Decimal128(precision, scale) | ArrowDataType::Decimal256(precision, scale) => {
            return Ok((DataType::Decimal, *precision as i32, *scale as i32))
        }
        ArrowDataType::Float32 => DataType::Float,
        ArrowDataType::Float64 => DataType::Double,
        ArrowDataType::Int8 => DataType::Byte,
        ArrowDataType::Int16 => DataType::Short,
        ArrowDataType::Int32 => DataType::Int,
        ArrowDataType::Int64 => DataType::Long,
        ArrowDataType::Date32 | ArrowDataType::Date64 => DataType::Date,
        ArrowDataType::Timestamp(_, Some(_)) => DataType::Timestamp,
        ArrowDataType::Timestamp(_, None) => DataType::TimestampNtz,
        ArrowDataType::List(_)
        | ArrowDataType::LargeList(_)
        | ArrowDataType::FixedSizeList(_, _) => DataType::Array,
        ArrowDataType::Struct(_) => DataType::Struct,
        ArrowDataType::Map(_, _) => DataType::Map,
        ArrowDataType::Utf8 | ArrowDataType::LargeUtf8 | ArrowDataType::Utf8View => DataType::String,
        ArrowDataType::Binary
        | ArrowDataType::LargeBinary
        | ArrowDataType::BinaryView
        | ArrowDataType::FixedSizeBinary(_) => DataType::Binary,
        ArrowDataType::Boolean => DataType::Boolean,
        ArrowDataType::Null => DataType::Null,
        // Hive partition values may come back dictionary encoded.
        ArrowDataType::Dictionary(_, value_type) => return arrow_type_to_uc_type(value_type),
        other => return Err(FrameError::UnsupportedType(other.to_string())),
    };
    Ok((uc_type, 0, 0))
}

/// Maps a UC column onto the Arrow type used when reading it.
pub fn uc_type_to_arrow_type(column: &Column) -> Result<ArrowDataType, FrameError> {
    let data_type = match column.data_type {
        DataType::Boolean => ArrowDataType::Boolean,
        DataType::Byte => ArrowDataType::Int8,
        DataType::Short => ArrowDataType::Int16,
        DataType::Int => ArrowDataType::Int32,
        DataType::Long => ArrowDataType::Int64,
        DataType::Float => ArrowDataType::Float32,
        DataType::Double => ArrowDataType::Float64,
        DataType::Date => ArrowDataType::Date32,
        DataType::Timestamp => ArrowDataType::Timestamp(TimeUnit::Microsecond, Some(UTC.into())),
        DataType::TimestampNtz => ArrowDataType::Timestamp(TimeUnit::Microsecond, None),
        DataType::String | DataType::Char => ArrowDataType::Utf8,
        DataType::Binary => ArrowDataType::Binary,
        DataType::Decimal => ArrowDataType::Decimal128(
            u8::try_from(column.type_precision).map_err(|_| {
                FrameError::UnsupportedType(format!("decimal precision {}", column.type_precision))
            })?,
            i8::try_from(column.type_scale).map_err(|_| {
                FrameError::UnsupportedType(format!("decimal scale {}", column.type_scale))
            })?,
        ),
        DataType::Null => ArrowDataType::Null,
        other => return Err(FrameError::UnsupportedType(other.to_string())),
    };
    Ok(data_type)
}

/// Derives UC columns from an Arrow schema. Every column is nullable.
pub fn schema_to_columns(schema: &Schema) -> Result<Vec<Column>, FrameError> {
    schema
        .fields()
        .iter()
        .enumerate()
        .map(|(position, field)| {
            let (data_type, precision, scale) = arrow_type_to_uc_type(field.data_type())?;
            Ok(Column::new(field.name(), data_type, position as i32, true)
                .with_precision(precision, scale))
        })
        .collect()
}

/// Builds the Arrow schema of a table from its UC columns, ordered by position.
pub fn columns_to_schema(columns: &[Column]) -> Result<Schema, FrameError> {
    let mut columns: Vec<&Column> = columns.iter().collect();
    columns.sort_by_key(|c| c.position);

    let fields = columns
        .into_iter()
        .map(|c| Ok(Field::new(&c.name, uc_type_to_arrow_type(c)?, true)))
        .collect::<Result<Vec<_>, FrameError>>()?;
    Ok(Schema::new(fields))
}

/// Compares two column lists by position: names, types and decimal precision/scale.
pub fn schemas_match(left: &[Column], right: &[Column]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    let mut left: Vec<&Column> = left.iter().collect();
    let mut right: Vec<&Column> = right.iter().collect();
    left.sort_by_key(|c| c.position);
    right.sort_by_key(|c| c.position);

    left.iter().zip(right.iter()).all(|(l, r)| {
        l.name == r.name
            && l.data_type == r.data_type
            && (l.data_type != DataType::Decimal
                || (l.type_precision == r.type_precision && l.type_scale == r.type_scale))
    })
}

pub fn ensure_schema_matches(schema: &Schema, columns: &[Column]) -> Result<(), FrameError> {
    let frame_columns = schema_to_columns(schema)?;
    if schemas_match(&frame_columns, columns) {
        return Ok(());
    }
    Err(FrameError::SchemaMismatch(format!(
        "{} VS {}",
        describe(&frame_columns),
        describe(columns)
    )))
}

/// Carries the partition indices of `previous` over to same-named columns of `columns`.
pub fn keep_partition_indices(mut columns: Vec<Column>, previous: &[Column]) -> Vec<Column> {
    for column in columns.iter_mut() {
        column.partition_index = previous
            .iter()
            .find(|p| p.name == column.name)
            .and_then(|p| p.partition_index);
    }
    columns
}

fn describe(columns: &[Column]) -> String {
    let parts: Vec<String> = columns
        .iter()
        .map(|c| format!("{}: {}", c.name, c.type_text()))
        .collect();
    format!("[{}]", parts.join(", "))
}
