use std::{fs::File, path::Path, sync::Arc};

use apache_avro::{types::Value, Schema as AvroSchema, Writer};
use arrow::{
    array::{Array, ArrayRef, AsArray, RecordBatch},
    compute::cast,
    datatypes::{
        DataType as ArrowDataType, Date32Type, Field, Float32Type, Float64Type, Int32Type,
        Int64Type, Schema, TimeUnit, TimestampMicrosecondType,
    },
};
use datafusion::prelude::{AvroReadOptions, DataFrame, SessionContext};
use serde_json::{json, Value as JsonValue};

use uchelper_models::Column;

use crate::{
    error::FrameError,
    formats::select_as,
    location::{dotted_extension, path_str},
    schema::{columns_to_schema, UTC},
};

const AVRO_EXTENSION: &str = ".avro";
const RECORD_NAME: &str = "topLevelRecord";

/// Scans an Avro file, cast to the stored columns when there are any.
///
/// Without stored columns `timestamp-micros` values are read as UTC instants.
pub async fn scan(
    ctx: &SessionContext,
    path: &Path,
    columns: &[Column],
) -> Result<DataFrame, FrameError> {
    let extension = dotted_extension(path, AVRO_EXTENSION);
    let options = AvroReadOptions {
        file_extension: &extension,
        ..Default::default()
    };
    let df = ctx.read_avro(path_str(path)?, options).await?;

    let schema = if columns.is_empty() {
        instant_schema(df.schema().inner())
    } else {
        columns_to_schema(columns)?
    };
    select_as(df, &schema)
}

fn instant_schema(schema: &Schema) -> Schema {
    let fields = schema
        .fields()
        .iter()
        .map(|field| match field.data_type() {
            ArrowDataType::Timestamp(unit, None) => Arc::new(Field::new(
                field.name(),
                ArrowDataType::Timestamp(*unit, Some(UTC.into())),
                field.is_nullable(),
            )),
            _ => field.clone(),
        })
        .collect::<Vec<_>>();
    Schema::new(fields)
}

/// Writes `batch` as a single Avro container file. Every field is a union with null.
pub fn write(path: &Path, batch: &RecordBatch) -> Result<(), FrameError> {
    let schema = avro_schema(&batch.schema())?;
    let columns = batch
        .columns()
        .iter()
        .map(normalize)
        .collect::<Result<Vec<_>, FrameError>>()?;
    let names: Vec<String> = batch
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = Writer::new(&schema, File::create(path)?);
    for row in 0..batch.num_rows() {
        let fields = names
            .iter()
            .zip(columns.iter())
            .map(|(name, column)| Ok((name.clone(), field_value(column, row)?)))
            .collect::<Result<Vec<_>, FrameError>>()?;
        writer.append(Value::Record(fields))?;
    }
    writer.flush()?;
    Ok(())
}

fn avro_schema(schema: &Schema) -> Result<AvroSchema, FrameError> {
    let fields = schema
        .fields()
        .iter()
        .map(|field| {
            let field_type = match field.data_type() {
                ArrowDataType::Null => json!("null"),
                other => json!(["null", avro_type(other)?]),
            };
            Ok(json!({"name": field.name(), "type": field_type}))
        })
        .collect::<Result<Vec<_>, FrameError>>()?;

    let record = json!({"type": "record", "name": RECORD_NAME, "fields": fields});
    Ok(AvroSchema::parse(&record)?)
}

fn avro_type(data_type: &ArrowDataType) -> Result<JsonValue, FrameError> {
    let avro = match data_type {
        ArrowDataType::Boolean => json!("boolean"),
        ArrowDataType::Int8 | ArrowDataType::Int16 | ArrowDataType::Int32 => json!("int"),
        ArrowDataType::Int64 => json!("long"),
        ArrowDataType::Float32 => json!("float"),
        ArrowDataType::Float64 => json!("double"),
        ArrowDataType::Utf8 | ArrowDataType::LargeUtf8 | ArrowDataType::Utf8View => json!("string"),
        ArrowDataType::Binary | ArrowDataType::LargeBinary | ArrowDataType::BinaryView => {
            json!("bytes")
        }
        ArrowDataType::Date32 | ArrowDataType::Date64 => json!({"type": "int", "logicalType": "date"}),
        // Naive timestamps are read back through the stored TIMESTAMP_NTZ column.
        ArrowDataType::Timestamp(_, _) => {
            json!({"type": "long", "logicalType": "timestamp-micros"})
        }
        other => {
            return Err(FrameError::UnsupportedType(format!(
                "{other} cannot be written to AVRO"
            )))
        }
    };
    Ok(avro)
}

// Casts every column to the single Arrow type read back per Avro type.
fn normalize(column: &ArrayRef) -> Result<ArrayRef, FrameError> {
    let target = match column.data_type() {
        ArrowDataType::Int8 | ArrowDataType::Int16 => ArrowDataType::Int32,
        ArrowDataType::LargeUtf8 | ArrowDataType::Utf8View => ArrowDataType::Utf8,
        ArrowDataType::LargeBinary | ArrowDataType::BinaryView => ArrowDataType::Binary,
        ArrowDataType::Date64 => ArrowDataType::Date32,
        ArrowDataType::Timestamp(unit, tz) if *unit != TimeUnit::Microsecond => {
            ArrowDataType::Timestamp(TimeUnit::Microsecond, tz.clone())
        }
        _ => return Ok(column.clone()),
    };
    Ok(cast(column, &target)?)
}

fn field_value(column: &ArrayRef, row: usize) -> Result<Value, FrameError> {
    if column.is_null(row) {
        return Ok(match column.data_type() {
            ArrowDataType::Null => Value::Null,
            _ => Value::Union(0, Box::new(Value::Null)),
        });
    }

    let value = match column.data_type() {
        ArrowDataType::Boolean => Value::Boolean(column.as_boolean().value(row)),
        ArrowDataType::Int32 => Value::Int(column.as_primitive::<Int32Type>().value(row)),
        ArrowDataType::Int64 => Value::Long(column.as_primitive::<Int64Type>().value(row)),
        ArrowDataType::Float32 => Value::Float(column.as_primitive::<Float32Type>().value(row)),
        ArrowDataType::Float64 => Value::Double(column.as_primitive::<Float64Type>().value(row)),
        ArrowDataType::Utf8 => Value::String(column.as_string::<i32>().value(row).to_string()),
        ArrowDataType::Binary => Value::Bytes(column.as_binary::<i32>().value(row).to_vec()),
        ArrowDataType::Date32 => Value::Date(column.as_primitive::<Date32Type>().value(row)),
        ArrowDataType::Timestamp(_, _) => {
            Value::TimestampMicros(column.as_primitive::<TimestampMicrosecondType>().value(row))
        }
        other => {
            return Err(FrameError::UnsupportedType(format!(
                "{other} cannot be written to AVRO"
            )))
        }
    };
    Ok(Value::Union(1, Box::new(value)))
}
