pub mod avro;
pub mod csv;
pub mod delta;
pub mod parquet;

use arrow::datatypes::Schema;
use datafusion::{
    logical_expr::{cast, ident},
    prelude::DataFrame,
};

use crate::error::FrameError;

/// Projects `df` onto `schema`: fields in schema order, each cast to its schema type.
pub(crate) fn select_as(df: DataFrame, schema: &Schema) -> Result<DataFrame, FrameError> {
    let exprs = schema
        .fields()
        .iter()
        .map(|field| cast(ident(field.name()), field.data_type().clone()).alias(field.name()))
        .collect::<Vec<_>>();
    Ok(df.select(exprs)?)
}
