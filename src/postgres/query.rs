use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;
use tokio_postgres::{Row, Statement};

use crate::error::SqlMiddlewareDbError;
use crate::results::ResultSet;
use crate::types::RowValues;

/// Build a result set using statement metadata for column names, so statements that
/// return no rows still report their columns.
///
/// # Errors
/// Returns errors from row value extraction.
pub fn build_result_set(
    stmt: &Statement,
    rows: &[Row],
) -> Result<ResultSet, SqlMiddlewareDbError> {
    let column_names: Vec<String> = stmt
        .columns()
        .iter()
        .map(|col| col.name().to_string())
        .collect();
    let column_count = column_names.len();

    let mut result_set = ResultSet::with_capacity(rows.len());
    result_set.set_column_names(Arc::new(column_names));

    for row in rows {
        let mut row_values = Vec::with_capacity(column_count);
        for idx in 0..column_count {
            row_values.push(postgres_extract_value(row, idx)?);
        }
        result_set.add_row_values(row_values);
    }

    Ok(result_set)
}

/// Extracts a `RowValues` from a `tokio_postgres` Row at the given index.
///
/// # Errors
/// Returns `SqlMiddlewareDbError` if the column cannot be retrieved.
pub fn postgres_extract_value(row: &Row, idx: usize) -> Result<RowValues, SqlMiddlewareDbError> {
    let type_name = row.columns()[idx].type_().name();

    let value = match type_name {
        "int2" => row
            .try_get::<_, Option<i16>>(idx)?
            .map_or(RowValues::Null, |v| RowValues::Int(i64::from(v))),
        "int4" => row
            .try_get::<_, Option<i32>>(idx)?
            .map_or(RowValues::Null, |v| RowValues::Int(i64::from(v))),
        "int8" => row
            .try_get::<_, Option<i64>>(idx)?
            .map_or(RowValues::Null, RowValues::Int),
        "float4" => row
            .try_get::<_, Option<f32>>(idx)?
            .map_or(RowValues::Null, |v| RowValues::Float(f64::from(v))),
        "float8" => row
            .try_get::<_, Option<f64>>(idx)?
            .map_or(RowValues::Null, RowValues::Float),
        "bool" => row
            .try_get::<_, Option<bool>>(idx)?
            .map_or(RowValues::Null, RowValues::Bool),
        "timestamp" => row
            .try_get::<_, Option<NaiveDateTime>>(idx)?
            .map_or(RowValues::Null, RowValues::Timestamp),
        "timestamptz" => row
            .try_get::<_, Option<DateTime<Utc>>>(idx)?
            .map_or(RowValues::Null, |v| RowValues::Timestamp(v.naive_utc())),
        "json" | "jsonb" => row
            .try_get::<_, Option<Value>>(idx)?
            .map_or(RowValues::Null, RowValues::JSON),
        "bytea" => row
            .try_get::<_, Option<Vec<u8>>>(idx)?
            .map_or(RowValues::Null, RowValues::Blob),
        // text, varchar, char, name and anything else readable as a string
        _ => row
            .try_get::<_, Option<String>>(idx)?
            .map_or(RowValues::Null, RowValues::Text),
    };
    Ok(value)
}
