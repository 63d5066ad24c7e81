use std::error::Error;

use chrono::{TimeZone, Utc};
use tokio_postgres::types::{IsNull, ToSql, Type, WrongType, to_sql_checked};
use tokio_util::bytes;

use crate::types::RowValues;

/// Borrowed Postgres parameters built from a slice of `RowValues`.
pub struct Params<'a> {
    references: Vec<&'a (dyn ToSql + Sync)>,
}

impl<'a> Params<'a> {
    #[must_use]
    pub fn convert(params: &'a [RowValues]) -> Params<'a> {
        let mut references = Vec::with_capacity(params.len());
        for p in params {
            references.push(p as &(dyn ToSql + Sync));
        }
        Params { references }
    }

    /// Get a reference to the underlying parameter array
    #[must_use]
    pub fn as_refs(&self) -> &[&(dyn ToSql + Sync)] {
        &self.references
    }
}

/// Write `value` only if its Rust type accepts the parameter's column type.
fn write_checked<T: ToSql>(
    value: &T,
    ty: &Type,
    out: &mut bytes::BytesMut,
) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
    if T::accepts(ty) {
        value.to_sql(ty, out)
    } else {
        Err(Box::new(WrongType::new::<T>(ty.clone())))
    }
}

impl ToSql for RowValues {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut bytes::BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            RowValues::Int(i) => match *ty {
                Type::INT2 => write_checked(&i16::try_from(*i)?, ty, out),
                Type::INT4 => write_checked(&i32::try_from(*i)?, ty, out),
                _ => write_checked(i, ty, out),
            },
            RowValues::Float(f) => match *ty {
                #[allow(clippy::cast_possible_truncation)]
                Type::FLOAT4 => write_checked(&(*f as f32), ty, out),
                _ => write_checked(f, ty, out),
            },
            RowValues::Text(s) => write_checked(s, ty, out),
            RowValues::Bool(b) => write_checked(b, ty, out),
            RowValues::Timestamp(dt) => match *ty {
                Type::TIMESTAMPTZ => write_checked(&Utc.from_utc_datetime(dt), ty, out),
                _ => write_checked(dt, ty, out),
            },
            RowValues::Null => Ok(IsNull::Yes),
            RowValues::JSON(jsval) => write_checked(jsval, ty, out),
            RowValues::Blob(bytes) => write_checked(bytes, ty, out),
        }
    }

    fn accepts(ty: &Type) -> bool {
        matches!(
            *ty,
            Type::INT2
                | Type::INT4
                | Type::INT8
                | Type::FLOAT4
                | Type::FLOAT8
                | Type::TEXT
                | Type::VARCHAR
                | Type::BPCHAR
                | Type::NAME
                | Type::BOOL
                | Type::TIMESTAMP
                | Type::TIMESTAMPTZ
                | Type::JSON
                | Type::JSONB
                | Type::BYTEA
        )
    }

    to_sql_checked!();
}
