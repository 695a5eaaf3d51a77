//! Bind `SqlValue` to PostgreSQL queries and decode result cells back into it.

use crate::entity::{SqlType, SqlValue};
use sqlx::encode::{Encode, IsNull};
use sqlx::postgres::{PgRow, PgTypeInfo, Postgres};
use sqlx::{Database, Row, Type};

fn type_info_of(ty: SqlType) -> PgTypeInfo {
    match ty {
        SqlType::Text => <String as Type<Postgres>>::type_info(),
        SqlType::Integer => <i32 as Type<Postgres>>::type_info(),
        SqlType::BigInt => <i64 as Type<Postgres>>::type_info(),
        SqlType::Boolean => <bool as Type<Postgres>>::type_info(),
        SqlType::DoublePrecision => <f64 as Type<Postgres>>::type_info(),
        SqlType::Uuid => <uuid::Uuid as Type<Postgres>>::type_info(),
    }
}

impl<'q> Encode<'q, Postgres> for SqlValue {
    fn encode_by_ref(
        &self,
        buf: &mut <Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, Box<dyn std::error::Error + Send + Sync>> {
        Ok(match self {
            SqlValue::Null(_) => IsNull::Yes,
            SqlValue::Text(s) => <String as Encode<'q, Postgres>>::encode_by_ref(s, buf)?,
            SqlValue::Integer(n) => <i32 as Encode<'q, Postgres>>::encode_by_ref(n, buf)?,
            SqlValue::BigInt(n) => <i64 as Encode<'q, Postgres>>::encode_by_ref(n, buf)?,
            SqlValue::Boolean(b) => <bool as Encode<'q, Postgres>>::encode_by_ref(b, buf)?,
            SqlValue::Double(n) => <f64 as Encode<'q, Postgres>>::encode_by_ref(n, buf)?,
            SqlValue::Uuid(u) => <uuid::Uuid as Encode<'q, Postgres>>::encode_by_ref(u, buf)?,
        })
    }

    /// Each value declares its own column type so the server never has to coerce from text.
    fn produces(&self) -> Option<PgTypeInfo> {
        Some(type_info_of(self.sql_type()))
    }
}

impl Type<Postgres> for SqlValue {
    fn type_info() -> PgTypeInfo {
        <String as Type<Postgres>>::type_info()
    }

    fn compatible(_ty: &PgTypeInfo) -> bool {
        true
    }
}

/// Read the cell at `index` as the given column type.
pub fn decode_cell(row: &PgRow, index: usize, ty: SqlType) -> Result<SqlValue, sqlx::Error> {
    let v = match ty {
        SqlType::Text => row.try_get::<Option<String>, _>(index)?.map(SqlValue::Text),
        SqlType::Integer => row.try_get::<Option<i32>, _>(index)?.map(SqlValue::Integer),
        SqlType::BigInt => row.try_get::<Option<i64>, _>(index)?.map(SqlValue::BigInt),
        SqlType::Boolean => row.try_get::<Option<bool>, _>(index)?.map(SqlValue::Boolean),
        SqlType::DoublePrecision => row.try_get::<Option<f64>, _>(index)?.map(SqlValue::Double),
        SqlType::Uuid => row.try_get::<Option<uuid::Uuid>, _>(index)?.map(SqlValue::Uuid),
    };
    Ok(v.unwrap_or(SqlValue::Null(ty)))
}
