//! Dynamic cell values exchanged between records and the store.

use crate::error::EntityError;
use uuid::Uuid;

/// Storage type of a column. Closed set: one per supported field type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SqlType {
    Text,
    Integer,
    BigInt,
    Boolean,
    DoublePrecision,
    Uuid,
}

impl SqlType {
    /// Type name as written in DDL.
    pub fn ddl(&self) -> &'static str {
        match self {
            SqlType::Text => "TEXT",
            SqlType::Integer => "INTEGER",
            SqlType::BigInt => "BIGINT",
            SqlType::Boolean => "BOOLEAN",
            SqlType::DoublePrecision => "DOUBLE PRECISION",
            SqlType::Uuid => "UUID",
        }
    }
}

/// A single column value. `Null` keeps its column type so it can still be bound as a typed parameter.
#[derive(Clone, Debug, PartialEq)]
pub enum SqlValue {
    Null(SqlType),
    Text(String),
    Integer(i32),
    BigInt(i64),
    Boolean(bool),
    Double(f64),
    Uuid(Uuid),
}

impl SqlValue {
    pub fn sql_type(&self) -> SqlType {
        match self {
            SqlValue::Null(ty) => *ty,
            SqlValue::Text(_) => SqlType::Text,
            SqlValue::Integer(_) => SqlType::Integer,
            SqlValue::BigInt(_) => SqlType::BigInt,
            SqlValue::Boolean(_) => SqlType::Boolean,
            SqlValue::Double(_) => SqlType::DoublePrecision,
            SqlValue::Uuid(_) => SqlType::Uuid,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null(_))
    }
}

macro_rules! sql_value_conversions {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for SqlValue {
                fn from(v: $ty) -> Self {
                    SqlValue::$variant(v)
                }
            }

            /// NULL decodes to the zero value of the field type.
            impl TryFrom<SqlValue> for $ty {
                type Error = EntityError;

                fn try_from(value: SqlValue) -> Result<Self, Self::Error> {
                    match value {
                        SqlValue::$variant(v) => Ok(v),
                        SqlValue::Null(_) => Ok(<$ty>::default()),
                        other => Err(EntityError::TypeMismatch {
                            expected: SqlValue::$variant(<$ty>::default()).sql_type(),
                            found: other.sql_type(),
                        }),
                    }
                }
            }
        )*
    };
}

sql_value_conversions! {
    String => Text,
    i32 => Integer,
    i64 => BigInt,
    bool => Boolean,
    f64 => Double,
    Uuid => Uuid,
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}
