use rusqlite::types::{ToSql, ToSqlOutput, Value as SqlValue, ValueRef};
use salesdesk_core::stmt::Value as CoreValue;
use salesdesk_core::{Error, Result};

/// Borrowing bridge from a core value to a SQLite bind parameter.
#[derive(Debug)]
pub(crate) struct Param<'a>(pub(crate) &'a CoreValue);

impl ToSql for Param<'_> {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self.0 {
            CoreValue::I64(v) => Ok(ToSqlOutput::Owned(SqlValue::Integer(*v))),
            CoreValue::F64(v) => Ok(ToSqlOutput::Owned(SqlValue::Real(*v))),
            CoreValue::String(v) => Ok(ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes()))),
            CoreValue::Null => Ok(ToSqlOutput::Owned(SqlValue::Null)),
        }
    }
}

/// Converts a SQLite cell into a core value.
pub(crate) fn from_sql(value: SqlValue) -> Result<CoreValue> {
    match value {
        SqlValue::Null => Ok(CoreValue::Null),
        SqlValue::Integer(v) => Ok(CoreValue::I64(v)),
        SqlValue::Real(v) => Ok(CoreValue::F64(v)),
        SqlValue::Text(v) => Ok(CoreValue::String(v)),
        SqlValue::Blob(_) => Err(Error::from(anyhow::anyhow!(
            "BLOB columns are not part of the engine's value model"
        ))),
    }
}
