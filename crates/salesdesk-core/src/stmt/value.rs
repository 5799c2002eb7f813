use crate::schema::Type;
use crate::{Error, Result};

use chrono::NaiveDate;

/// A single typed cell value.
///
/// Dates are carried as ISO-8601 strings; the semantic `Date` type lives
/// on the column, not the value.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Value {
    /// Signed 64-bit integer
    I64(i64),

    /// 64-bit float
    F64(f64),

    /// String value
    String(String),

    /// Null value
    #[default]
    Null,
}

impl Value {
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::I64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::F64(v) => Some(*v),
            Self::I64(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Coerces this value to the given semantic type.
    ///
    /// Nulls pass through untouched; nullability is enforced by the
    /// store, not here. `column` is only used for error reporting.
    pub fn coerce(self, ty: Type, column: &str) -> Result<Value> {
        if self.is_null() {
            return Ok(self);
        }

        match ty {
            Type::Integer => match self {
                Self::I64(_) => Ok(self),
                Self::String(ref s) => match s.trim().parse::<i64>() {
                    Ok(v) => Ok(Self::I64(v)),
                    Err(_) => Err(Error::type_mismatch(column, ty, self)),
                },
                _ => Err(Error::type_mismatch(column, ty, self)),
            },
            Type::Real => match self {
                Self::F64(_) => Ok(self),
                Self::I64(v) => Ok(Self::F64(v as f64)),
                Self::String(ref s) => match s.trim().parse::<f64>() {
                    Ok(v) => Ok(Self::F64(v)),
                    Err(_) => Err(Error::type_mismatch(column, ty, self)),
                },
                _ => Err(Error::type_mismatch(column, ty, self)),
            },
            Type::Date => match self {
                Self::String(ref s) => match NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d") {
                    Ok(date) => Ok(Self::String(date.format("%Y-%m-%d").to_string())),
                    Err(_) => Err(Error::type_mismatch(column, ty, self)),
                },
                _ => Err(Error::type_mismatch(column, ty, self)),
            },
            Type::Text => match self {
                Self::String(_) => Ok(self),
                // UI layers hand numeric cells back as whatever they
                // parsed them into; stringify rather than reject.
                Self::I64(v) => Ok(Self::String(v.to_string())),
                Self::F64(v) => Ok(Self::String(v.to_string())),
                Self::Null => unreachable!(),
            },
        }
    }
}

impl core::fmt::Display for Value {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Self::I64(v) => write!(f, "{v}"),
            Self::F64(v) => write!(f, "{v}"),
            Self::String(v) => f.write_str(v),
            Self::Null => f.write_str("NULL"),
        }
    }
}

impl From<i64> for Value {
    fn from(src: i64) -> Self {
        Self::I64(src)
    }
}

impl From<i32> for Value {
    fn from(src: i32) -> Self {
        Self::I64(src as i64)
    }
}

impl From<f64> for Value {
    fn from(src: f64) -> Self {
        Self::F64(src)
    }
}

impl From<&str> for Value {
    fn from(src: &str) -> Self {
        Self::String(src.to_string())
    }
}

impl From<String> for Value {
    fn from(src: String) -> Self {
        Self::String(src)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(src: Option<T>) -> Self {
        match src {
            Some(value) => value.into(),
            None => Self::Null,
        }
    }
}
