//! Scalar values carried in the bound-parameter channel.
//!
//! Fragments only ever contain identifiers and `$n` placeholders; the data for
//! those placeholders travels separately as a `Vec<Value>`. `Value` binds
//! against whatever parameter type Postgres infers for its placeholder, so a
//! payload decoded from JSON (where every integer is an `i64`) still binds to an
//! `integer` column.

use crate::error::JoblyError;
use bytes::BytesMut;
use rust_decimal::Decimal;
use std::error::Error;
use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};

/// A single bound parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Numeric(Decimal),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrow the text content, if this is a `Text` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Numeric(_) => "numeric",
            Value::Text(_) => "text",
        }
    }

    fn mismatch(&self, ty: &Type) -> Box<dyn Error + Sync + Send> {
        Box::new(BindError(format!(
            "cannot bind {} value to parameter of type {}",
            self.type_name(),
            ty
        )))
    }

    fn out_of_range(&self, ty: &Type) -> Box<dyn Error + Sync + Send> {
        Box::new(BindError(format!(
            "{} value is not representable as {}",
            self.type_name(),
            ty
        )))
    }

    /// Narrow to the integer width `ty` asks for.
    fn encode_int(&self, i: i64, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match *ty {
            Type::INT2 => i16::try_from(i).map_err(|_| self.out_of_range(ty))?.to_sql(ty, out),
            Type::INT4 => i32::try_from(i).map_err(|_| self.out_of_range(ty))?.to_sql(ty, out),
            _ => i.to_sql(ty, out),
        }
    }
}

/// A value that cannot be bound to its parameter without changing it.
///
/// Raised from [`ToSql::to_sql`]; [`JoblyError::from_db_error`] reports it as
/// [`JoblyError::Validation`]. The message names types only, never the value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct BindError(String);

fn int_to_f32(i: i64) -> Option<f32> {
    let f = i as f32;
    (f as i128 == i128::from(i)).then_some(f)
}

fn int_to_f64(i: i64) -> Option<f64> {
    let f = i as f64;
    (f as i128 == i128::from(i)).then_some(f)
}

/// `None` when a finite `f` overflows or underflows to zero as `f32`.
fn float_to_f32(f: f64) -> Option<f32> {
    let n = f as f32;
    let lost = f.is_finite() && (n.is_infinite() || (n == 0.0 && f != 0.0));
    (!lost).then_some(n)
}

/// `Some` only for floats with no fractional part inside the `i64` range.
fn float_to_int(f: f64) -> Option<i64> {
    let integral = f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64;
    integral.then_some(f as i64)
}

/// Borrow a values list as the parameter slice `tokio-postgres` expects.
pub fn as_params(values: &[Value]) -> Vec<&(dyn ToSql + Sync)> {
    values.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
}

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(b) => match *ty {
                Type::BOOL => b.to_sql(ty, out),
                _ => Err(self.mismatch(ty)),
            },
            Value::Int(i) => match *ty {
                Type::INT2 | Type::INT4 | Type::INT8 => self.encode_int(*i, ty, out),
                Type::FLOAT4 => int_to_f32(*i)
                    .ok_or_else(|| self.out_of_range(ty))?
                    .to_sql(ty, out),
                Type::FLOAT8 => int_to_f64(*i)
                    .ok_or_else(|| self.out_of_range(ty))?
                    .to_sql(ty, out),
                Type::NUMERIC => Decimal::from(*i).to_sql(ty, out),
                _ => Err(self.mismatch(ty)),
            },
            Value::Float(f) => match *ty {
                Type::INT2 | Type::INT4 | Type::INT8 => {
                    let i = float_to_int(*f).ok_or_else(|| self.out_of_range(ty))?;
                    self.encode_int(i, ty, out)
                }
                Type::FLOAT4 => float_to_f32(*f)
                    .ok_or_else(|| self.out_of_range(ty))?
                    .to_sql(ty, out),
                Type::FLOAT8 => f.to_sql(ty, out),
                Type::NUMERIC => Decimal::try_from(*f)
                    .map_err(|_| self.out_of_range(ty))?
                    .to_sql(ty, out),
                _ => Err(self.mismatch(ty)),
            },
            Value::Numeric(d) => match *ty {
                Type::NUMERIC => d.to_sql(ty, out),
                _ => Err(self.mismatch(ty)),
            },
            Value::Text(s) => match *ty {
                Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN => {
                    s.as_str().to_sql(ty, out)
                }
                _ => Err(self.mismatch(ty)),
            },
        }
    }

    fn accepts(ty: &Type) -> bool {
        matches!(
            *ty,
            Type::BOOL
                | Type::INT2
                | Type::INT4
                | Type::INT8
                | Type::FLOAT4
                | Type::FLOAT8
                | Type::NUMERIC
                | Type::TEXT
                | Type::VARCHAR
                | Type::BPCHAR
                | Type::NAME
                | Type::UNKNOWN
        )
    }

    to_sql_checked!();
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::Int(v.into())
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Numeric(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// JSON scalars map onto [`Value`]; arrays and objects are rejected.
impl TryFrom<serde_json::Value> for Value {
    type Error = JoblyError;

    fn try_from(v: serde_json::Value) -> Result<Self, Self::Error> {
        use serde_json::Value as Json;

        match v {
            Json::Null => Ok(Value::Null),
            Json::Bool(b) => Ok(Value::Bool(b)),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Value::Int(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(Value::Float(f))
                } else {
                    Err(JoblyError::validation(format!("number out of range: {n}")))
                }
            }
            Json::String(s) => Ok(Value::Text(s)),
            Json::Array(_) | Json::Object(_) => Err(JoblyError::validation(
                "nested values are not supported",
            )),
        }
    }
}
