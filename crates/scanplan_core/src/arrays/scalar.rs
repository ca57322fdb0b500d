use std::fmt;

use scanplan_error::{DbError, OptionExt, Result};
use scanplan_proto::messages::scalar::scalar_value::Value as ProtoValue;
use scanplan_proto::messages::schema::EmptyMeta;
use scanplan_proto::{ProtoConv, from_proto_vec, to_proto_vec};
use serde::{Deserialize, Serialize};

use super::datatype::{DataType, ListTypeMeta};

/// A single literal value.
///
/// Used for the constant arguments a table function was called with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScalarValue {
    Null,
    Boolean(bool),
    Int64(i64),
    UInt64(u64),
    Float64(f64),
    Utf8(String),
    Binary(Vec<u8>),
    List(Vec<ScalarValue>),
}

impl ScalarValue {
    pub fn datatype(&self) -> DataType {
        match self {
            Self::Null => DataType::Null,
            Self::Boolean(_) => DataType::Boolean,
            Self::Int64(_) => DataType::Int64,
            Self::UInt64(_) => DataType::UInt64,
            Self::Float64(_) => DataType::Float64,
            Self::Utf8(_) => DataType::Utf8,
            Self::Binary(_) => DataType::Binary,
            Self::List(values) => {
                // First non-null value determines the child type.
                let child = values
                    .iter()
                    .map(|v| v.datatype())
                    .find(|d| !d.is_null())
                    .unwrap_or(DataType::Null);
                DataType::List(ListTypeMeta::new(child))
            }
        }
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn try_as_bool(&self) -> Result<bool> {
        match self {
            Self::Boolean(b) => Ok(*b),
            other => Err(DbError::new(format!("Not a bool: {other}"))),
        }
    }

    pub fn try_as_i64(&self) -> Result<i64> {
        match self {
            Self::Int64(v) => Ok(*v),
            Self::UInt64(v) => i64::try_from(*v)
                .map_err(|_| DbError::new(format!("Value {v} does not fit in an i64"))),
            other => Err(DbError::new(format!("Not an integer: {other}"))),
        }
    }

    pub fn try_as_str(&self) -> Result<&str> {
        match self {
            Self::Utf8(s) => Ok(s.as_str()),
            other => Err(DbError::new(format!("Not a string: {other}"))),
        }
    }
}

impl From<bool> for ScalarValue {
    fn from(value: bool) -> Self {
        ScalarValue::Boolean(value)
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        ScalarValue::Int64(value)
    }
}

impl From<u64> for ScalarValue {
    fn from(value: u64) -> Self {
        ScalarValue::UInt64(value)
    }
}

impl From<f64> for ScalarValue {
    fn from(value: f64) -> Self {
        ScalarValue::Float64(value)
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        ScalarValue::Utf8(value.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(value: String) -> Self {
        ScalarValue::Utf8(value)
    }
}

/// Formats the value as a SQL literal.
impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::UInt64(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::Utf8(v) => write!(f, "'{}'", v.replace('\'', "''")),
            Self::Binary(v) => {
                write!(f, "'\\x")?;
                for b in v {
                    write!(f, "{b:02x}")?;
                }
                write!(f, "'")
            }
            Self::List(values) => {
                write!(f, "[")?;
                for (idx, v) in values.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl ProtoConv for ScalarValue {
    type ProtoType = scanplan_proto::messages::scalar::ScalarValue;

    fn to_proto(&self) -> Result<Self::ProtoType> {
        let value = match self {
            Self::Null => ProtoValue::ScalarNull(EmptyMeta {}),
            Self::Boolean(v) => ProtoValue::ScalarBoolean(*v),
            Self::Int64(v) => ProtoValue::ScalarInt64(*v),
            Self::UInt64(v) => ProtoValue::ScalarUint64(*v),
            Self::Float64(v) => ProtoValue::ScalarFloat64(*v),
            Self::Utf8(v) => ProtoValue::ScalarUtf8(v.clone()),
            Self::Binary(v) => ProtoValue::ScalarBinary(v.clone()),
            Self::List(values) => {
                ProtoValue::ScalarList(scanplan_proto::messages::scalar::ListScalar {
                    values: to_proto_vec(values)?,
                })
            }
        };

        Ok(Self::ProtoType { value: Some(value) })
    }

    fn from_proto(proto: Self::ProtoType) -> Result<Self> {
        Ok(match proto.value.required("scalar value")? {
            ProtoValue::ScalarNull(_) => Self::Null,
            ProtoValue::ScalarBoolean(v) => Self::Boolean(v),
            ProtoValue::ScalarInt64(v) => Self::Int64(v),
            ProtoValue::ScalarUint64(v) => Self::UInt64(v),
            ProtoValue::ScalarFloat64(v) => Self::Float64(v),
            ProtoValue::ScalarUtf8(v) => Self::Utf8(v),
            ProtoValue::ScalarBinary(v) => Self::Binary(v),
            ProtoValue::ScalarList(list) => Self::List(from_proto_vec(list.values)?),
        })
    }
}
