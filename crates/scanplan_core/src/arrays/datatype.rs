use std::fmt;

use scanplan_error::{DbError, OptionExt, Result};
use scanplan_proto::ProtoConv;
use scanplan_proto::messages::schema::DataTypeId as ProtoDataTypeId;
use serde::{Deserialize, Serialize};

/// Metadata associated with decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DecimalTypeMeta {
    pub precision: u8,
    pub scale: i8,
}

impl DecimalTypeMeta {
    pub const fn new(precision: u8, scale: i8) -> Self {
        DecimalTypeMeta { precision, scale }
    }
}

/// Metadata associated with lists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListTypeMeta {
    pub datatype: Box<DataType>,
}

impl ListTypeMeta {
    pub fn new(datatype: DataType) -> Self {
        ListTypeMeta {
            datatype: Box::new(datatype),
        }
    }
}

/// Supported data types.
///
/// Some types may include additional metadata, which acts to refine the type
/// even further.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// Constant null columns.
    Null,
    Boolean,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    /// 64-bit decimal.
    Decimal64(DecimalTypeMeta),
    Utf8,
    Binary,
    /// Days since epoch.
    Date32,
    /// Timestamp in microseconds.
    Timestamp,
    Interval,
    /// A list of values all of the same type.
    List(ListTypeMeta),
    /// Type of the synthetic row identifier column.
    RowId,
}

impl DataType {
    /// Return if this datatype is null.
    pub const fn is_null(&self) -> bool {
        matches!(self, DataType::Null)
    }

    pub const fn is_row_id(&self) -> bool {
        matches!(self, DataType::RowId)
    }

    pub const fn is_numeric(&self) -> bool {
        matches!(
            self,
            DataType::Int8
                | DataType::Int16
                | DataType::Int32
                | DataType::Int64
                | DataType::UInt8
                | DataType::UInt16
                | DataType::UInt32
                | DataType::UInt64
                | DataType::Float32
                | DataType::Float64
                | DataType::Decimal64(_)
        )
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "Null"),
            Self::Boolean => write!(f, "Boolean"),
            Self::Int8 => write!(f, "Int8"),
            Self::Int16 => write!(f, "Int16"),
            Self::Int32 => write!(f, "Int32"),
            Self::Int64 => write!(f, "Int64"),
            Self::UInt8 => write!(f, "UInt8"),
            Self::UInt16 => write!(f, "UInt16"),
            Self::UInt32 => write!(f, "UInt32"),
            Self::UInt64 => write!(f, "UInt64"),
            Self::Float32 => write!(f, "Float32"),
            Self::Float64 => write!(f, "Float64"),
            Self::Decimal64(meta) => write!(f, "Decimal64({},{})", meta.precision, meta.scale),
            Self::Utf8 => write!(f, "Utf8"),
            Self::Binary => write!(f, "Binary"),
            Self::Date32 => write!(f, "Date32"),
            Self::Timestamp => write!(f, "Timestamp"),
            Self::Interval => write!(f, "Interval"),
            Self::List(meta) => write!(f, "List[{}]", meta.datatype),
            Self::RowId => write!(f, "RowId"),
        }
    }
}

impl ProtoConv for DataType {
    type ProtoType = scanplan_proto::messages::schema::DataType;

    fn to_proto(&self) -> Result<Self::ProtoType> {
        let (id, decimal, list_child) = match self {
            Self::Null => (ProtoDataTypeId::Null, None, None),
            Self::Boolean => (ProtoDataTypeId::Boolean, None, None),
            Self::Int8 => (ProtoDataTypeId::Int8, None, None),
            Self::Int16 => (ProtoDataTypeId::Int16, None, None),
            Self::Int32 => (ProtoDataTypeId::Int32, None, None),
            Self::Int64 => (ProtoDataTypeId::Int64, None, None),
            Self::UInt8 => (ProtoDataTypeId::UInt8, None, None),
            Self::UInt16 => (ProtoDataTypeId::UInt16, None, None),
            Self::UInt32 => (ProtoDataTypeId::UInt32, None, None),
            Self::UInt64 => (ProtoDataTypeId::UInt64, None, None),
            Self::Float32 => (ProtoDataTypeId::Float32, None, None),
            Self::Float64 => (ProtoDataTypeId::Float64, None, None),
            Self::Decimal64(meta) => (
                ProtoDataTypeId::Decimal64,
                Some(scanplan_proto::messages::schema::DecimalTypeMeta {
                    precision: meta.precision as i32,
                    scale: meta.scale as i32,
                }),
                None,
            ),
            Self::Utf8 => (ProtoDataTypeId::Utf8, None, None),
            Self::Binary => (ProtoDataTypeId::Binary, None, None),
            Self::Date32 => (ProtoDataTypeId::Date32, None, None),
            Self::Timestamp => (ProtoDataTypeId::Timestamp, None, None),
            Self::Interval => (ProtoDataTypeId::Interval, None, None),
            Self::List(meta) => (
                ProtoDataTypeId::List,
                None,
                Some(Box::new(meta.datatype.to_proto()?)),
            ),
            Self::RowId => (ProtoDataTypeId::RowId, None, None),
        };

        Ok(Self::ProtoType {
            id: id as i32,
            decimal,
            list_child,
        })
    }

    fn from_proto(proto: Self::ProtoType) -> Result<Self> {
        let id = ProtoDataTypeId::try_from(proto.id)
            .map_err(|_| DbError::serialization("Unknown data type id").with_field("id", proto.id))?;

        Ok(match id {
            ProtoDataTypeId::InvalidDataTypeId => {
                return Err(DbError::serialization("Invalid data type id"));
            }
            ProtoDataTypeId::Null => Self::Null,
            ProtoDataTypeId::Boolean => Self::Boolean,
            ProtoDataTypeId::Int8 => Self::Int8,
            ProtoDataTypeId::Int16 => Self::Int16,
            ProtoDataTypeId::Int32 => Self::Int32,
            ProtoDataTypeId::Int64 => Self::Int64,
            ProtoDataTypeId::UInt8 => Self::UInt8,
            ProtoDataTypeId::UInt16 => Self::UInt16,
            ProtoDataTypeId::UInt32 => Self::UInt32,
            ProtoDataTypeId::UInt64 => Self::UInt64,
            ProtoDataTypeId::Float32 => Self::Float32,
            ProtoDataTypeId::Float64 => Self::Float64,
            ProtoDataTypeId::Decimal64 => {
                let meta = proto.decimal.required("decimal meta")?;
                Self::Decimal64(DecimalTypeMeta::new(
                    u8::try_from(meta.precision)
                        .map_err(|_| DbError::serialization("Decimal precision out of range"))?,
                    i8::try_from(meta.scale)
                        .map_err(|_| DbError::serialization("Decimal scale out of range"))?,
                ))
            }
            ProtoDataTypeId::Utf8 => Self::Utf8,
            ProtoDataTypeId::Binary => Self::Binary,
            ProtoDataTypeId::Date32 => Self::Date32,
            ProtoDataTypeId::Timestamp => Self::Timestamp,
            ProtoDataTypeId::Interval => Self::Interval,
            ProtoDataTypeId::List => {
                let child = proto.list_child.required("list child type")?;
                Self::List(ListTypeMeta::new(DataType::from_proto(*child)?))
            }
            ProtoDataTypeId::RowId => Self::RowId,
        })
    }
}
