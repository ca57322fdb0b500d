//! Protobuf messages for persisted plans.
//!
//! Field tags are part of the persisted format. Never reuse a tag, only add
//! new ones.

pub mod schema {
    #[derive(Clone, Copy, PartialEq, ::prost::Message)]
    pub struct EmptyMeta {}

    #[derive(Clone, Copy, PartialEq, ::prost::Message)]
    pub struct DecimalTypeMeta {
        #[prost(int32, tag = "1")]
        pub precision: i32,
        #[prost(int32, tag = "2")]
        pub scale: i32,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct DataType {
        #[prost(enumeration = "DataTypeId", tag = "1")]
        pub id: i32,
        #[prost(message, optional, tag = "2")]
        pub decimal: ::core::option::Option<DecimalTypeMeta>,
        #[prost(message, optional, boxed, tag = "3")]
        pub list_child: ::core::option::Option<::prost::alloc::boxed::Box<DataType>>,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum DataTypeId {
        InvalidDataTypeId = 0,
        Null = 1,
        Boolean = 2,
        Int8 = 3,
        Int16 = 4,
        Int32 = 5,
        Int64 = 6,
        UInt8 = 7,
        UInt16 = 8,
        UInt32 = 9,
        UInt64 = 10,
        Float32 = 11,
        Float64 = 12,
        Decimal64 = 13,
        Utf8 = 14,
        Binary = 15,
        Date32 = 16,
        Timestamp = 17,
        Interval = 18,
        List = 19,
        RowId = 20,
    }
}

pub mod scalar {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ScalarValue {
        #[prost(oneof = "scalar_value::Value", tags = "1, 2, 3, 4, 5, 6, 7, 8")]
        pub value: ::core::option::Option<scalar_value::Value>,
    }

    pub mod scalar_value {
        #[derive(Clone, PartialEq, ::prost::Oneof)]
        pub enum Value {
            #[prost(message, tag = "1")]
            ScalarNull(super::super::schema::EmptyMeta),
            #[prost(bool, tag = "2")]
            ScalarBoolean(bool),
            #[prost(int64, tag = "3")]
            ScalarInt64(i64),
            #[prost(uint64, tag = "4")]
            ScalarUint64(u64),
            #[prost(double, tag = "5")]
            ScalarFloat64(f64),
            #[prost(string, tag = "6")]
            ScalarUtf8(::prost::alloc::string::String),
            #[prost(bytes = "vec", tag = "7")]
            ScalarBinary(::prost::alloc::vec::Vec<u8>),
            #[prost(message, tag = "8")]
            ScalarList(super::ListScalar),
        }
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ListScalar {
        #[prost(message, repeated, tag = "1")]
        pub values: ::prost::alloc::vec::Vec<ScalarValue>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct NamedScalar {
        #[prost(string, tag = "1")]
        pub name: ::prost::alloc::string::String,
        #[prost(message, optional, tag = "2")]
        pub value: ::core::option::Option<ScalarValue>,
    }
}

pub mod filter {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum ComparisonOperator {
        InvalidComparisonOperator = 0,
        Eq = 1,
        NotEq = 2,
        Lt = 3,
        LtEq = 4,
        Gt = 5,
        GtEq = 6,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ConstantFilter {
        #[prost(enumeration = "ComparisonOperator", tag = "1")]
        pub op: i32,
        #[prost(message, optional, tag = "2")]
        pub value: ::core::option::Option<super::scalar::ScalarValue>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ConjunctionFilter {
        #[prost(message, repeated, tag = "1")]
        pub children: ::prost::alloc::vec::Vec<TableFilter>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct TableFilter {
        #[prost(oneof = "table_filter::Value", tags = "1, 2, 3, 4, 5")]
        pub value: ::core::option::Option<table_filter::Value>,
    }

    pub mod table_filter {
        #[derive(Clone, PartialEq, ::prost::Oneof)]
        pub enum Value {
            #[prost(message, tag = "1")]
            Constant(super::ConstantFilter),
            #[prost(message, tag = "2")]
            IsNull(super::super::schema::EmptyMeta),
            #[prost(message, tag = "3")]
            IsNotNull(super::super::schema::EmptyMeta),
            #[prost(message, tag = "4")]
            And(super::ConjunctionFilter),
            #[prost(message, tag = "5")]
            Or(super::ConjunctionFilter),
        }
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct TableFilterEntry {
        #[prost(uint64, tag = "1")]
        pub column_index: u64,
        #[prost(message, optional, tag = "2")]
        pub filter: ::core::option::Option<TableFilter>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct TableFilterSet {
        #[prost(message, repeated, tag = "1")]
        pub filters: ::prost::alloc::vec::Vec<TableFilterEntry>,
    }
}

pub mod logical {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct StatisticsValue {
        #[prost(oneof = "statistics_value::Value", tags = "1, 2, 3")]
        pub value: ::core::option::Option<statistics_value::Value>,
    }

    pub mod statistics_value {
        #[derive(Clone, PartialEq, ::prost::Oneof)]
        pub enum Value {
            #[prost(uint64, tag = "1")]
            Exact(u64),
            #[prost(uint64, tag = "2")]
            Estimated(u64),
            #[prost(message, tag = "3")]
            Unknown(super::super::schema::EmptyMeta),
        }
    }

    /// Reference to a table function along with its encoded bind state.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct TableFunctionRef {
        #[prost(string, tag = "1")]
        pub name: ::prost::alloc::string::String,
        /// Whether or not the function's own codec was used for the bind
        /// state. When false, a `RebindInput` accompanies the function.
        #[prost(bool, tag = "2")]
        pub has_serialize: bool,
        #[prost(bytes = "vec", optional, tag = "3")]
        pub state: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
    }

    /// Arguments needed to call bind again when deserializing.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct RebindInput {
        #[prost(message, repeated, tag = "1")]
        pub positional: ::prost::alloc::vec::Vec<super::scalar::ScalarValue>,
        #[prost(message, repeated, tag = "2")]
        pub named: ::prost::alloc::vec::Vec<super::scalar::NamedScalar>,
        #[prost(message, repeated, tag = "3")]
        pub input_types: ::prost::alloc::vec::Vec<super::schema::DataType>,
        #[prost(string, repeated, tag = "4")]
        pub input_names: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ExtraOperatorInfo {
        #[prost(string, tag = "1")]
        pub file_filters: ::prost::alloc::string::String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct LogicalScan {
        #[prost(uint64, tag = "1")]
        pub table_index: u64,
        #[prost(message, repeated, tag = "2")]
        pub returned_types: ::prost::alloc::vec::Vec<super::schema::DataType>,
        #[prost(string, repeated, tag = "3")]
        pub names: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
        #[prost(uint64, repeated, tag = "4")]
        pub column_ids: ::prost::alloc::vec::Vec<u64>,
        #[prost(uint64, repeated, tag = "5")]
        pub projection_ids: ::prost::alloc::vec::Vec<u64>,
        #[prost(message, optional, tag = "6")]
        pub table_filters: ::core::option::Option<super::filter::TableFilterSet>,
        #[prost(message, optional, tag = "7")]
        pub function: ::core::option::Option<TableFunctionRef>,
        #[prost(message, optional, tag = "8")]
        pub rebind: ::core::option::Option<RebindInput>,
        #[prost(uint64, repeated, tag = "9")]
        pub projected_input: ::prost::alloc::vec::Vec<u64>,
        #[prost(message, optional, tag = "10")]
        pub extra_info: ::core::option::Option<ExtraOperatorInfo>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ExpressionRow {
        #[prost(message, repeated, tag = "1")]
        pub values: ::prost::alloc::vec::Vec<super::scalar::ScalarValue>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct LogicalExpressionList {
        #[prost(uint64, tag = "1")]
        pub table_index: u64,
        #[prost(message, repeated, tag = "2")]
        pub types: ::prost::alloc::vec::Vec<super::schema::DataType>,
        #[prost(message, repeated, tag = "3")]
        pub rows: ::prost::alloc::vec::Vec<ExpressionRow>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct LogicalOperator {
        #[prost(oneof = "logical_operator::Value", tags = "1, 2")]
        pub value: ::core::option::Option<logical_operator::Value>,
        #[prost(message, repeated, tag = "3")]
        pub children: ::prost::alloc::vec::Vec<LogicalOperator>,
        #[prost(message, optional, tag = "4")]
        pub estimated_cardinality: ::core::option::Option<StatisticsValue>,
    }

    pub mod logical_operator {
        #[derive(Clone, PartialEq, ::prost::Oneof)]
        pub enum Value {
            #[prost(message, tag = "1")]
            Scan(super::LogicalScan),
            #[prost(message, tag = "2")]
            ExpressionList(super::LogicalExpressionList),
        }
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct PlanEnvelope {
        #[prost(uint32, tag = "1")]
        pub version: u32,
        #[prost(message, optional, tag = "2")]
        pub root: ::core::option::Option<LogicalOperator>,
    }
}
