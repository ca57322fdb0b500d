use scanplan_error::Result;

use crate::database::DatabaseContext;

/// Convert types to/from their protobuf representations with access to the
/// database context.
///
/// Used for types that reference functions in the registry, or that may need
/// to call into a function (e.g. binding a table function again) when being
/// decoded.
pub trait DatabaseProtoConv: Sized {
    type ProtoType;

    fn to_proto_ctx(&self, context: &DatabaseContext) -> Result<Self::ProtoType>;
    fn from_proto_ctx(proto: Self::ProtoType, context: &DatabaseContext) -> Result<Self>;
}
