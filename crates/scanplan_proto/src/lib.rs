pub mod messages;
pub mod packed;

use scanplan_error::{DbError, Result};

/// Convert types to/from their protobuf representations.
pub trait ProtoConv: Sized {
    type ProtoType;

    fn to_proto(&self) -> Result<Self::ProtoType>;
    fn from_proto(proto: Self::ProtoType) -> Result<Self>;
}

/// Convert a slice of items into their protobuf representations.
pub fn to_proto_vec<T: ProtoConv>(items: &[T]) -> Result<Vec<T::ProtoType>> {
    items.iter().map(|item| item.to_proto()).collect()
}

/// Convert a vec of protobuf messages into their native representations.
pub fn from_proto_vec<T: ProtoConv>(protos: Vec<T::ProtoType>) -> Result<Vec<T>> {
    protos.into_iter().map(T::from_proto).collect()
}

/// Convert a persisted index or count back into a `usize`.
pub fn index_from_u64(idx: u64) -> Result<usize> {
    usize::try_from(idx)
        .map_err(|_| DbError::serialization("Index does not fit in usize").with_field("index", idx))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_in_range() {
        assert_eq!(17, index_from_u64(17).unwrap());
    }

    #[test]
    #[cfg(target_pointer_width = "32")]
    fn index_out_of_range() {
        assert!(index_from_u64(u64::from(u32::MAX) + 1).is_err());
    }
}
