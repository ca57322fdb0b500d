use scanplan_error::{DbError, ErrorKind, Result};
use tracing::{debug, warn};

use crate::arrays::datatype::DataType;
use crate::database::DatabaseContext;
use crate::functions::table::{BindData, TableFunction, TableFunctionInput};

/// How the bind state of a scan was persisted.
#[derive(Debug)]
pub(crate) enum PersistedBindState<'a> {
    /// State written by the function's own codec.
    Encoded(&'a [u8]),
    /// Arguments to call bind with again.
    Rebind(&'a TableFunctionInput),
}

/// Rebuild the bind state for a scan being loaded.
///
/// When rebinding, the freshly bound types must exactly match the persisted
/// types. Names are only checked by count since binding may alias columns
/// differently.
pub(crate) fn reconstruct_bind_state(
    context: &DatabaseContext,
    function: &dyn TableFunction,
    persisted: PersistedBindState<'_>,
    returned_types: &[DataType],
    names: &[String],
) -> Result<Box<dyn BindData>> {
    if function.state_codec().is_none() && function.binder().is_none() {
        return Err(DbError::new_with_kind(
            ErrorKind::Unreconstructible,
            "Table function has neither bind nor a state codec",
        )
        .with_field("function", function.name()));
    }

    match persisted {
        PersistedBindState::Encoded(buf) => {
            let codec = function.state_codec().ok_or_else(|| {
                DbError::serialization("Plan has encoded bind state, but function has no codec")
                    .with_field("function", function.name())
            })?;
            debug!(function = function.name(), len = buf.len(), "decoding bind state");
            codec.decode_state(buf).map_err(|e| e.with_kind(ErrorKind::Serialization))
        }
        PersistedBindState::Rebind(input) => {
            let binder = function.binder().ok_or_else(|| {
                DbError::serialization("Plan requires rebinding, but function cannot be bound")
                    .with_field("function", function.name())
            })?;
            debug!(function = function.name(), "rebinding table function");
            let bound = binder.bind(context, input)?;

            if bound.types != returned_types {
                warn!(
                    function = function.name(),
                    expected = ?returned_types,
                    got = ?bound.types,
                    "rebind produced different types"
                );
                return Err(DbError::serialization(
                    "Table function deserialization failure, bind returned different return types than were serialized",
                )
                .with_field("function", function.name()));
            }

            if bound.names.len() != names.len() {
                warn!(
                    function = function.name(),
                    expected = names.len(),
                    got = bound.names.len(),
                    "rebind produced a different number of names"
                );
                return Err(DbError::serialization(
                    "Table function deserialization failure, bind returned different returned names than were serialized",
                )
                .with_field("function", function.name()));
            }

            Ok(bound.state)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrays::scalar::ScalarValue;
    use crate::functions::table::builtin::repeat::RepeatBindState;
    use crate::testutil::{MutatedRepeat, OpaqueSource, test_db_context};

    #[test]
    fn rebind_matching() {
        let context = test_db_context();
        let function = context.registry().try_get_table_function("repeat").unwrap();
        let input = TableFunctionInput::positional([ScalarValue::from("a"), 3_i64.into()]);

        let state = reconstruct_bind_state(
            &context,
            function.as_ref(),
            PersistedBindState::Rebind(&input),
            &[DataType::Utf8],
            &["repeat".to_string()],
        )
        .unwrap();

        let state = state.as_ref().as_any().downcast_ref::<RepeatBindState>().unwrap();
        assert_eq!(3, state.count);
    }

    #[test]
    fn rebind_names_only_checked_by_count() {
        let context = test_db_context();
        let function = context.registry().try_get_table_function("repeat").unwrap();
        let input = TableFunctionInput::positional([ScalarValue::from("a"), 3_i64.into()])
            .with_named("alias", "renamed");

        reconstruct_bind_state(
            &context,
            function.as_ref(),
            PersistedBindState::Rebind(&input),
            &[DataType::Utf8],
            &["repeat".to_string()],
        )
        .unwrap();

        let err = reconstruct_bind_state(
            &context,
            function.as_ref(),
            PersistedBindState::Rebind(&input),
            &[DataType::Utf8],
            &["a".to_string(), "b".to_string()],
        )
        .unwrap_err();
        assert_eq!(ErrorKind::Serialization, err.kind());
    }

    #[test]
    fn rebind_type_mismatch() {
        logutil::init_test();

        let context = test_db_context();
        let input = TableFunctionInput::positional([ScalarValue::from("a"), 3_i64.into()]);

        let err = reconstruct_bind_state(
            &context,
            &MutatedRepeat,
            PersistedBindState::Rebind(&input),
            &[DataType::Utf8],
            &["repeat".to_string()],
        )
        .unwrap_err();
        assert_eq!(ErrorKind::Serialization, err.kind());
    }

    #[test]
    fn neither_codec_nor_bind() {
        let context = test_db_context();
        let input = TableFunctionInput::default();

        let err = reconstruct_bind_state(
            &context,
            &OpaqueSource,
            PersistedBindState::Rebind(&input),
            &[DataType::Int64],
            &["a".to_string()],
        )
        .unwrap_err();
        assert_eq!(ErrorKind::Unreconstructible, err.kind());

        let err = reconstruct_bind_state(
            &context,
            &OpaqueSource,
            PersistedBindState::Encoded(&[]),
            &[DataType::Int64],
            &["a".to_string()],
        )
        .unwrap_err();
        assert_eq!(ErrorKind::Unreconstructible, err.kind());
    }

    #[test]
    fn encoded_without_codec() {
        let context = test_db_context();
        let function = context.registry().try_get_table_function("repeat").unwrap();

        let err = reconstruct_bind_state(
            &context,
            function.as_ref(),
            PersistedBindState::Encoded(&[1, 2, 3]),
            &[DataType::Utf8],
            &["repeat".to_string()],
        )
        .unwrap_err();
        assert_eq!(ErrorKind::Serialization, err.kind());
    }
}
