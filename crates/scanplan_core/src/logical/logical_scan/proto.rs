use scanplan_error::{DbError, ErrorKind, OptionExt, Result};
use scanplan_proto::messages::logical::{ExtraOperatorInfo as ProtoExtraInfo, RebindInput, TableFunctionRef};
use scanplan_proto::messages::scalar::NamedScalar;
use scanplan_proto::{ProtoConv, from_proto_vec, index_from_u64, to_proto_vec};
use tracing::trace;

use super::rebind::{PersistedBindState, reconstruct_bind_state};
use super::{ExtraOperatorInfo, LogicalScan, ROW_ID_COLUMN};
use crate::arrays::scalar::ScalarValue;
use crate::database::DatabaseContext;
use crate::functions::table::TableFunctionInput;
use crate::logical::binding::TableRef;
use crate::proto::DatabaseProtoConv;
use crate::storage::table_filter::TableFilterSet;

/// Persisted form of a column id. The row id column maps to `u64::MAX`.
pub(crate) fn column_id_to_u64(id: usize) -> u64 {
    if id == ROW_ID_COLUMN { u64::MAX } else { id as u64 }
}

pub(crate) fn column_id_from_u64(id: u64) -> Result<usize> {
    if id == u64::MAX {
        return Ok(ROW_ID_COLUMN);
    }
    usize::try_from(id)
        .map_err(|_| DbError::serialization("Column id does not fit in usize").with_field("id", id))
}

impl DatabaseProtoConv for LogicalScan {
    type ProtoType = scanplan_proto::messages::logical::LogicalScan;

    fn to_proto_ctx(&self, _context: &DatabaseContext) -> Result<Self::ProtoType> {
        let (function, rebind) = match self.function.state_codec() {
            Some(codec) => {
                let mut state = Vec::new();
                codec.encode_state(self.bind_state.as_ref(), &mut state)?;
                let function = TableFunctionRef {
                    name: self.function.name().to_string(),
                    has_serialize: true,
                    state: Some(state),
                };
                (function, None)
            }
            None => {
                let function = TableFunctionRef {
                    name: self.function.name().to_string(),
                    has_serialize: false,
                    state: None,
                };
                let rebind = RebindInput {
                    positional: to_proto_vec(&self.input.positional)?,
                    named: self
                        .input
                        .named
                        .iter()
                        .map(|(name, value)| {
                            Ok(NamedScalar {
                                name: name.clone(),
                                value: Some(value.to_proto()?),
                            })
                        })
                        .collect::<Result<Vec<_>>>()?,
                    input_types: to_proto_vec(&self.input.input_types)?,
                    input_names: self.input.input_names.clone(),
                };
                (function, Some(rebind))
            }
        };

        Ok(Self::ProtoType {
            table_index: self.table_ref.table_idx as u64,
            returned_types: to_proto_vec(&self.returned_types)?,
            names: self.names.clone(),
            column_ids: self.column_ids.iter().map(|&id| column_id_to_u64(id)).collect(),
            projection_ids: self.projection_ids.iter().map(|&id| id as u64).collect(),
            table_filters: Some(self.table_filters.to_proto()?),
            function: Some(function),
            rebind,
            projected_input: self.projected_input.iter().map(|&id| id as u64).collect(),
            extra_info: Some(ProtoExtraInfo {
                file_filters: self.extra_info.file_filters.clone(),
            }),
        })
    }

    fn from_proto_ctx(proto: Self::ProtoType, context: &DatabaseContext) -> Result<Self> {
        let table_ref = TableRef::from(index_from_u64(proto.table_index)?);
        let returned_types = from_proto_vec(proto.returned_types)?;
        let names = proto.names;
        let column_ids = proto
            .column_ids
            .into_iter()
            .map(column_id_from_u64)
            .collect::<Result<Vec<_>>>()?;
        let projection_ids = proto
            .projection_ids
            .into_iter()
            .map(index_from_u64)
            .collect::<Result<Vec<_>>>()?;
        let table_filters = TableFilterSet::from_proto(proto.table_filters.required("table filters")?)?;

        let function_ref = proto.function.required("table function")?;
        let function = context
            .registry()
            .try_get_table_function(&function_ref.name)
            .map_err(|e| e.with_kind(ErrorKind::Serialization))?;

        let input = match (function_ref.has_serialize, proto.rebind) {
            (true, None) => TableFunctionInput::default(),
            (false, Some(rebind)) => TableFunctionInput {
                positional: from_proto_vec(rebind.positional)?,
                named: rebind
                    .named
                    .into_iter()
                    .map(|named| {
                        let value = ScalarValue::from_proto(named.value.required("named value")?)?;
                        Ok((named.name, value))
                    })
                    .collect::<Result<_>>()?,
                input_types: from_proto_vec(rebind.input_types)?,
                input_names: rebind.input_names,
            },
            (has_serialize, rebind) => {
                return Err(DbError::serialization(
                    "Encoded state flag does not match presence of rebind input",
                )
                .with_field("has_serialize", has_serialize)
                .with_field("has_rebind", rebind.is_some()));
            }
        };

        trace!(
            function = function.name(),
            has_serialize = function_ref.has_serialize,
            "decoding scan"
        );

        let persisted = if function_ref.has_serialize {
            let state = function_ref.state.as_deref().required("encoded bind state")?;
            PersistedBindState::Encoded(state)
        } else {
            PersistedBindState::Rebind(&input)
        };
        let bind_state =
            reconstruct_bind_state(context, function.as_ref(), persisted, &returned_types, &names)?;

        let projected_input = proto
            .projected_input
            .into_iter()
            .map(index_from_u64)
            .collect::<Result<Vec<_>>>()?;

        let extra_info = proto
            .extra_info
            .map(|info| ExtraOperatorInfo {
                file_filters: info.file_filters,
            })
            .unwrap_or_default();

        Ok(LogicalScan {
            table_ref,
            function,
            bind_state,
            returned_types,
            names,
            input,
            extra_info,
            column_ids,
            projection_ids,
            table_filters,
            projected_input,
            types: Vec::new(),
        })
    }
}
