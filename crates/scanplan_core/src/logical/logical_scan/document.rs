//! Self-describing form of a scan, written as named properties.

use std::collections::BTreeMap;

use scanplan_error::{DbError, ErrorKind, Result};
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::proto::{column_id_from_u64, column_id_to_u64};
use super::rebind::{PersistedBindState, reconstruct_bind_state};
use super::{ExtraOperatorInfo, LogicalScan};
use crate::arrays::datatype::DataType;
use crate::arrays::scalar::ScalarValue;
use crate::database::DatabaseContext;
use crate::functions::table::TableFunctionInput;
use crate::logical::binding::TableRef;
use crate::storage::table_filter::TableFilterSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDocument {
    pub name: String,
    pub has_serialize: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanDocument {
    pub table_index: usize,
    pub returned_types: Vec<DataType>,
    pub names: Vec<String>,
    pub column_ids: Vec<u64>,
    pub projection_ids: Vec<usize>,
    pub table_filters: TableFilterSet,
    pub function: FunctionDocument,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<ScalarValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub named_parameters: Option<BTreeMap<String, ScalarValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_table_types: Option<Vec<DataType>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_table_names: Option<Vec<String>>,
    pub projected_input: Vec<usize>,
    #[serde(default)]
    pub extra_info: ExtraOperatorInfo,
}

impl LogicalScan {
    pub fn to_document(&self) -> Result<ScanDocument> {
        let mut doc = ScanDocument {
            table_index: self.table_ref.table_idx,
            returned_types: self.returned_types.clone(),
            names: self.names.clone(),
            column_ids: self.column_ids.iter().map(|&id| column_id_to_u64(id)).collect(),
            projection_ids: self.projection_ids.clone(),
            table_filters: self.table_filters.clone(),
            function: FunctionDocument {
                name: self.function.name().to_string(),
                has_serialize: false,
                state: None,
            },
            parameters: None,
            named_parameters: None,
            input_table_types: None,
            input_table_names: None,
            projected_input: self.projected_input.clone(),
            extra_info: self.extra_info.clone(),
        };

        match self.function.state_codec() {
            Some(codec) => {
                let mut state = Vec::new();
                codec.encode_state(self.bind_state.as_ref(), &mut state)?;
                doc.function.has_serialize = true;
                doc.function.state = Some(state);
            }
            None => {
                doc.parameters = Some(self.input.positional.clone());
                doc.named_parameters = Some(self.input.named.clone());
                doc.input_table_types = Some(self.input.input_types.clone());
                doc.input_table_names = Some(self.input.input_names.clone());
            }
        }

        Ok(doc)
    }

    pub fn from_document(doc: ScanDocument, context: &DatabaseContext) -> Result<Self> {
        let function = context
            .registry()
            .try_get_table_function(&doc.function.name)
            .map_err(|e| e.with_kind(ErrorKind::Serialization))?;

        let input = if doc.function.has_serialize {
            let has_rebind = doc.parameters.is_some()
                || doc.named_parameters.is_some()
                || doc.input_table_types.is_some()
                || doc.input_table_names.is_some();
            if has_rebind {
                return Err(DbError::serialization(
                    "Document has both encoded state and rebind parameters",
                )
                .with_field("function", &doc.function.name));
            }
            TableFunctionInput::default()
        } else {
            match (
                doc.parameters,
                doc.named_parameters,
                doc.input_table_types,
                doc.input_table_names,
            ) {
                (Some(positional), Some(named), Some(input_types), Some(input_names)) => {
                    TableFunctionInput {
                        positional,
                        named,
                        input_types,
                        input_names,
                    }
                }
                _ => {
                    return Err(DbError::serialization(
                        "Document is missing rebind parameters",
                    )
                    .with_field("function", &doc.function.name));
                }
            }
        };

        trace!(
            function = function.name(),
            has_serialize = doc.function.has_serialize,
            "decoding scan document"
        );

        let persisted = if doc.function.has_serialize {
            let state = doc.function.state.as_deref().ok_or_else(|| {
                DbError::serialization("Document is missing encoded bind state")
                    .with_field("function", &doc.function.name)
            })?;
            PersistedBindState::Encoded(state)
        } else {
            PersistedBindState::Rebind(&input)
        };
        let bind_state = reconstruct_bind_state(
            context,
            function.as_ref(),
            persisted,
            &doc.returned_types,
            &doc.names,
        )?;

        let column_ids = doc
            .column_ids
            .into_iter()
            .map(column_id_from_u64)
            .collect::<Result<Vec<_>>>()?;

        Ok(LogicalScan {
            table_ref: TableRef::from(doc.table_index),
            function,
            bind_state,
            returned_types: doc.returned_types,
            names: doc.names,
            input,
            extra_info: doc.extra_info,
            column_ids,
            projection_ids: doc.projection_ids,
            table_filters: doc.table_filters,
            projected_input: doc.projected_input,
            types: Vec::new(),
        })
    }
}
