use scanplan_error::{DbError, Result};
use scanplan_proto::messages::logical::ExpressionRow;
use scanplan_proto::{ProtoConv, from_proto_vec, index_from_u64, to_proto_vec};
use serde::{Deserialize, Serialize};

use super::binding::{ColumnBinding, TableRef};
use super::operator::{LogicalNode, Node};
use crate::arrays::datatype::DataType;
use crate::arrays::scalar::ScalarValue;
use crate::config::session::SessionConfig;
use crate::database::DatabaseContext;
use crate::explain::explainable::{ExplainConfig, ExplainEntry, Explainable};

/// A list of constant rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicalExpressionList {
    pub table_ref: TableRef,
    pub types: Vec<DataType>,
    pub rows: Vec<Vec<ScalarValue>>,
}

impl LogicalExpressionList {
    pub fn try_new(
        table_ref: impl Into<TableRef>,
        types: Vec<DataType>,
        rows: Vec<Vec<ScalarValue>>,
    ) -> Result<Self> {
        let list = LogicalExpressionList {
            table_ref: table_ref.into(),
            types,
            rows,
        };
        list.check_row_widths()?;
        Ok(list)
    }

    pub(crate) fn check_row_widths(&self) -> Result<()> {
        if let Some(row) = self.rows.iter().find(|row| row.len() != self.types.len()) {
            return Err(DbError::invalid_input("Row width does not match number of types")
                .with_field("row", row.len())
                .with_field("types", self.types.len()));
        }
        Ok(())
    }
}

impl Explainable for LogicalExpressionList {
    fn explain_entry(&self, conf: ExplainConfig) -> ExplainEntry {
        let name = if conf.print_bindings {
            format!("EXPRESSION_LIST {}", self.table_ref)
        } else {
            "EXPRESSION_LIST".to_string()
        };
        let mut ent = ExplainEntry::new(name)
            .with_value("num_rows", self.rows.len())
            .with_values("types", &self.types);
        if conf.verbose {
            ent = ent.with_value("table_ref", self.table_ref);
        }
        ent
    }
}

impl LogicalNode for Node<LogicalExpressionList> {
    fn name(&self, config: &SessionConfig) -> String {
        if config.debug_print_bindings {
            format!("EXPRESSION_LIST {}", self.node.table_ref)
        } else {
            "EXPRESSION_LIST".to_string()
        }
    }

    fn get_table_refs(&self) -> Vec<TableRef> {
        vec![self.node.table_ref]
    }

    fn get_column_bindings(&self) -> Result<Vec<ColumnBinding>> {
        Ok((0..self.node.types.len())
            .map(|idx| ColumnBinding::new(self.node.table_ref, idx))
            .collect())
    }

    fn resolve_types(&mut self) -> Result<()> {
        // Types are fixed at construction.
        Ok(())
    }

    fn types(&self) -> &[DataType] {
        &self.node.types
    }

    fn estimate_cardinality(&self, _context: &DatabaseContext) -> usize {
        match self.estimated_cardinality.value() {
            Some(&pinned) => pinned,
            None => self.node.rows.len().max(1),
        }
    }
}

impl ProtoConv for LogicalExpressionList {
    type ProtoType = scanplan_proto::messages::logical::LogicalExpressionList;

    fn to_proto(&self) -> Result<Self::ProtoType> {
        Ok(Self::ProtoType {
            table_index: self.table_ref.table_idx as u64,
            types: to_proto_vec(&self.types)?,
            rows: self
                .rows
                .iter()
                .map(|row| {
                    Ok(ExpressionRow {
                        values: to_proto_vec(row)?,
                    })
                })
                .collect::<Result<Vec<_>>>()?,
        })
    }

    fn from_proto(proto: Self::ProtoType) -> Result<Self> {
        let list = LogicalExpressionList {
            table_ref: TableRef::from(index_from_u64(proto.table_index)?),
            types: from_proto_vec(proto.types)?,
            rows: proto
                .rows
                .into_iter()
                .map(|row| from_proto_vec(row.values))
                .collect::<Result<Vec<_>>>()?,
        };
        list.check_row_widths()
            .map_err(|e| e.with_kind(scanplan_error::ErrorKind::Serialization))?;
        Ok(list)
    }
}
