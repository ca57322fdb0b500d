//! Named-property form of a logical plan.

use scanplan_error::{ErrorKind, Result};
use serde::{Deserialize, Serialize};

use super::logical_expression_list::LogicalExpressionList;
use super::logical_scan::LogicalScan;
use super::logical_scan::document::ScanDocument;
use super::operator::{LogicalOperator, Node};
use crate::database::DatabaseContext;
use crate::statistics::value::StatisticsValue;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeDocument {
    Scan(ScanDocument),
    ExpressionList(LogicalExpressionList),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorDocument {
    pub operator: NodeDocument,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<OperatorDocument>,
    #[serde(default)]
    pub estimated_cardinality: StatisticsValue<usize>,
}

impl LogicalOperator {
    pub fn to_document(&self) -> Result<OperatorDocument> {
        let operator = match self {
            Self::Scan(n) => NodeDocument::Scan(n.node.to_document()?),
            Self::ExpressionList(n) => NodeDocument::ExpressionList(n.node.clone()),
        };
        let children = self
            .children()
            .iter()
            .map(|child| child.to_document())
            .collect::<Result<Vec<_>>>()?;

        Ok(OperatorDocument {
            operator,
            children,
            estimated_cardinality: self.estimated_cardinality(),
        })
    }

    pub fn from_document(doc: OperatorDocument, context: &DatabaseContext) -> Result<Self> {
        let children = doc
            .children
            .into_iter()
            .map(|child| LogicalOperator::from_document(child, context))
            .collect::<Result<Vec<_>>>()?;

        let operator = match doc.operator {
            NodeDocument::Scan(scan) => LogicalOperator::Scan(Node {
                node: LogicalScan::from_document(scan, context)?,
                children,
                estimated_cardinality: doc.estimated_cardinality,
            }),
            NodeDocument::ExpressionList(list) => {
                list.check_row_widths()
                    .map_err(|e| e.with_kind(ErrorKind::Serialization))?;
                LogicalOperator::ExpressionList(Node {
                    node: list,
                    children,
                    estimated_cardinality: doc.estimated_cardinality,
                })
            }
        };

        operator
            .verify_node()
            .map_err(|e| e.with_kind(ErrorKind::Serialization))?;

        Ok(operator)
    }
}
