use scanplan_error::{ErrorKind, OptionExt, Result};
use scanplan_proto::ProtoConv;
use scanplan_proto::messages::logical::logical_operator::Value;

use super::logical_expression_list::LogicalExpressionList;
use super::logical_scan::LogicalScan;
use super::operator::{LogicalOperator, Node};
use crate::database::DatabaseContext;
use crate::proto::DatabaseProtoConv;
use crate::statistics::value::StatisticsValue;

impl DatabaseProtoConv for LogicalOperator {
    type ProtoType = scanplan_proto::messages::logical::LogicalOperator;

    fn to_proto_ctx(&self, context: &DatabaseContext) -> Result<Self::ProtoType> {
        let value = match self {
            Self::Scan(n) => Value::Scan(n.node.to_proto_ctx(context)?),
            Self::ExpressionList(n) => Value::ExpressionList(n.node.to_proto()?),
        };
        let children = self
            .children()
            .iter()
            .map(|child| child.to_proto_ctx(context))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::ProtoType {
            value: Some(value),
            children,
            estimated_cardinality: Some(self.estimated_cardinality().to_proto()?),
        })
    }

    fn from_proto_ctx(proto: Self::ProtoType, context: &DatabaseContext) -> Result<Self> {
        let children = proto
            .children
            .into_iter()
            .map(|child| LogicalOperator::from_proto_ctx(child, context))
            .collect::<Result<Vec<_>>>()?;
        let estimated_cardinality = match proto.estimated_cardinality {
            Some(card) => StatisticsValue::from_proto(card)?,
            None => StatisticsValue::Unknown,
        };

        let operator = match proto.value.required("logical operator")? {
            Value::Scan(scan) => LogicalOperator::Scan(Node {
                node: LogicalScan::from_proto_ctx(scan, context)?,
                children,
                estimated_cardinality,
            }),
            Value::ExpressionList(list) => LogicalOperator::ExpressionList(Node {
                node: LogicalExpressionList::from_proto(list)?,
                children,
                estimated_cardinality,
            }),
        };

        operator
            .verify_node()
            .map_err(|e| e.with_kind(ErrorKind::Serialization))?;

        Ok(operator)
    }
}
