use scanplan_error::{DbError, Result};

use super::binding::{ColumnBinding, TableRef};
use super::logical_expression_list::LogicalExpressionList;
use super::logical_scan::LogicalScan;
use crate::arrays::datatype::DataType;
use crate::config::session::SessionConfig;
use crate::database::DatabaseContext;
use crate::explain::explainable::{ExplainConfig, ExplainEntry, Explainable};
use crate::statistics::value::StatisticsValue;

/// Common operations across all logical nodes in a plan.
///
/// For individual operators, this should be implemented on `Node<T>` and not
/// `T`.
///
/// This is implemented on `LogicalOperator` for convenience.
pub trait LogicalNode {
    /// Name of the operator as shown in plan output.
    fn name(&self, config: &SessionConfig) -> String;

    /// Returns the table refs this operator introduces.
    fn get_table_refs(&self) -> Vec<TableRef>;

    /// Returns the columns this operator outputs, in order.
    ///
    /// Always the same length as the resolved types.
    fn get_column_bindings(&self) -> Result<Vec<ColumnBinding>>;

    /// Resolve the output types of this operator.
    ///
    /// Children need to have their types resolved first. Recomputes from
    /// scratch on every call.
    fn resolve_types(&mut self) -> Result<()>;

    /// Output types from the last call to `resolve_types`.
    fn types(&self) -> &[DataType];

    /// Estimated number of rows this operator produces.
    fn estimate_cardinality(&self, context: &DatabaseContext) -> usize;

    /// Human readable parameters for plan printing.
    fn params_to_string(&self) -> String {
        String::new()
    }
}

/// Wrapper around nodes in the logical plan holding common fields.
#[derive(Debug, Clone)]
pub struct Node<N> {
    /// Node specific logic.
    pub node: N,
    /// Inputs to this node.
    pub children: Vec<LogicalOperator>,
    /// Estimated output cardinality of this node.
    ///
    /// Starts as unknown. Optimizer rules may pin a value here, and a pinned
    /// value takes precedence over what the node would estimate itself.
    pub estimated_cardinality: StatisticsValue<usize>,
}

impl<N> Node<N> {
    pub fn new(node: N) -> Self {
        Node {
            node,
            children: Vec::new(),
            estimated_cardinality: StatisticsValue::Unknown,
        }
    }

    pub fn get_one_child_exact(&self) -> Result<&LogicalOperator> {
        if self.children.len() != 1 {
            return Err(DbError::internal(format!(
                "Expected 1 child to operator, have {}",
                self.children.len()
            )));
        }
        Ok(&self.children[0])
    }
}

#[derive(Debug, Clone)]
pub enum LogicalOperator {
    Scan(Node<LogicalScan>),
    ExpressionList(Node<LogicalExpressionList>),
}

impl LogicalOperator {
    pub fn children(&self) -> &[LogicalOperator] {
        match self {
            Self::Scan(n) => &n.children,
            Self::ExpressionList(n) => &n.children,
        }
    }

    pub fn children_mut(&mut self) -> &mut Vec<LogicalOperator> {
        match self {
            Self::Scan(n) => &mut n.children,
            Self::ExpressionList(n) => &mut n.children,
        }
    }

    pub fn estimated_cardinality(&self) -> StatisticsValue<usize> {
        match self {
            Self::Scan(n) => n.estimated_cardinality,
            Self::ExpressionList(n) => n.estimated_cardinality,
        }
    }

    /// Resolve types for this operator and all of its children, children
    /// first.
    pub fn resolve_operator_types(&mut self) -> Result<()> {
        for child in self.children_mut() {
            child.resolve_operator_types()?;
        }
        self.resolve_types()
    }

    /// Check node invariants for every operator in the plan.
    pub fn verify(&self) -> Result<()> {
        for child in self.children() {
            child.verify()?;
        }
        self.verify_node()
    }

    /// Check invariants for only this operator.
    pub(crate) fn verify_node(&self) -> Result<()> {
        match self {
            Self::Scan(n) => n.verify(),
            Self::ExpressionList(n) => {
                if !n.children.is_empty() {
                    return Err(DbError::invalid_input("Expression list cannot have children"));
                }
                Ok(())
            }
        }
    }

    pub fn explain_entry(&self, conf: ExplainConfig) -> ExplainEntry {
        match self {
            Self::Scan(n) => n.node.explain_entry(conf),
            Self::ExpressionList(n) => n.node.explain_entry(conf),
        }
    }

    /// Format the plan as an indented tree of explain entries.
    pub fn format_tree(&self, conf: ExplainConfig) -> String {
        let mut lines = Vec::new();
        self.format_tree_inner(conf, 0, &mut lines);
        lines.join("\n")
    }

    fn format_tree_inner(&self, conf: ExplainConfig, depth: usize, lines: &mut Vec<String>) {
        lines.push(format!("{}{}", "  ".repeat(depth), self.explain_entry(conf)));
        for child in self.children() {
            child.format_tree_inner(conf, depth + 1, lines);
        }
    }
}

impl LogicalNode for LogicalOperator {
    fn name(&self, config: &SessionConfig) -> String {
        match self {
            Self::Scan(n) => n.name(config),
            Self::ExpressionList(n) => n.name(config),
        }
    }

    fn get_table_refs(&self) -> Vec<TableRef> {
        match self {
            Self::Scan(n) => n.get_table_refs(),
            Self::ExpressionList(n) => n.get_table_refs(),
        }
    }

    fn get_column_bindings(&self) -> Result<Vec<ColumnBinding>> {
        match self {
            Self::Scan(n) => n.get_column_bindings(),
            Self::ExpressionList(n) => n.get_column_bindings(),
        }
    }

    fn resolve_types(&mut self) -> Result<()> {
        match self {
            Self::Scan(n) => n.resolve_types(),
            Self::ExpressionList(n) => n.resolve_types(),
        }
    }

    fn types(&self) -> &[DataType] {
        match self {
            Self::Scan(n) => n.types(),
            Self::ExpressionList(n) => n.types(),
        }
    }

    fn estimate_cardinality(&self, context: &DatabaseContext) -> usize {
        match self {
            Self::Scan(n) => n.estimate_cardinality(context),
            Self::ExpressionList(n) => n.estimate_cardinality(context),
        }
    }

    fn params_to_string(&self) -> String {
        match self {
            Self::Scan(n) => n.params_to_string(),
            Self::ExpressionList(n) => n.params_to_string(),
        }
    }
}
