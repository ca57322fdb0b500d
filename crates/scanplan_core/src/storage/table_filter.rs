//! Filters pushed down into a scan.
//!
//! A filter only knows how to check a single column. Which column it applies
//! to is determined by its key in the `TableFilterSet`.

use std::collections::BTreeMap;
use std::fmt;

use scanplan_error::{DbError, OptionExt, Result};
use scanplan_proto::messages::filter::ComparisonOperator as ProtoComparisonOperator;
use scanplan_proto::messages::filter::table_filter::Value as ProtoFilterValue;
use scanplan_proto::messages::schema::EmptyMeta;
use scanplan_proto::{ProtoConv, from_proto_vec, index_from_u64, to_proto_vec};
use serde::{Deserialize, Serialize};

use crate::arrays::scalar::ScalarValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOperator {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eq => write!(f, "="),
            Self::NotEq => write!(f, "!="),
            Self::Lt => write!(f, "<"),
            Self::LtEq => write!(f, "<="),
            Self::Gt => write!(f, ">"),
            Self::GtEq => write!(f, ">="),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TableFilter {
    /// Compare the column against a constant.
    Constant {
        op: ComparisonOperator,
        value: ScalarValue,
    },
    IsNull,
    IsNotNull,
    And(Vec<TableFilter>),
    Or(Vec<TableFilter>),
}

impl TableFilter {
    pub fn constant(op: ComparisonOperator, value: impl Into<ScalarValue>) -> Self {
        TableFilter::Constant {
            op,
            value: value.into(),
        }
    }

    /// Format this filter as applied to the given column.
    pub fn to_column_string(&self, column_name: &str) -> String {
        match self {
            Self::Constant { op, value } => format!("{column_name}{op}{value}"),
            Self::IsNull => format!("{column_name} IS NULL"),
            Self::IsNotNull => format!("{column_name} IS NOT NULL"),
            Self::And(children) => Self::join_children(children, column_name, " AND "),
            Self::Or(children) => Self::join_children(children, column_name, " OR "),
        }
    }

    fn join_children(children: &[TableFilter], column_name: &str, sep: &str) -> String {
        children
            .iter()
            .map(|child| child.to_column_string(column_name))
            .collect::<Vec<_>>()
            .join(sep)
    }
}

impl ProtoConv for TableFilter {
    type ProtoType = scanplan_proto::messages::filter::TableFilter;

    fn to_proto(&self) -> Result<Self::ProtoType> {
        use scanplan_proto::messages::filter::{ConjunctionFilter, ConstantFilter};

        let value = match self {
            Self::Constant { op, value } => ProtoFilterValue::Constant(ConstantFilter {
                op: op.to_proto()? as i32,
                value: Some(value.to_proto()?),
            }),
            Self::IsNull => ProtoFilterValue::IsNull(EmptyMeta {}),
            Self::IsNotNull => ProtoFilterValue::IsNotNull(EmptyMeta {}),
            Self::And(children) => ProtoFilterValue::And(ConjunctionFilter {
                children: to_proto_vec(children)?,
            }),
            Self::Or(children) => ProtoFilterValue::Or(ConjunctionFilter {
                children: to_proto_vec(children)?,
            }),
        };

        Ok(Self::ProtoType { value: Some(value) })
    }

    fn from_proto(proto: Self::ProtoType) -> Result<Self> {
        Ok(match proto.value.required("table filter")? {
            ProtoFilterValue::Constant(constant) => {
                let op = ProtoComparisonOperator::try_from(constant.op).map_err(|_| {
                    DbError::serialization("Unknown comparison operator")
                        .with_field("op", constant.op)
                })?;
                Self::Constant {
                    op: ComparisonOperator::from_proto(op)?,
                    value: ScalarValue::from_proto(constant.value.required("constant value")?)?,
                }
            }
            ProtoFilterValue::IsNull(_) => Self::IsNull,
            ProtoFilterValue::IsNotNull(_) => Self::IsNotNull,
            ProtoFilterValue::And(conj) => Self::And(from_proto_vec(conj.children)?),
            ProtoFilterValue::Or(conj) => Self::Or(from_proto_vec(conj.children)?),
        })
    }
}

impl ProtoConv for ComparisonOperator {
    type ProtoType = ProtoComparisonOperator;

    fn to_proto(&self) -> Result<Self::ProtoType> {
        Ok(match self {
            Self::Eq => ProtoComparisonOperator::Eq,
            Self::NotEq => ProtoComparisonOperator::NotEq,
            Self::Lt => ProtoComparisonOperator::Lt,
            Self::LtEq => ProtoComparisonOperator::LtEq,
            Self::Gt => ProtoComparisonOperator::Gt,
            Self::GtEq => ProtoComparisonOperator::GtEq,
        })
    }

    fn from_proto(proto: Self::ProtoType) -> Result<Self> {
        Ok(match proto {
            ProtoComparisonOperator::InvalidComparisonOperator => {
                return Err(DbError::serialization("Invalid comparison operator"));
            }
            ProtoComparisonOperator::Eq => Self::Eq,
            ProtoComparisonOperator::NotEq => Self::NotEq,
            ProtoComparisonOperator::Lt => Self::Lt,
            ProtoComparisonOperator::LtEq => Self::LtEq,
            ProtoComparisonOperator::Gt => Self::Gt,
            ProtoComparisonOperator::GtEq => Self::GtEq,
        })
    }
}

/// Filters keyed by an index into a scan's column ids.
///
/// Ordered by key so that formatting is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableFilterSet {
    pub filters: BTreeMap<usize, TableFilter>,
}

impl TableFilterSet {
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Add a filter for a column.
    ///
    /// If the column already has a filter, the two are combined with AND.
    pub fn push_filter(&mut self, column_index: usize, filter: TableFilter) {
        match self.filters.remove(&column_index) {
            Some(TableFilter::And(mut children)) => {
                children.push(filter);
                self.filters.insert(column_index, TableFilter::And(children));
            }
            Some(existing) => {
                self.filters
                    .insert(column_index, TableFilter::And(vec![existing, filter]));
            }
            None => {
                self.filters.insert(column_index, filter);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&usize, &TableFilter)> {
        self.filters.iter()
    }

    /// Largest column index referenced by a filter.
    pub fn max_column_index(&self) -> Option<usize> {
        self.filters.keys().next_back().copied()
    }
}

impl ProtoConv for TableFilterSet {
    type ProtoType = scanplan_proto::messages::filter::TableFilterSet;

    fn to_proto(&self) -> Result<Self::ProtoType> {
        let filters = self
            .filters
            .iter()
            .map(|(idx, filter)| {
                Ok(scanplan_proto::messages::filter::TableFilterEntry {
                    column_index: *idx as u64,
                    filter: Some(filter.to_proto()?),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::ProtoType { filters })
    }

    fn from_proto(proto: Self::ProtoType) -> Result<Self> {
        let mut filters = BTreeMap::new();
        for entry in proto.filters {
            let filter = TableFilter::from_proto(entry.filter.required("filter")?)?;
            if filters.insert(index_from_u64(entry.column_index)?, filter).is_some() {
                return Err(DbError::serialization("Duplicate filter for column")
                    .with_field("column_index", entry.column_index));
            }
        }
        Ok(TableFilterSet { filters })
    }
}
