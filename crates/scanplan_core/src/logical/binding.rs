use std::fmt;

use serde::{Deserialize, Serialize};

/// Reference to the output of a node in the plan.
///
/// Every node producing columns gets a unique table ref, and columns are
/// referenced through the (table ref, column) pair.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TableRef {
    pub table_idx: usize,
}

impl From<usize> for TableRef {
    fn from(value: usize) -> Self {
        TableRef { table_idx: value }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.table_idx)
    }
}

/// A single column in the output of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColumnBinding {
    pub table_ref: TableRef,
    pub column: usize,
}

impl ColumnBinding {
    pub fn new(table_ref: impl Into<TableRef>, column: usize) -> Self {
        ColumnBinding {
            table_ref: table_ref.into(),
            column,
        }
    }
}

impl fmt::Display for ColumnBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table_ref, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!("#5.2", ColumnBinding::new(5, 2).to_string());
    }
}
