pub mod document;
pub mod proto;
pub(crate) mod rebind;

use std::sync::Arc;

use scanplan_error::{DbError, Result};
use serde::{Deserialize, Serialize};

use super::binding::{ColumnBinding, TableRef};
use super::operator::{LogicalNode, LogicalOperator, Node};
use crate::arrays::datatype::DataType;
use crate::config::session::SessionConfig;
use crate::database::DatabaseContext;
use crate::explain::explainable::{ColumnIndexes, ExplainConfig, ExplainEntry, Explainable};
use crate::functions::table::{
    BindData,
    TableFunction,
    TableFunctionBindState,
    TableFunctionInput,
    TableFunctionKind,
};
use crate::storage::table_filter::{TableFilter, TableFilterSet};

/// Column id referencing the synthetic row identifier instead of a column
/// produced by the source.
pub const ROW_ID_COLUMN: usize = usize::MAX;

/// Display name used for the row id column.
pub const ROW_ID_COLUMN_NAME: &str = "rowid";

/// Line separating filters from extra info in the params string.
pub const INFO_SEPARATOR: &str = "[INFOSEPARATOR]";

/// Extra info attached by the planner that isn't interpreted by the scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraOperatorInfo {
    /// Filters applied on file names (e.g. for globbed scans).
    pub file_filters: String,
}

/// Scan from a table function.
///
/// Column selection works in two levels. `column_ids` index into the types
/// the function can produce and select the columns actually read, and
/// `projection_ids` index into `column_ids` and select the columns exposed to
/// the rest of the plan. Filters are keyed by index into `column_ids`.
///
/// In/out functions may have a single child. Columns from the child are
/// appended to the output according to `projected_input`.
#[derive(Debug, Clone)]
pub struct LogicalScan {
    /// Table ref for the output of this scan.
    pub table_ref: TableRef,
    pub function: Arc<dyn TableFunction>,
    pub bind_state: Box<dyn BindData>,
    /// All types the function can produce.
    pub returned_types: Vec<DataType>,
    /// Names for all types the function can produce.
    pub names: Vec<String>,
    /// Arguments the function was bound with.
    ///
    /// Only used for persisting plans with functions that can't encode their
    /// own bind state.
    pub input: TableFunctionInput,
    pub extra_info: ExtraOperatorInfo,
    column_ids: Vec<usize>,
    projection_ids: Vec<usize>,
    table_filters: TableFilterSet,
    projected_input: Vec<usize>,
    /// Resolved output types.
    types: Vec<DataType>,
}

impl LogicalScan {
    pub fn new(
        table_ref: impl Into<TableRef>,
        function: Arc<dyn TableFunction>,
        bind: TableFunctionBindState,
        input: TableFunctionInput,
    ) -> Self {
        LogicalScan {
            table_ref: table_ref.into(),
            function,
            bind_state: bind.state,
            returned_types: bind.types,
            names: bind.names,
            input,
            extra_info: ExtraOperatorInfo::default(),
            column_ids: Vec::new(),
            projection_ids: Vec::new(),
            table_filters: TableFilterSet::default(),
            projected_input: Vec::new(),
            types: Vec::new(),
        }
    }

    /// Bind the function with the given input and create a scan from it.
    pub fn bind(
        context: &DatabaseContext,
        table_ref: impl Into<TableRef>,
        function: Arc<dyn TableFunction>,
        input: TableFunctionInput,
    ) -> Result<Self> {
        let bind = {
            let binder = function.binder().ok_or_else(|| {
                DbError::invalid_input("Table function cannot be bound")
                    .with_field("function", function.name())
            })?;
            binder.bind(context, &input)?
        };
        Ok(Self::new(table_ref, function, bind, input))
    }

    pub fn column_ids(&self) -> &[usize] {
        &self.column_ids
    }

    pub fn projection_ids(&self) -> &[usize] {
        &self.projection_ids
    }

    pub fn table_filters(&self) -> &TableFilterSet {
        &self.table_filters
    }

    pub fn projected_input(&self) -> &[usize] {
        &self.projected_input
    }

    /// Set the columns to read from the function.
    ///
    /// Existing projections and filters must still point to valid columns.
    pub fn set_column_ids(&mut self, column_ids: Vec<usize>) -> Result<()> {
        if let Some(&id) = column_ids
            .iter()
            .find(|&&id| id != ROW_ID_COLUMN && id >= self.returned_types.len())
        {
            return Err(DbError::invalid_input("Column id out of range")
                .with_field("column_id", id)
                .with_field("num_columns", self.returned_types.len()));
        }
        check_indexes("Projection id", &self.projection_ids, column_ids.len())?;
        if let Some(max) = self.table_filters.max_column_index() {
            check_indexes("Filter column index", &[max], column_ids.len())?;
        }

        self.column_ids = column_ids;
        Ok(())
    }

    /// Set which of the read columns get projected out of the scan.
    pub fn set_projection_ids(&mut self, projection_ids: Vec<usize>) -> Result<()> {
        check_indexes("Projection id", &projection_ids, self.column_ids.len())?;
        self.projection_ids = projection_ids;
        Ok(())
    }

    /// Push a filter on a column being read.
    ///
    /// Filters on the same column are combined with AND.
    pub fn push_filter(&mut self, column_index: usize, filter: TableFilter) -> Result<()> {
        check_indexes("Filter column index", &[column_index], self.column_ids.len())?;
        self.table_filters.push_filter(column_index, filter);
        Ok(())
    }

    /// Output types, only valid after types have been resolved.
    pub fn types(&self) -> &[DataType] {
        &self.types
    }

    /// Name of the catalog table backing this scan, if any.
    pub fn source_table(&self) -> Option<String> {
        self.function.backing_table(self.bind_state.as_ref())
    }

    /// Name of the operator, optionally with the table ref appended.
    pub fn display_name(&self, print_bindings: bool) -> String {
        let name = self.function.name().to_uppercase();
        if print_bindings {
            format!("{name} {}", self.table_ref)
        } else {
            name
        }
    }

    /// Human readable parameters of the scan.
    ///
    /// One line per filter, file filters after a separator, then anything
    /// the function wants to show.
    pub fn params_to_string(&self) -> String {
        let mut lines = self.filter_strings();

        if !self.extra_info.file_filters.is_empty() {
            lines.push(INFO_SEPARATOR.to_string());
            lines.push(format!("File Filters: {}", self.extra_info.file_filters));
        }

        if let Some(s) = self.function.to_display_string(self.bind_state.as_ref()) {
            lines.push(s);
        }

        lines.join("\n")
    }

    /// Get the display name for a read column.
    fn column_name(&self, column_index: usize) -> Option<&str> {
        match *self.column_ids.get(column_index)? {
            ROW_ID_COLUMN => Some(ROW_ID_COLUMN_NAME),
            id => self.names.get(id).map(|s| s.as_str()),
        }
    }

    /// Filters rendered against their column names. Filters on columns that
    /// don't exist are skipped.
    fn filter_strings(&self) -> Vec<String> {
        self.table_filters
            .iter()
            .filter_map(|(idx, filter)| {
                self.column_name(*idx)
                    .map(|name| filter.to_column_string(name))
            })
            .collect()
    }

    fn datatype_for_column_id(&self, id: usize) -> Result<DataType> {
        if id == ROW_ID_COLUMN {
            return Ok(DataType::RowId);
        }
        self.returned_types.get(id).cloned().ok_or_else(|| {
            DbError::internal("Column id out of range")
                .with_field("column_id", id)
                .with_field("num_columns", self.returned_types.len())
        })
    }
}

fn check_indexes(what: &str, indexes: &[usize], len: usize) -> Result<()> {
    match indexes.iter().find(|&&idx| idx >= len) {
        Some(idx) => Err(DbError::invalid_input(format!("{what} out of range"))
            .with_field("index", idx)
            .with_field("len", len)),
        None => Ok(()),
    }
}

impl Node<LogicalScan> {
    /// Set the input to an in/out function, along with which of the input's
    /// columns get appended to the output.
    pub fn set_child(&mut self, child: LogicalOperator, projected_input: Vec<usize>) -> Result<()> {
        if self.node.function.kind() != TableFunctionKind::InOut {
            return Err(DbError::invalid_input(
                "Only in/out table functions can have an input",
            )
            .with_field("function", self.node.function.name()));
        }
        let num_bindings = child.get_column_bindings()?.len();
        check_indexes("Projected input", &projected_input, num_bindings)?;

        self.children = vec![child];
        self.node.projected_input = projected_input;
        Ok(())
    }

    /// Check that all stored indexes are in range.
    pub fn verify(&self) -> Result<()> {
        let scan = &self.node;
        if let Some(&id) = scan
            .column_ids
            .iter()
            .find(|&&id| id != ROW_ID_COLUMN && id >= scan.returned_types.len())
        {
            return Err(DbError::invalid_input("Column id out of range")
                .with_field("column_id", id)
                .with_field("num_columns", scan.returned_types.len()));
        }
        check_indexes("Projection id", &scan.projection_ids, scan.column_ids.len())?;
        if let Some(max) = scan.table_filters.max_column_index() {
            check_indexes("Filter column index", &[max], scan.column_ids.len())?;
        }

        if !self.children.is_empty() && scan.function.kind() != TableFunctionKind::InOut {
            return Err(DbError::invalid_input("Only in/out table functions can have an input")
                .with_field("function", scan.function.name()));
        }
        if !scan.projected_input.is_empty() {
            let child = self.get_one_child_exact()?;
            let num_bindings = child.get_column_bindings()?.len();
            check_indexes("Projected input", &scan.projected_input, num_bindings)?;
        }

        Ok(())
    }
}

impl LogicalNode for Node<LogicalScan> {
    fn name(&self, config: &SessionConfig) -> String {
        self.node.display_name(config.debug_print_bindings)
    }

    fn get_table_refs(&self) -> Vec<TableRef> {
        vec![self.node.table_ref]
    }

    fn get_column_bindings(&self) -> Result<Vec<ColumnBinding>> {
        let scan = &self.node;
        if scan.column_ids.is_empty() {
            return Ok(vec![ColumnBinding::new(scan.table_ref, 0)]);
        }

        let mut bindings: Vec<_> = if scan.projection_ids.is_empty() {
            (0..scan.column_ids.len())
                .map(|idx| ColumnBinding::new(scan.table_ref, idx))
                .collect()
        } else {
            scan.projection_ids
                .iter()
                .map(|&idx| ColumnBinding::new(scan.table_ref, idx))
                .collect()
        };

        if !scan.projected_input.is_empty() {
            let child_bindings = self.get_one_child_exact()?.get_column_bindings()?;
            for &entry in &scan.projected_input {
                let binding = child_bindings.get(entry).ok_or_else(|| {
                    DbError::internal("Projected input out of range")
                        .with_field("index", entry)
                        .with_field("len", child_bindings.len())
                })?;
                bindings.push(*binding);
            }
        }

        Ok(bindings)
    }

    fn resolve_types(&mut self) -> Result<()> {
        if self.node.column_ids.is_empty() {
            self.node.column_ids.push(ROW_ID_COLUMN);
        }
        let scan = &self.node;

        let mut types = Vec::with_capacity(scan.column_ids.len() + scan.projected_input.len());
        if scan.projection_ids.is_empty() {
            for &id in &scan.column_ids {
                types.push(scan.datatype_for_column_id(id)?);
            }
        } else {
            for &proj in &scan.projection_ids {
                let id = *scan.column_ids.get(proj).ok_or_else(|| {
                    DbError::internal("Projection id out of range")
                        .with_field("index", proj)
                        .with_field("len", scan.column_ids.len())
                })?;
                types.push(scan.datatype_for_column_id(id)?);
            }
        }

        if !scan.projected_input.is_empty() {
            let child_types = self.get_one_child_exact()?.types();
            for &entry in &scan.projected_input {
                let datatype = child_types.get(entry).ok_or_else(|| {
                    DbError::internal("Projected input out of range for child types")
                        .with_field("index", entry)
                        .with_field("len", child_types.len())
                })?;
                types.push(datatype.clone());
            }
        }

        self.node.types = types;
        Ok(())
    }

    fn types(&self) -> &[DataType] {
        &self.node.types
    }

    fn estimate_cardinality(&self, context: &DatabaseContext) -> usize {
        if let Some(&pinned) = self.estimated_cardinality.value() {
            return pinned;
        }
        self.node
            .function
            .cardinality(context, self.node.bind_state.as_ref())
            .value()
            .map(|&v| v.max(1))
            .unwrap_or(1)
    }

    fn params_to_string(&self) -> String {
        self.node.params_to_string()
    }
}

impl Explainable for LogicalScan {
    fn explain_entry(&self, conf: ExplainConfig) -> ExplainEntry {
        let column_names = self
            .column_ids
            .iter()
            .map(|&id| match id {
                ROW_ID_COLUMN => ROW_ID_COLUMN_NAME,
                id => self.names.get(id).map(|s| s.as_str()).unwrap_or("?"),
            });

        let mut ent = ExplainEntry::new(self.display_name(conf.print_bindings))
            .with_value("function", self.function.name())
            .with_values("column_names", column_names);

        let filters = self.filter_strings();
        if !filters.is_empty() {
            ent = ent.with_values("filters", filters);
        }
        if !self.extra_info.file_filters.is_empty() {
            ent = ent.with_value("file_filters", &self.extra_info.file_filters);
        }
        ent = ent
            .with_optional_value("source", self.function.to_display_string(self.bind_state.as_ref()))
            .with_optional_value("table", self.source_table());

        if conf.verbose {
            ent = ent
                .with_value("table_ref", self.table_ref)
                .with_value("column_ids", ColumnIndexes(&self.column_ids))
                .with_value("projection_ids", ColumnIndexes(&self.projection_ids));
            if !self.projected_input.is_empty() {
                ent = ent.with_value("projected_input", ColumnIndexes(&self.projected_input));
            }
        }

        ent
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::arrays::scalar::ScalarValue;
    use crate::logical::logical_expression_list::LogicalExpressionList;
    use crate::statistics::value::StatisticsValue;
    use crate::storage::table_filter::ComparisonOperator;
    use crate::testutil::{OpaqueSource, TableScanMock, test_db_context};

    fn series_scan(table_ref: usize) -> Node<LogicalScan> {
        let context = test_db_context();
        let function = context
            .registry()
            .try_get_table_function("generate_series")
            .unwrap();
        let input = TableFunctionInput::positional([1_i64.into(), 10_i64.into()]);
        Node::new(LogicalScan::bind(&context, table_ref, function, input).unwrap())
    }

    fn table_scan(table_ref: usize) -> Node<LogicalScan> {
        Node::new(TableScanMock::scan(table_ref, "items"))
    }

    #[test]
    fn empty_column_ids_resolves_to_row_id() {
        let mut node = series_scan(3);
        assert_eq!(vec![ColumnBinding::new(3, 0)], node.get_column_bindings().unwrap());

        node.resolve_types().unwrap();
        assert_eq!(&[ROW_ID_COLUMN], node.node.column_ids());
        assert_eq!(&[DataType::RowId], node.types());
        assert_eq!(vec![ColumnBinding::new(3, 0)], node.get_column_bindings().unwrap());

        // Sentinel only inserted once.
        node.resolve_types().unwrap();
        assert_eq!(&[ROW_ID_COLUMN], node.node.column_ids());
        assert_eq!(1, node.types().len());
    }

    #[test]
    fn resolve_is_idempotent() {
        let mut node = table_scan(1);
        node.node.set_column_ids(vec![2, 0, ROW_ID_COLUMN]).unwrap();
        node.node.set_projection_ids(vec![2, 0]).unwrap();

        node.resolve_types().unwrap();
        let types = node.types().to_vec();
        let bindings = node.get_column_bindings().unwrap();

        node.resolve_types().unwrap();
        assert_eq!(types, node.types());
        assert_eq!(bindings, node.get_column_bindings().unwrap());

        assert_eq!(vec![DataType::RowId, DataType::Float64], types);
        assert_eq!(
            vec![ColumnBinding::new(1, 2), ColumnBinding::new(1, 0)],
            bindings
        );
    }

    #[test]
    fn unprojected_bindings_are_positional() {
        let mut node = table_scan(4);
        node.node.set_column_ids(vec![1, 2]).unwrap();
        node.resolve_types().unwrap();

        assert_eq!(vec![DataType::Utf8, DataType::Float64], node.types());
        assert_eq!(
            vec![ColumnBinding::new(4, 0), ColumnBinding::new(4, 1)],
            node.get_column_bindings().unwrap()
        );
    }

    #[rstest]
    #[case(vec![0, 1], vec![2])]
    #[case(vec![0], vec![1])]
    #[case(vec![], vec![0])]
    fn projection_out_of_range_rejected(
        #[case] column_ids: Vec<usize>,
        #[case] projection_ids: Vec<usize>,
    ) {
        let mut node = table_scan(1);
        node.node.set_column_ids(column_ids).unwrap();
        let err = node.node.set_projection_ids(projection_ids).unwrap_err();
        assert_eq!(scanplan_error::ErrorKind::InvalidInput, err.kind());
    }

    #[test]
    fn shrinking_column_ids_with_projection_rejected() {
        let mut node = table_scan(1);
        node.node.set_column_ids(vec![0, 1, 2]).unwrap();
        node.node.set_projection_ids(vec![2]).unwrap();
        assert!(node.node.set_column_ids(vec![0]).is_err());
        // Unchanged after failure.
        assert_eq!(&[0, 1, 2], node.node.column_ids());
    }

    #[test]
    fn column_id_out_of_range_rejected() {
        let mut node = table_scan(1);
        assert!(node.node.set_column_ids(vec![3]).is_err());
    }

    #[test]
    fn filter_out_of_range_rejected() {
        let mut node = table_scan(1);
        node.node.set_column_ids(vec![0]).unwrap();
        let filter = TableFilter::constant(ComparisonOperator::Gt, 5_i64);
        assert!(node.node.push_filter(1, filter).is_err());
    }

    fn in_out_scan(context: &DatabaseContext) -> Node<LogicalScan> {
        let function = context
            .registry()
            .try_get_table_function("enumerate")
            .unwrap();
        let input = TableFunctionInput::default().with_input_table(
            vec![DataType::Int64, DataType::Utf8, DataType::Boolean],
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
        );
        Node::new(LogicalScan::bind(context, 6, function, input).unwrap())
    }

    fn expression_list_child() -> LogicalOperator {
        LogicalOperator::ExpressionList(Node::new(
            LogicalExpressionList::try_new(
                5,
                vec![DataType::Int64, DataType::Utf8, DataType::Boolean],
                vec![vec![1_i64.into(), "x".into(), true.into()]],
            )
            .unwrap(),
        ))
    }

    #[test]
    fn in_out_appends_child_columns() {
        let context = test_db_context();
        let mut node = in_out_scan(&context);
        node.node.set_column_ids(vec![0]).unwrap();
        node.set_child(expression_list_child(), vec![2, 0]).unwrap();

        node.resolve_types().unwrap();
        assert_eq!(
            vec![
                ColumnBinding::new(6, 0),
                ColumnBinding::new(5, 2),
                ColumnBinding::new(5, 0),
            ],
            node.get_column_bindings().unwrap()
        );
        assert_eq!(
            vec![DataType::Int64, DataType::Boolean, DataType::Int64],
            node.types()
        );
    }

    #[test]
    fn in_out_projection_out_of_range() {
        let context = test_db_context();
        let mut node = in_out_scan(&context);
        let err = node.set_child(expression_list_child(), vec![3]).unwrap_err();
        assert_eq!(scanplan_error::ErrorKind::InvalidInput, err.kind());
        assert!(node.children.is_empty());
    }

    #[test]
    fn child_on_scan_function_rejected() {
        let mut node = series_scan(1);
        assert!(node.set_child(expression_list_child(), vec![0]).is_err());
    }

    #[test]
    fn projected_input_without_child_is_internal_error() {
        let context = test_db_context();
        let mut node = in_out_scan(&context);
        node.node.set_column_ids(vec![0]).unwrap();
        node.set_child(expression_list_child(), vec![1]).unwrap();
        node.children.clear();

        let err = node.resolve_types().unwrap_err();
        assert_eq!(scanplan_error::ErrorKind::Internal, err.kind());
        let err = node.get_column_bindings().unwrap_err();
        assert_eq!(scanplan_error::ErrorKind::Internal, err.kind());
    }

    #[test]
    fn cardinality_pinned() {
        let context = test_db_context();
        let mut node = series_scan(1);
        assert_eq!(10, node.estimate_cardinality(&context));

        node.estimated_cardinality = StatisticsValue::Estimated(42);
        assert_eq!(42, node.estimate_cardinality(&context));
    }

    #[test]
    fn cardinality_defaults_to_one() {
        let context = test_db_context();
        let node = Node::new(OpaqueSource::scan(1));
        assert_eq!(1, node.estimate_cardinality(&context));
    }

    #[test]
    fn cardinality_never_zero_from_source() {
        let context = test_db_context();
        let function = context.registry().try_get_table_function("repeat").unwrap();
        let input = TableFunctionInput::positional([ScalarValue::Null, 0_i64.into()]);
        let node = Node::new(LogicalScan::bind(&context, 1, function, input).unwrap());
        assert_eq!(1, node.estimate_cardinality(&context));
    }

    #[test]
    fn params_string_ordering() {
        let mut node = table_scan(1);
        node.node.set_column_ids(vec![0, 1]).unwrap();
        node.node.names = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        node.node
            .push_filter(1, TableFilter::constant(ComparisonOperator::Eq, "x"))
            .unwrap();
        node.node
            .push_filter(0, TableFilter::constant(ComparisonOperator::Gt, 5_i64))
            .unwrap();
        node.node.extra_info.file_filters = "*.parquet".to_string();

        let expected = [
            "a>5",
            "b='x'",
            INFO_SEPARATOR,
            "File Filters: *.parquet",
            "Table: items",
        ]
        .join("\n");
        assert_eq!(expected, node.params_to_string());
    }

    #[test]
    fn params_string_omits_empty_sections() {
        let node = Node::new(OpaqueSource::scan(1));
        assert_eq!("", node.params_to_string());

        let node = series_scan(1);
        assert_eq!("Range: 1 to 10 (step 1)", node.params_to_string());
    }

    #[test]
    fn params_string_skips_out_of_range_filter() {
        let mut node = table_scan(1);
        node.node.set_column_ids(vec![0, 1]).unwrap();
        node.node.push_filter(1, TableFilter::IsNull).unwrap();
        // Bypass the checked setter to simulate a stale filter.
        node.node.column_ids = vec![0];
        assert_eq!("Table: items", node.params_to_string());
    }

    #[test]
    fn params_string_row_id_filter() {
        let mut node = table_scan(1);
        node.node.set_column_ids(vec![ROW_ID_COLUMN]).unwrap();
        node.node.push_filter(0, TableFilter::IsNotNull).unwrap();
        assert_eq!("rowid IS NOT NULL\nTable: items", node.params_to_string());
    }

    #[test]
    fn display_name() {
        let node = series_scan(7);
        let mut config = SessionConfig::default();
        assert_eq!("GENERATE_SERIES", node.name(&config));

        config.debug_print_bindings = true;
        assert_eq!("GENERATE_SERIES #7", node.name(&config));
    }

    #[test]
    fn source_table() {
        assert_eq!(Some("items".to_string()), table_scan(1).node.source_table());
        assert_eq!(None, series_scan(1).node.source_table());
    }

    #[test]
    fn explain_entry_verbose() {
        let mut node = table_scan(2);
        node.node.set_column_ids(vec![0, ROW_ID_COLUMN]).unwrap();
        node.node.set_projection_ids(vec![1]).unwrap();

        let ent = node.node.explain_entry(ExplainConfig {
            verbose: true,
            print_bindings: false,
        });
        assert_eq!(
            "SEQ_SCAN (column_ids = #0, #rowid, column_names = [id, rowid], function = seq_scan, projection_ids = #1, source = Table: items, table = items, table_ref = #2)",
            ent.to_string()
        );
    }

    #[test]
    fn bind_without_binder() {
        let context = test_db_context();
        let err = LogicalScan::bind(
            &context,
            1,
            Arc::new(OpaqueSource),
            TableFunctionInput::default(),
        )
        .unwrap_err();
        assert_eq!(scanplan_error::ErrorKind::InvalidInput, err.kind());
    }
}
