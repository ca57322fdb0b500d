//! Utilities for tests.

use std::sync::Arc;

use scanplan_error::{DbError, Result};
use scanplan_proto::packed::{PackedDecoder, PackedEncoder};

use crate::arrays::datatype::DataType;
use crate::database::DatabaseContext;
use crate::database::registry::FunctionRegistry;
use crate::functions::table::builtin::builtin_table_functions;
use crate::functions::table::builtin::repeat::{Repeat, RepeatBindState};
use crate::functions::table::{
    BindData,
    BindStateCodec,
    TableFunction,
    TableFunctionBindState,
    TableFunctionBinder,
    TableFunctionInput,
    downcast_bind_data,
};
use crate::logical::binding::TableRef;
use crate::logical::logical_scan::LogicalScan;
use crate::statistics::value::StatisticsValue;

/// Get a database context with all builtins and the mock sources below.
pub fn test_db_context() -> DatabaseContext {
    test_db_context_with(Vec::new())
}

/// Get a database context where the given functions replace any function
/// with the same name.
pub fn test_db_context_with(overrides: Vec<Arc<dyn TableFunction>>) -> DatabaseContext {
    let mut functions = builtin_table_functions();
    functions.push(Arc::new(OpaqueSource));
    functions.push(Arc::new(TableScanMock));

    let mut registry = FunctionRegistry::default();
    for function in functions {
        if overrides.iter().any(|o| o.name() == function.name()) {
            continue;
        }
        registry.register_table_function(function).unwrap();
    }
    for function in overrides {
        registry.register_table_function(function).unwrap();
    }

    DatabaseContext::new(Arc::new(registry))
}

/// Source that can be neither bound nor have its state encoded.
#[derive(Debug, Clone, Copy)]
pub struct OpaqueSource;

#[derive(Debug, Clone)]
pub struct OpaqueState;

crate::impl_bind_data!(OpaqueState);

impl OpaqueSource {
    pub fn scan(table_ref: impl Into<TableRef>) -> LogicalScan {
        LogicalScan::new(
            table_ref,
            Arc::new(OpaqueSource),
            TableFunctionBindState {
                state: Box::new(OpaqueState),
                types: vec![DataType::Int64],
                names: vec!["a".to_string()],
            },
            TableFunctionInput::default(),
        )
    }
}

impl TableFunction for OpaqueSource {
    fn name(&self) -> &'static str {
        "opaque"
    }
}

/// Same name as `repeat`, but always binds to an Int64 column.
///
/// Simulates a function whose output changed between writing and reading a
/// plan.
#[derive(Debug, Clone, Copy)]
pub struct MutatedRepeat;

impl TableFunction for MutatedRepeat {
    fn name(&self) -> &'static str {
        "repeat"
    }

    fn binder(&self) -> Option<&dyn TableFunctionBinder> {
        Some(self)
    }
}

impl TableFunctionBinder for MutatedRepeat {
    fn bind(
        &self,
        context: &DatabaseContext,
        input: &TableFunctionInput,
    ) -> Result<TableFunctionBindState> {
        let mut bound = Repeat.bind(context, input)?;
        bound.types = vec![DataType::Int64];
        Ok(bound)
    }
}

/// Same name and types as `repeat`, but names its column differently.
#[derive(Debug, Clone, Copy)]
pub struct AliasingRepeat;

impl TableFunction for AliasingRepeat {
    fn name(&self) -> &'static str {
        "repeat"
    }

    fn binder(&self) -> Option<&dyn TableFunctionBinder> {
        Some(self)
    }
}

impl TableFunctionBinder for AliasingRepeat {
    fn bind(
        &self,
        context: &DatabaseContext,
        input: &TableFunctionInput,
    ) -> Result<TableFunctionBindState> {
        let mut bound = Repeat.bind(context, input)?;
        let state = downcast_bind_data::<RepeatBindState>(self, bound.state.as_ref())?;
        bound.names = vec![format!("repeat_{}", state.count)];
        Ok(bound)
    }
}

/// Scan of a catalog table with columns (id, name, price).
#[derive(Debug, Clone, Copy)]
pub struct TableScanMock;

#[derive(Debug, Clone, PartialEq)]
pub struct TableScanState {
    pub table: String,
}

crate::impl_bind_data!(TableScanState);

impl TableScanMock {
    pub fn scan(table_ref: impl Into<TableRef>, table: &str) -> LogicalScan {
        let input = TableFunctionInput::default().with_named("table", table);
        let bind = TableScanMock.bind(&test_db_context(), &input).unwrap();
        LogicalScan::new(table_ref, Arc::new(TableScanMock), bind, input)
    }
}

impl TableFunction for TableScanMock {
    fn name(&self) -> &'static str {
        "seq_scan"
    }

    fn binder(&self) -> Option<&dyn TableFunctionBinder> {
        Some(self)
    }

    fn state_codec(&self) -> Option<&dyn BindStateCodec> {
        Some(self)
    }

    fn cardinality(&self, _context: &DatabaseContext, _state: &dyn BindData) -> StatisticsValue<usize> {
        StatisticsValue::Estimated(100)
    }

    fn to_display_string(&self, state: &dyn BindData) -> Option<String> {
        let state = downcast_bind_data::<TableScanState>(self, state).ok()?;
        Some(format!("Table: {}", state.table))
    }

    fn backing_table(&self, state: &dyn BindData) -> Option<String> {
        let state = downcast_bind_data::<TableScanState>(self, state).ok()?;
        Some(state.table.clone())
    }
}

impl TableFunctionBinder for TableScanMock {
    fn bind(
        &self,
        _context: &DatabaseContext,
        input: &TableFunctionInput,
    ) -> Result<TableFunctionBindState> {
        let table = input
            .named
            .get("table")
            .ok_or_else(|| DbError::new("Missing table argument"))?
            .try_as_str()?;

        Ok(TableFunctionBindState {
            state: Box::new(TableScanState {
                table: table.to_string(),
            }),
            types: vec![DataType::Int64, DataType::Utf8, DataType::Float64],
            names: vec!["id".to_string(), "name".to_string(), "price".to_string()],
        })
    }
}

impl BindStateCodec for TableScanMock {
    fn encode_state(&self, state: &dyn BindData, buf: &mut Vec<u8>) -> Result<()> {
        let state = downcast_bind_data::<TableScanState>(self, state)?;
        PackedEncoder::new(buf).encode_next(&state.table)
    }

    fn decode_state(&self, buf: &[u8]) -> Result<Box<dyn BindData>> {
        let table: String = PackedDecoder::new(buf).decode_next()?;
        Ok(Box::new(TableScanState { table }))
    }
}
