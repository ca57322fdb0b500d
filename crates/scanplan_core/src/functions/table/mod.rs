pub mod builtin;

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt::Debug;

use dyn_clone::DynClone;
use scanplan_error::{DbError, Result};

use crate::arrays::datatype::DataType;
use crate::arrays::scalar::ScalarValue;
use crate::database::DatabaseContext;
use crate::statistics::value::StatisticsValue;

/// State produced by binding a table function.
///
/// Opaque to everything except the function that produced it.
pub trait BindData: Debug + Sync + Send + DynClone + 'static {
    fn as_any(&self) -> &dyn Any;
}

dyn_clone::clone_trait_object!(BindData);

/// Implement `BindData` for concrete bind state types.
#[macro_export]
macro_rules! impl_bind_data {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::functions::table::BindData for $ty {
                fn as_any(&self) -> &dyn ::std::any::Any {
                    self
                }
            }
        )+
    };
}

/// Downcast bind data to the concrete type the function expects.
pub fn downcast_bind_data<'a, T: 'static>(
    function: &dyn TableFunction,
    data: &'a dyn BindData,
) -> Result<&'a T> {
    data.as_any().downcast_ref::<T>().ok_or_else(|| {
        DbError::internal("Unexpected bind data for table function")
            .with_field("function", function.name())
            .with_field("expected", std::any::type_name::<T>())
    })
}

/// Whether a function only produces rows, or also consumes rows from a
/// child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableFunctionKind {
    Scan,
    InOut,
}

/// Arguments a table function was called with.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableFunctionInput {
    /// Unnamed positional arguments.
    pub positional: Vec<ScalarValue>,
    /// Named arguments.
    pub named: BTreeMap<String, ScalarValue>,
    /// Types of the input table (in/out functions only).
    pub input_types: Vec<DataType>,
    /// Names of the input table (in/out functions only).
    pub input_names: Vec<String>,
}

impl TableFunctionInput {
    pub fn positional(args: impl IntoIterator<Item = ScalarValue>) -> Self {
        TableFunctionInput {
            positional: args.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn with_named(mut self, name: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        self.named.insert(name.into(), value.into());
        self
    }

    pub fn with_input_table(mut self, types: Vec<DataType>, names: Vec<String>) -> Self {
        self.input_types = types;
        self.input_names = names;
        self
    }
}

/// The result of binding a table function.
#[derive(Debug)]
pub struct TableFunctionBindState {
    pub state: Box<dyn BindData>,
    /// All types the function can produce.
    pub types: Vec<DataType>,
    /// Names for each of the types.
    pub names: Vec<String>,
}

pub trait TableFunctionBinder: Debug + Sync + Send {
    /// Bind the function for the given input.
    ///
    /// This may do I/O (e.g. reading file metadata) and may block.
    fn bind(
        &self,
        context: &DatabaseContext,
        input: &TableFunctionInput,
    ) -> Result<TableFunctionBindState>;
}

/// Encodes and decodes the bind state for a function.
///
/// Functions that provide a codec are persisted with their encoded state and
/// don't need to be bound again when a plan is loaded.
pub trait BindStateCodec: Debug + Sync + Send {
    fn encode_state(&self, state: &dyn BindData, buf: &mut Vec<u8>) -> Result<()>;
    fn decode_state(&self, buf: &[u8]) -> Result<Box<dyn BindData>>;
}

/// A source of rows in a plan.
///
/// Every capability beyond `name` is optional.
pub trait TableFunction: Debug + Sync + Send {
    /// Name of the function as registered.
    fn name(&self) -> &'static str;

    fn kind(&self) -> TableFunctionKind {
        TableFunctionKind::Scan
    }

    /// Returns the binder if this function can be bound from its arguments.
    fn binder(&self) -> Option<&dyn TableFunctionBinder> {
        None
    }

    /// Returns the codec if this function can persist its own bind state.
    fn state_codec(&self) -> Option<&dyn BindStateCodec> {
        None
    }

    /// Estimate the number of rows this function will produce.
    fn cardinality(&self, _context: &DatabaseContext, _state: &dyn BindData) -> StatisticsValue<usize> {
        StatisticsValue::Unknown
    }

    /// Extra human readable info about the bound function.
    fn to_display_string(&self, _state: &dyn BindData) -> Option<String> {
        None
    }

    /// Name of the catalog table this function reads, if any.
    fn backing_table(&self, _state: &dyn BindData) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::table::builtin::generate_series::{
        GenerateSeries,
        GenerateSeriesBindState,
    };
    use crate::functions::table::builtin::repeat::RepeatBindState;

    #[test]
    fn downcast_matching_type() {
        let state: Box<dyn BindData> = Box::new(GenerateSeriesBindState {
            start: 1,
            stop: 3,
            step: 1,
        });
        let got: &GenerateSeriesBindState =
            downcast_bind_data(&GenerateSeries, state.as_ref()).unwrap();
        assert_eq!(3, got.stop);
    }

    #[test]
    fn downcast_wrong_type() {
        let state: Box<dyn BindData> = Box::new(GenerateSeriesBindState {
            start: 1,
            stop: 3,
            step: 1,
        });
        let err = downcast_bind_data::<RepeatBindState>(&GenerateSeries, state.as_ref())
            .unwrap_err();
        assert_eq!(scanplan_error::ErrorKind::Internal, err.kind());
    }

    #[test]
    fn cloned_bind_data_keeps_type() {
        let state: Box<dyn BindData> = Box::new(GenerateSeriesBindState {
            start: 1,
            stop: 3,
            step: 1,
        });
        let cloned = state.clone();
        assert!(cloned.as_ref().as_any().is::<GenerateSeriesBindState>());
    }
}
