use scanplan_error::{DbError, Result};

use crate::arrays::datatype::DataType;
use crate::database::DatabaseContext;
use crate::functions::table::{
    BindData,
    TableFunction,
    TableFunctionBindState,
    TableFunctionBinder,
    TableFunctionInput,
    TableFunctionKind,
    downcast_bind_data,
};

/// `enumerate(TABLE ...)`
///
/// In/out function producing an `ordinality` column for each input row.
/// Columns from the input are passed through using the scan's input
/// projection.
#[derive(Debug, Clone, Copy)]
pub struct Enumerate;

#[derive(Debug, Clone, PartialEq)]
pub struct EnumerateBindState {
    /// Ordinality of the first row.
    pub start: i64,
}

crate::impl_bind_data!(EnumerateBindState);

impl TableFunction for Enumerate {
    fn name(&self) -> &'static str {
        "enumerate"
    }

    fn kind(&self) -> TableFunctionKind {
        TableFunctionKind::InOut
    }

    fn binder(&self) -> Option<&dyn TableFunctionBinder> {
        Some(self)
    }

    fn to_display_string(&self, state: &dyn BindData) -> Option<String> {
        let state = downcast_bind_data::<EnumerateBindState>(self, state).ok()?;
        Some(format!("Start: {}", state.start))
    }
}

impl TableFunctionBinder for Enumerate {
    fn bind(
        &self,
        _context: &DatabaseContext,
        input: &TableFunctionInput,
    ) -> Result<TableFunctionBindState> {
        if input.input_types.is_empty() {
            return Err(DbError::new("enumerate requires an input table"));
        }
        if input.input_types.len() != input.input_names.len() {
            return Err(DbError::new("Input table types and names differ in length")
                .with_field("types", input.input_types.len())
                .with_field("names", input.input_names.len()));
        }
        let start = match input.named.get("start") {
            Some(start) => start.try_as_i64()?,
            None => 1,
        };

        Ok(TableFunctionBindState {
            state: Box::new(EnumerateBindState { start }),
            types: vec![DataType::Int64],
            names: vec!["ordinality".to_string()],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::test_db_context;

    #[test]
    fn bind_requires_input_table() {
        let context = test_db_context();
        assert!(Enumerate.bind(&context, &TableFunctionInput::default()).is_err());

        let input = TableFunctionInput::default().with_input_table(
            vec![DataType::Utf8, DataType::Int32],
            vec!["a".to_string(), "b".to_string()],
        );
        let bind = Enumerate.bind(&context, &input).unwrap();
        assert_eq!(vec![DataType::Int64], bind.types);
        assert_eq!(
            Some("Start: 1".to_string()),
            Enumerate.to_display_string(bind.state.as_ref())
        );
    }

    #[test]
    fn bind_named_start() {
        let context = test_db_context();
        let input = TableFunctionInput::default()
            .with_named("start", 0_i64)
            .with_input_table(vec![DataType::Utf8], vec!["a".to_string()]);
        let bind = Enumerate.bind(&context, &input).unwrap();
        let state = downcast_bind_data::<EnumerateBindState>(&Enumerate, bind.state.as_ref()).unwrap();
        assert_eq!(&EnumerateBindState { start: 0 }, state);
    }
}
