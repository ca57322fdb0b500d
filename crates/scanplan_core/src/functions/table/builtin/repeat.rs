use scanplan_error::{DbError, Result};

use crate::arrays::scalar::ScalarValue;
use crate::database::DatabaseContext;
use crate::functions::table::{
    BindData,
    TableFunction,
    TableFunctionBindState,
    TableFunctionBinder,
    TableFunctionInput,
    downcast_bind_data,
};
use crate::statistics::value::StatisticsValue;

/// `repeat(value, count [, alias => name])`
///
/// Produces `count` rows of `value`. Has no state codec, plans containing this
/// function are persisted with their arguments and bound again on load.
#[derive(Debug, Clone, Copy)]
pub struct Repeat;

#[derive(Debug, Clone, PartialEq)]
pub struct RepeatBindState {
    pub value: ScalarValue,
    pub count: usize,
}

crate::impl_bind_data!(RepeatBindState);

impl TableFunction for Repeat {
    fn name(&self) -> &'static str {
        "repeat"
    }

    fn binder(&self) -> Option<&dyn TableFunctionBinder> {
        Some(self)
    }

    fn cardinality(&self, _context: &DatabaseContext, state: &dyn BindData) -> StatisticsValue<usize> {
        match downcast_bind_data::<RepeatBindState>(self, state) {
            Ok(state) => StatisticsValue::Exact(state.count),
            Err(_) => StatisticsValue::Unknown,
        }
    }
}

impl TableFunctionBinder for Repeat {
    fn bind(
        &self,
        _context: &DatabaseContext,
        input: &TableFunctionInput,
    ) -> Result<TableFunctionBindState> {
        let [value, count] = input.positional.as_slice() else {
            return Err(DbError::new("repeat expects 2 arguments")
                .with_field("got", input.positional.len()));
        };
        let count = count.try_as_i64()?;
        let count = usize::try_from(count)
            .map_err(|_| DbError::new("repeat count cannot be negative").with_field("count", count))?;

        let name = match input.named.get("alias") {
            Some(alias) => alias.try_as_str()?.to_string(),
            None => "repeat".to_string(),
        };

        Ok(TableFunctionBindState {
            state: Box::new(RepeatBindState {
                value: value.clone(),
                count,
            }),
            types: vec![value.datatype()],
            names: vec![name],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrays::datatype::DataType;
    use crate::testutil::test_db_context;

    #[test]
    fn bind_with_alias() {
        let context = test_db_context();
        let input = TableFunctionInput::positional([ScalarValue::from("a"), ScalarValue::Int64(3)])
            .with_named("alias", "letters");
        let bind = Repeat.bind(&context, &input).unwrap();

        assert_eq!(vec![DataType::Utf8], bind.types);
        assert_eq!(vec!["letters".to_string()], bind.names);
        assert_eq!(
            StatisticsValue::Exact(3),
            Repeat.cardinality(&context, bind.state.as_ref())
        );
    }

    #[test]
    fn bind_negative_count() {
        let context = test_db_context();
        let input = TableFunctionInput::positional([ScalarValue::from("a"), ScalarValue::Int64(-1)]);
        assert!(Repeat.bind(&context, &input).is_err());
    }

    #[test]
    fn no_codec() {
        assert!(Repeat.state_codec().is_none());
        assert!(Repeat.binder().is_some());
    }
}
