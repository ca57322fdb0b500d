use scanplan_error::{DbError, Result};
use scanplan_proto::packed::{PackedDecoder, PackedEncoder};

use crate::arrays::datatype::DataType;
use crate::database::DatabaseContext;
use crate::functions::table::{
    BindData,
    BindStateCodec,
    TableFunction,
    TableFunctionBindState,
    TableFunctionBinder,
    TableFunctionInput,
    downcast_bind_data,
};
use crate::statistics::value::StatisticsValue;

/// `generate_series(start, stop[, step])`
///
/// Produces a single Int64 column. Bind state is small and fixed size, so it
/// gets persisted directly.
#[derive(Debug, Clone, Copy)]
pub struct GenerateSeries;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerateSeriesBindState {
    pub start: i64,
    pub stop: i64,
    pub step: i64,
}

crate::impl_bind_data!(GenerateSeriesBindState);

impl GenerateSeriesBindState {
    /// Number of values the series will produce, saturating at `usize::MAX`.
    pub fn num_values(&self) -> usize {
        let (lo, hi) = if self.step > 0 {
            (self.start as i128, self.stop as i128)
        } else {
            (self.stop as i128, self.start as i128)
        };
        if lo > hi {
            return 0;
        }
        let count = (hi - lo) / i128::from(self.step.unsigned_abs()) + 1;
        usize::try_from(count).unwrap_or(usize::MAX)
    }
}

impl TableFunction for GenerateSeries {
    fn name(&self) -> &'static str {
        "generate_series"
    }

    fn binder(&self) -> Option<&dyn TableFunctionBinder> {
        Some(self)
    }

    fn state_codec(&self) -> Option<&dyn BindStateCodec> {
        Some(self)
    }

    fn cardinality(&self, _context: &DatabaseContext, state: &dyn BindData) -> StatisticsValue<usize> {
        match downcast_bind_data::<GenerateSeriesBindState>(self, state) {
            Ok(state) => StatisticsValue::Exact(state.num_values()),
            Err(_) => StatisticsValue::Unknown,
        }
    }

    fn to_display_string(&self, state: &dyn BindData) -> Option<String> {
        let state = downcast_bind_data::<GenerateSeriesBindState>(self, state).ok()?;
        Some(format!(
            "Range: {} to {} (step {})",
            state.start, state.stop, state.step
        ))
    }
}

impl TableFunctionBinder for GenerateSeries {
    fn bind(
        &self,
        _context: &DatabaseContext,
        input: &TableFunctionInput,
    ) -> Result<TableFunctionBindState> {
        let (start, stop, step) = match input.positional.as_slice() {
            [start, stop] => (start.try_as_i64()?, stop.try_as_i64()?, 1),
            [start, stop, step] => (start.try_as_i64()?, stop.try_as_i64()?, step.try_as_i64()?),
            other => {
                return Err(DbError::new("generate_series expects 2 or 3 arguments")
                    .with_field("got", other.len()));
            }
        };
        if step == 0 {
            return Err(DbError::new("generate_series step cannot be zero"));
        }

        Ok(TableFunctionBindState {
            state: Box::new(GenerateSeriesBindState { start, stop, step }),
            types: vec![DataType::Int64],
            names: vec!["generate_series".to_string()],
        })
    }
}

impl BindStateCodec for GenerateSeries {
    fn encode_state(&self, state: &dyn BindData, buf: &mut Vec<u8>) -> Result<()> {
        let state = downcast_bind_data::<GenerateSeriesBindState>(self, state)?;
        let mut packed = PackedEncoder::new(buf);
        packed.encode_next(&state.start)?;
        packed.encode_next(&state.stop)?;
        packed.encode_next(&state.step)?;
        Ok(())
    }

    fn decode_state(&self, buf: &[u8]) -> Result<Box<dyn BindData>> {
        let mut packed = PackedDecoder::new(buf);
        let start: i64 = packed.decode_next()?;
        let stop: i64 = packed.decode_next()?;
        let step: i64 = packed.decode_next()?;
        if !packed.is_exhausted() {
            return Err(DbError::serialization(
                "Trailing bytes after generate_series state",
            ));
        }
        if step == 0 {
            return Err(DbError::serialization("generate_series step cannot be zero"));
        }

        Ok(Box::new(GenerateSeriesBindState { start, stop, step }))
    }
}
