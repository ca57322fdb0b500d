pub mod enumerate;
pub mod generate_series;
pub mod repeat;

use std::sync::Arc;

use super::TableFunction;

/// All built-in table functions.
pub fn builtin_table_functions() -> Vec<Arc<dyn TableFunction>> {
    vec![
        Arc::new(generate_series::GenerateSeries),
        Arc::new(repeat::Repeat),
        Arc::new(enumerate::Enumerate),
    ]
}
