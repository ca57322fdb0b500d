use std::collections::HashMap;
use std::sync::Arc;

use scanplan_error::{DbError, Result};
use tracing::trace;

use crate::functions::table::TableFunction;
use crate::functions::table::builtin::builtin_table_functions;

/// Registry of table functions keyed by (lowercased) name.
#[derive(Debug, Default)]
pub struct FunctionRegistry {
    table_functions: HashMap<String, Arc<dyn TableFunction>>,
}

impl FunctionRegistry {
    /// Create a registry containing all built-in functions.
    pub fn with_builtins() -> Result<Self> {
        let mut registry = Self::default();
        for function in builtin_table_functions() {
            registry.register_table_function(function)?;
        }
        Ok(registry)
    }

    pub fn register_table_function(&mut self, function: Arc<dyn TableFunction>) -> Result<()> {
        let name = function.name().to_lowercase();
        if self.table_functions.contains_key(&name) {
            return Err(DbError::new(format!(
                "Duplicate table function name '{name}'"
            )));
        }
        trace!(%name, "registering table function");
        self.table_functions.insert(name, function);
        Ok(())
    }

    pub fn get_table_function(&self, name: &str) -> Option<Arc<dyn TableFunction>> {
        self.table_functions.get(&name.to_lowercase()).cloned()
    }

    /// Get a table function, erroring if it doesn't exist.
    pub fn try_get_table_function(&self, name: &str) -> Result<Arc<dyn TableFunction>> {
        self.get_table_function(name)
            .ok_or_else(|| DbError::new(format!("Missing table function for '{name}'")))
    }

    pub fn table_function_names(&self) -> impl Iterator<Item = &str> {
        self.table_functions.keys().map(|k| k.as_str())
    }
}
