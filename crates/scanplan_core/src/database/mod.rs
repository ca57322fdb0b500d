pub mod registry;

use std::sync::Arc;

use registry::FunctionRegistry;

use crate::config::session::SessionConfig;

/// Context passed to table functions when they're bound.
///
/// Holds everything needed to reconstruct plans: the registry for looking up
/// functions by name, and the session configuration.
#[derive(Debug)]
pub struct DatabaseContext {
    registry: Arc<FunctionRegistry>,
    config: SessionConfig,
}

impl DatabaseContext {
    pub fn new(registry: Arc<FunctionRegistry>) -> Self {
        DatabaseContext {
            registry,
            config: SessionConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut SessionConfig {
        &mut self.config
    }
}
