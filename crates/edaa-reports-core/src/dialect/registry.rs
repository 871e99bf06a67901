//! Registry of dialect adapters.

use std::collections::HashMap;
use std::sync::Arc;

use super::junit::{JUnitAdapter, JUnitFlavor};
use super::osvvm::OsvvmAdapter;
use super::{Dialect, DialectAdapter};
use crate::config::Config;
use crate::unittest::UnittestError;

/// Maps dialects to their adapters.
///
/// All built-in adapters are registered on creation.
pub struct AdapterRegistry {
    adapters: HashMap<Dialect, Arc<dyn DialectAdapter>>,
}

impl AdapterRegistry {
    /// Create a registry with all built-in adapters and default settings.
    pub fn new() -> Self {
        Self::with_config(&Config::default())
    }

    /// Create a registry whose adapters use the reader/writer settings of `config`.
    pub fn with_config(config: &Config) -> Self {
        let mut registry = Self {
            adapters: HashMap::new(),
        };

        for flavor in JUnitFlavor::ALL {
            registry.register(Arc::new(JUnitAdapter::with_config(
                flavor,
                config.reader.clone(),
                config.writer.clone(),
            )));
        }
        registry.register(Arc::new(OsvvmAdapter::with_config(config.reader.clone())));

        registry
    }

    /// Register an adapter, replacing any adapter for the same dialect.
    pub fn register(&mut self, adapter: Arc<dyn DialectAdapter>) {
        self.adapters.insert(adapter.dialect(), adapter);
    }

    pub fn adapter(&self, dialect: Dialect) -> Result<Arc<dyn DialectAdapter>, UnittestError> {
        self.adapters
            .get(&dialect)
            .cloned()
            .ok_or_else(|| UnittestError::UnknownDialect {
                identifier: dialect.identifier().to_string(),
                known: self.identifiers().join(", "),
            })
    }

    /// Look up an adapter by command line identifier.
    pub fn adapter_for_identifier(&self, identifier: &str) -> Result<Arc<dyn DialectAdapter>, UnittestError> {
        self.adapter(identifier.parse()?)
    }

    pub fn supports(&self, dialect: Dialect) -> bool {
        self.adapters.contains_key(&dialect)
    }

    /// Registered dialects in their canonical order.
    pub fn dialects(&self) -> Vec<Dialect> {
        Dialect::ALL
            .into_iter()
            .filter(|d| self.adapters.contains_key(d))
            .collect()
    }

    pub fn identifiers(&self) -> Vec<&'static str> {
        self.dialects().iter().map(Dialect::identifier).collect()
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}
