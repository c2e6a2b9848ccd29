use std::fmt;
use std::sync::Arc;

use crate::logger::{Logger, TracingLogger};

/// Name given to chains that are not named explicitly.
pub const DEFAULT_CHAIN_NAME: &str = "transaction";

/// Label and logger of a chain, bound when the chain is built.
#[derive(Clone, Default)]
pub struct Configuration {
    /// Display name used in log events. Empty means [`DEFAULT_CHAIN_NAME`].
    pub name: String,
    /// Receiver of execution events. `None` means [`TracingLogger`].
    pub logger: Option<Arc<dyn Logger>>,
}

impl Configuration {
    /// Configuration with the given name and the default logger.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            logger: None,
        }
    }

    /// Replace the logger.
    #[must_use]
    pub fn with_logger(mut self, logger: impl Logger + 'static) -> Self {
        self.logger = Some(Arc::new(logger));
        self
    }

    /// Name and logger with defaults applied.
    pub(crate) fn resolve(self) -> (String, Arc<dyn Logger>) {
        let name = if self.name.is_empty() {
            DEFAULT_CHAIN_NAME.to_string()
        } else {
            self.name
        };
        let logger = self.logger.unwrap_or_else(|| Arc::new(TracingLogger));
        (name, logger)
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("name", &self.name)
            .field("has_logger", &self.logger.is_some())
            .finish()
    }
}
