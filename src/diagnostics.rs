//! Warning channel threaded through the pipeline
//!
//! Recoverable anomalies (an unrecognized line, a doc-comment syntax error, an unresolved
//! transform rule) are reported here instead of aborting. In strict mode the first warning
//! becomes [Error::Warning]; in silent mode warnings are counted but not logged.

use std::cell::Cell;

use crate::error::{Error, Result};

#[derive(Debug, Default)]
pub struct Diagnostics {
    silent: bool,
    stop_on_warn: bool,
    warnings: Cell<usize>,
}

impl Diagnostics {
    pub fn new(silent: bool, stop_on_warn: bool) -> Self {
        Self {
            silent,
            stop_on_warn,
            warnings: Cell::new(0),
        }
    }

    /// Diagnostics that never log, used by tests and round-trip checks.
    pub fn silent() -> Self {
        Self::new(true, false)
    }

    pub fn strict() -> Self {
        Self::new(true, true)
    }

    /// Report a recoverable anomaly.
    pub fn warn(&self, message: impl AsRef<str>) -> Result<()> {
        let message = message.as_ref();
        self.warnings.set(self.warnings.get() + 1);
        if self.stop_on_warn {
            return Err(Error::Warning(message.to_string()));
        }
        if !self.silent {
            tracing::warn!("{message}");
        }
        Ok(())
    }

    pub fn info(&self, message: impl AsRef<str>) {
        if !self.silent {
            tracing::info!("{}", message.as_ref());
        }
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.get()
    }
}
