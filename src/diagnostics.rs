//! Non-fatal error reporting.
//!
//! Preprocessing never aborts a batch. Problems are handed to a
//! [`DiagnosticsSink`] and the driver decides afterwards whether the
//! batch as a whole failed.

/// Receives human-readable error messages.
pub trait DiagnosticsSink {
    fn error(&mut self, message: String);
}

/// A sink that keeps every message in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    errors: Vec<String>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Remove and return all collected messages.
    pub fn take(&mut self) -> Vec<String> {
        std::mem::take(&mut self.errors)
    }
}

impl DiagnosticsSink for Diagnostics {
    fn error(&mut self, message: String) {
        log::error!("{}", message);
        self.errors.push(message);
    }
}
