//! Error channel shared by all invocations of one schedule.

use std::sync::OnceLock;

use dax_types::{DaxError, DaxResult};

/// Collects the error raised by scheduled invocations.
///
/// Only the first message is kept; later ones are dropped. Raising does
/// not stop other invocations, which all run to completion.
#[derive(Debug, Default)]
pub struct ErrorHandler {
    message: OnceLock<String>,
}

impl ErrorHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports an error. Ignored if an error was already raised.
    pub fn raise(&self, message: impl Into<String>) {
        if self.message.set(message.into()).is_err() {
            tracing::trace!("dropping error raised after the first");
        }
    }

    /// Reports a [`DaxError`] by its display message.
    pub fn raise_error(&self, error: &DaxError) {
        self.raise(error.to_string());
    }

    /// Returns true once any invocation has raised an error.
    pub fn is_raised(&self) -> bool {
        self.message.get().is_some()
    }

    /// The first raised message, if any.
    pub fn message(&self) -> Option<&str> {
        self.message.get().map(String::as_str)
    }

    /// Converts the collected state into the schedule result.
    pub fn into_result(self) -> DaxResult<()> {
        match self.message.into_inner() {
            Some(message) => Err(DaxError::Execution(message)),
            None => Ok(()),
        }
    }
}
