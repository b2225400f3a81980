//! Logging helpers.

use tracing::error;

use crate::actions::{ActionDescriptor, ActionExecutionError, ErrorHandler};

/// The default error handler.
///
/// Logs every failed action at the error level and moves on.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultErrorHandler;

impl ErrorHandler for DefaultErrorHandler {
    fn call(&self, action: &ActionDescriptor, err: &ActionExecutionError) {
        error!(target: "actions", "while running {}: {}", action, err)
    }
}
