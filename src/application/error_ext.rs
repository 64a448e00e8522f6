//! Error conversion helpers for I/O and API calls
//!
//! Provides extension traits for cleaner error handling with context.

use std::io;
use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};
use crate::infrastructure::{InfraError, InfraResult};

/// Extension trait for converting `io::Result` to `ApplicationResult` with context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    ///
    /// # Example
    /// ```ignore
    /// fs.create_dir_all(&dir)
    ///     .with_path_context("create directory", &dir)?;
    /// ```
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: format!("{}: {}", action, path.display()),
            source: Box::new(e),
        })
    }
}

/// Extension trait for lifting API results into the application layer.
pub trait ApiResultExt<T> {
    /// Non-200 replies become [`ApplicationError::Rejected`] carrying the raw
    /// body; every other failure becomes `OperationFailed` with `action` as context.
    fn with_action(self, action: &str) -> ApplicationResult<T>;
}

impl<T> ApiResultExt<T> for InfraResult<T> {
    fn with_action(self, action: &str) -> ApplicationResult<T> {
        self.map_err(|e| match e {
            InfraError::Http { status, body, .. } => ApplicationError::Rejected {
                action: action.to_string(),
                status,
                body,
            },
            InfraError::Application(inner) => inner,
            other => ApplicationError::OperationFailed {
                context: action.to_string(),
                source: Box::new(other),
            },
        })
    }
}
