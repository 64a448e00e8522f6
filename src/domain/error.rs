//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent reconciliation failures.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("release '{version}' not found in source release group '{group}'")]
    SourceReleaseNotFound { group: String, version: String },

    #[error("release '{version}' not found in destination release group '{group}'")]
    DestinationReleaseNotFound { group: String, version: String },

    #[error("Test project not found: {title}")]
    PlaceholderNotFound { title: String },
}
