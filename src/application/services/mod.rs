//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, CommandRunner) and the
//! API client, but are themselves concrete structs, not traits.

mod catalog;
mod placeholder;
mod release_groups;

pub use catalog::{sorted_by_name, CatalogService};
pub use placeholder::PlaceholderService;
pub use release_groups::{AddOutcome, ReleaseGroupService, PAGE_SIZE, SORT_ORDER};

use colored::Colorize;
use tracing::warn;

/// Report a non-200 reply that the caller degrades on instead of failing.
pub(crate) fn report_failure(action: &str, body: &str) {
    warn!("{action} failed: {body}");
    eprintln!("{}: Failed to {}: {}", "Warning".yellow(), action, body);
}
