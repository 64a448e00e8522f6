//! Domain layer: entities and reconciliation logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod entities;
pub mod error;
pub mod release;

pub use entities::*;
pub use error::DomainError;
pub use release::{has_next_page, plan_copy, CopyPlan, ReleaseLookup};
