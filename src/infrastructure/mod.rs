//! Infrastructure layer: I/O implementations and DI container
//!
//! This layer implements I/O boundary traits, the FOSSA API client,
//! and wires up services.

pub mod api;
pub mod di;
pub mod error;
pub mod traits;

pub use api::ApiClient;
pub use error::{InfraError, InfraResult};
