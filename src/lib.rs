//! Manage FOSSA release groups from the command line.
//!
//! Layers, innermost first:
//! - [`domain`]: API records and reconciliation logic, no I/O
//! - [`application`]: services orchestrating the API client, the analysis
//!   binary and the filesystem
//! - [`infrastructure`]: I/O boundary traits, the REST client, DI container
//! - [`cli`]: argument parsing, dispatch, terminal output

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
