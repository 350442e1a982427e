//! Shared plumbing for the workbench crates: configuration, logging setup,
//! the clock abstraction used for TTL arithmetic, supported languages and
//! small filesystem helpers.

pub mod clock;
pub mod config;
pub mod languages;
pub mod logging;
pub mod paths;
