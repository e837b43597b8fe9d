//! # Auto Eden common
//!
//! Shared building blocks for the Auto Eden client crates:
//! - Logging initialisation for binaries
//! - Layered configuration loading (defaults, TOML file, environment)
//! - The configuration error type

pub mod config;
pub mod error;
pub mod logging;

pub use config::ConfigLoader;
pub use error::ConfigurationError;
