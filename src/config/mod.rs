//! Configuration module for dllbuilder
//!
//! Provides types and parsing for `dllb.toml` project configuration.

pub mod loader;
pub mod schema;

pub use loader::{default_config, load_config, CliOverrides, ConfigError};
pub use schema::*;
