//! Application configuration module.
//!
//! Manages the TOML config file holding the listing host and
//! HTTP settings.

#[allow(clippy::module_inception)]
mod config;

pub use config::AppConfig;
