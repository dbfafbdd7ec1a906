//! Configuration module for Firestash
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file. Every section has defaults, so a missing file yields
//! a usable configuration pointing at a local API instance.
//!
//! # Example
//!
//! ```no_run
//! use firestash::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("firestash.toml")).unwrap();
//! println!("Polling every {}ms", config.polling.interval_ms);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{ApiConfig, Config, ExportConfig, PollingConfig, StoreBackend, StoreConfig};

// Re-export parser functions
pub use parser::{load_config, load_config_or_default, parse_config};
pub use validation::{validate, validate_store_for_save};
