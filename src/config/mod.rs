//! Configuration module for Linkspider
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file, and validating the base address the crawl starts from.
//!
//! # Example
//!
//! ```no_run
//! use linkspider::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("linkspider.toml")).unwrap();
//! println!("EOF read timeout: {}ms", config.wire.eof_read_timeout);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, WireConfig};

// Re-export parser and validation functions
pub use parser::{load_config, parse_config};
pub use validation::{validate, validate_base_address};
