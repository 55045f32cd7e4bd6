//! Configuration module for Link-Tally
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every setting has a default, so a configuration file is optional.
//!
//! # Example
//!
//! ```no_run
//! use link_tally::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("link-tally.toml")).unwrap();
//! println!("Max concurrent fetches: {}", config.crawler.max_concurrent_fetches);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, UserAgentConfig};

// Re-export parser and validation functions
pub use parser::{load_config, parse_config};
pub use validation::validate;
