//! URL handling module for Link-Tally
//!
//! This module provides URL normalization into page keys and the host
//! comparisons used to keep a crawl on a single site.

mod domain;
mod normalize;

// Re-export main functions
pub use domain::{extract_host, is_same_host};
pub use normalize::{normalize_parsed, normalize_url, NormalizedUrl};
