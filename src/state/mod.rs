//! State module for tracking crawl progress
//!
//! This module provides the state owned by the crawl coordinator.
//!
//! # Components
//!
//! - `PageCounts`: Reference count per normalized page, in discovery order
//! - `PageOutcome`: How a counted page finished (fetched, skipped, failed, ...)

mod page_counts;
mod page_state;

// Re-export main types
pub use page_counts::{PageCounts, Visit};
pub use page_state::PageOutcome;
