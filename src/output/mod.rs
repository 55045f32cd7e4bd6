//! Output module for crawl reports
//!
//! This module handles:
//! - Ordering page counts into a frequency report
//! - Rendering and printing the report
//! - Recording crawl statistics and logging a summary

mod report;
pub mod stats;

pub use report::{build_report, print_report, render_report, ReportEntry};
pub use stats::{log_statistics, CrawlStatistics};
