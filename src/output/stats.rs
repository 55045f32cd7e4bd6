//! Crawl statistics
//!
//! This module tallies how counted pages ended and how many discovered
//! references were dropped before counting.

use crate::state::PageOutcome;
use std::collections::HashMap;
use std::time::Duration;

/// Crawl statistics summary
#[derive(Debug, Clone, Default)]
pub struct CrawlStatistics {
    /// Count of pages by outcome
    pub pages_by_outcome: HashMap<PageOutcome, u64>,

    /// URLs offered to the coordinator (seed and every extracted link)
    pub references_seen: u64,

    /// References discarded because they point at another host
    pub off_host_links: u64,

    /// References discarded because they could not be parsed or normalized
    pub invalid_links: u64,

    /// Wall-clock time of the crawl
    pub duration: Duration,
}

impl CrawlStatistics {
    /// Records the outcome of one page
    pub fn record_outcome(&mut self, outcome: PageOutcome) {
        *self.pages_by_outcome.entry(outcome).or_insert(0) += 1;
    }

    /// Number of pages that ended with `outcome`
    pub fn count(&self, outcome: PageOutcome) -> u64 {
        self.pages_by_outcome.get(&outcome).copied().unwrap_or(0)
    }

    /// Number of pages a request was sent for
    pub fn pages_requested(&self) -> u64 {
        self.pages_by_outcome
            .iter()
            .filter(|(outcome, _)| outcome.was_requested())
            .map(|(_, count)| count)
            .sum()
    }

    /// Number of pages whose fetch failed
    pub fn pages_failed(&self) -> u64 {
        self.pages_by_outcome
            .iter()
            .filter(|(outcome, _)| outcome.is_error())
            .map(|(_, count)| count)
            .sum()
    }
}

/// Logs a summary of the statistics
///
/// # Arguments
///
/// * `stats` - The statistics to log
pub fn log_statistics(stats: &CrawlStatistics) {
    tracing::info!(
        "References seen: {} ({} off-host, {} invalid)",
        stats.references_seen,
        stats.off_host_links,
        stats.invalid_links
    );

    for outcome in PageOutcome::ALL {
        let count = stats.count(outcome);
        if count > 0 {
            tracing::info!("  {}: {}", outcome, count);
        }
    }

    if stats.pages_failed() > 0 {
        tracing::warn!("{} pages could not be fetched", stats.pages_failed());
    }
}
