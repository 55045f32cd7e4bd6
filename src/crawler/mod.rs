//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with response classification
//! - HTML parsing and link extraction
//! - Concurrency limiting and request spacing
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;

pub use coordinator::{Coordinator, CrawlResult, ShutdownHandle};
pub use fetcher::{build_http_client, fetch_url, FetchResult};
pub use parser::extract_links;
pub use scheduler::{FetchPermit, LimiterClosed, RateLimiter};

use crate::config::Config;
use crate::state::PageCounts;
use crate::CrawlError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the base and seed URLs
/// 2. Build the HTTP client and the shared limiter
/// 3. Fetch pages on the base host, following their links
/// 4. Return the reference count of every page seen
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `base_url` - Host to stay on; also the base for relative links
/// * `seed_url` - First page to visit
///
/// # Returns
///
/// * `Ok(PageCounts)` - Crawl completed
/// * `Err(CrawlError)` - Crawl could not start
///
/// # Example
///
/// ```no_run
/// use link_tally::config::Config;
/// use link_tally::crawler::crawl;
///
/// # async fn example() -> Result<(), link_tally::CrawlError> {
/// let pages = crawl(Config::default(), "https://example.com/", "https://example.com/").await?;
/// println!("{} pages counted", pages.len());
/// # Ok(())
/// # }
/// ```
pub async fn crawl(
    config: Config,
    base_url: &str,
    seed_url: &str,
) -> Result<PageCounts, CrawlError> {
    let coordinator = Coordinator::new(config, base_url, seed_url)?;
    Ok(coordinator.run().await?.pages)
}
