//! Politeness limiter shared by all crawl workers
//!
//! This module handles:
//! - Global concurrency limiting via a semaphore
//! - A minimum delay between consecutive fetch dispatches
//! - Closing the limiter to stop a crawl without interrupting in-flight fetches

use crate::config::CrawlerConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;

/// Error returned once the limiter has been closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimiterClosed;

/// A granted fetch slot
///
/// The concurrency slot is released when the permit is dropped.
#[derive(Debug)]
pub struct FetchPermit {
    _permit: OwnedSemaphorePermit,
}

/// Rate limiter combining a concurrency cap and request spacing
///
/// Every fetch in a crawl goes through the same limiter, so the aggregate
/// load on the target host stays bounded no matter how many links a page
/// fans out to.
#[derive(Debug)]
pub struct RateLimiter {
    /// Caps the number of fetches in flight
    semaphore: Arc<Semaphore>,

    /// Earliest instant at which the next dispatch may start
    next_slot: Mutex<Instant>,

    /// Minimum time between two dispatches
    spacing: Duration,
}

impl RateLimiter {
    /// Creates a limiter with an explicit concurrency cap and spacing
    pub fn new(max_concurrent: usize, spacing: Duration) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
            next_slot: Mutex::new(Instant::now()),
            spacing,
        }
    }

    /// Creates a limiter from the crawler configuration
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(
            config.max_concurrent_fetches as usize,
            config.min_spacing(),
        )
    }

    /// Waits for a fetch slot
    ///
    /// This method:
    /// 1. Acquires a concurrency permit (waits while the cap is reached)
    /// 2. Waits until the spacing since the previous dispatch has elapsed
    /// 3. Books the next dispatch slot and returns the permit
    ///
    /// # Returns
    ///
    /// * `Ok(FetchPermit)` - The caller may fetch now
    /// * `Err(LimiterClosed)` - The limiter was closed; the caller must not fetch
    pub async fn acquire(&self) -> Result<FetchPermit, LimiterClosed> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| LimiterClosed)?;

        let mut next_slot = self.next_slot.lock().await;
        let now = Instant::now();
        if *next_slot > now {
            tracing::trace!("Waiting {:?} before next fetch", *next_slot - now);
            tokio::time::sleep_until(*next_slot).await;
        }

        if self.is_closed() {
            return Err(LimiterClosed);
        }

        *next_slot = Instant::now() + self.spacing;
        drop(next_slot);

        Ok(FetchPermit { _permit: permit })
    }

    /// Closes the limiter
    ///
    /// Pending and future acquisitions fail; permits already granted stay
    /// valid until dropped.
    pub fn close(&self) {
        self.semaphore.close();
    }

    /// Returns whether the limiter has been closed
    pub fn is_closed(&self) -> bool {
        self.semaphore.is_closed()
    }

    /// Number of fetch slots currently free
    pub fn available_slots(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// The configured spacing between dispatches
    pub fn spacing(&self) -> Duration {
        self.spacing
    }
}
