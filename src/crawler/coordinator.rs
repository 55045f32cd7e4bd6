//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that coordinates all aspects of
//! the crawling process, including:
//! - Validating the base and seed URLs
//! - Owning the page counts (and with them the visited set)
//! - Feeding a fixed pool of fetch workers through a job channel
//! - Folding worker reports back into the counts and scheduling new pages
//! - Shutting down cleanly when asked to

use crate::config::Config;
use crate::crawler::parser::extract_links;
use crate::crawler::scheduler::{LimiterClosed, RateLimiter};
use crate::crawler::{build_http_client, fetch_url, FetchResult};
use crate::output::CrawlStatistics;
use crate::state::{PageCounts, PageOutcome, Visit};
use crate::url::{extract_host, is_same_host, normalize_parsed, NormalizedUrl};
use crate::CrawlError;
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use url::Url;

/// Final state of a finished crawl
#[derive(Debug, Clone)]
pub struct CrawlResult {
    /// Reference count per normalized page
    pub pages: PageCounts,

    /// Outcome tallies and link counters
    pub stats: CrawlStatistics,
}

/// Stops a running crawl from outside the coordinator
///
/// Triggering closes the shared limiter: fetches already in flight finish,
/// nothing new is requested, and the crawl returns what it has counted.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    limiter: Arc<RateLimiter>,
}

impl ShutdownHandle {
    pub fn trigger(&self) {
        if !self.limiter.is_closed() {
            tracing::info!("Shutdown requested, draining in-flight fetches");
            self.limiter.close();
        }
    }

    pub fn is_triggered(&self) -> bool {
        self.limiter.is_closed()
    }
}

/// A page handed to the worker pool
#[derive(Debug)]
struct FetchJob {
    url: Url,
    key: NormalizedUrl,
}

/// What a worker sends back for one job
#[derive(Debug)]
struct JobReport {
    key: NormalizedUrl,
    outcome: PageOutcome,
    links: Vec<String>,
}

impl JobReport {
    fn not_expanded(key: NormalizedUrl, outcome: PageOutcome) -> Self {
        Self {
            key,
            outcome,
            links: Vec::new(),
        }
    }
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    base_url: Arc<Url>,
    seed_url: Url,
    client: Client,
    limiter: Arc<RateLimiter>,
    pages: PageCounts,
    stats: CrawlStatistics,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `base_url` - Defines the host to stay on and resolves relative links
    /// * `seed_url` - The first page to count and fetch
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(CrawlError)` - A URL is unusable or the HTTP client failed to build
    pub fn new(config: Config, base_url: &str, seed_url: &str) -> Result<Self, CrawlError> {
        let base = parse_seed(base_url)?;
        if extract_host(&base).is_none() {
            return Err(CrawlError::InvalidSeed {
                url: base_url.to_string(),
                reason: "URL has no host".to_string(),
            });
        }
        let seed = parse_seed(seed_url)?;

        let client = build_http_client(&config.user_agent, config.crawler.timeout())?;
        let limiter = Arc::new(RateLimiter::from_config(&config.crawler));

        Ok(Self {
            config: Arc::new(config),
            base_url: Arc::new(base),
            seed_url: seed,
            client,
            limiter,
            pages: PageCounts::new(),
            stats: CrawlStatistics::default(),
        })
    }

    /// Returns a handle that can stop this crawl from another task
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            limiter: self.limiter.clone(),
        }
    }

    /// Runs the crawl to completion
    ///
    /// This is the core crawling logic that:
    /// 1. Spawns the worker pool
    /// 2. Counts the seed and dispatches it
    /// 3. Receives worker reports and records their outcome
    /// 4. Counts every reported link, dispatching the ones never seen before
    /// 5. Stops when no dispatched job is outstanding
    pub async fn run(mut self) -> Result<CrawlResult, CrawlError> {
        let worker_count = self.config.crawler.max_concurrent_fetches.max(1) as usize;
        tracing::info!(
            "Starting crawl of {} ({} workers, {:?} between requests)",
            self.seed_url,
            worker_count,
            self.limiter.spacing()
        );
        let start_time = std::time::Instant::now();

        let (job_tx, job_rx) = mpsc::unbounded_channel::<FetchJob>();
        let (report_tx, mut report_rx) = mpsc::unbounded_channel::<JobReport>();
        let job_rx = Arc::new(Mutex::new(job_rx));

        let mut workers = JoinSet::new();
        for id in 0..worker_count {
            let worker = Worker {
                id,
                jobs: job_rx.clone(),
                reports: report_tx.clone(),
                client: self.client.clone(),
                limiter: self.limiter.clone(),
                base_url: self.base_url.clone(),
            };
            workers.spawn(worker.run());
        }
        // Only workers hold report senders from here on
        drop(report_tx);

        let mut outstanding = 0usize;
        let seed = self.seed_url.to_string();
        if let Some(job) = self.discover(&seed) {
            if job_tx.send(job).is_ok() {
                outstanding += 1;
            }
        }

        while outstanding > 0 {
            let report = tokio::select! {
                report = report_rx.recv() => match report {
                    Some(report) => report,
                    None => break,
                },
                Some(joined) = workers.join_next() => {
                    joined?;
                    continue;
                }
            };
            outstanding -= 1;

            tracing::trace!("{} finished as {}", report.key, report.outcome);
            self.stats.record_outcome(report.outcome);

            for link in &report.links {
                if let Some(job) = self.discover(link) {
                    if job_tx.send(job).is_ok() {
                        outstanding += 1;
                    }
                }
            }
        }

        drop(job_tx);
        while let Some(joined) = workers.join_next().await {
            joined?;
        }

        self.stats.duration = start_time.elapsed();
        tracing::info!(
            "Crawl completed: {} pages counted, {} requested in {:?}",
            self.pages.len(),
            self.stats.pages_requested(),
            self.stats.duration
        );
        crate::output::log_statistics(&self.stats);

        Ok(CrawlResult {
            pages: self.pages,
            stats: self.stats,
        })
    }

    /// Counts one reference to `link` and decides whether to fetch it
    ///
    /// Only the coordinator task calls this, so the membership check and the
    /// insert into the page counts can never interleave with another caller.
    ///
    /// Returns a job when the page is new, on the base host, within budget,
    /// and the crawl has not been shut down.
    fn discover(&mut self, link: &str) -> Option<FetchJob> {
        self.stats.references_seen += 1;

        let url = match Url::parse(link) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!("Discarding unparseable URL {}: {}", link, e);
                self.stats.invalid_links += 1;
                return None;
            }
        };

        if !is_same_host(&url, &self.base_url) {
            tracing::trace!("Discarding off-host URL {}", url);
            self.stats.off_host_links += 1;
            return None;
        }

        let key = match normalize_parsed(&url) {
            Ok(key) => key,
            Err(e) => {
                tracing::debug!("Discarding URL {}: {}", url, e);
                self.stats.invalid_links += 1;
                return None;
            }
        };

        if let Visit::Revisit(count) = self.pages.record(key.clone()) {
            tracing::trace!("{} referenced again ({} total)", key, count);
            return None;
        }

        if let Some(budget) = self.config.crawler.max_pages {
            if self.pages.len() >= budget {
                tracing::debug!("Crawl budget of {} pages reached, not fetching {}", budget, key);
                self.stats.record_outcome(PageOutcome::OverBudget);
                return None;
            }
        }

        if self.limiter.is_closed() {
            self.stats.record_outcome(PageOutcome::Cancelled);
            return None;
        }

        tracing::info!("Crawling {}", key);
        Some(FetchJob { url, key })
    }
}

/// One member of the fixed fetch pool
struct Worker {
    id: usize,
    jobs: Arc<Mutex<UnboundedReceiver<FetchJob>>>,
    reports: UnboundedSender<JobReport>,
    client: Client,
    limiter: Arc<RateLimiter>,
    base_url: Arc<Url>,
}

impl Worker {
    async fn run(self) {
        loop {
            let job = {
                let mut jobs = self.jobs.lock().await;
                jobs.recv().await
            };
            let Some(job) = job else {
                break;
            };

            let report = self.process(job).await;
            if self.reports.send(report).is_err() {
                break;
            }
        }
        tracing::trace!("Worker {} exiting", self.id);
    }

    /// Fetches one page through the limiter and extracts its links
    ///
    /// Every per-page failure is logged here and turned into an outcome;
    /// nothing propagates past the worker.
    async fn process(&self, job: FetchJob) -> JobReport {
        let permit = match self.limiter.acquire().await {
            Ok(permit) => permit,
            Err(LimiterClosed) => {
                tracing::debug!("Crawl shut down, not fetching {}", job.key);
                return JobReport::not_expanded(job.key, PageOutcome::Cancelled);
            }
        };

        let result = fetch_url(&self.client, &job.url).await;
        drop(permit);

        match result {
            FetchResult::Success { status, body, .. } => {
                let links = extract_links(&body, &self.base_url);
                tracing::debug!(
                    "Fetched {} (HTTP {}), {} links found",
                    job.key,
                    status,
                    links.len()
                );
                JobReport {
                    key: job.key,
                    outcome: PageOutcome::Fetched,
                    links,
                }
            }

            FetchResult::Skipped { reason } => {
                tracing::info!("Skipping {}: {}", job.url, reason);
                JobReport::not_expanded(job.key, PageOutcome::Skipped)
            }

            FetchResult::ClientOrServerError { status } => {
                tracing::warn!("Got HTTP error for {}, status code: {}", job.url, status);
                JobReport::not_expanded(job.key, PageOutcome::HttpError)
            }

            FetchResult::NetworkFailure { cause } => {
                tracing::warn!("Error fetching {}: {}", job.url, cause);
                JobReport::not_expanded(job.key, PageOutcome::Unreachable)
            }
        }
    }
}

fn parse_seed(raw: &str) -> Result<Url, CrawlError> {
    Url::parse(raw).map_err(|e| CrawlError::InvalidSeed {
        url: raw.to_string(),
        reason: e.to_string(),
    })
}
