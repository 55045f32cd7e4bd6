//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with the configured user agent and timeout
//! - Single GET requests (no retries)
//! - Classifying the response into a closed set of results

use crate::config::UserAgentConfig;
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::redirect::{Action, Attempt, Policy};
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Status in [200, 299] with an HTML body
    Success {
        /// HTTP status code
        status: u16,
        /// Content-Type header value
        content_type: String,
        /// Page body content
        body: String,
    },

    /// Status in [200, 399] but the content is not HTML or the redirect
    /// leaves the host; body not read
    Skipped {
        /// Why the page was not parsed
        reason: String,
    },

    /// HTTP status >= 400
    ClientOrServerError {
        /// The HTTP status code
        status: u16,
    },

    /// Request could not complete (DNS, connection refused, timeout)
    NetworkFailure {
        /// Error description
        cause: String,
    },
}

impl FetchResult {
    /// Returns true if the page body is available for link extraction
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Longest redirect chain followed before the fetch fails
const MAX_REDIRECTS: usize = 10;

/// Builds an HTTP client with proper configuration
///
/// Redirects are followed only while they stay on the host of the original
/// request; a hop to another host ends the chain at the 3xx response.
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Upper bound on a whole request, body included
///
/// # Example
///
/// ```no_run
/// use link_tally::config::UserAgentConfig;
/// use link_tally::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::custom(same_host_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

fn same_host_redirects(attempt: Attempt) -> Action {
    if attempt.previous().len() >= MAX_REDIRECTS {
        return attempt.error("too many redirects");
    }

    let same_host = match attempt.previous().first() {
        Some(origin) => attempt.url().host_str() == origin.host_str(),
        None => true,
    };

    if same_host {
        attempt.follow()
    } else {
        tracing::debug!("Not following redirect to {}", attempt.url());
        attempt.stop()
    }
}

/// Fetches a URL with a single GET request
///
/// # Classification
///
/// | Condition | Result |
/// |-----------|--------|
/// | 200-299 and `text/html` | Success |
/// | 200-299, other or missing Content-Type | Skipped |
/// | 300-399 (redirect to another host) | Skipped |
/// | >= 400 | ClientOrServerError |
/// | Timeout, DNS, connection error, body read error | NetworkFailure |
///
/// Same-host redirects are followed by the client and the final response is
/// classified. A redirect that leaves the host is never requested.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
pub async fn fetch_url(client: &Client, url: &Url) -> FetchResult {
    let response = match client.get(url.clone()).send().await {
        Ok(response) => response,
        Err(e) => return classify_error(&e),
    };

    let status = response.status().as_u16();

    if status >= 400 {
        return FetchResult::ClientOrServerError { status };
    }

    if response.status().is_redirection() {
        let target = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("nowhere");
        return FetchResult::Skipped {
            reason: format!("redirect to {} not followed", target),
        };
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let content_type = match content_type {
        Some(ct) if ct.to_ascii_lowercase().contains("text/html") => ct,
        Some(ct) => {
            return FetchResult::Skipped {
                reason: format!("non-HTML content type {}", ct),
            }
        }
        None => {
            return FetchResult::Skipped {
                reason: "missing content type".to_string(),
            }
        }
    };

    match response.text().await {
        Ok(body) => FetchResult::Success {
            status,
            content_type,
            body,
        },
        Err(e) => classify_error(&e),
    }
}

fn classify_error(e: &reqwest::Error) -> FetchResult {
    let cause = if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        format!("Connection failed: {}", e)
    } else {
        e.to_string()
    };

    FetchResult::NetworkFailure { cause }
}
