//! Page outcome definitions for tracking crawl results
//!
//! Every counted page ends in exactly one of these outcomes.

use std::fmt;

/// How a counted page finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageOutcome {
    // ===== Success =====
    /// Page was fetched as HTML and its links were followed
    Fetched,

    // ===== Not expanded =====
    /// Page answered with a non-HTML (or missing) content type
    Skipped,

    /// Page answered with HTTP status >= 400
    HttpError,

    /// Request could not complete (DNS, connection refused, timeout)
    Unreachable,

    /// Page was counted after the crawl budget was reached
    OverBudget,

    /// Crawl was shut down before the page could be fetched
    Cancelled,
}

impl PageOutcome {
    /// All outcomes, in reporting order
    pub const ALL: [PageOutcome; 6] = [
        Self::Fetched,
        Self::Skipped,
        Self::HttpError,
        Self::Unreachable,
        Self::OverBudget,
        Self::Cancelled,
    ];

    /// Returns true if a request was actually sent for the page
    pub fn was_requested(&self) -> bool {
        matches!(
            self,
            Self::Fetched | Self::Skipped | Self::HttpError | Self::Unreachable
        )
    }

    /// Returns true if this represents an error
    pub fn is_error(&self) -> bool {
        matches!(self, Self::HttpError | Self::Unreachable)
    }

    /// Short label used in logs and summaries
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetched => "fetched",
            Self::Skipped => "skipped",
            Self::HttpError => "http_error",
            Self::Unreachable => "unreachable",
            Self::OverBudget => "over_budget",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for PageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
