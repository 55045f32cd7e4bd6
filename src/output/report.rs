//! Frequency report over page counts

use crate::state::PageCounts;
use std::fmt;

/// One line of the report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    /// Normalized page key
    pub url: String,

    /// Number of internal references to the page
    pub count: u32,
}

impl fmt::Display for ReportEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Found {} internal links to {}", self.count, self.url)
    }
}

/// Orders page counts from most to least referenced
///
/// The sort is stable, so pages with equal counts keep the order in which
/// the crawl first saw them.
///
/// # Example
///
/// ```
/// use link_tally::{build_report, normalize_url, PageCounts};
///
/// let mut pages = PageCounts::new();
/// for link in ["https://a.com/x", "https://a.com/y", "https://a.com/y"] {
///     pages.record(normalize_url(link).unwrap());
/// }
///
/// let report = build_report(&pages);
/// assert_eq!(report[0].url, "a.com/y");
/// assert_eq!(report[0].count, 2);
/// ```
pub fn build_report(pages: &PageCounts) -> Vec<ReportEntry> {
    let mut entries: Vec<ReportEntry> = pages
        .iter()
        .map(|(key, count)| ReportEntry {
            url: key.to_string(),
            count,
        })
        .collect();

    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries
}

/// Renders one line per entry
pub fn render_report(entries: &[ReportEntry]) -> String {
    entries
        .iter()
        .map(|entry| format!("{}\n", entry))
        .collect()
}

/// Prints the report with its banner to stdout
pub fn print_report(entries: &[ReportEntry]) {
    println!();
    println!("==========");
    println!("REPORT");
    println!("==========");
    println!();
    print!("{}", render_report(entries));
}
