use crate::url::NormalizedUrl;
use std::collections::HashMap;

/// Result of recording one reference to a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// First reference; the page joined the visited set with a count of 1
    New,
    /// The page was already known; carries its count after the increment
    Revisit(u32),
}

/// Reference counts per normalized page
///
/// Entries keep the order in which pages were first seen, so stable sorts
/// over the counts break ties by discovery order. Keys are never removed.
/// Key membership doubles as the visited set: a key is present exactly when
/// its page has been dispatched (or deliberately withheld) once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageCounts {
    entries: Vec<(NormalizedUrl, u32)>,
    index: HashMap<NormalizedUrl, usize>,
}

impl PageCounts {
    /// Creates an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one reference to `key`
    ///
    /// Membership check and insert happen in one call, so a caller owning
    /// the mapping can never dispatch the same page twice.
    pub fn record(&mut self, key: NormalizedUrl) -> Visit {
        if let Some(&slot) = self.index.get(&key) {
            let count = &mut self.entries[slot].1;
            *count += 1;
            return Visit::Revisit(*count);
        }

        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, 1));
        Visit::New
    }

    /// Returns the count for a key, if the page has been seen
    pub fn get(&self, key: &NormalizedUrl) -> Option<u32> {
        self.index.get(key).map(|&slot| self.entries[slot].1)
    }

    /// Looks a page up by its key string
    pub fn get_str(&self, key: &str) -> Option<u32> {
        self.index.get(key).map(|&slot| self.entries[slot].1)
    }

    /// Returns true if the page has been seen
    pub fn contains(&self, key: &NormalizedUrl) -> bool {
        self.index.contains_key(key)
    }

    /// Number of distinct pages
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all reference counts
    pub fn total_references(&self) -> u64 {
        self.entries.iter().map(|(_, count)| u64::from(*count)).sum()
    }

    /// Iterates over `(key, count)` pairs in discovery order
    pub fn iter(&self) -> impl Iterator<Item = (&NormalizedUrl, u32)> {
        self.entries.iter().map(|(key, count)| (key, *count))
    }
}

impl FromIterator<(NormalizedUrl, u32)> for PageCounts {
    /// Builds a mapping from explicit counts; repeated keys add up
    fn from_iter<I: IntoIterator<Item = (NormalizedUrl, u32)>>(iter: I) -> Self {
        let mut counts = PageCounts::new();
        for (key, count) in iter {
            match counts.index.get(&key) {
                Some(&slot) => counts.entries[slot].1 += count,
                None => {
                    counts.index.insert(key.clone(), counts.entries.len());
                    counts.entries.push((key, count));
                }
            }
        }
        counts
    }
}
