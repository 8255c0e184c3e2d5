//! Scan statistics with atomic counters.
//!
//! [`ScanStats`] is shared by the walker's worker threads; [`StatsSnapshot`]
//! is the copied, serializable view attached to a [`ScanReport`].
//!
//! All counters use [`Relaxed`](std::sync::atomic::Ordering::Relaxed)
//! ordering. They are informational and read only after the walk joins.
//!
//! [`ScanReport`]: crate::ScanReport

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Atomic counters for one walk.
///
/// # Examples
///
/// ```
/// use td_scanner::ScanStats;
///
/// let stats = ScanStats::new();
/// stats.increment_entries();
/// stats.increment_blobs();
/// stats.increment_unclassified();
///
/// let snap = stats.snapshot();
/// assert_eq!(snap.entries, 1);
/// assert_eq!(snap.skipped(), 1);
/// ```
#[derive(Debug, Default)]
pub struct ScanStats {
    /// Tree entries visited.
    entries: AtomicU64,
    /// Entries that were regular files.
    blobs: AtomicU64,
    /// Blobs whose path yielded no language token.
    unclassified: AtomicU64,
    /// Blobs whose token has no comment grammar.
    unsupported: AtomicU64,
    /// Content fetches attempted.
    fetched: AtomicU64,
    /// Content fetches that failed.
    fetch_errors: AtomicU64,
    /// Fetched files rejected by the whole-content pre-filter.
    prefiltered: AtomicU64,
    /// Files in the final result.
    matched_files: AtomicU64,
    /// Lines in the final result.
    matched_lines: AtomicU64,
}

impl ScanStats {
    /// Creates a new [`ScanStats`] with all counters at zero.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the visited entries counter.
    #[inline]
    pub fn increment_entries(&self) {
        self.entries.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the regular files counter.
    #[inline]
    pub fn increment_blobs(&self) {
        self.blobs.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the unclassified files counter.
    #[inline]
    pub fn increment_unclassified(&self) {
        self.unclassified.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the unsupported language counter.
    #[inline]
    pub fn increment_unsupported(&self) {
        self.unsupported.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the fetch attempts counter.
    #[inline]
    pub fn increment_fetched(&self) {
        self.fetched.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the failed fetches counter.
    #[inline]
    pub fn increment_fetch_errors(&self) {
        self.fetch_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the pre-filter rejection counter.
    #[inline]
    pub fn increment_prefiltered(&self) {
        self.prefiltered.fetch_add(1, Ordering::Relaxed);
    }

    /// Records the size of the assembled result.
    pub fn record_matches(&self, files: u64, lines: u64) {
        self.matched_files.store(files, Ordering::Relaxed);
        self.matched_lines.store(lines, Ordering::Relaxed);
    }

    /// Returns a point-in-time snapshot of all statistics.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            entries: self.entries.load(Ordering::Relaxed),
            blobs: self.blobs.load(Ordering::Relaxed),
            unclassified: self.unclassified.load(Ordering::Relaxed),
            unsupported: self.unsupported.load(Ordering::Relaxed),
            fetched: self.fetched.load(Ordering::Relaxed),
            fetch_errors: self.fetch_errors.load(Ordering::Relaxed),
            prefiltered: self.prefiltered.load(Ordering::Relaxed),
            matched_files: self.matched_files.load(Ordering::Relaxed),
            matched_lines: self.matched_lines.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of [`ScanStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Tree entries visited.
    pub entries: u64,
    /// Entries that were regular files.
    pub blobs: u64,
    /// Blobs whose path yielded no language token.
    pub unclassified: u64,
    /// Blobs whose token has no comment grammar.
    pub unsupported: u64,
    /// Content fetches attempted.
    pub fetched: u64,
    /// Content fetches that failed.
    pub fetch_errors: u64,
    /// Fetched files rejected by the pre-filter.
    pub prefiltered: u64,
    /// Files in the final result.
    pub matched_files: u64,
    /// Lines in the final result.
    pub matched_lines: u64,
}

impl StatsSnapshot {
    /// Blobs skipped before fetching (no token or no grammar).
    #[inline]
    #[must_use]
    pub const fn skipped(&self) -> u64 {
        self.unclassified + self.unsupported
    }

    /// Fetches that returned content.
    #[inline]
    #[must_use]
    pub const fn fetched_ok(&self) -> u64 {
        self.fetched.saturating_sub(self.fetch_errors)
    }
}
