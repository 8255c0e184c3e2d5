//! Comment-aware task marker scanner for remote repository snapshots.
//!
//! This crate finds lines carrying task markers (`todo`, `to do`, `bugbug`,
//! `bug`) inside source comments of a remote repository. It never talks to
//! the remote itself; trees, blobs, budget, and freshness come through the
//! collaborator traits in [`source`].
//!
//! # Overview
//!
//! - [`classify`]: path to language token
//! - [`grammar`]: language token to comment syntax
//! - [`has_marker`] / [`matching_lines`]: per-line detection
//! - [`TreeWalker`]: parallel fetch-and-scan over a snapshot
//! - [`ScanCoordinator`]: staleness, budget admission, refresh
//! - [`ScanStats`]: atomic counters for one walk
//!
//! # Example
//!
//! ```
//! use td_core::{RepoRef, ScanConfig, TreeEntry};
//! use td_scanner::{MemorySource, RefreshOutcome, ScanCoordinator};
//!
//! let repo = RepoRef::new("octocat", "hello");
//! let source = MemorySource::new()
//!     .with_tree(&repo, "master", vec![TreeEntry::blob("app.py", "b1")])
//!     .with_blob("b1", "run()  # TODO: retry\n")
//!     .with_remaining_calls(500);
//!
//! let coordinator = ScanCoordinator::new(source, &ScanConfig::default())?;
//! if let RefreshOutcome::Scanned { report, .. } = coordinator.refresh(&repo, None)? {
//!     assert_eq!(report.result.total_lines(), 1);
//! }
//! # Ok::<(), td_scanner::ScanError>(())
//! ```
//!
//! # Streaming API
//!
//! [`ScanCoordinator::refresh_streaming`] (and the lower-level
//! [`TreeWalker::walk_streaming`]) send [`WalkUpdate`]s as files finish so a
//! front end can show progress while the refresh runs on another thread:
//!
//! ```ignore
//! let (tx, mut rx) = mpsc::channel(256);
//! let outcome = std::thread::scope(|s| {
//!     let handle = s.spawn(|| coordinator.refresh_streaming(&repo, None, tx));
//!     while let Some(update) = rx.blocking_recv() {
//!         match update {
//!             WalkUpdate::EntriesDiscovered(n) => println!("{n} entries"),
//!             WalkUpdate::FileMatched(file) => println!("{}", file.path),
//!             WalkUpdate::FileError(error) => println!("failed: {error}"),
//!             WalkUpdate::Complete(stats) => println!("{} files", stats.matched_files),
//!         }
//!     }
//!     handle.join()
//! });
//! ```
//!
//! # Architecture
//!
//! ```text
//! ScanCoordinator
//!     │
//!     ├── RemoteSource (tree, content, budget, freshness, info)
//!     │
//!     └── TreeWalker (rayon pool)
//!             │
//!             ├── classify ── grammar::lookup
//!             ├── ContentSource::fetch
//!             ├── content_may_contain_marker (pre-filter)
//!             ├── matching_lines
//!             └── ScanStats (atomic counters)
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod classify;
mod coordinator;
mod error;
pub mod grammar;
mod marker;
mod memory;
pub mod source;
mod stats;
mod walker;

pub use classify::classify;
pub use coordinator::{RefreshOutcome, SAFETY_MARGIN, ScanCoordinator, ScanPlan, should_scan};
pub use error::{ScanError, SourceError};
pub use grammar::{BlockSyntax, CommentSyntax};
pub use marker::{
    MARKERS, contains_marker, content_may_contain_marker, has_marker, line_has_marker,
    matching_lines,
};
pub use memory::MemorySource;
pub use source::{ContentSource, FreshnessSource, InfoSource, RateBudgetSource, RemoteSource, TreeSource};
pub use stats::{ScanStats, StatsSnapshot};
pub use walker::{TreeWalker, WalkUpdate};

use td_core::ScanResult;

/// Everything one walk produced.
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// Files with at least one marker line, keyed by content id.
    pub result: ScanResult,
    /// Per-file fetch failures; each carries its path.
    pub errors: Vec<ScanError>,
    /// Counters for the walk.
    pub stats: StatsSnapshot,
}

impl ScanReport {
    /// Returns `true` if every eligible file was fetched.
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}
