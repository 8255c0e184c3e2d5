//! Snapshot traversal: filter, classify, fetch, scan.
//!
//! [`TreeWalker`] turns a [`RepositorySnapshot`] into a [`ScanReport`].
//!
//! # Design
//!
//! Each tree entry is an independent fetch-and-scan unit:
//!
//! 1. Non-blobs are skipped
//! 2. The path is classified and looked up in the comment grammar table
//! 3. Content is fetched from the [`ContentSource`]
//! 4. The whole-content pre-filter runs
//! 5. Surviving content is scanned line by line
//!
//! Units run on a bounded rayon pool. Outcomes are collected in snapshot
//! order and assembled sequentially, so the report does not depend on which
//! unit finished first. When two entries share a content id, the later one
//! in the snapshot owns the match.
//!
//! # Examples
//!
//! ```
//! use td_core::{RepositorySnapshot, ScanConfig, TreeEntry};
//! use td_scanner::{MemorySource, TreeWalker};
//!
//! let source = MemorySource::new().with_blob("b1", "x = 1 # TODO\n");
//! let snapshot = RepositorySnapshot::new(vec![TreeEntry::blob("a.rb", "b1")]);
//!
//! let walker = TreeWalker::new(&ScanConfig::default())?;
//! let report = walker.walk(&snapshot, &source);
//! assert_eq!(report.result.len(), 1);
//! # Ok::<(), td_scanner::ScanError>(())
//! ```

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use td_core::{ExtensionRule, FileMatch, RepositorySnapshot, ScanConfig, ScanResult, TreeEntry};
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use crate::classify::classify;
use crate::error::ScanError;
use crate::grammar::{self, CommentSyntax};
use crate::marker::{content_may_contain_marker, matching_lines};
use crate::source::ContentSource;
use crate::stats::{ScanStats, StatsSnapshot};
use crate::ScanReport;

/// Update sent during a streaming walk.
///
/// Order: one [`EntriesDiscovered`](Self::EntriesDiscovered), then
/// [`FileMatched`](Self::FileMatched) / [`FileError`](Self::FileError) in
/// completion order, then one [`Complete`](Self::Complete).
#[derive(Debug)]
pub enum WalkUpdate {
    /// Number of entries in the snapshot.
    EntriesDiscovered(usize),

    /// A file had at least one marker line.
    ///
    /// Boxed to keep the enum small on the channel.
    FileMatched(Box<FileMatch>),

    /// A file's content could not be fetched.
    ///
    /// The failing path is available through [`ScanError::path`].
    FileError(ScanError),

    /// The walk finished; carries the final counters.
    ///
    /// The full report is the return value of the walk.
    Complete(StatsSnapshot),
}

/// Result of one fetch-and-scan unit.
#[derive(Debug)]
enum FileOutcome {
    Skipped,
    Clean,
    Matched(FileMatch),
    Failed(ScanError),
}

/// Walks repository snapshots on a bounded worker pool.
#[derive(Debug)]
pub struct TreeWalker {
    rule: ExtensionRule,
    pool: ThreadPool,
}

impl TreeWalker {
    /// Creates a walker from scanner configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Config`] if the worker pool cannot be built.
    pub fn new(config: &ScanConfig) -> Result<Self, ScanError> {
        let mut builder = ThreadPoolBuilder::new().thread_name(|i| format!("td-walk-{i}"));
        if let Some(workers) = config.workers {
            if workers == 0 {
                return Err(ScanError::config("workers must be at least 1"));
            }
            builder = builder.num_threads(workers);
        }
        let pool = builder
            .build()
            .map_err(|e| ScanError::config(format!("failed to build worker pool: {e}")))?;

        Ok(Self {
            rule: config.extension_rule,
            pool,
        })
    }

    /// Number of worker threads.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Walks `snapshot`, fetching content from `source`.
    ///
    /// Per-file fetch failures land in [`ScanReport::errors`]; they never
    /// abort the walk.
    pub fn walk<C>(&self, snapshot: &RepositorySnapshot, source: &C) -> ScanReport
    where
        C: ContentSource + ?Sized,
    {
        info!(entries = snapshot.len(), workers = self.workers(), "Starting walk");
        self.walk_inner(snapshot, source, |_| {})
    }

    /// Walks `snapshot`, streaming per-file updates over `tx`.
    ///
    /// Returns the same report as [`walk`](Self::walk). A dropped receiver
    /// does not stop the walk; updates are discarded.
    /// Must not be called from inside an async runtime: it uses
    /// `blocking_send`.
    #[allow(clippy::needless_pass_by_value)] // Sender is dropped on return to close the channel
    pub fn walk_streaming<C>(
        &self,
        snapshot: &RepositorySnapshot,
        source: &C,
        tx: mpsc::Sender<WalkUpdate>,
    ) -> ScanReport
    where
        C: ContentSource + ?Sized,
    {
        info!(entries = snapshot.len(), workers = self.workers(), "Starting streaming walk");

        if tx
            .blocking_send(WalkUpdate::EntriesDiscovered(snapshot.len()))
            .is_err()
        {
            debug!("Walk update receiver dropped");
        }

        let report = self.walk_inner(snapshot, source, |outcome| {
            let update = match outcome {
                FileOutcome::Matched(file) => WalkUpdate::FileMatched(Box::new(file.clone())),
                FileOutcome::Failed(error) => WalkUpdate::FileError(error.clone()),
                FileOutcome::Skipped | FileOutcome::Clean => return,
            };
            let _ = tx.blocking_send(update);
        });

        let _ = tx.blocking_send(WalkUpdate::Complete(report.stats));
        report
    }

    fn walk_inner<C, F>(&self, snapshot: &RepositorySnapshot, source: &C, notify: F) -> ScanReport
    where
        C: ContentSource + ?Sized,
        F: Fn(&FileOutcome) + Sync,
    {
        let stats = ScanStats::new();

        let outcomes: Vec<FileOutcome> = self.pool.install(|| {
            snapshot
                .entries()
                .par_iter()
                .map(|entry| {
                    let outcome = self.process_entry(entry, source, &stats);
                    notify(&outcome);
                    outcome
                })
                .collect()
        });

        let report = assemble(outcomes, &stats);
        info!(
            entries = report.stats.entries,
            fetched = report.stats.fetched,
            matched_files = report.stats.matched_files,
            matched_lines = report.stats.matched_lines,
            errors = report.errors.len(),
            "Walk completed"
        );
        report
    }

    fn process_entry<C>(&self, entry: &TreeEntry, source: &C, stats: &ScanStats) -> FileOutcome
    where
        C: ContentSource + ?Sized,
    {
        stats.increment_entries();
        if !entry.entry_type.is_blob() {
            return FileOutcome::Skipped;
        }
        stats.increment_blobs();

        let Some(token) = classify(entry.path.as_str(), self.rule) else {
            trace!(path = %entry.path, "No extension, skipping");
            stats.increment_unclassified();
            return FileOutcome::Skipped;
        };
        let Some(syntax) = grammar::lookup(token) else {
            trace!(path = %entry.path, token, "No comment grammar, skipping");
            stats.increment_unsupported();
            return FileOutcome::Skipped;
        };

        stats.increment_fetched();
        let content = match source.fetch(&entry.content_id) {
            Ok(content) => content,
            Err(e) => {
                stats.increment_fetch_errors();
                warn!(path = %entry.path, content_id = %entry.content_id, error = %e, "Failed to fetch content");
                return FileOutcome::Failed(ScanError::fetch(
                    entry.path.clone(),
                    entry.content_id.clone(),
                    e,
                ));
            }
        };

        if !content_may_contain_marker(&content) {
            stats.increment_prefiltered();
            return FileOutcome::Clean;
        }

        match scan_content(entry, syntax, &content) {
            Some(file) => {
                debug!(path = %file.path, lines = file.line_count(), "Found markers");
                FileOutcome::Matched(file)
            }
            None => FileOutcome::Clean,
        }
    }
}

/// Runs the per-line pass over fetched content.
fn scan_content(entry: &TreeEntry, syntax: &CommentSyntax, content: &[u8]) -> Option<FileMatch> {
    let text = String::from_utf8_lossy(content);
    let lines = matching_lines(&text, syntax);
    if lines.is_empty() {
        return None;
    }
    Some(FileMatch {
        content_id: entry.content_id.clone(),
        path: entry.path.clone(),
        language: syntax.language.to_owned(),
        lines,
    })
}

/// Builds the report from outcomes in snapshot order.
fn assemble(outcomes: Vec<FileOutcome>, stats: &ScanStats) -> ScanReport {
    let matched = outcomes
        .iter()
        .filter(|o| matches!(o, FileOutcome::Matched(_)))
        .count();
    let mut result = ScanResult::with_capacity(matched);
    let mut errors = Vec::new();

    for outcome in outcomes {
        match outcome {
            FileOutcome::Matched(file) => {
                if let Some(previous) = result.insert(file) {
                    debug!(path = %previous.path, content_id = %previous.content_id, "Content id listed twice, keeping later path");
                }
            }
            FileOutcome::Failed(error) => errors.push(error),
            FileOutcome::Skipped | FileOutcome::Clean => {}
        }
    }

    stats.record_matches(
        u64::try_from(result.len()).unwrap_or(u64::MAX),
        u64::try_from(result.total_lines()).unwrap_or(u64::MAX),
    );

    ScanReport {
        result,
        errors,
        stats: stats.snapshot(),
    }
}
