//! Scan admission and staleness.
//!
//! [`ScanCoordinator`] decides whether a repository needs scanning and
//! whether the remote call budget can afford it, then drives the
//! [`TreeWalker`].

use chrono::{DateTime, Utc};
use td_core::{Freshness, RepoRef, RepositoryInfo, RepositorySnapshot, ScanConfig};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::ScanError;
use crate::source::RemoteSource;
use crate::walker::{TreeWalker, WalkUpdate};
use crate::ScanReport;

/// Calls kept in reserve beyond a scan's estimated cost.
pub const SAFETY_MARGIN: u64 = 100;

/// Returns `true` if a scan costing `estimated_cost` calls fits within
/// `remaining_budget` with [`SAFETY_MARGIN`] to spare.
///
/// The comparison is strict: a scan that would leave exactly the margin is
/// refused.
///
/// # Examples
///
/// ```
/// use td_scanner::should_scan;
///
/// assert!(!should_scan(50, 100));
/// assert!(!should_scan(50, 150));
/// assert!(should_scan(50, 151));
/// ```
#[inline]
#[must_use]
pub const fn should_scan(estimated_cost: u64, remaining_budget: u64) -> bool {
    estimated_cost.saturating_add(SAFETY_MARGIN) < remaining_budget
}

/// Outcome of [`ScanCoordinator::plan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanPlan {
    /// The budget allows a scan of this snapshot.
    Ready {
        /// The snapshot to scan.
        snapshot: RepositorySnapshot,
        /// Calls left when the plan was made.
        remaining_budget: u64,
    },

    /// The budget is too low; retry after it refills.
    Deferred {
        /// Calls the scan would need (one per tree entry).
        estimated_cost: u64,
        /// Calls left when the plan was made.
        remaining_budget: u64,
    },
}

/// Outcome of [`ScanCoordinator::refresh`].
#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    /// The repository has not changed since the last scan.
    Fresh,

    /// The repository changed but the budget cannot cover a rescan.
    Deferred {
        /// Calls the scan would need.
        estimated_cost: u64,
        /// Calls left when the decision was made.
        remaining_budget: u64,
    },

    /// A scan ran.
    Scanned {
        /// The scan's result, per-file errors, and counters.
        report: Box<ScanReport>,
        /// Repository metadata, if it could be fetched after the scan.
        info: Option<RepositoryInfo>,
    },
}

/// Drives scans of one remote against a budget.
#[derive(Debug)]
pub struct ScanCoordinator<S> {
    source: S,
    walker: TreeWalker,
    git_ref: String,
}

impl<S: RemoteSource> ScanCoordinator<S> {
    /// Creates a coordinator for `source`.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Config`] if the walker cannot be built.
    pub fn new(source: S, config: &ScanConfig) -> Result<Self, ScanError> {
        Ok(Self {
            source,
            walker: TreeWalker::new(config)?,
            git_ref: config.git_ref.clone(),
        })
    }

    /// The underlying collaborator.
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// The walker used for scans.
    pub const fn walker(&self) -> &TreeWalker {
        &self.walker
    }

    /// The ref scanned by [`plan`](Self::plan).
    pub fn git_ref(&self) -> &str {
        &self.git_ref
    }

    /// Returns `true` if `repo` exists on the remote.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Source`] if the remote cannot answer.
    pub fn exists(&self, repo: &RepoRef) -> Result<bool, ScanError> {
        match self.source.info(repo) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(ScanError::from_source(format!("repository {repo}"), e)),
        }
    }

    /// Returns `true` if `repo` must be rescanned.
    ///
    /// A repository never scanned is stale without asking the remote.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::NotFound`] if the repository no longer exists,
    /// or [`ScanError::Source`] if the remote cannot answer.
    pub fn is_stale(
        &self,
        repo: &RepoRef,
        last_scan: Option<DateTime<Utc>>,
    ) -> Result<bool, ScanError> {
        let Some(since) = last_scan else {
            debug!(%repo, "Never scanned, stale");
            return Ok(true);
        };

        let freshness = self
            .source
            .check_modified_since(repo, since)
            .map_err(|e| ScanError::from_source(format!("freshness of {repo}"), e))?;

        match freshness {
            Freshness::NotModified => Ok(false),
            Freshness::Modified => Ok(true),
            Freshness::NotFound => Err(ScanError::NotFound(format!("repository {repo}"))),
        }
    }

    /// Takes a snapshot of `repo` and checks it against the call budget.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::NotFound`] if the repository or ref does not
    /// exist, or [`ScanError::Source`] if the remote cannot answer.
    pub fn plan(&self, repo: &RepoRef) -> Result<ScanPlan, ScanError> {
        let snapshot = self
            .source
            .snapshot(repo, &self.git_ref)
            .map_err(|e| ScanError::from_source(format!("tree {repo}@{}", self.git_ref), e))?;

        let remaining_budget = self
            .source
            .remaining_calls()
            .map_err(|e| ScanError::from_source("rate budget", e))?;
        let estimated_cost = u64::try_from(snapshot.len()).unwrap_or(u64::MAX);

        if should_scan(estimated_cost, remaining_budget) {
            debug!(%repo, estimated_cost, remaining_budget, "Scan admitted");
            Ok(ScanPlan::Ready {
                snapshot,
                remaining_budget,
            })
        } else {
            info!(%repo, estimated_cost, remaining_budget, "Scan deferred, budget too low");
            Ok(ScanPlan::Deferred {
                estimated_cost,
                remaining_budget,
            })
        }
    }

    /// Scans an admitted snapshot.
    pub fn run_scan(&self, snapshot: &RepositorySnapshot) -> ScanReport {
        self.walker.walk(snapshot, &self.source)
    }

    /// Scans an admitted snapshot, streaming updates over `tx`.
    pub fn run_scan_streaming(
        &self,
        snapshot: &RepositorySnapshot,
        tx: mpsc::Sender<WalkUpdate>,
    ) -> ScanReport {
        self.walker.walk_streaming(snapshot, &self.source, tx)
    }

    /// Rescans `repo` if it is stale and the budget allows.
    ///
    /// Metadata is fetched after a successful scan; a metadata failure is
    /// logged and does not discard the scan.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::NotFound`] if the repository is gone, or
    /// [`ScanError::Source`] if the remote cannot answer a
    /// repository-level request.
    pub fn refresh(
        &self,
        repo: &RepoRef,
        last_scan: Option<DateTime<Utc>>,
    ) -> Result<RefreshOutcome, ScanError> {
        self.refresh_with(repo, last_scan, None)
    }

    /// Same as [`refresh`](Self::refresh), streaming walk updates over `tx`.
    ///
    /// Nothing is sent when the refresh exits early; the channel just
    /// closes.
    ///
    /// # Errors
    ///
    /// See [`refresh`](Self::refresh).
    pub fn refresh_streaming(
        &self,
        repo: &RepoRef,
        last_scan: Option<DateTime<Utc>>,
        tx: mpsc::Sender<WalkUpdate>,
    ) -> Result<RefreshOutcome, ScanError> {
        self.refresh_with(repo, last_scan, Some(tx))
    }

    fn refresh_with(
        &self,
        repo: &RepoRef,
        last_scan: Option<DateTime<Utc>>,
        updates: Option<mpsc::Sender<WalkUpdate>>,
    ) -> Result<RefreshOutcome, ScanError> {
        if !self.is_stale(repo, last_scan)? {
            info!(%repo, "Repository unchanged since last scan");
            return Ok(RefreshOutcome::Fresh);
        }

        let snapshot = match self.plan(repo)? {
            ScanPlan::Ready { snapshot, .. } => snapshot,
            ScanPlan::Deferred {
                estimated_cost,
                remaining_budget,
            } => {
                return Ok(RefreshOutcome::Deferred {
                    estimated_cost,
                    remaining_budget,
                });
            }
        };

        let report = match updates {
            Some(tx) => self.run_scan_streaming(&snapshot, tx),
            None => self.run_scan(&snapshot),
        };
        let info = match self.source.info(repo) {
            Ok(info) => Some(info),
            Err(e) => {
                warn!(%repo, error = %e, "Failed to fetch repository metadata");
                None
            }
        };

        Ok(RefreshOutcome::Scanned {
            report: Box::new(report),
            info,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemorySource;
    use chrono::TimeZone;
    use td_core::TreeEntry;

    fn repo() -> RepoRef {
        RepoRef::new("octocat", "hello")
    }

    fn last_scan() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn source(budget: u64) -> MemorySource {
        MemorySource::new()
            .with_tree(
                &repo(),
                "master",
                vec![
                    TreeEntry::blob("a.rb", "b1"),
                    TreeEntry::blob("b.js", "b2"),
                ],
            )
            .with_blob("b1", "# TODO\n")
            .with_blob("b2", "ok();\n")
            .with_remaining_calls(budget)
    }

    fn coordinator(source: MemorySource) -> ScanCoordinator<MemorySource> {
        ScanCoordinator::new(source, &ScanConfig::default()).unwrap()
    }

    #[test]
    fn test_should_scan_requires_margin() {
        assert!(!should_scan(50, 100));
        assert!(should_scan(50, 200));
        assert!(!should_scan(0, 100));
        assert!(should_scan(0, 101));
    }

    #[test]
    fn test_should_scan_saturates() {
        assert!(!should_scan(u64::MAX, u64::MAX));
        assert!(!should_scan(u64::MAX - 10, 5));
    }

    #[test]
    fn test_is_stale_never_scanned() {
        // Unknown repo, but no remote call is made.
        let coordinator = coordinator(MemorySource::new());
        assert!(coordinator.is_stale(&repo(), None).unwrap());
    }

    #[test]
    fn test_is_stale_not_modified() {
        let coordinator = coordinator(source(1000).with_freshness(&repo(), Freshness::NotModified));
        assert!(!coordinator.is_stale(&repo(), Some(last_scan())).unwrap());
    }

    #[test]
    fn test_is_stale_modified() {
        let coordinator = coordinator(source(1000).with_freshness(&repo(), Freshness::Modified));
        assert!(coordinator.is_stale(&repo(), Some(last_scan())).unwrap());
    }

    #[test]
    fn test_is_stale_not_found() {
        let coordinator = coordinator(source(1000).with_freshness(&repo(), Freshness::NotFound));
        let err = coordinator
            .is_stale(&repo(), Some(last_scan()))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_exists() {
        let coordinator = coordinator(source(0));
        assert!(coordinator.exists(&repo()).unwrap());
        assert!(!coordinator.exists(&RepoRef::new("nobody", "nothing")).unwrap());
    }

    #[test]
    fn test_plan_ready_and_deferred() {
        let ready = coordinator(source(103)).plan(&repo()).unwrap();
        assert!(matches!(
            ready,
            ScanPlan::Ready { ref snapshot, remaining_budget: 103 } if snapshot.len() == 2
        ));

        let deferred = coordinator(source(102)).plan(&repo()).unwrap();
        assert_eq!(
            deferred,
            ScanPlan::Deferred {
                estimated_cost: 2,
                remaining_budget: 102
            }
        );
    }

    #[test]
    fn test_plan_missing_ref() {
        let config = ScanConfig {
            git_ref: "main".to_owned(),
            ..ScanConfig::default()
        };
        let coordinator = ScanCoordinator::new(source(1000), &config).unwrap();
        assert!(coordinator.plan(&repo()).unwrap_err().is_not_found());
    }

    #[test]
    fn test_refresh_fresh_skips_snapshot() {
        let coordinator = coordinator(source(1000).with_freshness(&repo(), Freshness::NotModified));
        let outcome = coordinator.refresh(&repo(), Some(last_scan())).unwrap();
        assert!(matches!(outcome, RefreshOutcome::Fresh));
        assert_eq!(coordinator.source().fetch_count(), 0);
    }

    #[test]
    fn test_refresh_deferred_fetches_nothing() {
        let coordinator = coordinator(source(10));
        let outcome = coordinator.refresh(&repo(), None).unwrap();
        assert!(matches!(
            outcome,
            RefreshOutcome::Deferred {
                estimated_cost: 2,
                remaining_budget: 10
            }
        ));
        assert_eq!(coordinator.source().fetch_count(), 0);
    }

    #[test]
    fn test_refresh_scans_and_fetches_info() {
        let info = RepositoryInfo {
            stars: 42,
            ..RepositoryInfo::default()
        };
        let coordinator = coordinator(source(1000).with_info(&repo(), info));
        let RefreshOutcome::Scanned { report, info } =
            coordinator.refresh(&repo(), Some(last_scan())).unwrap()
        else {
            panic!("expected a scan");
        };
        assert_eq!(report.result.len(), 1);
        assert_eq!(info.map(|i| i.stars), Some(42));
    }

    #[test]
    fn test_run_scan_streaming_completes() {
        let coordinator = coordinator(source(1000));
        let ScanPlan::Ready { snapshot, .. } = coordinator.plan(&repo()).unwrap() else {
            panic!("expected a ready plan");
        };
        let (tx, mut rx) = mpsc::channel(16);
        let report = coordinator.run_scan_streaming(&snapshot, tx);

        let mut completed = None;
        while let Some(update) = rx.blocking_recv() {
            if let WalkUpdate::Complete(stats) = update {
                completed = Some(stats);
            }
        }
        assert_eq!(report.result.len(), 1);
        assert_eq!(completed.map(|s| s.matched_files), Some(1));
    }

    #[test]
    fn test_refresh_streaming_matches_refresh() {
        let coordinator = coordinator(source(1000));
        let (tx, mut rx) = mpsc::channel(16);

        let streamed = coordinator.refresh_streaming(&repo(), None, tx).unwrap();
        let mut matched = 0;
        while let Some(update) = rx.blocking_recv() {
            if matches!(update, WalkUpdate::FileMatched(_)) {
                matched += 1;
            }
        }

        let RefreshOutcome::Scanned { report: streamed, .. } = streamed else {
            panic!("expected a scan");
        };
        let RefreshOutcome::Scanned { report: plain, .. } =
            coordinator.refresh(&repo(), None).unwrap()
        else {
            panic!("expected a scan");
        };
        assert_eq!(matched, 1);
        assert_eq!(streamed.result, plain.result);
    }

    #[test]
    fn test_refresh_streaming_early_exit_closes_channel() {
        let coordinator = coordinator(source(1000).with_freshness(&repo(), Freshness::NotModified));
        let (tx, mut rx) = mpsc::channel(16);

        let outcome = coordinator
            .refresh_streaming(&repo(), Some(last_scan()), tx)
            .unwrap();
        assert!(matches!(outcome, RefreshOutcome::Fresh));
        assert!(rx.blocking_recv().is_none());
    }
}
