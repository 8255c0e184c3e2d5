//! Domain types for todo-scan.
//!
//! - Tree entries and snapshots: [`TreeEntry`], [`RepositorySnapshot`]
//! - Per-file marker matches: [`FileMatch`], [`ScanResult`]
//! - Repository identity, metadata, and freshness: [`RepoRef`],
//!   [`RepositoryInfo`], [`Freshness`]
//!
//! All public types are re-exported here and at the crate root:
//!
//! ```
//! use td_core::{FileMatch, RepositorySnapshot, ScanResult, TreeEntry};
//! ```

mod entry;
mod matches;
mod repo;

pub use entry::{ContentId, EntryType, RepositorySnapshot, TreeEntry};
pub use matches::{FileMatch, LineNumbers, ScanResult};
pub use repo::{Freshness, ParseRepoRefError, RepoRef, RepositoryInfo};
