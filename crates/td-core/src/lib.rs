//! Core types, configuration, and errors for the todo-scan workspace.
//!
//! This crate provides the foundational types used across the workspace:
//!
//! - Domain types for repository snapshots and scan results
//!   ([`TreeEntry`], [`RepositorySnapshot`], [`FileMatch`], [`ScanResult`])
//! - Repository identity and metadata ([`RepoRef`], [`RepositoryInfo`])
//! - Configuration structures ([`Config`])
//! - Type aliases for `FxHashMap`/`FxHashSet` (faster than std)

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod hash;
pub mod types;

pub use config::{Config, ExtensionRule, GithubConfig, ScanConfig};
pub use error::ConfigError;
pub use hash::{FxHashMap, FxHashSet, fx_hash_map, fx_hash_map_with_capacity};
pub use types::{
    ContentId, EntryType, FileMatch, Freshness, LineNumbers, ParseRepoRefError, RepoRef,
    RepositoryInfo, RepositorySnapshot, ScanResult, TreeEntry,
};
