//! GitHub REST adapter for todo-scan.
//!
//! [`GithubClient`] implements the `td-scanner` collaborator traits
//! (`TreeSource`, `ContentSource`, `RateBudgetSource`, `FreshnessSource`,
//! `InfoSource`) on top of a blocking `reqwest` client, so it can be handed
//! straight to a `ScanCoordinator`.
//!
//! # Example
//!
//! ```no_run
//! use td_core::{GithubConfig, RepoRef, ScanConfig};
//! use td_github::GithubClient;
//! use td_scanner::{RefreshOutcome, ScanCoordinator};
//!
//! let repo: RepoRef = "octocat/Hello-World".parse()?;
//! let client = GithubClient::new(&GithubConfig::default(), repo.clone())?;
//! let coordinator = ScanCoordinator::new(client, &ScanConfig::default())?;
//!
//! match coordinator.refresh(&repo, None)? {
//!     RefreshOutcome::Scanned { report, .. } => println!("{} files", report.result.len()),
//!     RefreshOutcome::Deferred { .. } => println!("rate limit too low"),
//!     RefreshOutcome::Fresh => println!("unchanged"),
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod client;
mod error;
mod wire;

pub use client::GithubClient;
pub use error::GithubError;
