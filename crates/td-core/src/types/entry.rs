//! Repository tree listing types.
//!
//! A [`RepositorySnapshot`] is one point-in-time listing of a repository's
//! file tree, as returned by a recursive tree query against a single ref.

use std::fmt;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Opaque handle to one version of a file's bytes.
///
/// For git hosts this is the blob's object hash. It is both the key used to
/// fetch content and the identity of a matched file in a [`ScanResult`]:
/// an unchanged file keeps its identifier across scans.
///
/// [`ScanResult`]: crate::ScanResult
///
/// # Examples
///
/// ```
/// use td_core::ContentId;
///
/// let id = ContentId::new("95b966ae1c166bd92f8ae7d1c313e738c731dfc3");
/// assert_eq!(id.as_str().len(), 40);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(String);

impl ContentId {
    /// Creates a content identifier from any string-like value.
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContentId {
    #[inline]
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for ContentId {
    #[inline]
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Kind of object a tree entry points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    /// A regular file.
    Blob,
    /// A directory.
    Tree,
    /// Anything else (submodule commits, unknown kinds).
    #[serde(other)]
    Other,
}

impl EntryType {
    /// Returns `true` for regular files.
    #[inline]
    #[must_use]
    pub const fn is_blob(self) -> bool {
        matches!(self, Self::Blob)
    }
}

/// One listed path in a repository snapshot.
///
/// # Examples
///
/// ```
/// use td_core::{EntryType, TreeEntry};
///
/// let entry = TreeEntry::blob("src/main.rs", "a1b2c3");
/// assert_eq!(entry.entry_type, EntryType::Blob);
/// assert_eq!(entry.content_id.as_str(), "a1b2c3");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TreeEntry {
    /// Repository-relative path.
    pub path: Utf8PathBuf,

    /// Kind of object at this path.
    pub entry_type: EntryType,

    /// Handle used to fetch the object's bytes.
    pub content_id: ContentId,
}

impl TreeEntry {
    /// Creates a tree entry.
    #[must_use]
    pub fn new(
        path: impl Into<Utf8PathBuf>,
        entry_type: EntryType,
        content_id: impl Into<ContentId>,
    ) -> Self {
        Self {
            path: path.into(),
            entry_type,
            content_id: content_id.into(),
        }
    }

    /// Creates a regular-file entry.
    #[inline]
    #[must_use]
    pub fn blob(path: impl Into<Utf8PathBuf>, content_id: impl Into<ContentId>) -> Self {
        Self::new(path, EntryType::Blob, content_id)
    }

    /// Creates a directory entry.
    #[inline]
    #[must_use]
    pub fn tree(path: impl Into<Utf8PathBuf>, content_id: impl Into<ContentId>) -> Self {
        Self::new(path, EntryType::Tree, content_id)
    }
}

/// An ordered, immutable listing of a repository's tree.
///
/// Entries keep the order in which the tree source returned them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepositorySnapshot {
    entries: Vec<TreeEntry>,
}

impl RepositorySnapshot {
    /// Creates a snapshot from a list of entries.
    #[inline]
    #[must_use]
    pub const fn new(entries: Vec<TreeEntry>) -> Self {
        Self { entries }
    }

    /// Returns the entries in listing order.
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }

    /// Number of entries of any type.
    ///
    /// This is the scan cost estimate: one budget unit per entry.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the snapshot lists nothing.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over regular-file entries.
    pub fn blobs(&self) -> impl Iterator<Item = &TreeEntry> {
        self.entries.iter().filter(|e| e.entry_type.is_blob())
    }
}

impl FromIterator<TreeEntry> for RepositorySnapshot {
    fn from_iter<I: IntoIterator<Item = TreeEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_type_deserialize_unknown_is_other() {
        let parsed: EntryType = serde_json::from_str(r#""commit""#).unwrap();
        assert_eq!(parsed, EntryType::Other);
        let parsed: EntryType = serde_json::from_str(r#""blob""#).unwrap();
        assert_eq!(parsed, EntryType::Blob);
    }

    #[test]
    fn test_snapshot_blobs_filters_directories() {
        let snapshot: RepositorySnapshot = [
            TreeEntry::tree("src", "t1"),
            TreeEntry::blob("src/lib.rs", "b1"),
            TreeEntry::new("vendor/dep", EntryType::Other, "c1"),
        ]
        .into_iter()
        .collect();

        assert_eq!(snapshot.len(), 3);
        let blobs: Vec<_> = snapshot.blobs().map(|e| e.path.as_str()).collect();
        assert_eq!(blobs, vec!["src/lib.rs"]);
    }

    #[test]
    fn test_content_id_display() {
        let id = ContentId::from("abc123");
        assert_eq!(id.to_string(), "abc123");
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""abc123""#);
    }
}
