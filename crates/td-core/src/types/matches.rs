//! Marker match types produced by a scan.

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::entry::ContentId;
use crate::hash::{FxHashMap, fx_hash_map, fx_hash_map_with_capacity};

/// 1-based line numbers of matched lines.
///
/// Inline storage covers the common case of a handful of markers per file.
pub type LineNumbers = SmallVec<[u32; 8]>;

/// A file whose content contains at least one task marker in a comment.
///
/// # Invariants
///
/// - `lines` is non-empty, strictly ascending, 1-based
/// - every value is at most the file's line count at scan time
/// - `language` is a token with a comment grammar entry
///
/// # Examples
///
/// ```
/// use td_core::{ContentId, FileMatch};
/// use camino::Utf8PathBuf;
/// use smallvec::smallvec;
///
/// let m = FileMatch {
///     content_id: ContentId::new("a1b2"),
///     path: Utf8PathBuf::from("lib/parser.rb"),
///     language: "rb".to_owned(),
///     lines: smallvec![3, 17],
/// };
/// assert_eq!(m.line_count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMatch {
    /// Content identifier of the scanned bytes.
    pub content_id: ContentId,

    /// Repository-relative path of the file.
    pub path: Utf8PathBuf,

    /// Language token the file was scanned as.
    pub language: String,

    /// Matched line numbers.
    pub lines: LineNumbers,
}

impl FileMatch {
    /// Number of matched lines.
    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

/// All file matches from one scan, keyed by content identifier.
///
/// A fresh `ScanResult` is built for every scan and replaces prior results
/// for the repository wholesale; it is never patched across scans.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanResult {
    files: FxHashMap<ContentId, FileMatch>,
}

impl ScanResult {
    /// Creates an empty result.
    #[must_use]
    pub fn new() -> Self {
        Self {
            files: fx_hash_map(),
        }
    }

    /// Creates an empty result with room for `capacity` files.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            files: fx_hash_map_with_capacity(capacity),
        }
    }

    /// Inserts a match, returning the one it replaced for the same content id.
    pub fn insert(&mut self, file: FileMatch) -> Option<FileMatch> {
        self.files.insert(file.content_id.clone(), file)
    }

    /// Looks up a match by content identifier.
    #[must_use]
    pub fn get(&self, id: &ContentId) -> Option<&FileMatch> {
        self.files.get(id)
    }

    /// Number of matched files.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` if no file matched.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Total matched lines across all files.
    #[must_use]
    pub fn total_lines(&self) -> usize {
        self.files.values().map(FileMatch::line_count).sum()
    }

    /// Iterates over matches in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &FileMatch> {
        self.files.values()
    }

    /// Returns matches ordered by path, then content id.
    #[must_use]
    pub fn sorted_by_path(&self) -> Vec<&FileMatch> {
        let mut files: Vec<&FileMatch> = self.files.values().collect();
        files.sort_by(|a, b| {
            a.path
                .cmp(&b.path)
                .then_with(|| a.content_id.cmp(&b.content_id))
        });
        files
    }
}
