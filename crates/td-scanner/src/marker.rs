//! Task marker detection.
//!
//! Detection is two explicit steps:
//!
//! 1. Locate the first comment-start token on the line. Anything may precede
//!    it, so trailing comments after code count.
//! 2. Match the rest of the line, ASCII-case-insensitively, against
//!    [`MARKERS`] as plain substrings. There is no word-boundary check:
//!    `debugging` and `bugged` match.
//!
//! [`content_may_contain_marker`] is the cheap whole-content pre-filter run
//! before the per-line pass. It applies the step 2 check to the entire
//! content, so it can only reject content that no line could match.

use crate::grammar::CommentSyntax;
use td_core::LineNumbers;

/// Marker terms, lowercase.
pub const MARKERS: [&str; 4] = ["todo", "to do", "bugbug", "bug"];

/// Returns `true` if `text` contains any marker, ignoring ASCII case.
///
/// # Examples
///
/// ```
/// use td_scanner::contains_marker;
///
/// assert!(contains_marker("FIXME: ToDo later"));
/// assert!(contains_marker("still debugging"));
/// assert!(!contains_marker("all good"));
/// ```
#[must_use]
pub fn contains_marker(text: &str) -> bool {
    let lowered = text.to_ascii_lowercase();
    MARKERS.iter().any(|marker| lowered.contains(marker))
}

/// Returns `true` if `line` has a marker inside a comment started by
/// `comment_start`.
///
/// An empty `comment_start` never matches.
///
/// # Examples
///
/// ```
/// use td_scanner::has_marker;
///
/// assert!(has_marker("x=1 // this is a todo", "//"));
/// assert!(!has_marker("todo_list = [] // ready", "//"));
/// assert!(!has_marker("# TODO", ""));
/// ```
#[must_use]
pub fn has_marker(line: &str, comment_start: &str) -> bool {
    if comment_start.is_empty() {
        return false;
    }
    line.find(comment_start)
        .is_some_and(|idx| contains_marker(&line[idx..]))
}

/// Applies the right per-line rule for a language.
///
/// Languages with a single-line comment form use [`has_marker`]. Block-only
/// languages are scanned as plain text, since block bodies are not extracted.
#[must_use]
pub fn line_has_marker(line: &str, syntax: &CommentSyntax) -> bool {
    match syntax.line {
        Some(start) => has_marker(line, start),
        None => contains_marker(line),
    }
}

/// Coarse whole-content check: could any line of `content` match?
///
/// # Examples
///
/// ```
/// use td_scanner::content_may_contain_marker;
///
/// assert!(content_may_contain_marker(b"fn main() {}\n// TODO: args\n"));
/// assert!(!content_may_contain_marker(b"fn main() {}\n"));
/// ```
#[must_use]
pub fn content_may_contain_marker(content: &[u8]) -> bool {
    let lowered = content.to_ascii_lowercase();
    MARKERS.iter().any(|marker| {
        lowered
            .windows(marker.len())
            .any(|window| window == marker.as_bytes())
    })
}

/// Returns the 1-based numbers of matching lines in `content`.
///
/// Lines end at `\n`; a trailing terminator does not add an empty last line
/// and a `\r` before the terminator is dropped.
#[must_use]
pub fn matching_lines(content: &str, syntax: &CommentSyntax) -> LineNumbers {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| line_has_marker(line, syntax))
        .filter_map(|(idx, _)| u32::try_from(idx + 1).ok())
        .collect()
}
