//! File classification by path extension.
//!
//! A path's language token is a run of ASCII word characters
//! (`[A-Za-z0-9_]`) following a dot. Which dot is decided by the
//! [`ExtensionRule`]; with the default [`ExtensionRule::FirstDot`] it is the
//! first dot in the whole path that is followed by a word character, so
//! `app.module.ts` classifies as `module` and `v1.2/main.rs` as `2`.
//!
//! Paths without a usable dot yield `None`. That is a normal filtering
//! outcome, not an error.

use td_core::ExtensionRule;

/// Extracts the language token from a repository path.
///
/// # Examples
///
/// ```
/// use td_core::ExtensionRule;
/// use td_scanner::classify;
///
/// assert_eq!(classify("lib/todo.rb", ExtensionRule::FirstDot), Some("rb"));
/// assert_eq!(classify("lib/util", ExtensionRule::FirstDot), None);
/// assert_eq!(classify("v1.2/main.rs", ExtensionRule::FileNameLastDot), Some("rs"));
/// ```
#[must_use]
pub fn classify(path: &str, rule: ExtensionRule) -> Option<&str> {
    match rule {
        ExtensionRule::FirstDot => path
            .match_indices('.')
            .find_map(|(idx, _)| word_prefix(&path[idx + 1..])),
        ExtensionRule::FileNameLastDot => {
            let file_name = path.rsplit('/').next()?;
            let idx = file_name.rfind('.')?;
            word_prefix(&file_name[idx + 1..])
        }
    }
}

/// Returns the leading run of ASCII word characters, if non-empty.
fn word_prefix(s: &str) -> Option<&str> {
    let end = s
        .bytes()
        .position(|b| !(b.is_ascii_alphanumeric() || b == b'_'))
        .unwrap_or(s.len());
    (end > 0).then(|| &s[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIRST: ExtensionRule = ExtensionRule::FirstDot;
    const LAST: ExtensionRule = ExtensionRule::FileNameLastDot;

    #[test]
    fn test_first_dot_simple() {
        assert_eq!(classify("app/models/repo.rb", FIRST), Some("rb"));
        assert_eq!(classify("main.py", FIRST), Some("py"));
    }

    #[test]
    fn test_no_dot_yields_none() {
        assert_eq!(classify("lib/util", FIRST), None);
        assert_eq!(classify("Makefile", FIRST), None);
        assert_eq!(classify("", FIRST), None);
        assert_eq!(classify("lib/util", LAST), None);
    }

    #[test]
    fn test_first_dot_takes_first_extension() {
        assert_eq!(classify("src/app.module.ts", FIRST), Some("module"));
        assert_eq!(classify("dist/jquery.min.js", FIRST), Some("min"));
    }

    #[test]
    fn test_first_dot_directory_quirk() {
        // A dot in a directory name wins over the file's extension.
        assert_eq!(classify("v1.2/file", FIRST), Some("2"));
        assert_eq!(classify("docs.d/main.rs", FIRST), Some("d"));
    }

    #[test]
    fn test_first_dot_skips_dots_without_word() {
        assert_eq!(classify("a./b.c", FIRST), Some("c"));
        assert_eq!(classify("trailing.", FIRST), None);
        assert_eq!(classify("../setup.sh", FIRST), Some("sh"));
    }

    #[test]
    fn test_token_stops_at_non_word() {
        assert_eq!(classify("notes.txt-backup", FIRST), Some("txt"));
        assert_eq!(classify("weird.é", FIRST), None);
    }

    #[test]
    fn test_hidden_file() {
        assert_eq!(classify(".travis.yml", FIRST), Some("travis"));
        assert_eq!(classify(".travis.yml", LAST), Some("yml"));
    }

    #[test]
    fn test_file_name_last_dot() {
        assert_eq!(classify("v1.2/file", LAST), None);
        assert_eq!(classify("src/app.module.ts", LAST), Some("ts"));
        assert_eq!(classify("archive.tar.gz", LAST), Some("gz"));
    }
}
