//! Comment grammar table.
//!
//! Maps a language token (as produced by [`classify`](crate::classify)) to
//! its comment syntax. Adding a language means adding a table row.
//!
//! # Examples
//!
//! ```
//! use td_scanner::grammar;
//!
//! let ruby = grammar::lookup("rb").unwrap();
//! assert_eq!(ruby.line, Some("#"));
//! assert!(grammar::lookup("docx").is_none());
//! ```

/// Delimiters of a block comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockSyntax {
    /// Opening delimiter.
    pub start: &'static str,
    /// Closing delimiter.
    pub end: &'static str,
}

/// Comment syntax of one language.
///
/// `line` drives marker detection. `block` is recorded for languages that
/// have it, but block bodies are not extracted: a language with no
/// single-line form is scanned line by line as plain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommentSyntax {
    /// Language token, lowercase.
    pub language: &'static str,
    /// Single-line comment start, if the language has one.
    pub line: Option<&'static str>,
    /// Block comment delimiters, if the language has them.
    pub block: Option<BlockSyntax>,
}

impl CommentSyntax {
    const fn line(language: &'static str, start: &'static str) -> Self {
        Self {
            language,
            line: Some(start),
            block: None,
        }
    }

    const fn line_and_block(
        language: &'static str,
        start: &'static str,
        block_start: &'static str,
        block_end: &'static str,
    ) -> Self {
        Self {
            language,
            line: Some(start),
            block: Some(BlockSyntax {
                start: block_start,
                end: block_end,
            }),
        }
    }

    const fn block_only(
        language: &'static str,
        block_start: &'static str,
        block_end: &'static str,
    ) -> Self {
        Self {
            language,
            line: None,
            block: Some(BlockSyntax {
                start: block_start,
                end: block_end,
            }),
        }
    }
}

const C_BLOCK: (&str, &str) = ("/*", "*/");
const MARKUP_BLOCK: (&str, &str) = ("<!--", "-->");

/// Every language the scanner knows about.
pub const GRAMMAR: &[CommentSyntax] = &[
    // `#` family
    CommentSyntax::line_and_block("rb", "#", "=begin", "=end"),
    CommentSyntax::line("py", "#"),
    CommentSyntax::line("sh", "#"),
    CommentSyntax::line("bash", "#"),
    CommentSyntax::line("zsh", "#"),
    CommentSyntax::line("pl", "#"),
    CommentSyntax::line("pm", "#"),
    CommentSyntax::line("r", "#"),
    CommentSyntax::line("ex", "#"),
    CommentSyntax::line("exs", "#"),
    CommentSyntax::line("cr", "#"),
    CommentSyntax::line("nim", "#"),
    CommentSyntax::line_and_block("coffee", "#", "###", "###"),
    CommentSyntax::line("yml", "#"),
    CommentSyntax::line("yaml", "#"),
    CommentSyntax::line("toml", "#"),
    CommentSyntax::line("cmake", "#"),
    // `//` family
    CommentSyntax::line_and_block("rs", "//", C_BLOCK.0, C_BLOCK.1),
    CommentSyntax::line_and_block("c", "//", C_BLOCK.0, C_BLOCK.1),
    CommentSyntax::line_and_block("h", "//", C_BLOCK.0, C_BLOCK.1),
    CommentSyntax::line_and_block("cc", "//", C_BLOCK.0, C_BLOCK.1),
    CommentSyntax::line_and_block("cpp", "//", C_BLOCK.0, C_BLOCK.1),
    CommentSyntax::line_and_block("hpp", "//", C_BLOCK.0, C_BLOCK.1),
    CommentSyntax::line_and_block("m", "//", C_BLOCK.0, C_BLOCK.1),
    CommentSyntax::line_and_block("cs", "//", C_BLOCK.0, C_BLOCK.1),
    CommentSyntax::line_and_block("java", "//", C_BLOCK.0, C_BLOCK.1),
    CommentSyntax::line_and_block("kt", "//", C_BLOCK.0, C_BLOCK.1),
    CommentSyntax::line_and_block("scala", "//", C_BLOCK.0, C_BLOCK.1),
    CommentSyntax::line_and_block("groovy", "//", C_BLOCK.0, C_BLOCK.1),
    CommentSyntax::line_and_block("go", "//", C_BLOCK.0, C_BLOCK.1),
    CommentSyntax::line_and_block("swift", "//", C_BLOCK.0, C_BLOCK.1),
    CommentSyntax::line_and_block("dart", "//", C_BLOCK.0, C_BLOCK.1),
    CommentSyntax::line_and_block("js", "//", C_BLOCK.0, C_BLOCK.1),
    CommentSyntax::line_and_block("jsx", "//", C_BLOCK.0, C_BLOCK.1),
    CommentSyntax::line_and_block("ts", "//", C_BLOCK.0, C_BLOCK.1),
    CommentSyntax::line_and_block("tsx", "//", C_BLOCK.0, C_BLOCK.1),
    CommentSyntax::line_and_block("php", "//", C_BLOCK.0, C_BLOCK.1),
    CommentSyntax::line_and_block("proto", "//", C_BLOCK.0, C_BLOCK.1),
    CommentSyntax::line("zig", "//"),
    // `--` family
    CommentSyntax::line_and_block("sql", "--", C_BLOCK.0, C_BLOCK.1),
    CommentSyntax::line_and_block("lua", "--", "--[[", "]]"),
    CommentSyntax::line_and_block("hs", "--", "{-", "-}"),
    // `%` and `;` families
    CommentSyntax::line("erl", "%"),
    CommentSyntax::line("tex", "%"),
    CommentSyntax::line("clj", ";"),
    CommentSyntax::line("lisp", ";"),
    CommentSyntax::line("el", ";"),
    CommentSyntax::line("asm", ";"),
    // block-only
    CommentSyntax::block_only("css", C_BLOCK.0, C_BLOCK.1),
    CommentSyntax::block_only("html", MARKUP_BLOCK.0, MARKUP_BLOCK.1),
    CommentSyntax::block_only("htm", MARKUP_BLOCK.0, MARKUP_BLOCK.1),
    CommentSyntax::block_only("xml", MARKUP_BLOCK.0, MARKUP_BLOCK.1),
];

/// Looks up a language token, ignoring ASCII case.
#[must_use]
pub fn lookup(token: &str) -> Option<&'static CommentSyntax> {
    GRAMMAR
        .iter()
        .find(|syntax| syntax.language.eq_ignore_ascii_case(token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use td_core::FxHashSet;

    #[test]
    fn test_lookup_known_tokens() {
        assert_eq!(lookup("rb").and_then(|s| s.line), Some("#"));
        assert_eq!(lookup("py").and_then(|s| s.line), Some("#"));
        assert_eq!(lookup("js").and_then(|s| s.line), Some("//"));
        assert_eq!(lookup("sql").and_then(|s| s.line), Some("--"));
    }

    #[test]
    fn test_lookup_ignores_case() {
        assert_eq!(lookup("RB").map(|s| s.language), Some("rb"));
        assert_eq!(lookup("Java").map(|s| s.language), Some("java"));
    }

    #[test]
    fn test_lookup_unknown() {
        assert!(lookup("").is_none());
        assert!(lookup("md").is_none());
        assert!(lookup("module").is_none());
    }

    #[test]
    fn test_block_only_entries_have_no_line_start() {
        let css = lookup("css").unwrap();
        assert!(css.line.is_none());
        assert_eq!(css.block.map(|b| b.start), Some("/*"));
    }

    #[test]
    fn test_table_invariants() {
        let mut seen = FxHashSet::default();
        for syntax in GRAMMAR {
            assert!(seen.insert(syntax.language), "duplicate {}", syntax.language);
            assert_eq!(syntax.language, syntax.language.to_ascii_lowercase());
            assert!(syntax.line.is_some() || syntax.block.is_some());
            assert!(syntax.line.is_none_or(|start| !start.is_empty()));
        }
    }
}
