#![warn(missing_docs)]
//! `quill-lang` - data-driven language configuration for the quill kernel.
//!
//! This crate intentionally stays lightweight and does **not** depend on the
//! document kernel or any lexing machinery. It holds the fixed, read-only
//! layout metadata each lexer declares - comment tokens, indent defaults,
//! and which style codes play structural roles - so hosts can implement
//! comment toggling, auto-indent, and bracket matching in a
//! language-aware way. Nothing here is persisted; the crate only describes.

/// Comment tokens/config for a given language.
///
/// Hosts can use this to implement comment toggling in a UI-agnostic way.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommentConfig {
    /// Line comment token (e.g. `//`, `#`, `;;`).
    pub line: Option<String>,
    /// Block comment start token (e.g. `/*`, `(;`).
    pub block_start: Option<String>,
    /// Block comment end token (e.g. `*/`, `;)`).
    pub block_end: Option<String>,
}

impl CommentConfig {
    /// Create a config that supports only line comments.
    pub fn line(token: impl Into<String>) -> Self {
        Self {
            line: Some(token.into()),
            block_start: None,
            block_end: None,
        }
    }

    /// Create a config that supports only block comments.
    pub fn block(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            line: None,
            block_start: Some(start.into()),
            block_end: Some(end.into()),
        }
    }

    /// Create a config that supports both line and block comments.
    pub fn line_and_block(
        line: impl Into<String>,
        block_start: impl Into<String>,
        block_end: impl Into<String>,
    ) -> Self {
        Self {
            line: Some(line.into()),
            block_start: Some(block_start.into()),
            block_end: Some(block_end.into()),
        }
    }

    /// Returns `true` if a line comment token is configured.
    pub fn has_line(&self) -> bool {
        self.line.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Returns `true` if both block comment tokens are configured.
    pub fn has_block(&self) -> bool {
        self.block_start.as_deref().is_some_and(|s| !s.is_empty())
            && self.block_end.as_deref().is_some_and(|s| !s.is_empty())
    }
}

/// Fixed layout metadata a lexer declares for its language.
///
/// Consumed externally (auto-indent, bracket matching, comment toggling);
/// the lexing engine itself never reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerLayout {
    /// Tab width in character cells.
    pub tab_width: u8,
    /// Default indent width in character cells.
    pub indent_width: u8,
    /// Comment tokens of the language.
    pub comment: CommentConfig,
    /// Style codes that represent comment text.
    pub comment_styles: Vec<u8>,
    /// Style codes that represent string text (bracket matching skips
    /// brackets inside these).
    pub string_styles: Vec<u8>,
}

impl LexerLayout {
    /// Conventional defaults: 4-cell tabs and indents, no comments.
    pub fn new() -> Self {
        Self {
            tab_width: 4,
            indent_width: 4,
            comment: CommentConfig::default(),
            comment_styles: Vec::new(),
            string_styles: Vec::new(),
        }
    }

    /// Whether `style` represents comment text in this language.
    pub fn is_comment_style(&self, style: u8) -> bool {
        self.comment_styles.contains(&style)
    }

    /// Whether `style` represents string text in this language.
    pub fn is_string_style(&self, style: u8) -> bool {
        self.string_styles.contains(&style)
    }
}

impl Default for LexerLayout {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_config() {
        let line_only = CommentConfig::line("//");
        assert!(line_only.has_line());
        assert!(!line_only.has_block());

        let both = CommentConfig::line_and_block(";;", "(;", ";)");
        assert!(both.has_line());
        assert!(both.has_block());
        assert_eq!(both.line.as_deref(), Some(";;"));

        let empty = CommentConfig::line("");
        assert!(!empty.has_line());
    }

    #[test]
    fn test_layout_style_roles() {
        let mut layout = LexerLayout::new();
        layout.comment_styles = vec![7, 8];
        layout.string_styles = vec![5];
        assert!(layout.is_comment_style(7));
        assert!(!layout.is_comment_style(5));
        assert!(layout.is_string_style(5));
        assert_eq!(layout.tab_width, 4);
        assert_eq!(layout.indent_width, 4);
    }
}
