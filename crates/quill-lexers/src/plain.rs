//! Plain-text fallback module.
//!
//! Used when a language identifier has no registered lexer: every byte gets
//! the default style, every line gets base fold level and empty line state.
//! Editing keeps working; only highlighting quality degrades.

use quill_core::document::Styler;
use quill_core::{Document, FOLD_LEVEL_BASE, STYLE_DEFAULT};
use quill_lang::LexerLayout;

/// Layout metadata for plain text.
pub fn layout() -> LexerLayout {
    LexerLayout::new()
}

/// The no-op styler.
#[derive(Debug, Default)]
pub struct PlainTextLexer;

impl PlainTextLexer {
    /// Create the no-op styler.
    pub fn new() -> Self {
        Self
    }
}

impl Styler for PlainTextLexer {
    fn tokenize(&mut self, doc: &mut Document, start: usize, end: usize, _init_style: u8) -> usize {
        let doc_len = doc.len();
        let end = end.min(doc_len);
        if end > start {
            doc.set_style_run(start, end - start, STYLE_DEFAULT)
                .expect("style run within document");
        }
        let first_line = doc.line_from_position(start);
        let last_line = doc.line_from_position(end);
        for line in first_line..=last_line {
            doc.set_line_state(line, 0);
        }
        end
    }

    fn fold(&mut self, doc: &mut Document, start: usize, end: usize) {
        let level = FOLD_LEVEL_BASE | (FOLD_LEVEL_BASE << 16);
        let first_line = doc.line_from_position(start);
        let mut line = first_line;
        while line < doc.line_count() {
            let old = doc.set_fold_level(line, level);
            if doc.line_start(line) >= end && old == level {
                break;
            }
            line += 1;
        }
    }
}
