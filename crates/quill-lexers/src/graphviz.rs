//! Lexer for GraphViz DOT.
//!
//! Same engine shape as the WebAssembly lexer: `//` and `#` line comments,
//! `/* */` block comments, double-quoted strings with single-character
//! escapes and backslash line continuation, HTML strings (`<...>`) with an
//! explicit nesting depth, numbers, and identifiers matched
//! case-insensitively against the keyword list. Only list 0 is consulted by
//! the tokenizer; the attribute/shape/color/value lists exist for
//! completion and reference.
//!
//! Line state: bit 0 flags a full-line comment, bit 1 an open block
//! comment, bit 2 an open (continued) string, and the remaining bits hold
//! the HTML-string nesting depth. Everything that carries across a line
//! boundary is in the word, which is what lets an incremental restyle stop
//! as soon as a line's stored state matches the recomputed one.

use crate::charset::{is_decimal_number_ex, is_eol_char, is_number_start, is_operator};
use crate::style_context::StyleContext;
use crate::word_list::{WordListAttr, WordListRole, WordListSet};
use quill_core::document::Styler;
use quill_core::{Document, FOLD_HEADER_FLAG, FOLD_LEVEL_BASE};
use quill_lang::{CommentConfig, LexerLayout};

/// Default (unstyled) text.
pub const STYLE_DEFAULT: u8 = 0;
/// Operators, brackets, and edge arrows.
pub const STYLE_OPERATOR: u8 = 1;
/// Numeric literals.
pub const STYLE_NUMBER: u8 = 2;
/// Identifiers not matching the keyword list.
pub const STYLE_IDENTIFIER: u8 = 3;
/// `graph`/`digraph`/`node`/... keywords (case-insensitive).
pub const STYLE_KEYWORD: u8 = 4;
/// Double-quoted strings.
pub const STYLE_STRING: u8 = 5;
/// Escape sequences inside strings.
pub const STYLE_ESCAPE_CHAR: u8 = 6;
/// `//` and `#` line comments.
pub const STYLE_COMMENT_LINE: u8 = 7;
/// `/* */` block comments.
pub const STYLE_COMMENT_BLOCK: u8 = 8;
/// HTML strings (`<...>`), nesting.
pub const STYLE_HTML_STRING: u8 = 9;
/// Malformed input, e.g. a string left open at end of line.
pub const STYLE_ERROR: u8 = 10;

/// Word-list index of the (case-insensitive) keyword list.
pub const KEYWORD_INDEX_KEYWORD: usize = 0;

/// Declared word-list shape of this lexer. Only the keyword list feeds the
/// tokenizer; the rest are reference data for completion.
pub const WORD_LISTS: &[WordListRole] = &[
    WordListRole {
        name: "keywords",
        attrs: WordListAttr(WordListAttr::PRE_SORTED.0 | WordListAttr::IGNORE_CASE.0),
    },
    WordListRole {
        name: "html labels",
        attrs: WordListAttr::NO_LEXER,
    },
    WordListRole {
        name: "attributes",
        attrs: WordListAttr::NO_LEXER,
    },
    WordListRole {
        name: "node shapes",
        attrs: WordListAttr::NO_LEXER,
    },
    WordListRole {
        name: "color names",
        attrs: WordListAttr::NO_LEXER,
    },
    WordListRole {
        name: "values",
        attrs: WordListAttr::NO_LEXER,
    },
];

const LINE_STATE_LINE_COMMENT: i32 = 1;

fn line_comment_state(line_state: i32) -> i32 {
    line_state & LINE_STATE_LINE_COMMENT
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Tokenize `[start, end)`, continuing past `end` until the line state
/// reconverges. Returns the position styled to.
pub fn tokenize(
    doc: &mut Document,
    start: usize,
    end: usize,
    init_style: u8,
    keywords: &WordListSet,
) -> usize {
    let mut line_state_line_comment = 0;
    let mut html_level: i32 = 0; // nested HTML string level
    let mut visible_chars = 0;
    let mut escape_done = false;
    let mut escaped_eol = false;

    let mut sc = StyleContext::new(doc, start, end, init_style);
    if sc.current_line() > 0 {
        let line_state = sc.line_state(sc.current_line() - 1);
        // 1: line_state_line_comment
        // 1: open block comment (carried via the style, recorded for
        //    reconvergence)
        // 1: open string (ditto)
        // 8: html_level
        html_level = line_state >> 3;
    }

    while sc.more() {
        match sc.state {
            STYLE_OPERATOR => {
                sc.set_state(STYLE_DEFAULT);
            }

            STYLE_NUMBER => {
                if !is_decimal_number_ex(sc.ch_prev, sc.ch, sc.ch_next) {
                    if is_word_char(sc.ch) {
                        sc.change_state(STYLE_IDENTIFIER);
                    } else {
                        sc.set_state(STYLE_DEFAULT);
                    }
                }
            }

            STYLE_IDENTIFIER => {
                if !is_word_char(sc.ch) {
                    let s = sc.token_text();
                    if keywords.get(KEYWORD_INDEX_KEYWORD).contains(&s) {
                        sc.change_state(STYLE_KEYWORD);
                    }
                    sc.set_state(STYLE_DEFAULT);
                }
            }

            STYLE_STRING => {
                if sc.ch == '\\' {
                    if is_eol_char(sc.ch_next) {
                        // escaped newline: the string continues next line
                        escaped_eol = true;
                    } else {
                        escape_done = false;
                        sc.set_state(STYLE_ESCAPE_CHAR);
                    }
                } else if sc.ch == '"' {
                    sc.forward_set_state(STYLE_DEFAULT);
                } else if sc.at_line_end() {
                    if escaped_eol {
                        escaped_eol = false;
                    } else {
                        sc.change_state(STYLE_ERROR);
                    }
                }
            }

            STYLE_ESCAPE_CHAR => {
                if escape_done {
                    sc.set_state(STYLE_STRING);
                    continue;
                }
                escape_done = true;
            }

            STYLE_ERROR => {
                if sc.at_line_start() {
                    sc.set_state(STYLE_DEFAULT);
                }
            }

            STYLE_COMMENT_LINE => {
                if sc.at_line_start() {
                    sc.set_state(STYLE_DEFAULT);
                }
            }

            STYLE_COMMENT_BLOCK => {
                if sc.match2('*', '/') {
                    sc.forward();
                    sc.forward_set_state(STYLE_DEFAULT);
                }
            }

            STYLE_HTML_STRING => {
                if sc.ch == '<' {
                    html_level += 1;
                } else if sc.ch == '>' {
                    html_level -= 1;
                    if html_level == 0 {
                        sc.forward_set_state(STYLE_DEFAULT);
                    }
                }
            }

            _ => {}
        }

        if sc.state == STYLE_DEFAULT {
            if sc.match2('/', '/') || sc.ch == '#' {
                sc.set_state(STYLE_COMMENT_LINE);
                if visible_chars == 0 {
                    line_state_line_comment = LINE_STATE_LINE_COMMENT;
                }
            } else if sc.match2('/', '*') {
                sc.set_state(STYLE_COMMENT_BLOCK);
                sc.forward();
            } else if sc.ch == '"' {
                sc.set_state(STYLE_STRING);
            } else if sc.ch == '<' {
                sc.set_state(STYLE_HTML_STRING);
                html_level = 1;
            } else if is_number_start(sc.ch, sc.ch_next) {
                sc.set_state(STYLE_NUMBER);
            } else if is_word_char(sc.ch) {
                sc.set_state(STYLE_IDENTIFIER);
            } else if is_operator(sc.ch) {
                sc.set_state(STYLE_OPERATOR);
            }
        }

        if visible_chars == 0 && !sc.ch.is_whitespace() && sc.ch != '\0' {
            visible_chars += 1;
        }
        if sc.at_line_end() {
            let in_block = i32::from(sc.state == STYLE_COMMENT_BLOCK);
            let in_string =
                i32::from(sc.state == STYLE_STRING || sc.state == STYLE_ESCAPE_CHAR);
            let line_state = (html_level << 3)
                | (in_string << 2)
                | (in_block << 1)
                | line_state_line_comment;
            sc.set_line_state(line_state);
            visible_chars = 0;
            line_state_line_comment = 0;
        }
        sc.forward();
    }

    sc.complete()
}

/// Recompute fold levels for `[start, end)`, continuing past `end` until a
/// line's stored level matches the recomputed one. Folds on braces and
/// brackets, block comments, HTML strings, and runs of full-line comments.
pub fn fold(doc: &mut Document, start: usize, end: usize) {
    let doc_len = doc.len();
    let mut line_current = doc.line_from_position(start);
    let mut level_current = FOLD_LEVEL_BASE;
    let mut line_comment_prev = 0;
    if line_current > 0 {
        level_current = doc.fold_level(line_current - 1) >> 16;
        line_comment_prev = line_comment_state(doc.line_state(line_current - 1));
    }

    let mut level_next = level_current;
    let mut line_comment_current = line_comment_state(doc.line_state(line_current));
    let mut line_start_next = doc.line_start(line_current + 1).min(doc_len);

    let mut pos = start;
    let mut ch_next = doc.byte_at(pos);
    let mut style_next = doc.style_at(pos);

    while pos < doc_len {
        let ch = ch_next;
        let style = style_next;
        pos += 1;
        ch_next = doc.byte_at(pos);
        style_next = doc.style_at(pos);

        match style {
            STYLE_COMMENT_BLOCK => {
                let level = if ch == b'/' && ch_next == b'*' {
                    1
                } else if ch == b'*' && ch_next == b'/' {
                    -1
                } else {
                    0
                };
                if level != 0 {
                    level_next += level;
                    pos += 1;
                    ch_next = doc.byte_at(pos);
                    style_next = doc.style_at(pos);
                }
            }

            STYLE_HTML_STRING => {
                if ch == b'<' {
                    level_next += 1;
                } else if ch == b'>' {
                    level_next -= 1;
                }
            }

            STYLE_OPERATOR => {
                if matches!(ch, b'{' | b'[') {
                    level_next += 1;
                } else if matches!(ch, b'}' | b']') {
                    level_next -= 1;
                }
            }

            _ => {}
        }

        if pos == line_start_next {
            let line_comment_next = line_comment_state(doc.line_state(line_current + 1));
            level_next = level_next.max(FOLD_LEVEL_BASE);
            if line_comment_current != 0 {
                level_next += line_comment_next - line_comment_prev;
            }

            let level_use = level_current;
            let mut lev = level_use | (level_next << 16);
            if level_use < level_next {
                lev |= FOLD_HEADER_FLAG;
            }
            let old = doc.set_fold_level(line_current, lev);
            if pos >= end && old == lev {
                return;
            }

            line_current += 1;
            line_start_next = doc.line_start(line_current + 1).min(doc_len);
            level_current = level_next;
            line_comment_prev = line_comment_current;
            line_comment_current = line_comment_next;
        }
    }
}

/// Layout metadata for DOT documents.
pub fn layout() -> LexerLayout {
    LexerLayout {
        tab_width: 4,
        indent_width: 4,
        comment: CommentConfig::line_and_block("//", "/*", "*/"),
        comment_styles: vec![STYLE_COMMENT_LINE, STYLE_COMMENT_BLOCK],
        string_styles: vec![STYLE_STRING, STYLE_ESCAPE_CHAR, STYLE_HTML_STRING],
    }
}

/// The DOT lexer instance registered on a document.
pub struct GraphVizLexer {
    keywords: WordListSet,
}

impl GraphVizLexer {
    /// Create a lexer over the supplied keyword lists (shape per
    /// [`WORD_LISTS`]).
    pub fn new(keywords: WordListSet) -> Self {
        Self { keywords }
    }
}

impl Styler for GraphVizLexer {
    fn tokenize(&mut self, doc: &mut Document, start: usize, end: usize, init_style: u8) -> usize {
        tokenize(doc, start, end, init_style, &self.keywords)
    }

    fn fold(&mut self, doc: &mut Document, start: usize, end: usize) {
        fold(doc, start, end)
    }
}
