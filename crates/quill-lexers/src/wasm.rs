//! Lexer for the WebAssembly text format.
//!
//! States: default, operator, number, word (pending keyword
//! classification), identifier, string with escape sequences, line comment
//! (`;;`), and nested block comment (`(;` ... `;)`) tracked with an explicit
//! depth counter. Word runs are reclassified against three keyword lists on
//! token end; dotted names fall back to a type-prefix match so `i32.add`
//! styles as an instruction even when only `i32` is listed.
//!
//! Line state packs the carry-over needed to resume at any line boundary:
//! bit 0 flags a full-line comment (used by the folder to collapse comment
//! runs), the remaining bits hold the block-comment nesting level.

use crate::charset::{is_decimal_number_ex, is_eol_char, is_hex_digit, is_number_start, is_operator};
use crate::style_context::StyleContext;
use crate::word_list::{WordListAttr, WordListRole, WordListSet};
use quill_core::document::Styler;
use quill_core::{Document, FOLD_HEADER_FLAG, FOLD_LEVEL_BASE};
use quill_lang::{CommentConfig, LexerLayout};

/// Default (unstyled) text.
pub const STYLE_DEFAULT: u8 = 0;
/// Operators and brackets.
pub const STYLE_OPERATOR: u8 = 1;
/// Numeric literals.
pub const STYLE_NUMBER: u8 = 2;
/// A lowercase word not yet classified against the keyword lists.
pub const STYLE_WORD: u8 = 3;
/// Identifiers (`$name` and other non-keyword runs).
pub const STYLE_IDENTIFIER: u8 = 4;
/// String literals.
pub const STYLE_STRING: u8 = 5;
/// Escape sequences inside strings.
pub const STYLE_ESCAPE_CHAR: u8 = 6;
/// `;;` line comments.
pub const STYLE_COMMENT_LINE: u8 = 7;
/// `(;` ... `;)` block comments (nesting).
pub const STYLE_COMMENT_BLOCK: u8 = 8;
/// Words found in the keyword list.
pub const STYLE_KEYWORD: u8 = 9;
/// Words found in the type list.
pub const STYLE_TYPE: u8 = 10;
/// Words found in the instruction list (directly or by type prefix).
pub const STYLE_INSTRUCTION: u8 = 11;
/// Malformed input, e.g. a string left open at end of line.
pub const STYLE_ERROR: u8 = 12;

/// Word-list index of the keyword list.
pub const KEYWORD_INDEX_KEYWORD: usize = 0;
/// Word-list index of the type list.
pub const KEYWORD_INDEX_TYPE: usize = 1;
/// Word-list index of the instruction list.
pub const KEYWORD_INDEX_INSTRUCTION: usize = 2;

/// Declared word-list shape of this lexer.
pub const WORD_LISTS: &[WordListRole] = &[
    WordListRole {
        name: "keywords",
        attrs: WordListAttr::PRE_SORTED,
    },
    WordListRole {
        name: "types",
        attrs: WordListAttr::PRE_SORTED,
    },
    WordListRole {
        name: "instructions",
        attrs: WordListAttr::PRE_SORTED,
    },
];

const LINE_STATE_LINE_COMMENT: i32 = 1;

fn line_comment_state(line_state: i32) -> i32 {
    line_state & LINE_STATE_LINE_COMMENT
}

/// Escape-sequence scanning state, scoped to one tokenize call.
#[derive(Debug, Default)]
struct EscapeSequence {
    digits_left: i32,
    brace: bool,
}

impl EscapeSequence {
    // Highlight any character as an escape sequence.
    fn reset(&mut self, ch_next: char) {
        self.digits_left = 1;
        self.brace = false;
        if is_hex_digit(ch_next) {
            self.digits_left = 2;
        }
    }

    fn at_escape_end(&mut self, ch: char) -> bool {
        self.digits_left -= 1;
        self.digits_left <= 0 || !is_hex_digit(ch)
    }
}

// https://webassembly.github.io/spec/core/text/values.html#text-id
fn is_invalid_id_char(ch: char) -> bool {
    let code = ch as u32;
    code <= 32
        || code >= 127
        || matches!(ch, '"' | '(' | ')' | ',' | ';' | '[' | ']' | '{' | '}')
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
    let mut comment_level: i32 = 0; // nested block comment level

    let mut visible_chars = 0;
    let mut prefix_len = 0usize;

    let mut esc = EscapeSequence::default();

    let mut sc = StyleContext::new(doc, start, end, init_style);
    if sc.current_line() > 0 {
        let line_state = sc.line_state(sc.current_line() - 1);
        // 1: line_state_line_comment
        // 8: comment_level
        comment_level = line_state >> 1;
    }

    while sc.more() {
        match sc.state {
            STYLE_OPERATOR => {
                sc.set_state(STYLE_DEFAULT);
            }

            STYLE_NUMBER => {
                if !is_decimal_number_ex(sc.ch_prev, sc.ch, sc.ch_next) {
                    if is_invalid_id_char(sc.ch) {
                        sc.set_state(STYLE_DEFAULT);
                    } else {
                        sc.change_state(STYLE_IDENTIFIER);
                    }
                }
            }

            STYLE_WORD => {
                if prefix_len == 0 && sc.ch == '.' {
                    prefix_len = sc.length_current();
                } else if is_invalid_id_char(sc.ch) {
                    let s = sc.token_text();
                    if keywords.get(KEYWORD_INDEX_KEYWORD).contains(&s) {
                        sc.change_state(STYLE_KEYWORD);
                    } else if keywords.get(KEYWORD_INDEX_TYPE).contains(&s) {
                        sc.change_state(STYLE_TYPE);
                    } else if keywords.get(KEYWORD_INDEX_INSTRUCTION).contains(&s) {
                        sc.change_state(STYLE_INSTRUCTION);
                    } else if prefix_len != 0
                        && prefix_len < s.len()
                        && keywords.get(KEYWORD_INDEX_TYPE).contains(&s[..prefix_len])
                    {
                        // instructions with a type prefix
                        sc.change_state(STYLE_INSTRUCTION);
                    }
                    sc.set_state(STYLE_DEFAULT);
                }
            }

            STYLE_IDENTIFIER => {
                if is_invalid_id_char(sc.ch) {
                    sc.set_state(STYLE_DEFAULT);
                }
            }

            STYLE_STRING => {
                if sc.ch == '\\' && !is_eol_char(sc.ch_next) {
                    esc.reset(sc.ch_next);
                    sc.set_state(STYLE_ESCAPE_CHAR);
                    sc.forward();
                    if sc.match2('u', '{') {
                        esc.brace = true;
                        esc.digits_left = 9; // Unicode code point
                        sc.forward();
                    }
                } else if sc.ch == '"' {
                    sc.forward_set_state(STYLE_DEFAULT);
                } else if sc.at_line_end() {
                    // unterminated: mark the whole run and resume cleanly
                    sc.change_state(STYLE_ERROR);
                }
            }

            STYLE_ESCAPE_CHAR => {
                if esc.at_escape_end(sc.ch) {
                    if esc.brace && sc.ch == '}' {
                        sc.forward();
                    }
                    sc.set_state(STYLE_STRING);
                    continue;
                }
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
                if sc.match2(';', ')') {
                    sc.forward();
                    comment_level -= 1;
                    if comment_level == 0 {
                        sc.forward_set_state(STYLE_DEFAULT);
                    }
                } else if sc.match2('(', ';') {
                    sc.forward();
                    comment_level += 1;
                }
            }

            _ => {}
        }

        if sc.state == STYLE_DEFAULT {
            if sc.match2(';', ';') {
                sc.set_state(STYLE_COMMENT_LINE);
                if visible_chars == 0 {
                    line_state_line_comment = LINE_STATE_LINE_COMMENT;
                }
            } else if sc.match2('(', ';') {
                sc.set_state(STYLE_COMMENT_BLOCK);
                sc.forward();
                comment_level = 1;
            } else if sc.ch == '"' {
                sc.set_state(STYLE_STRING);
            } else if is_number_start(sc.ch, sc.ch_next) {
                sc.set_state(STYLE_NUMBER);
            } else if sc.ch.is_ascii_lowercase() {
                sc.set_state(STYLE_WORD);
                prefix_len = 0;
            } else if is_operator(sc.ch) {
                sc.set_state(STYLE_OPERATOR);
            } else if !is_invalid_id_char(sc.ch) {
                sc.set_state(STYLE_IDENTIFIER);
            }
        }

        if visible_chars == 0 && !sc.ch.is_whitespace() && sc.ch != '\0' {
            visible_chars += 1;
        }
        if sc.at_line_end() {
            let line_state = (comment_level << 1) | line_state_line_comment;
            sc.set_line_state(line_state);
            visible_chars = 0;
            line_state_line_comment = 0;
        }
        sc.forward();
    }

    sc.complete()
}

/// Recompute fold levels for `[start, end)`, continuing past `end` until a
/// line's stored level matches the recomputed one.
///
/// Depth increases on opening brackets and block-comment openers; runs of
/// full-line comments fold as a unit via the line-comment flag deltas.
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
                let level = if ch == b'(' && ch_next == b';' {
                    1
                } else if ch == b';' && ch_next == b')' {
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

            STYLE_OPERATOR => {
                if matches!(ch, b'{' | b'[' | b'(') {
                    level_next += 1;
                } else if matches!(ch, b'}' | b']' | b')') {
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
                // Levels reconverged past the requested range.
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

/// Layout metadata for WebAssembly text documents.
pub fn layout() -> LexerLayout {
    LexerLayout {
        tab_width: 2,
        indent_width: 2,
        comment: CommentConfig::line_and_block(";;", "(;", ";)"),
        comment_styles: vec![STYLE_COMMENT_LINE, STYLE_COMMENT_BLOCK],
        string_styles: vec![STYLE_STRING, STYLE_ESCAPE_CHAR],
    }
}

/// The WebAssembly lexer instance registered on a document.
pub struct WasmLexer {
    keywords: WordListSet,
}

impl WasmLexer {
    /// Create a lexer over the supplied keyword lists (shape per
    /// [`WORD_LISTS`]).
    pub fn new(keywords: WordListSet) -> Self {
        Self { keywords }
    }

    /// The keyword lists this instance styles against.
    pub fn keywords(&self) -> &WordListSet {
        &self.keywords
    }
}

impl Styler for WasmLexer {
    fn tokenize(&mut self, doc: &mut Document, start: usize, end: usize, init_style: u8) -> usize {
        tokenize(doc, start, end, init_style, &self.keywords)
    }

    fn fold(&mut self, doc: &mut Document, start: usize, end: usize) {
        fold(doc, start, end)
    }
}
