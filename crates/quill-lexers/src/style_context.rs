//! The scanning engine every tokenizer drives.
//!
//! `StyleContext` walks a document forward character by character while a
//! lexer switches between named states. It keeps the current, previous, and
//! next codepoints decoded, flushes style runs on state transitions, and
//! owns the per-line bookkeeping: at each line boundary the lexer stores a
//! line-state word, and once the scan has passed the requested end the
//! context compares each stored word against its previous value to decide
//! whether styling has reconverged and may stop.
//!
//! Two loop idioms from the lexers matter here:
//!
//! - `sc.forward()` at the bottom of the loop consumes one character; a
//!   lexer may `continue` before it to re-evaluate the current character in
//!   a new state without consuming input (escape-sequence endings rely on
//!   this).
//! - `forward_set_state` includes the current character in the run being
//!   closed (closing string quotes, comment terminators).
//!
//! Forward progress is guaranteed: `forward()` always advances at least one
//! byte, and a stall guard cuts off any lexer that loops without advancing.

use quill_core::Document;

/// Iterations `more()` tolerates at one position before cutting a lexer
/// off. Generous: a correct lexer re-evaluates at most once per state
/// change, and states fit in a byte.
const STALL_LIMIT: u32 = 300;

/// Forward scanner over a document for one tokenize call.
pub struct StyleContext<'a> {
    doc: &'a mut Document,
    /// Current lexical state; also the style written for the current run.
    pub state: u8,
    /// Codepoint at the scan position (`'\0'` at end of document).
    pub ch: char,
    /// Codepoint before the scan position (`'\0'` at the start).
    pub ch_prev: char,
    /// Codepoint after the current one (`'\0'` at end of document).
    pub ch_next: char,
    pos: usize,
    curr_width: usize,
    next_width: usize,
    run_start: usize,
    requested_end: usize,
    doc_len: usize,
    current_line: usize,
    next_line_start: usize,
    at_line_start: bool,
    line_state_matched: bool,
    stopped: bool,
    stall_pos: usize,
    stall_count: u32,
}

impl<'a> StyleContext<'a> {
    /// Begin a scan of `[start, end)` in `init_style`. `start` must be a
    /// line boundary with valid line state (the document guarantees this by
    /// resuming from the styled-to watermark's line start).
    pub fn new(doc: &'a mut Document, start: usize, end: usize, init_style: u8) -> Self {
        let doc_len = doc.len();
        let current_line = doc.line_from_position(start);
        let line_count = doc.line_count();
        let next_line_start = if current_line + 1 < line_count {
            doc.line_start(current_line + 1)
        } else {
            usize::MAX
        };
        let (ch, curr_width) = doc.char_at(start);
        let (ch_next, next_width) = doc.char_at(start + curr_width);
        let at_line_start = start == doc.line_start(current_line);

        Self {
            doc,
            state: init_style,
            ch,
            ch_prev: '\0',
            ch_next,
            pos: start,
            curr_width,
            next_width,
            run_start: start,
            requested_end: end,
            doc_len,
            current_line,
            next_line_start,
            at_line_start,
            line_state_matched: true,
            stopped: false,
            stall_pos: usize::MAX,
            stall_count: 0,
        }
    }

    /// Whether the scan should continue.
    ///
    /// False at the end of the document, or at a line boundary past the
    /// requested end once the stored line state matched its previous value
    /// (reconvergence). Also cuts off a lexer that stalls in place.
    pub fn more(&mut self) -> bool {
        if self.stopped || self.pos >= self.doc_len {
            return false;
        }
        if self.pos == self.stall_pos {
            self.stall_count += 1;
            if self.stall_count > STALL_LIMIT {
                log::warn!("lexer stalled at position {}; forcing stop", self.pos);
                return false;
            }
        } else {
            self.stall_pos = self.pos;
            self.stall_count = 0;
        }
        true
    }

    /// Consume one character.
    pub fn forward(&mut self) {
        self.ch_prev = self.ch;
        self.pos += self.curr_width;
        if self.pos >= self.next_line_start {
            self.cross_line();
        } else {
            self.at_line_start = false;
        }
        self.ch = self.ch_next;
        self.curr_width = self.next_width;
        let (ch_next, next_width) = self.doc.char_at(self.pos + self.curr_width);
        self.ch_next = ch_next;
        self.next_width = next_width;
    }

    fn cross_line(&mut self) {
        // The line just completed had its state stored (or kept its old
        // one); past the requested end a match means styling reconverged.
        if self.pos >= self.requested_end && self.line_state_matched {
            self.stopped = true;
        }
        self.current_line += 1;
        self.next_line_start = if self.current_line + 1 < self.doc.line_count() {
            self.doc.line_start(self.current_line + 1)
        } else {
            usize::MAX
        };
        self.at_line_start = true;
        self.line_state_matched = true;
    }

    /// Close the current run with the current state and enter `new_state`.
    pub fn set_state(&mut self, new_state: u8) {
        self.flush();
        self.state = new_state;
    }

    /// Re-label the current (unclosed) run without ending it.
    pub fn change_state(&mut self, new_state: u8) {
        self.state = new_state;
    }

    /// Consume the current character into the current run, then enter
    /// `new_state`.
    pub fn forward_set_state(&mut self, new_state: u8) {
        self.forward();
        self.set_state(new_state);
    }

    /// Two-character lookahead match.
    pub fn match2(&self, a: char, b: char) -> bool {
        self.ch == a && self.ch_next == b
    }

    /// Whether the scan position is at the start of a line.
    pub fn at_line_start(&self) -> bool {
        self.at_line_start
    }

    /// Whether the current character is the last of its line (its final
    /// terminator byte, or the last character of the document).
    pub fn at_line_end(&self) -> bool {
        let next_pos = self.pos + self.curr_width;
        next_pos >= self.next_line_start || next_pos >= self.doc_len
    }

    /// Line containing the scan position.
    pub fn current_line(&self) -> usize {
        self.current_line
    }

    /// Byte length of the current run (current token so far).
    pub fn length_current(&self) -> usize {
        self.pos - self.run_start
    }

    /// Text of the current run, excluding the current character.
    pub fn token_text(&self) -> String {
        self.doc
            .text_range(self.run_start, self.pos.min(self.doc_len) - self.run_start)
            .unwrap_or_default()
    }

    /// Stored line state of `line`.
    pub fn line_state(&self, line: usize) -> i32 {
        self.doc.line_state(line)
    }

    /// Store the line state of the current line, tracking whether it
    /// matched the previously recorded value.
    pub fn set_line_state(&mut self, state: i32) {
        let old = self.doc.set_line_state(self.current_line, state);
        self.line_state_matched = old == state;
    }

    /// Flush the trailing run and return the position styled to.
    pub fn complete(mut self) -> usize {
        self.flush();
        self.pos.min(self.doc_len)
    }

    fn flush(&mut self) {
        let end = self.pos.min(self.doc_len);
        if end > self.run_start {
            self.doc
                .set_style_run(self.run_start, end - self.run_start, self.state)
                .expect("style run within document");
            self.run_start = end;
        }
    }
}
