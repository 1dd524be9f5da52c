//! The document: storage, line index, styles, undo, and notifications.
//!
//! `Document` is the single source of truth for text content and styling.
//! Every edit updates the gap buffer, the line-start index, the style runs,
//! and the indicator runs atomically, then rolls the styled-to watermark back
//! to the start of the edited line so the next style request re-tokenizes
//! from a position with valid line state.
//!
//! Styling itself lives behind the [`Styler`] trait: a language crate
//! registers a styler, and [`Document::ensure_styled_to`] invokes it from the
//! nearest preceding line boundary, letting it run past the requested
//! position until the per-line state reconverges with previously recorded
//! values.

use crate::delta::{ChangeListener, ModifyEvent};
use crate::line_index::LineIndex;
use crate::run_styles::RunStyles;
use crate::storage::GapBuffer;
use std::fmt;

/// Style code for unstyled/default text.
pub const STYLE_DEFAULT: u8 = 0;

/// Maximum number of undo steps retained before the oldest is evicted.
const MAX_UNDO_DEPTH: usize = 1000;

/// Error type for document operations with invalid positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentError {
    /// A position past the end of the document.
    InvalidPosition {
        /// Requested byte position.
        pos: usize,
        /// Document length at the time of the call.
        length: usize,
    },
    /// A range that does not fit inside the document.
    InvalidRange {
        /// Requested start byte position.
        pos: usize,
        /// Requested range length.
        len: usize,
        /// Document length at the time of the call.
        length: usize,
    },
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentError::InvalidPosition { pos, length } => {
                write!(f, "invalid position {} in document of length {}", pos, length)
            }
            DocumentError::InvalidRange { pos, len, length } => {
                write!(
                    f,
                    "invalid range {}..{} in document of length {}",
                    pos,
                    pos + len,
                    length
                )
            }
        }
    }
}

impl std::error::Error for DocumentError {}

/// The seam between the document and a language's styling implementation.
///
/// `tokenize` styles `[start, end)` and may continue past `end` until its
/// per-line state reconverges; it returns the position it actually styled
/// to, which is always a line boundary or the end of the document. `fold`
/// recomputes fold levels over an already-styled range.
pub trait Styler {
    /// Style `[start, end)` starting in `init_style`, returning the position
    /// styled to.
    fn tokenize(&mut self, doc: &mut Document, start: usize, end: usize, init_style: u8) -> usize;

    /// Recompute fold levels for the styled range `[start, end)`.
    fn fold(&mut self, doc: &mut Document, start: usize, end: usize);
}

#[derive(Debug, Clone)]
enum EditAction {
    Insert { pos: usize, bytes: Vec<u8> },
    Delete { pos: usize, bytes: Vec<u8> },
}

#[derive(Debug, Clone)]
struct UndoStep {
    group_id: usize,
    action: EditAction,
}

/// Invertible edit history with grouping, typing coalescing, bounded depth,
/// and save-point tracking.
struct UndoHistory {
    undo_stack: Vec<UndoStep>,
    redo_stack: Vec<UndoStep>,
    max_depth: usize,
    /// Save point expressed as an undo-stack depth. `None` once the saved
    /// state becomes unreachable (history evicted or redo branch cleared).
    clean_index: Option<usize>,
    next_group_id: usize,
    /// Group reused by consecutive coalescible inserts (typing).
    open_group_id: Option<usize>,
    /// Group forced by `begin_group`/`end_group`, nestable.
    explicit_group_id: Option<usize>,
    explicit_depth: usize,
}

impl UndoHistory {
    fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_depth,
            clean_index: Some(0),
            next_group_id: 0,
            open_group_id: None,
            explicit_group_id: None,
            explicit_depth: 0,
        }
    }

    fn fresh_group_id(&mut self) -> usize {
        let id = self.next_group_id;
        self.next_group_id = self.next_group_id.wrapping_add(1);
        id
    }

    fn begin_group(&mut self) {
        if self.explicit_depth == 0 {
            let id = self.fresh_group_id();
            self.explicit_group_id = Some(id);
        }
        self.explicit_depth += 1;
    }

    fn end_group(&mut self) {
        self.explicit_depth = self.explicit_depth.saturating_sub(1);
        if self.explicit_depth == 0 {
            self.explicit_group_id = None;
            self.open_group_id = None;
        }
    }

    fn end_typing_group(&mut self) {
        self.open_group_id = None;
    }

    fn clear_redo_and_adjust_clean(&mut self) {
        if self.redo_stack.is_empty() {
            return;
        }
        // A save point sitting in the redo branch becomes unreachable.
        if let Some(clean_index) = self.clean_index {
            if clean_index > self.undo_stack.len() {
                self.clean_index = None;
            }
        }
        self.redo_stack.clear();
    }

    fn push_step(&mut self, action: EditAction, coalescible: bool) {
        self.clear_redo_and_adjust_clean();

        if self.undo_stack.len() >= self.max_depth {
            self.undo_stack.remove(0);
            match self.clean_index {
                Some(0) => self.clean_index = None,
                Some(n) => self.clean_index = Some(n - 1),
                None => {}
            }
        }

        let group_id = if let Some(id) = self.explicit_group_id {
            id
        } else if coalescible
            && self.open_group_id.is_some()
            && self.clean_index != Some(self.undo_stack.len())
        {
            self.open_group_id.expect("checked")
        } else {
            self.fresh_group_id()
        };

        if self.explicit_group_id.is_none() {
            self.open_group_id = if coalescible { Some(group_id) } else { None };
        }

        self.undo_stack.push(UndoStep { group_id, action });
    }

    fn pop_undo_group(&mut self) -> Option<Vec<UndoStep>> {
        let group_id = self.undo_stack.last()?.group_id;
        let mut steps = Vec::new();
        while let Some(step) = self.undo_stack.last() {
            if step.group_id != group_id {
                break;
            }
            steps.push(self.undo_stack.pop().expect("checked"));
        }
        self.open_group_id = None;
        Some(steps)
    }

    fn pop_redo_group(&mut self) -> Option<Vec<UndoStep>> {
        let group_id = self.redo_stack.last()?.group_id;
        let mut steps = Vec::new();
        while let Some(step) = self.redo_stack.last() {
            if step.group_id != group_id {
                break;
            }
            steps.push(self.redo_stack.pop().expect("checked"));
        }
        Some(steps)
    }

    fn is_clean(&self) -> bool {
        self.clean_index == Some(self.undo_stack.len())
    }

    fn mark_clean(&mut self) {
        self.clean_index = Some(self.undo_stack.len());
        self.open_group_id = None;
    }
}

/// A text document with incremental styling state.
pub struct Document {
    buffer: GapBuffer,
    lines: LineIndex,
    styles: RunStyles<u8>,
    indicators: RunStyles<u32>,
    end_styled: usize,
    styler: Option<Box<dyn Styler>>,
    history: UndoHistory,
    listeners: Vec<ChangeListener>,
}

impl Document {
    /// Create an empty document.
    pub fn empty() -> Self {
        Self {
            buffer: GapBuffer::new(),
            lines: LineIndex::new(),
            styles: RunStyles::new(),
            indicators: RunStyles::new(),
            end_styled: 0,
            styler: None,
            history: UndoHistory::new(MAX_UNDO_DEPTH),
            listeners: Vec::new(),
        }
    }

    /// Create a document holding `text`, with a clean history.
    pub fn new(text: &str) -> Self {
        let mut doc = Self::empty();
        if !text.is_empty() {
            doc.basic_insert(0, text.as_bytes())
                .expect("insert at 0 into empty document");
        }
        doc.history = UndoHistory::new(MAX_UNDO_DEPTH);
        doc
    }

    // ---- content queries ----------------------------------------------

    /// Document length in bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns `true` when the document holds no text.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Byte at `pos`, or `0` past the end (scanner lookahead sentinel).
    pub fn byte_at(&self, pos: usize) -> u8 {
        self.buffer.byte_at(pos)
    }

    /// Decode the UTF-8 character at `pos`, returning `(char, byte_width)`.
    ///
    /// Defensive: invalid sequences decode as U+FFFD with width 1, and
    /// positions at or past the end decode as `'\0'` with width 1, so
    /// scanners always make forward progress.
    pub fn char_at(&self, pos: usize) -> (char, usize) {
        if pos >= self.len() {
            return ('\0', 1);
        }
        let b0 = self.buffer.byte_at(pos);
        if b0 < 0x80 {
            return (b0 as char, 1);
        }
        let width = match b0 {
            0xC2..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF4 => 4,
            _ => return (char::REPLACEMENT_CHARACTER, 1),
        };
        if pos + width > self.len() {
            return (char::REPLACEMENT_CHARACTER, 1);
        }
        let mut bytes = [0u8; 4];
        for (i, slot) in bytes.iter_mut().enumerate().take(width) {
            *slot = self.buffer.byte_at(pos + i);
        }
        match std::str::from_utf8(&bytes[..width]) {
            Ok(s) => (
                s.chars().next().unwrap_or(char::REPLACEMENT_CHARACTER),
                width,
            ),
            Err(_) => (char::REPLACEMENT_CHARACTER, 1),
        }
    }

    /// The whole text (invalid UTF-8, if any, is replaced).
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.buffer.to_bytes()).into_owned()
    }

    /// Text of the byte range `[pos, pos + len)`.
    pub fn text_range(&self, pos: usize, len: usize) -> Result<String, DocumentError> {
        let bytes = self
            .buffer
            .read_bytes(pos, len)
            .map_err(|_| DocumentError::InvalidRange {
                pos,
                len,
                length: self.len(),
            })?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    // ---- line queries --------------------------------------------------

    /// Number of lines (at least 1).
    pub fn line_count(&self) -> usize {
        self.lines.line_count()
    }

    /// Byte position where `line` starts; the document length for any line
    /// index at or past the line count.
    pub fn line_start(&self, line: usize) -> usize {
        if line >= self.lines.line_count() {
            self.len()
        } else {
            self.lines.start_of(line)
        }
    }

    /// Line containing byte position `pos`.
    pub fn line_from_position(&self, pos: usize) -> usize {
        self.lines.line_from_position(pos)
    }

    /// Text of `line` including its terminator.
    pub fn line_text(&self, line: usize) -> String {
        let start = self.line_start(line);
        let end = self.line_start(line + 1);
        self.text_range(start, end - start).unwrap_or_default()
    }

    /// Lexer carry-over state of `line`.
    pub fn line_state(&self, line: usize) -> i32 {
        self.lines.line_state(line)
    }

    /// Store the lexer carry-over state of `line`, returning the previous
    /// value (used by the styling engine to detect reconvergence).
    pub fn set_line_state(&mut self, line: usize, state: i32) -> i32 {
        self.lines.set_line_state(line, state)
    }

    /// Packed fold level of `line`.
    pub fn fold_level(&self, line: usize) -> i32 {
        self.lines.fold_level(line)
    }

    /// Store the packed fold level of `line`, returning the previous value.
    pub fn set_fold_level(&mut self, line: usize, level: i32) -> i32 {
        self.lines.set_fold_level(line, level)
    }

    // ---- style queries and writes --------------------------------------

    /// Style code at `pos` ([`STYLE_DEFAULT`] past the end).
    pub fn style_at(&self, pos: usize) -> u8 {
        self.styles.value_at(pos)
    }

    /// Assign `style` uniformly over `[pos, pos + len)`.
    pub fn set_style_run(&mut self, pos: usize, len: usize, style: u8) -> Result<(), DocumentError> {
        self.check_range(pos, len)?;
        self.styles.set_value_range(pos, len, style);
        Ok(())
    }

    /// Iterate `(start, len, style)` over the style runs.
    pub fn style_runs(&self) -> impl Iterator<Item = (usize, usize, u8)> + '_ {
        self.styles.runs()
    }

    /// Number of style runs currently stored.
    pub fn style_run_count(&self) -> usize {
        self.styles.run_count()
    }

    /// Position up to which styles are known valid.
    pub fn end_styled(&self) -> usize {
        self.end_styled
    }

    /// Install (or remove) the styler. Resets the styled-to watermark and
    /// all recorded line states so nothing from the previous language leaks
    /// into reconvergence checks.
    pub fn set_styler(&mut self, styler: Option<Box<dyn Styler>>) {
        self.styler = styler;
        self.end_styled = 0;
        for line in 0..self.lines.line_count() {
            self.lines.set_line_state(line, 0);
        }
    }

    /// Ensure style information is valid at least up to `pos`.
    ///
    /// Finds the nearest preceding line boundary with valid line state (the
    /// start of the line containing the watermark), invokes the styler from
    /// there, and advances the watermark to wherever the styler stopped —
    /// at or past `pos`, earlier only at the end of the document.
    pub fn ensure_styled_to(&mut self, pos: usize) {
        let target = pos.min(self.len());
        if self.end_styled >= target {
            return;
        }
        let Some(mut styler) = self.styler.take() else {
            // No language: everything keeps the default style.
            self.end_styled = target;
            return;
        };

        let start_line = self.lines.line_from_position(self.end_styled);
        let start = self.lines.start_of(start_line);
        let init_style = if start == 0 {
            STYLE_DEFAULT
        } else {
            self.style_at(start - 1)
        };
        log::debug!(
            "restyle from line {} [{}..{}), init style {}",
            start_line,
            start,
            target,
            init_style
        );

        let styled_to = styler.tokenize(self, start, target, init_style);
        let styled_to = styled_to.clamp(start, self.len());
        styler.fold(self, start, styled_to);
        self.styler = Some(styler);

        if styled_to > self.end_styled {
            self.end_styled = styled_to;
        }
        self.notify(ModifyEvent::Restyled {
            start,
            end: styled_to,
        });
    }

    // ---- indicators ----------------------------------------------------

    /// Indicator flag mask at `pos` (0 past the end).
    pub fn indicators_at(&self, pos: usize) -> u32 {
        self.indicators.value_at(pos)
    }

    /// Set the bits of `mask` over `[pos, pos + len)`.
    pub fn indicator_fill(&mut self, pos: usize, len: usize, mask: u32) -> Result<(), DocumentError> {
        self.check_range(pos, len)?;
        let segments: Vec<(usize, usize, u32)> = self
            .indicators
            .runs()
            .filter_map(|(start, run_len, value)| {
                let s = start.max(pos);
                let e = (start + run_len).min(pos + len);
                if s < e { Some((s, e - s, value)) } else { None }
            })
            .collect();
        for (s, l, v) in segments {
            self.indicators.set_value_range(s, l, v | mask);
        }
        Ok(())
    }

    /// Clear the bits of `mask` over `[pos, pos + len)`.
    pub fn indicator_clear(&mut self, pos: usize, len: usize, mask: u32) -> Result<(), DocumentError> {
        self.check_range(pos, len)?;
        let segments: Vec<(usize, usize, u32)> = self
            .indicators
            .runs()
            .filter_map(|(start, run_len, value)| {
                let s = start.max(pos);
                let e = (start + run_len).min(pos + len);
                if s < e { Some((s, e - s, value)) } else { None }
            })
            .collect();
        for (s, l, v) in segments {
            self.indicators.set_value_range(s, l, v & !mask);
        }
        Ok(())
    }

    // ---- edits ---------------------------------------------------------

    /// Insert `text` at byte position `pos` as its own undo step.
    pub fn insert_string(&mut self, pos: usize, text: &str) -> Result<usize, DocumentError> {
        self.insert_with(pos, text, false)
    }

    /// Insert `text` at `pos`, coalescing with an immediately preceding
    /// typed insert into one undo group.
    pub fn type_text(&mut self, pos: usize, text: &str) -> Result<usize, DocumentError> {
        self.insert_with(pos, text, true)
    }

    fn insert_with(
        &mut self,
        pos: usize,
        text: &str,
        coalescible: bool,
    ) -> Result<usize, DocumentError> {
        self.basic_insert(pos, text.as_bytes())?;
        self.history.push_step(
            EditAction::Insert {
                pos,
                bytes: text.as_bytes().to_vec(),
            },
            coalescible,
        );
        self.notify(ModifyEvent::Edited {
            position: pos,
            inserted_len: text.len(),
            deleted_len: 0,
        });
        Ok(text.len())
    }

    /// Delete `len` bytes starting at `pos` as its own undo step.
    pub fn delete_chars(&mut self, pos: usize, len: usize) -> Result<(), DocumentError> {
        let deleted = self.basic_delete(pos, len)?;
        self.history
            .push_step(EditAction::Delete { pos, bytes: deleted }, false);
        self.notify(ModifyEvent::Edited {
            position: pos,
            inserted_len: 0,
            deleted_len: len,
        });
        Ok(())
    }

    /// Replace `[pos, pos + len)` with `text` as one atomic undo group.
    pub fn replace(&mut self, pos: usize, len: usize, text: &str) -> Result<(), DocumentError> {
        self.check_range(pos, len)?;
        self.begin_undo_group();
        if len > 0 {
            self.delete_chars(pos, len)?;
        }
        if !text.is_empty() {
            self.insert_string(pos, text)?;
        }
        self.end_undo_group();
        Ok(())
    }

    // ---- undo ----------------------------------------------------------

    /// Open an explicit undo group; edits until [`Document::end_undo_group`]
    /// undo and redo atomically. Nestable.
    pub fn begin_undo_group(&mut self) {
        self.history.begin_group();
    }

    /// Close the innermost explicit undo group.
    pub fn end_undo_group(&mut self) {
        self.history.end_group();
    }

    /// End the current typing coalescing run (e.g. on an idle boundary).
    pub fn end_typing_group(&mut self) {
        self.history.end_typing_group();
    }

    /// Whether an undo step is available.
    pub fn can_undo(&self) -> bool {
        !self.history.undo_stack.is_empty()
    }

    /// Whether a redo step is available.
    pub fn can_redo(&self) -> bool {
        !self.history.redo_stack.is_empty()
    }

    /// Undo the most recent group. Returns `Ok(false)` with no history.
    pub fn undo(&mut self) -> Result<bool, DocumentError> {
        let Some(steps) = self.history.pop_undo_group() else {
            return Ok(false);
        };
        log::trace!("undo group of {} step(s)", steps.len());
        for step in &steps {
            self.apply_inverse(&step.action)?;
        }
        self.history.redo_stack.extend(steps);
        Ok(true)
    }

    /// Redo the most recently undone group. Returns `Ok(false)` with no
    /// redo history.
    pub fn redo(&mut self) -> Result<bool, DocumentError> {
        let Some(steps) = self.history.pop_redo_group() else {
            return Ok(false);
        };
        log::trace!("redo group of {} step(s)", steps.len());
        for step in &steps {
            self.apply_forward(&step.action)?;
        }
        self.history.undo_stack.extend(steps);
        Ok(true)
    }

    /// Record the current state as the saved state.
    pub fn mark_save_point(&mut self) {
        self.history.mark_clean();
    }

    /// Whether the document matches the last save point.
    pub fn is_clean(&self) -> bool {
        self.history.is_clean()
    }

    // ---- listeners -----------------------------------------------------

    /// Register a change listener. Listeners observe every edit (including
    /// those performed by undo/redo) and every restyle.
    pub fn add_listener(&mut self, listener: ChangeListener) {
        self.listeners.push(listener);
    }

    fn notify(&mut self, event: ModifyEvent) {
        for listener in self.listeners.iter_mut() {
            listener(&event);
        }
    }

    // ---- internals -----------------------------------------------------

    fn check_range(&self, pos: usize, len: usize) -> Result<(), DocumentError> {
        let end = pos.checked_add(len).ok_or(DocumentError::InvalidRange {
            pos,
            len,
            length: self.len(),
        })?;
        if end > self.len() {
            return Err(DocumentError::InvalidRange {
                pos,
                len,
                length: self.len(),
            });
        }
        Ok(())
    }

    fn apply_inverse(&mut self, action: &EditAction) -> Result<(), DocumentError> {
        match action {
            EditAction::Insert { pos, bytes } => {
                self.basic_delete(*pos, bytes.len())?;
                self.notify(ModifyEvent::Edited {
                    position: *pos,
                    inserted_len: 0,
                    deleted_len: bytes.len(),
                });
            }
            EditAction::Delete { pos, bytes } => {
                self.basic_insert(*pos, bytes)?;
                self.notify(ModifyEvent::Edited {
                    position: *pos,
                    inserted_len: bytes.len(),
                    deleted_len: 0,
                });
            }
        }
        Ok(())
    }

    fn apply_forward(&mut self, action: &EditAction) -> Result<(), DocumentError> {
        match action {
            EditAction::Insert { pos, bytes } => {
                self.basic_insert(*pos, bytes)?;
                self.notify(ModifyEvent::Edited {
                    position: *pos,
                    inserted_len: bytes.len(),
                    deleted_len: 0,
                });
            }
            EditAction::Delete { pos, bytes } => {
                self.basic_delete(*pos, bytes.len())?;
                self.notify(ModifyEvent::Edited {
                    position: *pos,
                    inserted_len: 0,
                    deleted_len: bytes.len(),
                });
            }
        }
        Ok(())
    }

    /// Apply an insert to every structure. Does not touch history or
    /// listeners.
    fn basic_insert(&mut self, pos: usize, bytes: &[u8]) -> Result<(), DocumentError> {
        if pos > self.len() {
            return Err(DocumentError::InvalidPosition {
                pos,
                length: self.len(),
            });
        }
        if bytes.is_empty() {
            return Ok(());
        }

        self.buffer
            .insert(pos, bytes)
            .map_err(|_| DocumentError::InvalidPosition {
                pos,
                length: self.len(),
            })?;
        self.lines.insert_space(pos, bytes.len());
        self.styles.insert_space(pos, bytes.len());
        self.indicators.insert_space(pos, bytes.len());
        self.rescan_lines(pos, pos + bytes.len());
        self.roll_back_watermark(pos);
        Ok(())
    }

    /// Apply a delete to every structure, returning the removed bytes. Does
    /// not touch history or listeners.
    fn basic_delete(&mut self, pos: usize, len: usize) -> Result<Vec<u8>, DocumentError> {
        self.check_range(pos, len)?;
        if len == 0 {
            return Ok(Vec::new());
        }

        let deleted = self
            .buffer
            .read_bytes(pos, len)
            .map_err(|_| DocumentError::InvalidRange {
                pos,
                len,
                length: self.len(),
            })?;

        // Drop line starts inside the removed range before shifting.
        self.lines.replace_window(pos, pos + len, &[]);
        self.buffer
            .delete(pos, len)
            .map_err(|_| DocumentError::InvalidRange {
                pos,
                len,
                length: self.len(),
            })?;
        self.lines.remove_space(pos, len);
        self.styles.remove_space(pos, len);
        self.indicators.remove_space(pos, len);
        self.rescan_lines(pos, pos);
        self.roll_back_watermark(pos);
        Ok(deleted)
    }

    /// Recompute the line starts in the window around an edit by scanning
    /// the actual bytes. `upper` is the end of the rewritten region (edit
    /// position plus inserted length; the edit position itself for
    /// deletes). Observing the buffer rather than case-analyzing the edit
    /// makes CRLF splits and joins fall out naturally.
    fn rescan_lines(&mut self, pos: usize, upper: usize) {
        let win_line = self.lines.line_from_position(pos.saturating_sub(1));
        let win_start = self.lines.start_of(win_line);

        let mut new_starts = Vec::new();
        let mut i = win_start;
        while i < upper {
            let b = self.buffer.byte_at(i);
            let boundary = match b {
                b'\n' => true,
                b'\r' => self.buffer.byte_at(i + 1) != b'\n',
                _ => false,
            };
            if boundary && i + 1 <= upper {
                new_starts.push(i + 1);
            }
            i += 1;
        }
        self.lines.replace_window(win_start, upper, &new_starts);
    }

    fn roll_back_watermark(&mut self, pos: usize) {
        let line = self.lines.line_from_position(pos);
        let line_start = self.lines.start_of(line);
        if line_start < self.end_styled {
            log::trace!("watermark {} -> {}", self.end_styled, line_start);
            self.end_styled = line_start;
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::empty()
    }
}
