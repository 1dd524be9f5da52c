//! Structured document change notifications.
//!
//! Consumers (a view, an indexer) need to know which byte range an edit
//! touched without diffing old and new text. Every mutation and every
//! incremental restyle emits one [`ModifyEvent`] to the registered
//! listeners, carrying enough to re-measure and repaint only the affected
//! lines.

/// A single document change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModifyEvent {
    /// Text was inserted and/or deleted at `position`.
    Edited {
        /// Byte offset of the edit.
        position: usize,
        /// Number of bytes inserted at `position` (0 for pure deletes).
        inserted_len: usize,
        /// Number of bytes deleted at `position` (0 for pure inserts).
        deleted_len: usize,
    },
    /// Style information for `[start, end)` was recomputed.
    ///
    /// Emitted by `ensure_styled_to`; the range always covers whole lines.
    Restyled {
        /// Start byte offset of the restyled range.
        start: usize,
        /// End byte offset (exclusive) of the restyled range.
        end: usize,
    },
}

/// Callback invoked for every document change.
pub type ChangeListener = Box<dyn FnMut(&ModifyEvent) + Send>;
