#![warn(missing_docs)]
//! Quill Core - Incremental Text-Editing Document Kernel
//!
//! # Overview
//!
//! `quill-core` is a headless document kernel for code editors: a mutable
//! byte buffer that supports efficient random-position edits on large files,
//! plus the bookkeeping an incremental syntax-highlighting layer needs to
//! restyle only the minimal suffix of the document after every keystroke.
//! It owns no rendering, no widgets, and no per-language knowledge; language
//! support plugs in through the [`Styler`] trait (see the `quill-lexers`
//! crate).
//!
//! # Core Features
//!
//! - **Gap-buffered storage**: edits near the last edit point cost O(edit)
//!   amortized
//! - **Line index**: partition-based line starts with a lazily-applied step
//!   adjustment, O(log n) position↔line queries
//! - **Run-length styles**: per-byte style codes and indicator flags stored
//!   as merged runs, never one entry per byte
//! - **Styled-to watermark**: styling is recomputed lazily, resuming from
//!   per-line saved state instead of the top of the file
//! - **Undo history**: invertible steps with atomic groups, typing
//!   coalescing, and save-point tracking
//! - **Change notifications**: structured (position, inserted, deleted)
//!   events for minimal repaints
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Document (edits, undo, watermark, events)  │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Styler seam (tokenize + fold)              │  ← quill-lexers
//! ├─────────────────────────────────────────────┤
//! │  LineIndex (starts + LineState/FoldLevel)   │  ← Line Access
//! ├─────────────────────────────────────────────┤
//! │  RunStyles (styles + indicators)            │  ← Derived Data
//! ├─────────────────────────────────────────────┤
//! │  Partitioning (boundaries + pending step)   │  ← Index Primitives
//! ├─────────────────────────────────────────────┤
//! │  GapBuffer (raw bytes)                      │  ← Text Storage
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use quill_core::Document;
//!
//! let mut doc = Document::new("fn main() {\n    println!(\"hi\");\n}\n");
//! assert_eq!(doc.line_count(), 4);
//!
//! doc.insert_string(0, "// entry point\n").unwrap();
//! assert_eq!(doc.line_count(), 5);
//!
//! doc.undo().unwrap();
//! assert_eq!(doc.line_count(), 4);
//! ```
//!
//! # Module Description
//!
//! - [`storage`] - gap-buffered byte storage
//! - [`partition`] - boundary positions with lazily-applied shifts
//! - [`run_styles`] - run-length style/indicator store
//! - [`line_index`] - line starts plus per-line lexer data
//! - [`document`] - the composition root and edit API
//! - [`classify`] - character classes and grapheme boundaries
//! - [`delta`] - change notifications
//! - [`line_ending`] - newline convention helpers
//! - [`worker`] - cancellation flag for background work
//!
//! # Concurrency
//!
//! The kernel is single-threaded by design: all mutation, tokenizing, and
//! folding happen on the owning thread, so there is no internal locking.
//! Background work coordinates only through [`CancelFlag`].

pub mod classify;
pub mod delta;
pub mod document;
pub mod line_ending;
pub mod line_index;
pub mod partition;
pub mod run_styles;
pub mod storage;
pub mod worker;

pub use classify::{CharClassify, CharacterClass, classify, is_grapheme_boundary};
pub use delta::{ChangeListener, ModifyEvent};
pub use document::{Document, DocumentError, STYLE_DEFAULT, Styler};
pub use line_ending::LineEnding;
pub use line_index::{
    FOLD_HEADER_FLAG, FOLD_LEVEL_BASE, FOLD_LEVEL_DEFAULT, FOLD_LEVEL_MASK, LineIndex,
    fold_is_header, fold_level_number,
};
pub use partition::Partitioning;
pub use run_styles::RunStyles;
pub use storage::{GapBuffer, StorageError};
pub use worker::CancelFlag;
