#![warn(missing_docs)]
//! `quill-lexers` - incremental state-machine lexers for the quill kernel.
//!
//! Every language here shares one engine shape: a [`StyleContext`] walks
//! the document forward with single-character transitions between named
//! lexical states, flushing style runs into the document and storing a
//! line-state word at every line boundary. That stored word is what makes
//! incremental restyling valid: after an edit, tokenizing restarts at the
//! nearest line boundary with valid state and stops as soon as the emitted
//! line states reconverge with the recorded ones.
//!
//! A second pass per language computes fold levels from the styled text,
//! resuming mid-document from the previous line's packed level.
//!
//! Languages are registered in [`registry`]; unknown identifiers fall back
//! to the plain-text module. Keyword lists are external data supplied per
//! document through [`word_list::WordListSet`].
//!
//! ```rust
//! use quill_core::Document;
//! use quill_lexers::registry;
//!
//! let module = registry::find("wasm").unwrap();
//! let mut doc = Document::new(";; demo\n(module)\n");
//! doc.set_styler(Some(module.instantiate(&[
//!     "module func",
//!     "i32 i64",
//!     "i32.add drop",
//! ])));
//! doc.ensure_styled_to(doc.len());
//! assert_eq!(doc.style_at(0), quill_lexers::wasm::STYLE_COMMENT_LINE);
//! ```

pub mod charset;
pub mod completion;
mod error;
pub mod graphviz;
pub mod plain;
pub mod registry;
pub mod style_context;
pub mod wasm;
pub mod word_list;

pub use error::RegistryError;
pub use registry::{LexerModule, find, find_or_plain, languages};
pub use style_context::StyleContext;
pub use word_list::{WordList, WordListAttr, WordListRole, WordListSet};
