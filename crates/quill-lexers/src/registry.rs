//! The lexer module registry.
//!
//! A static table maps language identifiers to everything needed to light
//! up a document: a styler factory, the declared word-list shape, and the
//! layout metadata. Selecting an unregistered identifier is an error the
//! caller can turn into plain-text fallback via [`find_or_plain`].

use crate::error::RegistryError;
use crate::word_list::{WordList, WordListAttr, WordListRole, WordListSet};
use crate::{graphviz, plain, wasm};
use quill_core::document::Styler;
use quill_lang::LexerLayout;

/// A registered language.
#[derive(Debug)]
pub struct LexerModule {
    /// Language identifier used for lookup (lowercase).
    pub language: &'static str,
    /// Declared word-list shape: count, role, and attributes per list.
    pub word_lists: &'static [WordListRole],
    /// Layout metadata factory.
    pub layout: fn() -> LexerLayout,
    /// Styler factory over the supplied word lists.
    pub make: fn(WordListSet) -> Box<dyn Styler>,
}

impl LexerModule {
    /// Build the word-list set for this module from space-separated
    /// sources in shape order, honoring each list's case attribute.
    pub fn build_word_lists(&self, sources: &[&str]) -> WordListSet {
        let mut set = WordListSet::new();
        for (index, source) in sources.iter().enumerate() {
            let ignore_case = self
                .word_lists
                .get(index)
                .is_some_and(|role| role.attrs.contains(WordListAttr::IGNORE_CASE));
            set.set(index, WordList::from_str(source, ignore_case));
        }
        set
    }

    /// Instantiate the styler over word lists built from `sources`.
    pub fn instantiate(&self, sources: &[&str]) -> Box<dyn Styler> {
        (self.make)(self.build_word_lists(sources))
    }
}

fn make_wasm(words: WordListSet) -> Box<dyn Styler> {
    Box::new(wasm::WasmLexer::new(words))
}

fn make_graphviz(words: WordListSet) -> Box<dyn Styler> {
    Box::new(graphviz::GraphVizLexer::new(words))
}

fn make_plain(_words: WordListSet) -> Box<dyn Styler> {
    Box::new(plain::PlainTextLexer::new())
}

/// Identifier of the plain-text fallback module.
pub const PLAIN_LANGUAGE: &str = "plain";

/// All registered modules, sorted by language identifier.
static MODULES: &[LexerModule] = &[
    LexerModule {
        language: "dot",
        word_lists: graphviz::WORD_LISTS,
        layout: graphviz::layout,
        make: make_graphviz,
    },
    LexerModule {
        language: "gv",
        word_lists: graphviz::WORD_LISTS,
        layout: graphviz::layout,
        make: make_graphviz,
    },
    LexerModule {
        language: "plain",
        word_lists: &[],
        layout: plain::layout,
        make: make_plain,
    },
    LexerModule {
        language: "wasm",
        word_lists: wasm::WORD_LISTS,
        layout: wasm::layout,
        make: make_wasm,
    },
];

/// Look up a module by language identifier.
pub fn find(language: &str) -> Result<&'static LexerModule, RegistryError> {
    MODULES
        .binary_search_by(|module| module.language.cmp(language))
        .map(|idx| &MODULES[idx])
        .map_err(|_| RegistryError::UnknownLexer(language.to_string()))
}

/// Look up a module, falling back to the plain-text module for unknown
/// identifiers.
pub fn find_or_plain(language: &str) -> &'static LexerModule {
    match find(language) {
        Ok(module) => module,
        Err(_) => {
            log::debug!("unknown lexer {:?}, falling back to plain text", language);
            find(PLAIN_LANGUAGE).expect("plain module is registered")
        }
    }
}

/// All registered language identifiers, sorted.
pub fn languages() -> impl Iterator<Item = &'static str> {
    MODULES.iter().map(|m| m.language)
}
