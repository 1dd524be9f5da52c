use thiserror::Error;

/// Errors from the lexer registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The requested language identifier has no registered lexer module.
    #[error("unknown lexer: {0:?}")]
    UnknownLexer(String),
    /// A word-list index outside the shape the lexer declared.
    #[error("word list index {index} out of range (lexer declares {declared})")]
    WordListIndex {
        /// Requested list index.
        index: usize,
        /// Number of lists the lexer declares.
        declared: usize,
    },
}
