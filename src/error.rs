use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures raised while loading an embedding source or encoding documents.
///
/// All variants are fatal for the call that produced them; no partial
/// vocabulary or sequence is ever returned alongside an error.
#[derive(Debug, Error)]
pub enum Error {
    /// The embedding source could not be opened or read.
    #[error("failed to read embedding source: {0}")]
    Source(#[from] io::Error),

    /// A vector component could not be parsed as a number.
    #[error("line {line}: invalid vector component {token:?}")]
    ParseComponent {
        /// 1-based line number in the source file.
        line: usize,
        /// The token that failed to parse.
        token: String,
    },

    /// A row's length disagrees with the dimensionality set by the first line.
    #[error("line {line}: expected {expected} components, got {actual}")]
    DimensionMismatch {
        /// 1-based line number in the source file.
        line: usize,
        /// Components per row, inferred from the first line.
        expected: usize,
        /// Components found on this line.
        actual: usize,
    },

    /// A word appeared on more than one line of the source.
    #[error("line {line}: duplicate word {word:?}")]
    DuplicateWord {
        /// 1-based line number of the second occurrence.
        line: usize,
        /// The repeated word.
        word: String,
    },

    /// The source contained no vectors, leaving the dimensionality undefined.
    #[error("embedding source contains no vectors")]
    EmptySource,

    /// `transform` was called before `fit` bound a vocabulary.
    #[error("transform called before fit bound a vocabulary")]
    UnboundVocabulary,
}
