//! Error types for tokenization and buffer transforms.

use thiserror::Error;

use crate::token::{Position, Span};

/// Errors raised while constructing lexemes or scanning source text.
///
/// Construction errors are not recoverable: a record that cannot be turned
/// into a lexeme is never coerced into a default.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    /// A numeric token code that does not name any known token category.
    #[error("unknown token code {0}")]
    UnknownTokenCode(u16),

    /// A symbolic token name that does not name any known token category.
    #[error("unknown token name '{0}'")]
    UnknownTokenName(String),

    /// A span whose end position precedes its start position.
    #[error("token span {0} runs backwards")]
    InvalidSpan(Span),

    /// A single-line token whose text length disagrees with its span width.
    #[error("token text of {len} chars does not fit span {span}")]
    SpanMismatch {
        /// The offending span.
        span: Span,
        /// Character length of the token text.
        len: usize,
    },

    /// A string literal that was still open when the input ended.
    #[error("unterminated string literal starting at {0}")]
    UnterminatedString(Position),

    /// A dedent that does not return to any outer indentation level.
    #[error("unindent at {0} does not match any outer indentation level")]
    DedentMismatch(Position),
}

/// Errors raised by `SourceBuffer` operations.
///
/// The empty-buffer variants are assertion-style caller errors: every real
/// source file tokenizes to at least an ENDMARKER, so an empty buffer or an
/// empty filter result signals unexpected input and fails loudly.
#[derive(Debug, Error)]
pub enum SourceError {
    /// `extend_source` was handed a fragment the tokenizer cannot usefully
    /// process (a lone newline or shorter).
    #[error("cannot tokenize a fragment of {0} chars; need at least 2")]
    FragmentTooShort(usize),

    /// A filtering operation was invoked on an empty buffer.
    #[error("operation requires a non-empty buffer")]
    EmptyBuffer,

    /// Filtering removed every lexeme, which real source text never does.
    #[error("filtering left no lexemes; input was not real source text")]
    EmptyResult,

    /// Tokenization of appended text failed.
    #[error(transparent)]
    Lex(#[from] LexError),
}
