//! Python-style lexical analysis for the pytok tokenizer
//!
//! This crate converts Python source text into a stream of lexemes with
//! line/column spans, and provides the `SourceBuffer` transforms built on
//! top of that stream: comment stripping, structural-newline scrubbing,
//! and source reconstruction (de-lexing).

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod lexer;
pub mod source;
pub mod string_interner;
pub mod token;

// Re-export the main types for convenience
pub use error::{LexError, SourceError};
pub use lexer::{tokenize, Lexer};
pub use source::SourceBuffer;
pub use string_interner::InternedString;
pub use token::{KindField, Lexeme, LexemeKind, Position, RawRecord, Span};
