//! The wire protocol: newline-delimited JSON messages.

use serde::{Deserialize, Serialize};

use pytok_lexer::Lexeme;

/// A request to tokenize one piece of Python source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizeRequest {
    /// The source text to tokenize.
    pub python: String,
}

/// One token in a reply: symbolic kind, literal text, and the
/// (line, column) start and end positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    /// Symbolic token name (`"NAME"`, `"OP"`, ...).
    pub kind: String,
    /// The literal text matched; may be empty.
    pub text: String,
    /// Start position, 1-based line and 0-based character column.
    pub start: (u32, u32),
    /// End position, 1-based line and 0-based character column.
    pub end: (u32, u32),
}

impl From<&Lexeme> for TokenRecord {
    fn from(lexeme: &Lexeme) -> Self {
        let span = lexeme.span();
        Self {
            kind: lexeme.kind().name().to_string(),
            text: lexeme.text().to_string(),
            start: (span.start.line, span.start.column),
            end: (span.end.line, span.end.column),
        }
    }
}

/// A successful reply: the full token stream for the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizeReply {
    /// The tokens, in source order, ENDMARKER last.
    pub tokens: Vec<TokenRecord>,
}

/// A failed reply. The session stays open after one of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReply {
    /// Human-readable description of what was wrong with the request.
    pub error: String,
}
