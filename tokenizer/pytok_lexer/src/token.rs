//! The lexeme model: token categories, source positions, and the immutable
//! `Lexeme` value type.

use std::fmt;

use crate::error::LexError;
use crate::string_interner::InternedString;

/// A position in source text: 1-based line, 0-based column.
///
/// Columns count characters, not bytes, matching the positions the CPython
/// tokenizer reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    /// The 1-based line number.
    pub line: u32,
    /// The 0-based column number, in characters.
    pub column: u32,
}

impl Position {
    /// Build a position from a line/column pair.
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The half-open source region a lexeme covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    /// Where the lexeme starts.
    pub start: Position,
    /// Where the lexeme ends.
    pub end: Position,
}

impl Span {
    /// Build a span from start and end positions.
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// True if start and end lie on the same line.
    pub fn is_single_line(&self) -> bool {
        self.start.line == self.end.line
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// The symbolic token categories of the Python token stream.
///
/// Numeric codes follow the CPython `token`/`tokenize` module constants so
/// records that carry a numeric first field resolve unambiguously.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LexemeKind {
    /// End of the token stream (code 0).
    #[cfg_attr(feature = "serde", serde(rename = "ENDMARKER"))]
    EndMarker,
    /// An identifier or keyword (code 1).
    #[cfg_attr(feature = "serde", serde(rename = "NAME"))]
    Name,
    /// A numeric literal (code 2).
    #[cfg_attr(feature = "serde", serde(rename = "NUMBER"))]
    Number,
    /// A string literal, quotes and prefix included (code 3).
    #[cfg_attr(feature = "serde", serde(rename = "STRING"))]
    String,
    /// A newline ending a logical line (code 4).
    #[cfg_attr(feature = "serde", serde(rename = "NEWLINE"))]
    Newline,
    /// An increase in indentation; text is the indent whitespace (code 5).
    #[cfg_attr(feature = "serde", serde(rename = "INDENT"))]
    Indent,
    /// A return to an outer indentation level; text is empty (code 6).
    #[cfg_attr(feature = "serde", serde(rename = "DEDENT"))]
    Dedent,
    /// An operator or delimiter (code 51).
    #[cfg_attr(feature = "serde", serde(rename = "OP"))]
    Op,
    /// A character the scanner could not classify (code 52).
    #[cfg_attr(feature = "serde", serde(rename = "ERRORTOKEN"))]
    ErrorToken,
    /// A comment, `#` to end of line (code 53).
    #[cfg_attr(feature = "serde", serde(rename = "COMMENT"))]
    Comment,
    /// A non-logical newline: blank line, comment-only line, or a newline
    /// inside brackets (code 54).
    #[cfg_attr(feature = "serde", serde(rename = "NL"))]
    Nl,
}

impl LexemeKind {
    /// The CPython numeric token code for this kind.
    pub const fn code(self) -> u16 {
        match self {
            LexemeKind::EndMarker => 0,
            LexemeKind::Name => 1,
            LexemeKind::Number => 2,
            LexemeKind::String => 3,
            LexemeKind::Newline => 4,
            LexemeKind::Indent => 5,
            LexemeKind::Dedent => 6,
            LexemeKind::Op => 51,
            LexemeKind::ErrorToken => 52,
            LexemeKind::Comment => 53,
            LexemeKind::Nl => 54,
        }
    }

    /// The upper-case symbolic name (`"NAME"`, `"ENDMARKER"`, ...).
    pub const fn name(self) -> &'static str {
        match self {
            LexemeKind::EndMarker => "ENDMARKER",
            LexemeKind::Name => "NAME",
            LexemeKind::Number => "NUMBER",
            LexemeKind::String => "STRING",
            LexemeKind::Newline => "NEWLINE",
            LexemeKind::Indent => "INDENT",
            LexemeKind::Dedent => "DEDENT",
            LexemeKind::Op => "OP",
            LexemeKind::ErrorToken => "ERRORTOKEN",
            LexemeKind::Comment => "COMMENT",
            LexemeKind::Nl => "NL",
        }
    }

    /// Resolve a numeric token code to its kind.
    pub fn from_code(code: u16) -> Result<Self, LexError> {
        match code {
            0 => Ok(LexemeKind::EndMarker),
            1 => Ok(LexemeKind::Name),
            2 => Ok(LexemeKind::Number),
            3 => Ok(LexemeKind::String),
            4 => Ok(LexemeKind::Newline),
            5 => Ok(LexemeKind::Indent),
            6 => Ok(LexemeKind::Dedent),
            51 => Ok(LexemeKind::Op),
            52 => Ok(LexemeKind::ErrorToken),
            53 => Ok(LexemeKind::Comment),
            54 => Ok(LexemeKind::Nl),
            other => Err(LexError::UnknownTokenCode(other)),
        }
    }

    /// Resolve a symbolic token name to its kind.
    pub fn from_name(name: &str) -> Result<Self, LexError> {
        match name {
            "ENDMARKER" => Ok(LexemeKind::EndMarker),
            "NAME" => Ok(LexemeKind::Name),
            "NUMBER" => Ok(LexemeKind::Number),
            "STRING" => Ok(LexemeKind::String),
            "NEWLINE" => Ok(LexemeKind::Newline),
            "INDENT" => Ok(LexemeKind::Indent),
            "DEDENT" => Ok(LexemeKind::Dedent),
            "OP" => Ok(LexemeKind::Op),
            "ERRORTOKEN" => Ok(LexemeKind::ErrorToken),
            "COMMENT" => Ok(LexemeKind::Comment),
            "NL" => Ok(LexemeKind::Nl),
            other => Err(LexError::UnknownTokenName(other.to_string())),
        }
    }
}

impl fmt::Display for LexemeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The first field of a raw token record: a numeric code or an already
/// symbolic name. Callers pick the variant; nothing is inferred at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KindField {
    /// A CPython numeric token code.
    Code(u16),
    /// A symbolic token name such as `"NAME"`.
    Name(String),
}

/// A raw token record as produced by an external tokenizer: kind field,
/// literal text, start and end positions, and the (unretained) source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// Numeric or symbolic token category.
    pub kind: KindField,
    /// The literal text matched; may be empty.
    pub text: String,
    /// Start position as (line, column).
    pub start: (u32, u32),
    /// End position as (line, column).
    pub end: (u32, u32),
    /// The source line the token came from. Informational only; a lexeme
    /// does not keep it.
    pub line: Option<String>,
}

/// One classified token with its literal text and source span.
///
/// Immutable after construction; equality is value equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Lexeme {
    kind: LexemeKind,
    text: InternedString,
    span: Span,
}

impl Lexeme {
    /// Construct a validated lexeme.
    ///
    /// Fails if the span runs backwards, or if a non-empty single-line text
    /// does not fit the span width.
    pub fn new(
        kind: LexemeKind,
        text: impl Into<InternedString>,
        span: Span,
    ) -> Result<Self, LexError> {
        let text = text.into();
        if span.end < span.start {
            return Err(LexError::InvalidSpan(span));
        }
        if span.is_single_line() && !text.is_empty() {
            let len = text.char_len();
            let width = (span.end.column - span.start.column) as usize;
            if len != width {
                return Err(LexError::SpanMismatch { span, len });
            }
        }
        Ok(Self { kind, text, span })
    }

    /// Construct a lexeme from a raw external record, resolving a numeric
    /// kind field to its symbolic kind.
    pub fn from_record(record: &RawRecord) -> Result<Self, LexError> {
        let kind = match &record.kind {
            KindField::Code(code) => LexemeKind::from_code(*code)?,
            KindField::Name(name) => LexemeKind::from_name(name)?,
        };
        let span = Span::new(
            Position::new(record.start.0, record.start.1),
            Position::new(record.end.0, record.end.1),
        );
        Self::new(kind, record.text.as_str(), span)
    }

    /// Internal constructor for the scanner, which produces spans that are
    /// consistent by construction.
    pub(crate) fn from_parts(kind: LexemeKind, text: impl Into<InternedString>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }

    /// The token category.
    pub fn kind(&self) -> LexemeKind {
        self.kind
    }

    /// The literal text matched.
    pub fn text(&self) -> &str {
        self.text.as_str()
    }

    /// The source span covered.
    pub fn span(&self) -> Span {
        self.span
    }

    /// True if the text is non-empty and entirely whitespace (a newline or
    /// indent token).
    pub fn is_whitespace_text(&self) -> bool {
        !self.text.is_empty() && self.text.chars().all(char::is_whitespace)
    }
}

/// Display policy: comment content is never surfaced, whitespace content is
/// elided to the kind name. The branch order matters; COMMENT tokens carry
/// non-whitespace text that must still be elided.
impl fmt::Display for Lexeme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind == LexemeKind::Comment {
            f.write_str("<COMMENT>")
        } else if self.is_whitespace_text() {
            write!(f, "<{}>", self.kind.name())
        } else if !self.text.is_empty() {
            f.write_str(self.text.as_str())
        } else {
            write!(f, "<{}>", self.kind.name())
        }
    }
}
