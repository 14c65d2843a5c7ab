//! A buffer of lexemes with the transforms built on top of the token
//! stream: comment stripping, structural-newline scrubbing, corpus
//! rendering, and source reconstruction.

#[cfg(feature = "logging")]
use log::debug;

use crate::error::SourceError;
use crate::lexer::tokenize;
use crate::token::{Lexeme, LexemeKind};

#[cfg(windows)]
const LINE_SEP: &str = "\r\n";
#[cfg(not(windows))]
const LINE_SEP: &str = "\n";

/// An append-only sequence of lexemes.
///
/// A buffer grows by tokenizing source text or by taking lexemes that were
/// already classified; the filtering operations return new buffers and leave
/// the receiver untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceBuffer {
    lexemes: Vec<Lexeme>,
}

impl SourceBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokenize a complete source text into a fresh buffer.
    pub fn from_source(source: &str) -> Result<Self, SourceError> {
        let mut buffer = Self::new();
        buffer.extend_source(source)?;
        Ok(buffer)
    }

    /// Tokenize `source` and append the resulting lexemes.
    ///
    /// Fragments of one character or fewer are rejected: a lone newline (or
    /// less) carries nothing the tokenizer can classify.
    pub fn extend_source(&mut self, source: &str) -> Result<(), SourceError> {
        let chars = source.chars().count();
        if chars <= 1 {
            return Err(SourceError::FragmentTooShort(chars));
        }
        let lexemes = tokenize(source)?;
        #[cfg(feature = "logging")]
        debug!("appending {} lexemes from {} chars", lexemes.len(), chars);
        self.lexemes.extend(lexemes);
        Ok(())
    }

    /// Append one already-classified lexeme.
    pub fn push(&mut self, lexeme: Lexeme) {
        self.lexemes.push(lexeme);
    }

    /// Append a sequence of already-classified lexemes.
    pub fn extend_lexemes<I: IntoIterator<Item = Lexeme>>(&mut self, lexemes: I) {
        self.lexemes.extend(lexemes);
    }

    /// Number of lexemes held.
    pub fn len(&self) -> usize {
        self.lexemes.len()
    }

    /// True if the buffer holds no lexemes.
    pub fn is_empty(&self) -> bool {
        self.lexemes.is_empty()
    }

    /// Iterate over the lexemes in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Lexeme> {
        self.lexemes.iter()
    }

    /// A copy of the buffer with all COMMENT lexemes removed.
    ///
    /// An empty receiver, or a result with nothing left, is a caller error:
    /// any tokenized source keeps at least its ENDMARKER.
    pub fn uncommented(&self) -> Result<Self, SourceError> {
        if self.is_empty() {
            return Err(SourceError::EmptyBuffer);
        }
        let lexemes: Vec<Lexeme> = self
            .lexemes
            .iter()
            .filter(|l| l.kind() != LexemeKind::Comment)
            .cloned()
            .collect();
        if lexemes.is_empty() {
            return Err(SourceError::EmptyResult);
        }
        Ok(Self { lexemes })
    }

    /// A copy with comments and structural newlines removed: every NL goes
    /// first, then a NEWLINE directly followed by another NEWLINE or an
    /// INDENT goes with it. The two passes keep the lookahead blind to
    /// tokens that are already gone, so a blank line between a header and
    /// its block still collapses the header's NEWLINE. The final NEWLINE of
    /// the stream survives.
    pub fn scrubbed(&self) -> Result<Self, SourceError> {
        let uncommented = self.uncommented()?;
        let kept: Vec<Lexeme> = uncommented
            .lexemes
            .into_iter()
            .filter(|l| l.kind() != LexemeKind::Nl)
            .collect();
        let mut lexemes = Vec::with_capacity(kept.len());
        let mut iter = kept.into_iter().peekable();
        while let Some(lexeme) = iter.next() {
            if lexeme.kind() == LexemeKind::Newline {
                if let Some(next) = iter.peek() {
                    if matches!(next.kind(), LexemeKind::Newline | LexemeKind::Indent) {
                        continue;
                    }
                }
            }
            lexemes.push(lexeme);
        }
        if lexemes.is_empty() {
            return Err(SourceError::EmptyResult);
        }
        Ok(Self { lexemes })
    }

    /// Reconstruct source text from the spans and texts of the lexemes.
    ///
    /// A cursor walks from (1,0); missing lines become separators and
    /// missing columns become spaces, so a stream with intact spans
    /// reproduces its source layout exactly.
    pub fn delex(&self) -> String {
        let mut out = String::new();
        let mut line: u32 = 1;
        let mut column: u32 = 0;
        for lexeme in &self.lexemes {
            let start = lexeme.span().start;
            while line < start.line {
                out.push_str(LINE_SEP);
                line += 1;
                column = 0;
            }
            while column < start.column {
                out.push(' ');
                column += 1;
            }
            let text = lexeme.text();
            if text.contains('\n') {
                // Token text is '\n'-normalized; emit the same separator the
                // gap lines use.
                out.push_str(&text.replace('\n', LINE_SEP));
                line += text.matches('\n').count() as u32;
                let tail = text.rsplit('\n').next().unwrap_or("");
                column = tail.chars().count() as u32;
            } else {
                out.push_str(text);
                column += text.chars().count() as u32;
            }
        }
        out
    }

    /// Render the buffer as one corpus line: the display form of each
    /// lexeme, space separated, with whitespace-text lexemes left out.
    pub fn corpus(&self) -> String {
        let mut out = String::new();
        for lexeme in &self.lexemes {
            if lexeme.is_whitespace_text() {
                continue;
            }
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(&lexeme.to_string());
        }
        out
    }
}

impl From<Vec<Lexeme>> for SourceBuffer {
    fn from(lexemes: Vec<Lexeme>) -> Self {
        Self { lexemes }
    }
}

impl IntoIterator for SourceBuffer {
    type Item = Lexeme;
    type IntoIter = std::vec::IntoIter<Lexeme>;

    fn into_iter(self) -> Self::IntoIter {
        self.lexemes.into_iter()
    }
}

impl<'a> IntoIterator for &'a SourceBuffer {
    type Item = &'a Lexeme;
    type IntoIter = std::slice::Iter<'a, Lexeme>;

    fn into_iter(self) -> Self::IntoIter {
        self.lexemes.iter()
    }
}
