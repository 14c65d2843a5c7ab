//! Line-structured scanner producing the Python token stream.
//!
//! The scanner is hand-written: INDENT/DEDENT bookkeeping, the NL-versus-
//! NEWLINE distinction, and bracket-aware line joining depend on where a
//! character sits in the line structure, which a flat token automaton cannot
//! express. Positions are (1-based line, 0-based column) in characters.

use std::collections::VecDeque;

#[cfg(feature = "logging")]
use log::{debug, trace};

use crate::error::LexError;
use crate::token::{Lexeme, LexemeKind, Position, Span};

/// Three-character operators, matched before shorter candidates.
const OPS3: &[&str] = &["**=", "//=", ">>=", "<<="];

/// Two-character operators.
const OPS2: &[&str] = &[
    "**", "//", ">>", "<<", "<=", ">=", "==", "!=", "<>", "+=", "-=", "*=", "/=", "%=", "&=",
    "|=", "^=", "->",
];

/// Single-character operators and delimiters.
const OPS1: &str = "+-*/%&|^~<>()[]{},:.;@=`";

/// Tab stops used when measuring indentation width.
const TAB_SIZE: usize = 8;

/// Tokenize a complete source text.
pub fn tokenize(source: &str) -> Result<Vec<Lexeme>, LexError> {
    Lexer::new(source).collect()
}

/// A scanner over one source text, yielding `Result<Lexeme, LexError>`.
///
/// Iteration fuses after the first error.
pub struct Lexer {
    /// Physical lines, each keeping its trailing `'\n'` when present.
    lines: Vec<Vec<char>>,
    /// Index of the physical line being scanned.
    row: usize,
    /// Character index within the current line.
    pos: usize,
    /// Stack of open indentation widths; the bottom entry is always 0.
    indents: Vec<usize>,
    /// Open bracket depth; newlines inside brackets are NL, not NEWLINE.
    paren_depth: usize,
    /// True when the next line begins a fresh logical line.
    at_line_start: bool,
    /// True once the current logical line has produced a token, so EOF can
    /// synthesize the closing NEWLINE.
    logical_open: bool,
    /// Tokens produced ahead of the consumer (dedent runs, trailing NL).
    pending: VecDeque<Lexeme>,
    finished: bool,
    failed: bool,
}

impl Lexer {
    /// Create a scanner for the given source text. Line endings are
    /// normalized to `'\n'` before scanning.
    pub fn new(source: &str) -> Self {
        let normalized = source.replace("\r\n", "\n").replace('\r', "\n");
        let lines: Vec<Vec<char>> = normalized
            .split_inclusive('\n')
            .map(|l| l.chars().collect())
            .collect();
        #[cfg(feature = "logging")]
        debug!("scanning {} physical lines", lines.len());
        Self {
            lines,
            row: 0,
            pos: 0,
            indents: vec![0],
            paren_depth: 0,
            at_line_start: true,
            logical_open: false,
            pending: VecDeque::new(),
            finished: false,
            failed: false,
        }
    }

    fn span_at(&self, row: usize, start: usize, end_row: usize, end: usize) -> Span {
        Span::new(
            Position::new(row as u32 + 1, start as u32),
            Position::new(end_row as u32 + 1, end as u32),
        )
    }

    fn scan_next(&mut self) -> Result<Option<Lexeme>, LexError> {
        loop {
            if self.row >= self.lines.len() {
                return Ok(self.finish());
            }
            if self.at_line_start && self.paren_depth == 0 {
                if let Some(lexeme) = self.scan_line_start()? {
                    return Ok(Some(lexeme));
                }
                continue;
            }
            while self.pos < self.lines[self.row].len()
                && matches!(self.lines[self.row][self.pos], ' ' | '\t' | '\x0c')
            {
                self.pos += 1;
            }
            if self.pos >= self.lines[self.row].len() {
                // Physical line ran out without a newline character (EOF).
                self.row += 1;
                self.pos = 0;
                continue;
            }
            let line = &self.lines[self.row];
            if line[self.pos] == '\\'
                && (self.pos + 1 >= line.len() || line[self.pos + 1] == '\n')
            {
                // Explicit line joining; the logical line continues.
                self.row += 1;
                self.pos = 0;
                continue;
            }
            return self.scan_token().map(Some);
        }
    }

    /// Handle indentation at the start of a logical line. Blank and
    /// comment-only lines produce NL (and COMMENT) without touching the
    /// indent stack.
    fn scan_line_start(&mut self) -> Result<Option<Lexeme>, LexError> {
        let row = self.row;
        let line = self.lines[row].clone();
        let mut pos = 0usize;
        let mut width = 0usize;
        while pos < line.len() {
            match line[pos] {
                ' ' => width += 1,
                '\t' => width = width / TAB_SIZE * TAB_SIZE + TAB_SIZE,
                '\x0c' => width = 0,
                _ => break,
            }
            pos += 1;
        }
        if pos >= line.len() {
            // Whitespace-only final line without a newline; nothing to emit.
            self.row += 1;
            self.pos = 0;
            return Ok(None);
        }
        match line[pos] {
            '\n' => {
                let nl =
                    Lexeme::from_parts(LexemeKind::Nl, "\n", self.span_at(row, pos, row, pos + 1));
                self.row += 1;
                self.pos = 0;
                Ok(Some(nl))
            }
            '#' => {
                let has_newline = line.last() == Some(&'\n');
                let end = if has_newline { line.len() - 1 } else { line.len() };
                let text: String = line[pos..end].iter().collect();
                let comment =
                    Lexeme::from_parts(LexemeKind::Comment, text, self.span_at(row, pos, row, end));
                if has_newline {
                    self.pending.push_back(Lexeme::from_parts(
                        LexemeKind::Nl,
                        "\n",
                        self.span_at(row, end, row, end + 1),
                    ));
                }
                self.row += 1;
                self.pos = 0;
                Ok(Some(comment))
            }
            _ => {
                self.at_line_start = false;
                self.pos = pos;
                let current = self.indents.last().copied().unwrap_or(0);
                if width > current {
                    self.indents.push(width);
                    let text: String = line[..pos].iter().collect();
                    return Ok(Some(Lexeme::from_parts(
                        LexemeKind::Indent,
                        text,
                        self.span_at(row, 0, row, pos),
                    )));
                }
                while width < self.indents.last().copied().unwrap_or(0) {
                    self.indents.pop();
                    self.pending.push_back(Lexeme::from_parts(
                        LexemeKind::Dedent,
                        "",
                        self.span_at(row, pos, row, pos),
                    ));
                }
                if width != self.indents.last().copied().unwrap_or(0) {
                    return Err(LexError::DedentMismatch(Position::new(
                        row as u32 + 1,
                        pos as u32,
                    )));
                }
                Ok(self.pending.pop_front())
            }
        }
    }

    /// Scan one token starting at a non-whitespace character.
    fn scan_token(&mut self) -> Result<Lexeme, LexError> {
        let row = self.row;
        let pos = self.pos;
        let line = self.lines[row].clone();
        let c = line[pos];

        if c == '\n' {
            self.row += 1;
            self.pos = 0;
            if self.paren_depth > 0 {
                return Ok(Lexeme::from_parts(
                    LexemeKind::Nl,
                    "\n",
                    self.span_at(row, pos, row, pos + 1),
                ));
            }
            self.at_line_start = true;
            self.logical_open = false;
            return Ok(Lexeme::from_parts(
                LexemeKind::Newline,
                "\n",
                self.span_at(row, pos, row, pos + 1),
            ));
        }

        if c == '#' {
            let has_newline = line.last() == Some(&'\n');
            let end = if has_newline { line.len() - 1 } else { line.len() };
            let text: String = line[pos..end].iter().collect();
            self.pos = end;
            return Ok(Lexeme::from_parts(
                LexemeKind::Comment,
                text,
                self.span_at(row, pos, row, end),
            ));
        }

        if is_name_start(c) {
            // A short run of r/b/u letters directly before a quote is a
            // string prefix, not a name.
            let mut j = pos;
            while j < line.len() && j - pos < 2 && matches!(line[j], 'r' | 'R' | 'b' | 'B' | 'u' | 'U')
            {
                j += 1;
            }
            if j > pos && j < line.len() && matches!(line[j], '\'' | '"') {
                return self.scan_string(&line, row, pos, j);
            }
            let mut end = pos;
            while end < line.len() && is_name_continue(line[end]) {
                end += 1;
            }
            let text: String = line[pos..end].iter().collect();
            self.pos = end;
            self.logical_open = true;
            return Ok(Lexeme::from_parts(
                LexemeKind::Name,
                text,
                self.span_at(row, pos, row, end),
            ));
        }

        if matches!(c, '\'' | '"') {
            return self.scan_string(&line, row, pos, pos);
        }

        if c.is_ascii_digit()
            || (c == '.' && pos + 1 < line.len() && line[pos + 1].is_ascii_digit())
        {
            return Ok(self.scan_number(&line, row, pos));
        }

        // Operators, longest match first.
        for width in [3usize, 2] {
            if pos + width <= line.len() {
                let cand: String = line[pos..pos + width].iter().collect();
                let table = if width == 3 { OPS3 } else { OPS2 };
                if table.contains(&cand.as_str()) {
                    self.pos = pos + width;
                    self.logical_open = true;
                    return Ok(Lexeme::from_parts(
                        LexemeKind::Op,
                        cand,
                        self.span_at(row, pos, row, pos + width),
                    ));
                }
            }
        }
        if OPS1.contains(c) {
            match c {
                '(' | '[' | '{' => self.paren_depth += 1,
                ')' | ']' | '}' => self.paren_depth = self.paren_depth.saturating_sub(1),
                _ => {}
            }
            self.pos = pos + 1;
            self.logical_open = true;
            return Ok(Lexeme::from_parts(
                LexemeKind::Op,
                c.to_string(),
                self.span_at(row, pos, row, pos + 1),
            ));
        }

        // Anything else is a recoverable error token; scanning continues.
        self.pos = pos + 1;
        self.logical_open = true;
        Ok(Lexeme::from_parts(
            LexemeKind::ErrorToken,
            c.to_string(),
            self.span_at(row, pos, row, pos + 1),
        ))
    }

    /// Scan a string literal. `start` is the first character of the token
    /// (including any prefix letters); `quote_pos` is where the quote sits.
    fn scan_string(
        &mut self,
        line: &[char],
        row: usize,
        start: usize,
        quote_pos: usize,
    ) -> Result<Lexeme, LexError> {
        let quote = line[quote_pos];
        let origin = Position::new(row as u32 + 1, start as u32);
        let triple = quote_pos + 2 < line.len()
            && line[quote_pos + 1] == quote
            && line[quote_pos + 2] == quote;

        if triple {
            let mut text: String = line[start..quote_pos + 3].iter().collect();
            let mut r = row;
            let mut i = quote_pos + 3;
            let mut cur: Vec<char> = line.to_vec();
            loop {
                if i >= cur.len() {
                    r += 1;
                    i = 0;
                    if r >= self.lines.len() {
                        return Err(LexError::UnterminatedString(origin));
                    }
                    cur = self.lines[r].clone();
                    continue;
                }
                let ch = cur[i];
                if ch == '\\' {
                    text.push(ch);
                    if i + 1 < cur.len() {
                        text.push(cur[i + 1]);
                        i += 2;
                    } else {
                        i += 1;
                    }
                    continue;
                }
                if ch == quote && i + 2 < cur.len() && cur[i + 1] == quote && cur[i + 2] == quote {
                    text.push(quote);
                    text.push(quote);
                    text.push(quote);
                    self.row = r;
                    self.pos = i + 3;
                    self.logical_open = true;
                    return Ok(Lexeme::from_parts(
                        LexemeKind::String,
                        text,
                        Span::new(origin, Position::new(r as u32 + 1, i as u32 + 3)),
                    ));
                }
                text.push(ch);
                i += 1;
            }
        }

        let mut text: String = line[start..=quote_pos].iter().collect();
        let mut r = row;
        let mut i = quote_pos + 1;
        let mut cur: Vec<char> = line.to_vec();
        loop {
            if i >= cur.len() {
                return Err(LexError::UnterminatedString(origin));
            }
            let ch = cur[i];
            if ch == '\\' {
                text.push(ch);
                if i + 1 >= cur.len() {
                    return Err(LexError::UnterminatedString(origin));
                }
                text.push(cur[i + 1]);
                if cur[i + 1] == '\n' {
                    // Escaped newline continues the literal on the next line.
                    r += 1;
                    i = 0;
                    if r >= self.lines.len() {
                        return Err(LexError::UnterminatedString(origin));
                    }
                    cur = self.lines[r].clone();
                    continue;
                }
                i += 2;
                continue;
            }
            if ch == quote {
                text.push(ch);
                self.row = r;
                self.pos = i + 1;
                self.logical_open = true;
                return Ok(Lexeme::from_parts(
                    LexemeKind::String,
                    text,
                    Span::new(origin, Position::new(r as u32 + 1, i as u32 + 1)),
                ));
            }
            if ch == '\n' {
                return Err(LexError::UnterminatedString(origin));
            }
            text.push(ch);
            i += 1;
        }
    }

    /// Scan a numeric literal: decimal and radix integers, floats with
    /// exponents, and trailing `j`/`J`/`l`/`L` suffixes.
    fn scan_number(&mut self, line: &[char], row: usize, pos: usize) -> Lexeme {
        let mut end = pos;
        if line[pos] == '0'
            && pos + 1 < line.len()
            && matches!(line[pos + 1], 'x' | 'X' | 'o' | 'O' | 'b' | 'B')
        {
            end = pos + 2;
            while end < line.len() && (line[end].is_ascii_hexdigit() || line[end] == '_') {
                end += 1;
            }
        } else {
            while end < line.len() && line[end].is_ascii_digit() {
                end += 1;
            }
            if end < line.len() && line[end] == '.' {
                end += 1;
                while end < line.len() && line[end].is_ascii_digit() {
                    end += 1;
                }
            }
            if end < line.len() && matches!(line[end], 'e' | 'E') {
                let mut k = end + 1;
                if k < line.len() && matches!(line[k], '+' | '-') {
                    k += 1;
                }
                if k < line.len() && line[k].is_ascii_digit() {
                    end = k;
                    while end < line.len() && line[end].is_ascii_digit() {
                        end += 1;
                    }
                }
            }
        }
        if end < line.len() && matches!(line[end], 'j' | 'J' | 'l' | 'L') {
            end += 1;
        }
        let text: String = line[pos..end].iter().collect();
        self.pos = end;
        self.logical_open = true;
        Lexeme::from_parts(LexemeKind::Number, text, self.span_at(row, pos, row, end))
    }

    /// Emit the end-of-stream tokens: the implicit NEWLINE when the last
    /// logical line had no trailing newline, then the closing DEDENT run and
    /// ENDMARKER.
    fn finish(&mut self) -> Option<Lexeme> {
        let end_line = self.lines.len() as u32 + 1;
        if self.logical_open {
            self.logical_open = false;
            let row = self.lines.len().saturating_sub(1);
            let col = self.lines.last().map(|l| l.len()).unwrap_or(0);
            self.pending.push_back(Lexeme::from_parts(
                LexemeKind::Newline,
                "",
                Span::new(
                    Position::new(row as u32 + 1, col as u32),
                    Position::new(row as u32 + 1, col as u32 + 1),
                ),
            ));
        }
        while self.indents.len() > 1 {
            self.indents.pop();
            self.pending.push_back(Lexeme::from_parts(
                LexemeKind::Dedent,
                "",
                Span::new(Position::new(end_line, 0), Position::new(end_line, 0)),
            ));
        }
        self.pending.push_back(Lexeme::from_parts(
            LexemeKind::EndMarker,
            "",
            Span::new(Position::new(end_line, 0), Position::new(end_line, 0)),
        ));
        self.finished = true;
        self.pending.pop_front()
    }
}

impl Iterator for Lexer {
    type Item = Result<Lexeme, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        if let Some(lexeme) = self.pending.pop_front() {
            return Some(Ok(lexeme));
        }
        if self.finished {
            return None;
        }
        match self.scan_next() {
            Ok(Some(lexeme)) => {
                #[cfg(feature = "logging")]
                trace!("{} {:?} at {}", lexeme.kind(), lexeme.text(), lexeme.span());
                Some(Ok(lexeme))
            }
            Ok(None) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_name_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
