//! High-level analysis entry points shared by the CLI and by embedders.

use serde::Serialize;

use pytok_lexer::SourceBuffer;
use pytok_service::TokenRecord;

/// The result of tokenizing one source text: the token stream, its corpus
/// rendering, and any errors that stopped the scan.
#[derive(Debug, Serialize)]
pub struct TokenReport {
    /// Tokens in source order, empty when the scan failed.
    pub tokens: Vec<TokenRecord>,
    /// The corpus line (whitespace tokens elided, comments masked).
    pub corpus: String,
    /// Errors, empty on success.
    pub errors: Vec<String>,
}

/// Tokenize a source string and return a report. Scan failures land in
/// `errors` instead of aborting, so callers always get a serializable
/// result.
pub fn token_report(source: &str) -> TokenReport {
    match SourceBuffer::from_source(source) {
        Ok(buffer) => TokenReport {
            tokens: buffer.iter().map(TokenRecord::from).collect(),
            corpus: buffer.corpus(),
            errors: Vec::new(),
        },
        Err(e) => TokenReport {
            tokens: Vec::new(),
            corpus: String::new(),
            errors: vec![e.to_string()],
        },
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn report_for_valid_source() {
        let report = token_report("print(1+2**2)\n");
        assert!(report.errors.is_empty());
        assert_eq!(report.tokens.len(), 10);
        assert_eq!(report.corpus, "print ( 1 + 2 ** 2 ) <ENDMARKER>");
    }

    #[test]
    fn report_for_broken_source() {
        let report = token_report("s = 'open\n");
        assert!(report.tokens.is_empty());
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("unterminated"));
    }
}
