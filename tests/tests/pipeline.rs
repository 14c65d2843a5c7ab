//! End-to-end checks across the lexer, the buffer transforms, and the
//! report API.

use pretty_assertions::assert_eq;
use pytok::token_report;
use pytok_lexer::{LexemeKind, SourceBuffer};

const SCRIPT: &str = "\
#!/usr/bin/env python
# module docstring substitute

import os

def size_of(path):
    '''Return the file size, or -1.'''
    try:
        return os.path.getsize(path)  # may raise
    except OSError:
        return -1

print(size_of('.'))
";

#[test]
fn a_realistic_script_round_trips_through_delex() {
    let buffer = SourceBuffer::from_source(SCRIPT).unwrap();
    assert_eq!(buffer.delex(), SCRIPT);
}

#[test]
fn scrubbing_a_realistic_script_leaves_only_logical_structure() {
    let buffer = SourceBuffer::from_source(SCRIPT).unwrap();
    let scrubbed = buffer.scrubbed().unwrap();
    assert!(scrubbed
        .iter()
        .all(|l| !matches!(l.kind(), LexemeKind::Comment | LexemeKind::Nl)));
    // Indentation structure is intact.
    let indents = scrubbed
        .iter()
        .filter(|l| l.kind() == LexemeKind::Indent)
        .count();
    let dedents = scrubbed
        .iter()
        .filter(|l| l.kind() == LexemeKind::Dedent)
        .count();
    assert_eq!(indents, dedents);
    assert!(indents > 0);
}

#[test]
fn corpus_of_a_realistic_script_masks_every_comment() {
    let buffer = SourceBuffer::from_source(SCRIPT).unwrap();
    let corpus = buffer.corpus();
    assert!(!corpus.contains("docstring substitute"));
    assert!(!corpus.contains("may raise"));
    assert!(corpus.contains("<COMMENT>"));
    assert!(corpus.ends_with("<ENDMARKER>"));
}

#[test]
fn report_json_is_stable_for_tooling() {
    let report = token_report("x = 1\n");
    let json = serde_json::to_string(&report).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["errors"].as_array().unwrap().len(), 0);
    let tokens = value["tokens"].as_array().unwrap();
    assert_eq!(tokens.len(), 5);
    assert_eq!(tokens[0]["kind"], "NAME");
    assert_eq!(tokens[0]["text"], "x");
    assert_eq!(tokens[0]["start"][0], 1);
    assert_eq!(tokens[0]["start"][1], 0);
}

#[test]
fn incremental_extension_matches_whole_file_tokenization() {
    let first = "a = 1\n";
    let second = "b = 2\n";

    let mut incremental = SourceBuffer::new();
    incremental.extend_source(first).unwrap();
    // Strip the end-of-stream bookkeeping before appending more text.
    let trimmed: Vec<_> = incremental
        .iter()
        .filter(|l| l.kind() != LexemeKind::EndMarker)
        .cloned()
        .collect();
    let mut trimmed_buffer = SourceBuffer::from(trimmed);
    trimmed_buffer.extend_source(second).unwrap();

    // Token kinds match the stream of the concatenated source; spans of the
    // second half restart at line 1, which is what per-fragment scanning
    // means.
    let whole = SourceBuffer::from_source("a = 1\nb = 2\n").unwrap();
    let got: Vec<LexemeKind> = trimmed_buffer.iter().map(|l| l.kind()).collect();
    let expected: Vec<LexemeKind> = whole.iter().map(|l| l.kind()).collect();
    assert_eq!(got, expected);
}
