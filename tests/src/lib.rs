//! Workspace-level integration tests for the pytok tokenizer.
//!
//! The library target is empty; the tests live under `tests/`.
