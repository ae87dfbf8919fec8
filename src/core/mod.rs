//! Byte-level scanning: elements and the tokenizer that produces them.

/// Parsed tag unit.
pub mod element;
/// Streaming tag scanner.
pub mod tokenizer;
