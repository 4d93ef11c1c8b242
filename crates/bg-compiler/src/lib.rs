//! botgate robots.txt Compiler
//!
//! This crate turns robots.txt text into a `bg_core::Directory`. Parsing is
//! tolerant: malformed input degrades to fewer rules, never to an error.
//!
//! The pipeline is `tokenizer` -> `parser` (line classifier, using `pattern`
//! for rule paths) -> `builder` (group assembler).

pub mod tokenizer;
pub mod pattern;
pub mod parser;
pub mod builder;
pub mod status;

use bg_core::Directory;

pub use builder::build_directory;
pub use parser::{ClassifiedLine, LineKind, LineParser, ParseError};
pub use pattern::{compile_path, CompiledPath};
pub use status::{from_status_and_bytes, from_status_and_str, StatusPolicy};
pub use tokenizer::{line_count, tokenize, Token};

/// Parse a robots.txt document.
///
/// Always yields a usable directory; problems that dropped a line are
/// returned alongside it.
pub fn parse_policy(input: &[u8]) -> (Directory, Vec<ParseError>) {
    let tokens = tokenize(input);
    let (directory, errors) = build_directory(LineParser::new(tokens));
    log::debug!(
        "parsed {} bytes: {} groups, {} diagnostics",
        input.len(),
        directory.group_count(),
        errors.len()
    );
    (directory, errors)
}

pub fn parse_policy_str(input: &str) -> (Directory, Vec<ParseError>) {
    parse_policy(input.as_bytes())
}
