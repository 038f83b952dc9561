//! Lexical analysis module.
//!
//! Converts source text into a stream of tokens for the parser:
//!
//! - Tokenization using anchored regex patterns tried in order
//! - Recognition of keywords, built-in type names, literals and operators
//! - Byte-offset positions on every token for error reporting
//! - Line comments and whitespace are skipped

pub mod lexer;
pub mod tokens;

#[cfg(test)]
mod tests;
