//! Error types and error handling for the checker.
//!
//! This module defines the error type shared by every phase. It includes:
//!
//! - Error structures with a primary and an optional related source position
//! - Specific error variants for lexing, parsing, binding and type checking
//! - Short error names and human-readable suggestions for rendering

pub mod errors;
