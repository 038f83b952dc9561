//! Parser module for building an Abstract Syntax Tree (AST).
//!
//! This module contains the parser that transforms a stream of tokens
//! into an Abstract Syntax Tree. It uses a Pratt parser for expressions
//! with proper operator precedence and handles:
//!
//! - Declarations (`x : T = e`, `x := e`, `x :: e`)
//! - Statements (blocks, control flow, assignment, return)
//! - Expression parsing (binary ops, prefix ops, calls, member access, literals)
//! - Type parsing for annotations, parameters and return types
//!
//! The parser uses NUD (null denotation) and LED (left denotation) functions
//! for expression parsing with binding power for precedence handling.

pub mod expr;
pub mod lookups;
pub mod parser;
pub mod stmt;
pub mod types;
