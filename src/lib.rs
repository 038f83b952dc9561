#![allow(clippy::module_inception)]

use std::rc::Rc;

use crate::{
    ast::ast::Ast,
    errors::errors::{Error, ErrorTip},
    lexer::lexer::tokenize,
    parser::parser::parse,
    scope::{binder::bind, scope::Scopes},
    type_checker::type_checker::type_check,
};

pub mod ast;
pub mod errors;
pub mod lexer;
pub mod macros;
pub mod parser;
pub mod scope;
pub mod type_checker;

extern crate regex;

#[derive(Debug, Clone, PartialEq)]
pub struct Position(pub u32, pub Rc<String>);

impl Position {
    pub fn null() -> Self {
        Position(0, Rc::new(String::from("<null>")))
    }

    pub fn is_null(&self) -> bool {
        self.0 == 0 && self.1.as_str() == "<null>"
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn null() -> Self {
        Span {
            start: Position::null(),
            end: Position::null(),
        }
    }
}

/// A source file taken through every phase up to a type-checked tree.
pub struct Checked {
    pub ast: Ast,
    pub scopes: Scopes,
}

/// Lexes, parses, binds and type checks `source`.
///
/// Lexing and parsing stop at the first error; binding and checking report
/// every independent error they find.
pub fn check_source(source: &str, file: &str) -> Result<Checked, Vec<Error>> {
    let tokens = tokenize(source.to_string(), Some(String::from(file))).map_err(|e| vec![e])?;
    let mut ast = parse(tokens, Rc::new(String::from(file))).map_err(|e| vec![e])?;
    let scopes = bind(&mut ast)?;
    type_check(&mut ast, &scopes)?;

    Ok(Checked { ast, scopes })
}

/// Returns the one-based line number, the text of that line and the
/// zero-based column of byte offset `position`.
pub fn get_line_at_position(source: &str, position: u32) -> Option<(usize, String, usize)> {
    let pos = position as usize;

    if pos > source.len() {
        return None;
    }

    let mut start = 0;
    let mut line_number = 1;

    for line in source.split_inclusive('\n') {
        let end = start + line.len();

        if (start..end).contains(&pos) {
            let line_pos = pos - start;
            return Some((line_number, line.to_string(), line_pos));
        }

        start = end;
        line_number += 1;
    }

    // End of input, reported on a trailing empty line.
    Some((line_number, String::new(), 0))
}


pub fn display_error(error: &Error, source: &str, file: &str) {
    /*
        Error: TypeMatchError (Expected type `u32`, received `u16`)
        -> main.lang
           |
        20 | x : u32 = y;
           | ----------^
    */

    let position = error.get_position();
    let Some((line, line_text, line_pos)) = get_line_at_position(source, position.0) else {
        println!("Error: {} ({})", error.get_error_name(), error.get_tip());
        return;
    };

    let line_string = line.to_string();
    let padding = line_string.len() + 2;

    if let ErrorTip::None = error.get_tip() {
        println!("Error: {}", error.get_error_name());
    } else {
        println!("Error: {} ({})", error.get_error_name(), error.get_tip());
    }
    println!("-> {}", file);
    println!("{:>padding$}", "|");

    let (line_text_removed, removed_whitespace) = remove_starting_whitespace(&line_text);
    println!("{} | {}", line_string, line_text_removed.trim_end());

    let arrows = line_pos.saturating_sub(removed_whitespace) + 1;

    println!("{:>padding$} {:->arrows$}", "|", "^");

    if let Some(related) = error.get_related() {
        if let Some((related_line, _, related_pos)) = get_line_at_position(source, related.0) {
            println!("{:>padding$} note: expected type comes from {}:{}", "=", related_line, related_pos + 1);
        }
    }
}

fn remove_starting_whitespace(string: &str) -> (String, usize) {
    let mut start = 0;
    for c in string.chars() {
        if c == ' ' || c == '\t' {
            start += 1;
        } else {
            break;
        }
    }

    (String::from(&string[start..]), start)
}
