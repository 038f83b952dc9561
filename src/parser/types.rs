//! Type parsing implementation.
//!
//! Types are ordinary expressions once parsed, but type positions (declaration
//! annotations, parameter and return types) accept a narrower grammar:
//!
//! - Primitive types and named types (identifiers)
//! - Pointer types (`&T`)
//! - Function types (`fn (T, U) -> R`, never with a body)
//! - Inline struct and enum types
//! - Member access into a struct's constants (`Outer.Inner`)
//!
//! Similar to expression parsing, it uses NUD/LED handlers with
//! binding powers for parsing complex type expressions.

use std::collections::HashMap;

use crate::{
    ast::{
        ast::{NodeId, NodeKind},
        expressions::{Unary, UnaryOp},
    },
    errors::errors::Error,
    lexer::tokens::TokenKind,
};

use super::{
    expr::{check_fn_type_params, parse_enum_expr, parse_fn_prototype, parse_member_expr, parse_primary_expr, parse_struct_expr},
    lookups::BindingPower,
    parser::Parser,
};

/// Type alias for type null denotation handler functions.
pub type TypeNUDHandler = fn(&mut Parser) -> Result<NodeId, Error>;

/// Type alias for type left denotation handler functions.
pub type TypeLEDHandler = fn(&mut Parser, NodeId, BindingPower) -> Result<NodeId, Error>;

/// Type alias for type NUD lookup table.
pub type TypeNUDLookup = HashMap<TokenKind, TypeNUDHandler>;

/// Type alias for type LED lookup table.
pub type TypeLEDLookup = HashMap<TokenKind, TypeLEDHandler>;

/// Initializes the type parsing lookup tables.
pub fn create_token_type_lookups(parser: &mut Parser) {
    parser.type_nud(TokenKind::Primitive, parse_primary_expr);
    parser.type_nud(TokenKind::Identifier, parse_primary_expr);
    parser.type_nud(TokenKind::Ampersand, parse_pointer_type);
    parser.type_nud(TokenKind::Fn, parse_fn_type);
    parser.type_nud(TokenKind::Struct, parse_struct_expr);
    parser.type_nud(TokenKind::Enum, parse_enum_expr);
    parser.type_nud(TokenKind::OpenParen, parse_grouping_type);

    parser.type_led(TokenKind::Dot, BindingPower::Member, parse_member_expr);
}

pub fn parse_pointer_type(parser: &mut Parser) -> Result<NodeId, Error> {
    let start = parser.expect(TokenKind::Ampersand)?.span.start;
    let operand = parse_type(parser, BindingPower::Unary)?;

    Ok(parser.alloc(
        NodeKind::Unary(Unary {
            op: UnaryOp::Ref,
            operand,
        }),
        start,
    ))
}

pub fn parse_fn_type(parser: &mut Parser) -> Result<NodeId, Error> {
    let prototype = parse_fn_prototype(parser)?;
    check_fn_type_params(parser, prototype)?;

    Ok(prototype)
}

pub fn parse_grouping_type(parser: &mut Parser) -> Result<NodeId, Error> {
    parser.expect(TokenKind::OpenParen)?;
    let ty = parse_type(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;

    Ok(ty)
}

pub fn parse_type(parser: &mut Parser, bp: BindingPower) -> Result<NodeId, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let Some(nud) = parser.get_type_nud_lookup().get(&token_kind).copied() else {
        return Err(parser.unexpected_detailed("expected a type"));
    };

    let mut left = nud(parser)?;

    // While LED and current BP is less than BP of current token, continue parsing lhs
    while let Some(next_bp) = parser.get_type_bp_lookup().get(&parser.current_token_kind()).copied() {
        if next_bp <= bp {
            break;
        }

        let Some(led) = parser.get_type_led_lookup().get(&parser.current_token_kind()).copied() else {
            return Err(parser.unexpected());
        };

        left = led(parser, left, next_bp)?;
    }

    Ok(left)
}
