use crate::{
    ast::{
        ast::{Flags, NodeId, NodeKind},
        expressions::{
            Access, Binary, BinaryOp, Call, EnumType, EnumValue, Function, FunctionType, Identifier,
            NumberValue, Param, StructType, Unary, UnaryOp,
        },
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{TokenKind, PRIMITIVE_LOOKUP},
};

use super::{
    lookups::BindingPower,
    parser::Parser,
    stmt::{parse_block_stmt, parse_declaration},
    types::parse_type,
};

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<NodeId, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let Some(nud) = parser.get_nud_lookup().get(&token_kind).copied() else {
        return Err(parser.unexpected());
    };

    let mut left = nud(parser)?;

    // While LED and current BP is less than BP of current token, continue parsing lhs
    while let Some(next_bp) = parser.get_bp_lookup().get(&parser.current_token_kind()).copied() {
        if next_bp <= bp {
            break;
        }

        let Some(led) = parser.get_led_lookup().get(&parser.current_token_kind()).copied() else {
            return Err(parser.unexpected());
        };

        left = led(parser, left, next_bp)?;
    }

    Ok(left)
}

/// Allocates a binding identifier for the name token that was just consumed.
pub fn alloc_binding(parser: &mut Parser, name: &str, start: crate::Position) -> NodeId {
    let atom = parser.ast.interner.intern(name);
    let node = parser.alloc(NodeKind::Identifier(Identifier::new(atom)), start);
    parser.ast[node].flags.insert(Flags::BINDING);
    node
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    let token = parser.advance().clone();
    let start = token.span.start.clone();

    match token.kind {
        TokenKind::Number => {
            let is_float = token.value.contains('.');
            let value = if is_float {
                token.value.parse::<f64>().ok().map(NumberValue::Float)
            } else {
                token.value.parse::<u64>().ok().map(NumberValue::Int)
            };

            let Some(value) = value else {
                return Err(Error::new(ErrorImpl::NumberParseError { token: token.value }, start));
            };

            let node = parser.alloc(NodeKind::Number(value), start);
            if is_float {
                parser.ast[node].flags.insert(Flags::FLOATLIKE);
            }
            Ok(node)
        }
        TokenKind::String => Ok(parser.alloc(NodeKind::String(token.value), start)),
        TokenKind::True => Ok(parser.alloc(NodeKind::Bool(true), start)),
        TokenKind::False => Ok(parser.alloc(NodeKind::Bool(false), start)),
        TokenKind::Identifier => {
            let atom = parser.ast.interner.intern(&token.value);
            Ok(parser.alloc(NodeKind::Identifier(Identifier::new(atom)), start))
        }
        TokenKind::Primitive => match PRIMITIVE_LOOKUP.get(token.value.as_str()) {
            Some(desc) => Ok(parser.alloc(NodeKind::Primitive(*desc), start)),
            None => Err(Error::new(ErrorImpl::UnexpectedToken { token: token.value }, start)),
        },
        _ => Err(Error::new(ErrorImpl::UnexpectedToken { token: token.value }, start)),
    }
}

pub fn parse_binary_expr(parser: &mut Parser, left: NodeId, bp: BindingPower) -> Result<NodeId, Error> {
    let operator_token = parser.advance().clone();

    let op = match operator_token.kind {
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Dash => BinaryOp::Sub,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Equals => BinaryOp::Equals,
        TokenKind::NotEquals => BinaryOp::NotEquals,
        TokenKind::Less => BinaryOp::Less,
        TokenKind::LessEquals => BinaryOp::LessEquals,
        TokenKind::Greater => BinaryOp::Greater,
        TokenKind::GreaterEquals => BinaryOp::GreaterEquals,
        TokenKind::And => BinaryOp::And,
        TokenKind::Or => BinaryOp::Or,
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken { token: operator_token.value },
                operator_token.span.start,
            ))
        }
    };

    let right = parse_expr(parser, bp)?;
    let start = parser.ast[left].span.start.clone();

    Ok(parser.alloc(NodeKind::Binary(Binary { op, lhs: left, rhs: right }), start))
}

pub fn parse_prefix_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    let operator_token = parser.advance().clone();

    let op = match operator_token.kind {
        TokenKind::Plus => UnaryOp::Plus,
        TokenKind::Dash => UnaryOp::Minus,
        TokenKind::Not => UnaryOp::Not,
        TokenKind::Star => UnaryOp::Deref,
        TokenKind::Ampersand => UnaryOp::Ref,
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken { token: operator_token.value },
                operator_token.span.start,
            ))
        }
    };

    let operand = parse_expr(parser, BindingPower::Unary)?;

    Ok(parser.alloc(NodeKind::Unary(Unary { op, operand }), operator_token.span.start))
}

pub fn parse_grouping_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    parser.advance();
    let expr = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;

    Ok(expr)
}

pub fn parse_call_expr(parser: &mut Parser, left: NodeId, _bp: BindingPower) -> Result<NodeId, Error> {
    parser.advance();

    let mut args = vec![];

    while parser.current_token_kind() != TokenKind::CloseParen {
        args.push(parse_expr(parser, BindingPower::Default)?);

        if parser.current_token_kind() != TokenKind::CloseParen {
            parser.expect(TokenKind::Comma)?;
        }
    }

    parser.expect(TokenKind::CloseParen)?;

    let start = parser.ast[left].span.start.clone();
    Ok(parser.alloc(NodeKind::Call(Call { callee: left, args }), start))
}

pub fn parse_subscript_expr(parser: &mut Parser, left: NodeId, _bp: BindingPower) -> Result<NodeId, Error> {
    parser.advance();
    let index = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseBracket)?;

    let start = parser.ast[left].span.start.clone();
    Ok(parser.alloc(
        NodeKind::Binary(Binary {
            op: BinaryOp::Subscript,
            lhs: left,
            rhs: index,
        }),
        start,
    ))
}

pub fn parse_member_expr(parser: &mut Parser, left: NodeId, _bp: BindingPower) -> Result<NodeId, Error> {
    parser.advance();

    let error = parser.unexpected_detailed("expected member name after `.`");
    let member = parser.expect_error(TokenKind::Identifier, Some(error))?;
    let member = parser.ast.interner.intern(&member.value);

    let start = parser.ast[left].span.start.clone();
    Ok(parser.alloc(
        NodeKind::Access(Access {
            lhs: left,
            member,
            member_decl: None,
        }),
        start,
    ))
}

fn parse_params(parser: &mut Parser) -> Result<Vec<Param>, Error> {
    parser.expect(TokenKind::OpenParen)?;

    let mut params = vec![];

    while parser.current_token_kind() != TokenKind::CloseParen {
        let named = parser.current_token_kind() == TokenKind::Identifier
            && matches!(parser.peek_kind(), TokenKind::Colon | TokenKind::ColonEquals);

        let param = if named {
            let name_token = parser.advance().clone();
            let name = alloc_binding(parser, &name_token.value, name_token.span.start.clone());

            if parser.advance().kind == TokenKind::ColonEquals {
                Param {
                    name: Some(name),
                    ty: None,
                    default: Some(parse_expr(parser, BindingPower::Default)?),
                }
            } else {
                let ty = parse_type(parser, BindingPower::Default)?;
                let default = if parser.current_token_kind() == TokenKind::Assignment {
                    parser.advance();
                    Some(parse_expr(parser, BindingPower::Default)?)
                } else {
                    None
                };

                Param {
                    name: Some(name),
                    ty: Some(ty),
                    default,
                }
            }
        } else {
            Param {
                name: None,
                ty: Some(parse_type(parser, BindingPower::Default)?),
                default: None,
            }
        };

        params.push(param);

        if parser.current_token_kind() != TokenKind::CloseParen {
            parser.expect(TokenKind::Comma)?;
        }
    }

    parser.expect(TokenKind::CloseParen)?;

    Ok(params)
}

fn parse_returns(parser: &mut Parser) -> Result<Vec<NodeId>, Error> {
    if parser.current_token_kind() != TokenKind::Arrow {
        return Ok(vec![]);
    }

    parser.advance();

    if parser.current_token_kind() != TokenKind::OpenParen {
        return Ok(vec![parse_type(parser, BindingPower::Default)?]);
    }

    parser.advance();

    let mut returns = vec![];
    while parser.current_token_kind() != TokenKind::CloseParen {
        returns.push(parse_type(parser, BindingPower::Default)?);

        if parser.current_token_kind() != TokenKind::CloseParen {
            parser.expect(TokenKind::Comma)?;
        }
    }

    parser.expect(TokenKind::CloseParen)?;

    Ok(returns)
}

/// `fn (params) -> returns`, shared by expression and type positions.
pub fn parse_fn_prototype(parser: &mut Parser) -> Result<NodeId, Error> {
    let start = parser.expect(TokenKind::Fn)?.span.start;

    let params = parse_params(parser)?;
    let returns = parse_returns(parser)?;

    Ok(parser.alloc(NodeKind::FunctionType(FunctionType { params, returns }), start))
}

/// Rejects parameters a bodiless function type cannot have.
pub fn check_fn_type_params(parser: &Parser, prototype: NodeId) -> Result<(), Error> {
    let NodeKind::FunctionType(fn_type) = parser.ast.kind(prototype) else {
        return Ok(());
    };

    for param in &fn_type.params {
        let message = if param.ty.is_none() {
            "function type parameters need an explicit type"
        } else if param.default.is_some() {
            "function type parameters cannot have default values"
        } else {
            continue;
        };

        let position = match param.name {
            Some(name) => parser.ast[name].span.start.clone(),
            None => parser.ast[prototype].span.start.clone(),
        };

        return Err(Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: String::from("fn"),
                message: String::from(message),
            },
            position,
        ));
    }

    Ok(())
}

/// A function literal when a body follows, otherwise a function type.
pub fn parse_fn_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    let prototype = parse_fn_prototype(parser)?;

    if parser.current_token_kind() != TokenKind::OpenCurly {
        check_fn_type_params(parser, prototype)?;
        return Ok(prototype);
    }

    let body = parse_block_stmt(parser)?;
    let start = parser.ast[prototype].span.start.clone();

    Ok(parser.alloc(
        NodeKind::Function(Function {
            prototype,
            body,
            scope: None,
        }),
        start,
    ))
}

pub fn parse_struct_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    let start = parser.advance().span.start.clone();

    parser.expect(TokenKind::OpenCurly)?;

    let mut members = vec![];
    while parser.current_token_kind() != TokenKind::CloseCurly {
        members.push(parse_declaration(parser)?);

        match parser.current_token_kind() {
            TokenKind::Semicolon | TokenKind::Comma => {
                parser.advance();
            }
            TokenKind::CloseCurly => {}
            _ if parser.previous_token_kind() == Some(TokenKind::CloseCurly) => {}
            _ => return Err(parser.unexpected_detailed("expected `;` after struct member")),
        }
    }

    parser.expect(TokenKind::CloseCurly)?;

    Ok(parser.alloc(
        NodeKind::Struct(StructType {
            name: None,
            members,
            constants: None,
            fields: None,
        }),
        start,
    ))
}

pub fn parse_enum_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    let start = parser.advance().span.start.clone();

    parser.expect(TokenKind::OpenCurly)?;

    let mut values = vec![];
    while parser.current_token_kind() != TokenKind::CloseCurly {
        let error = parser.unexpected_detailed("expected enum value name");
        let name_token = parser.expect_error(TokenKind::Identifier, Some(error))?;
        let name = alloc_binding(parser, &name_token.value, name_token.span.start.clone());

        let value = if parser.current_token_kind() == TokenKind::Assignment {
            parser.advance();
            Some(parse_expr(parser, BindingPower::Default)?)
        } else {
            None
        };

        values.push(EnumValue { name, value });

        if matches!(parser.current_token_kind(), TokenKind::Comma | TokenKind::Semicolon) {
            parser.advance();
        }
    }

    parser.expect(TokenKind::CloseCurly)?;

    Ok(parser.alloc(
        NodeKind::Enum(EnumType {
            name: None,
            values,
            scope: None,
        }),
        start,
    ))
}
