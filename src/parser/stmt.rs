use crate::{
    ast::{
        ast::{NodeId, NodeKind},
        statements::{AssignOp, Assignment, Block, Declaration, ExpressionStmt, For, If, Return, While},
    },
    errors::errors::Error,
    lexer::tokens::TokenKind,
    parser::{expr::parse_expr, lookups::BindingPower},
};

use super::{expr::alloc_binding, parser::Parser, types::parse_type};

/// `name :` / `name ::` / `name :=` starts a declaration.
fn at_declaration(parser: &Parser) -> bool {
    parser.current_token_kind() == TokenKind::Identifier
        && matches!(
            parser.peek_kind(),
            TokenKind::Colon | TokenKind::ColonColon | TokenKind::ColonEquals
        )
}

pub fn parse_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    if at_declaration(parser) {
        return parse_decl_stmt(parser);
    }

    if let Some(handler) = parser.get_stmt_lookup().get(&parser.current_token_kind()).copied() {
        return handler(parser);
    }

    parse_expression_stmt(parser)
}

pub fn parse_top_level_decl(parser: &mut Parser) -> Result<NodeId, Error> {
    if !at_declaration(parser) {
        return Err(parser.unexpected_detailed("expected a declaration at the top level"));
    }

    parse_decl_stmt(parser)
}

/// Parses a declaration without its terminating `;`.
pub fn parse_declaration(parser: &mut Parser) -> Result<NodeId, Error> {
    let error = parser.unexpected_detailed("expected identifier during declaration");
    let name_token = parser.expect_error(TokenKind::Identifier, Some(error))?;
    let start = name_token.span.start.clone();
    let name = alloc_binding(parser, &name_token.value, start.clone());

    let (annotation, initializer, constant) = match parser.current_token_kind() {
        TokenKind::ColonColon => {
            parser.advance();
            (None, Some(parse_expr(parser, BindingPower::Default)?), true)
        }
        TokenKind::ColonEquals => {
            parser.advance();
            (None, Some(parse_expr(parser, BindingPower::Default)?), false)
        }
        TokenKind::Colon => {
            parser.advance();
            let annotation = parse_type(parser, BindingPower::Default)?;

            match parser.current_token_kind() {
                TokenKind::Assignment => {
                    parser.advance();
                    (Some(annotation), Some(parse_expr(parser, BindingPower::Default)?), false)
                }
                TokenKind::Colon => {
                    parser.advance();
                    (Some(annotation), Some(parse_expr(parser, BindingPower::Default)?), true)
                }
                _ => (Some(annotation), None, false),
            }
        }
        _ => return Err(parser.unexpected_detailed("expected `:`, `::` or `:=` after declaration name")),
    };

    if constant {
        if let Some(initializer) = initializer {
            name_type(parser, initializer, name_token.value.as_str());
        }
    }

    Ok(parser.alloc(
        NodeKind::Declaration(Declaration {
            name,
            annotation,
            initializer,
            constant,
        }),
        start,
    ))
}

/// `Name :: struct { .. }` names the struct, which only matters for diagnostics.
fn name_type(parser: &mut Parser, initializer: NodeId, name: &str) {
    let atom = parser.ast.interner.intern(name);

    match &mut parser.ast[initializer].kind {
        NodeKind::Struct(structure) if structure.name.is_none() => structure.name = Some(atom),
        NodeKind::Enum(enumeration) if enumeration.name.is_none() => enumeration.name = Some(atom),
        _ => {}
    }
}

/// `;` may be left out when the previous token closed a block.
fn end_declaration(parser: &mut Parser) -> Result<(), Error> {
    if parser.current_token_kind() == TokenKind::Semicolon {
        parser.advance();
        return Ok(());
    }

    if parser.previous_token_kind() == Some(TokenKind::CloseCurly) {
        return Ok(());
    }

    Err(parser.unexpected_detailed("expected `;` after declaration"))
}

pub fn parse_decl_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    let declaration = parse_declaration(parser)?;
    end_declaration(parser)?;

    Ok(declaration)
}

pub fn parse_expression_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    let start = parser.get_position();
    let expr = parse_expr(parser, BindingPower::Default)?;

    let op = match parser.current_token_kind() {
        TokenKind::Assignment => Some(AssignOp::Assign),
        TokenKind::PlusEquals => Some(AssignOp::Add),
        TokenKind::MinusEquals => Some(AssignOp::Sub),
        TokenKind::StarEquals => Some(AssignOp::Mul),
        TokenKind::SlashEquals => Some(AssignOp::Div),
        _ => None,
    };

    let kind = match op {
        Some(op) => {
            parser.advance();
            let rhs = parse_expr(parser, BindingPower::Default)?;
            NodeKind::Assignment(Assignment { op, lhs: expr, rhs })
        }
        None => NodeKind::Expression(ExpressionStmt { expression: expr }),
    };

    parser.expect(TokenKind::Semicolon)?;

    Ok(parser.alloc(kind, start))
}

pub fn parse_block_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    let start = parser.expect(TokenKind::OpenCurly)?.span.start;

    let mut statements = Vec::new();
    while parser.current_token_kind() != TokenKind::CloseCurly {
        if !parser.has_tokens() {
            return Err(parser.unexpected_detailed("expected `}` to close block"));
        }
        statements.push(parse_stmt(parser)?);
    }

    parser.expect(TokenKind::CloseCurly)?;

    Ok(parser.alloc(
        NodeKind::Block(Block {
            body: statements,
            scope: None,
        }),
        start,
    ))
}

pub fn parse_if_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    let start = parser.advance().span.start.clone();

    let guard = parse_expr(parser, BindingPower::Default)?;
    let then = parse_block_stmt(parser)?;

    let otherwise = if parser.current_token_kind() == TokenKind::Else {
        parser.advance();
        if parser.current_token_kind() == TokenKind::If {
            Some(parse_if_stmt(parser)?)
        } else {
            Some(parse_block_stmt(parser)?)
        }
    } else {
        None
    };

    Ok(parser.alloc(NodeKind::If(If { guard, then, otherwise }), start))
}

pub fn parse_while_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    let start = parser.advance().span.start.clone();

    let guard = parse_expr(parser, BindingPower::Default)?;
    let body = parse_block_stmt(parser)?;

    Ok(parser.alloc(NodeKind::While(While { guard, body }), start))
}

pub fn parse_for_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    let start = parser.advance().span.start.clone();

    let error = parser.unexpected_detailed("expected loop variable after `for`");
    let var_token = parser.expect_error(TokenKind::Identifier, Some(error))?;
    let var = alloc_binding(parser, &var_token.value, var_token.span.start.clone());

    parser.expect(TokenKind::In)?;

    let low = parse_expr(parser, BindingPower::Default)?;
    let high = if parser.current_token_kind() == TokenKind::DotDot {
        parser.advance();
        Some(parse_expr(parser, BindingPower::Default)?)
    } else {
        None
    };

    let body = parse_block_stmt(parser)?;

    Ok(parser.alloc(
        NodeKind::For(For {
            var,
            low,
            high,
            body,
            scope: None,
        }),
        start,
    ))
}

pub fn parse_return_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    let start = parser.advance().span.start.clone();

    let value = if parser.current_token_kind() != TokenKind::Semicolon {
        Some(parse_expr(parser, BindingPower::Default)?)
    } else {
        None
    };

    parser.expect(TokenKind::Semicolon)?;

    Ok(parser.alloc(NodeKind::Return(Return { value, function: None }), start))
}
