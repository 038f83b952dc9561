//! Unit tests for scope construction and lookup.

use std::rc::Rc;

use crate::{
    ast::{
        ast::{Ast, Flags, NodeId, NodeKind},
        expressions::Identifier,
        statements::{Block, Declaration, Return},
    },
    lexer::lexer::tokenize,
    parser::parser::parse,
    Span,
};

use super::{
    binder::bind,
    scope::{Lookup, Scope, Scopes},
};

fn parse_source(source: &str) -> Ast {
    let tokens = tokenize(source.to_string(), Some("test.lang".to_string())).unwrap();
    parse(tokens, Rc::new("test.lang".to_string())).unwrap()
}

/// Use sites of `name`, in source order.
fn uses(ast: &Ast, name: &str) -> Vec<NodeId> {
    let mut found: Vec<NodeId> = ast
        .nodes
        .iter()
        .filter(|(_, node)| !node.flags.contains(Flags::BINDING))
        .filter(|(_, node)| matches!(&node.kind, NodeKind::Identifier(ident) if ast.name(ident.atom) == name))
        .map(|(id, _)| id)
        .collect();

    found.sort_by_key(|id| ast[*id].span.start.0);
    found
}

/// Binding identifiers named `name`, in source order.
fn bindings(ast: &Ast, name: &str) -> Vec<NodeId> {
    let mut found: Vec<NodeId> = ast
        .nodes
        .iter()
        .filter(|(_, node)| node.flags.contains(Flags::BINDING))
        .filter(|(_, node)| matches!(&node.kind, NodeKind::Identifier(ident) if ast.name(ident.atom) == name))
        .map(|(id, _)| id)
        .collect();

    found.sort_by_key(|id| ast[*id].span.start.0);
    found
}

fn resolve_use(ast: &Ast, scopes: &Scopes, node: NodeId) -> Option<NodeId> {
    let NodeKind::Identifier(ident) = ast.kind(node) else {
        panic!("expected an identifier");
    };
    scopes.lookup(ident.scope?, ident.atom, ident.index)
}

#[test]
fn test_globals_are_unordered() {
    let mut ast = parse_source("a := b; b := 1;");
    let scopes = bind(&mut ast).unwrap();

    let b_use = uses(&ast, "b")[0];
    assert_eq!(resolve_use(&ast, &scopes, b_use), Some(bindings(&ast, "b")[0]));
}

#[test]
fn test_blocks_are_ordered() {
    let mut ast = parse_source("f :: fn () { y := x; x := 1; z := x; }");
    let scopes = bind(&mut ast).unwrap();

    let x_uses = uses(&ast, "x");
    assert_eq!(resolve_use(&ast, &scopes, x_uses[0]), None);
    assert_eq!(resolve_use(&ast, &scopes, x_uses[1]), Some(bindings(&ast, "x")[0]));
}

#[test]
fn test_shadowing_prefers_inner_scope() {
    let mut ast = parse_source("x := 1; f :: fn () { x := 2; y := x; }");
    let scopes = bind(&mut ast).unwrap();

    let x_bindings = bindings(&ast, "x");
    let x_use = uses(&ast, "x")[0];
    assert_eq!(resolve_use(&ast, &scopes, x_use), Some(x_bindings[1]));
}

#[test]
fn test_initializer_sees_outer_binding() {
    let mut ast = parse_source("x := 1; f :: fn () { x := x; }");
    let scopes = bind(&mut ast).unwrap();

    let x_bindings = bindings(&ast, "x");
    let x_use = uses(&ast, "x")[0];
    assert_eq!(resolve_use(&ast, &scopes, x_use), Some(x_bindings[0]));
}

#[test]
fn test_parameters_are_visible_in_body_and_later_defaults() {
    let mut ast = parse_source("f :: fn (a: s32, b := a) -> s32 { return a + b; }");
    let scopes = bind(&mut ast).unwrap();

    let a_binding = bindings(&ast, "a")[0];
    for a_use in uses(&ast, "a") {
        assert_eq!(resolve_use(&ast, &scopes, a_use), Some(a_binding));
    }
    assert_eq!(resolve_use(&ast, &scopes, uses(&ast, "b")[0]), Some(bindings(&ast, "b")[0]));
}

#[test]
fn test_loop_variable_scope() {
    let mut ast = parse_source("f :: fn () { for i in i..10 { x := i; } }");
    let scopes = bind(&mut ast).unwrap();

    let i_uses = uses(&ast, "i");
    assert_eq!(resolve_use(&ast, &scopes, i_uses[0]), None);
    assert_eq!(resolve_use(&ast, &scopes, i_uses[1]), Some(bindings(&ast, "i")[0]));
}

#[test]
fn test_struct_members_split_into_constants_and_fields() {
    let mut ast = parse_source("S :: struct { x: s32; LIMIT :: 10; y := LIMIT; }");
    let scopes = bind(&mut ast).unwrap();

    let NodeKind::Declaration(decl) = ast.kind(ast.declarations[0]) else {
        panic!("expected a declaration");
    };
    let NodeKind::Struct(structure) = ast.kind(decl.initializer.unwrap()) else {
        panic!("expected a struct");
    };

    let constants = structure.constants.unwrap();
    let fields = structure.fields.unwrap();
    let x = ast.interner.get("x").unwrap();
    let limit = ast.interner.get("LIMIT").unwrap();

    assert_eq!(scopes.lookup_member(fields, x), Some(bindings(&ast, "x")[0]));
    assert_eq!(scopes.lookup_member(fields, limit), None);
    assert_eq!(scopes.lookup_member(constants, limit), Some(bindings(&ast, "LIMIT")[0]));
    assert_eq!(resolve_use(&ast, &scopes, uses(&ast, "LIMIT")[0]), Some(bindings(&ast, "LIMIT")[0]));
}

#[test]
fn test_enum_values_scope() {
    let mut ast = parse_source("E :: enum { A, B = 2 }");
    let scopes = bind(&mut ast).unwrap();

    let NodeKind::Declaration(decl) = ast.kind(ast.declarations[0]) else {
        panic!("expected a declaration");
    };
    let NodeKind::Enum(enumeration) = ast.kind(decl.initializer.unwrap()) else {
        panic!("expected an enum");
    };

    let b = ast.interner.get("B").unwrap();
    assert_eq!(scopes.lookup_member(enumeration.scope.unwrap(), b), Some(bindings(&ast, "B")[0]));
}

#[test]
fn test_returns_point_at_innermost_function() {
    let mut ast = parse_source("f :: fn () -> s32 { g :: fn () { return; } return 1; }");
    bind(&mut ast).unwrap();

    let mut returns: Vec<(u32, Option<NodeId>)> = ast
        .nodes
        .iter()
        .filter_map(|(_, node)| match &node.kind {
            NodeKind::Return(ret) => Some((node.span.start.0, ret.function)),
            _ => None,
        })
        .collect();
    returns.sort_by_key(|(offset, _)| *offset);

    let functions: Vec<NodeId> = ast
        .nodes
        .iter()
        .filter(|(_, node)| matches!(node.kind, NodeKind::Function(_)))
        .map(|(id, _)| id)
        .collect();

    assert_eq!(returns.len(), 2);
    // The inner function is allocated first, it closes first.
    assert_eq!(returns[0].1, Some(functions[0]));
    assert_eq!(returns[1].1, Some(functions[1]));
}

#[test]
fn test_redeclaration_is_reported() {
    let mut ast = parse_source("a := 1; a := 2; f :: fn () { b := 1; b := 2; }");
    let errors = bind(&mut ast).unwrap_err();

    assert_eq!(errors.len(), 2);
    assert!(errors.iter().all(|error| error.get_error_name() == "VariableAlreadyDeclared"));
}

#[test]
fn test_return_outside_function() {
    let mut ast = Ast::new();
    let ret = ast.alloc(
        NodeKind::Return(Return {
            value: None,
            function: None,
        }),
        Span::null(),
    );
    let block = ast.alloc(
        NodeKind::Block(Block {
            body: vec![ret],
            scope: None,
        }),
        Span::null(),
    );
    let atom = ast.interner.intern("x");
    let name = ast.alloc(NodeKind::Identifier(Identifier::new(atom)), Span::null());
    ast[name].flags.insert(Flags::BINDING);
    let decl = ast.alloc(
        NodeKind::Declaration(Declaration {
            name,
            annotation: None,
            initializer: Some(block),
            constant: false,
        }),
        Span::null(),
    );
    ast.declarations.push(decl);

    let errors = bind(&mut ast).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].get_error_name(), "ReturnOutsideFunction");
}

#[test]
fn test_ordered_scope_visibility() {
    let mut scopes = Scopes::new();
    let global = scopes.alloc(Scope::new(None, false));
    let block = scopes.open(global, true);

    let mut ast = Ast::new();
    let atom = ast.interner.intern("v");
    let binding = ast.alloc(NodeKind::Identifier(Identifier::new(atom)), Span::null());
    let index = scopes[block]
        .declare(atom, binding, "v", crate::Position::null())
        .unwrap();

    assert_eq!(index, 0);
    assert_eq!(scopes.lookup(block, atom, 0), None);
    assert_eq!(scopes.lookup(block, atom, 1), Some(binding));
    assert!(scopes[block].declare(atom, binding, "v", crate::Position::null()).is_err());
}
