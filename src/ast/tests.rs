//! Unit tests for the AST module.

use crate::Span;

use super::{
    ast::{Ast, Flags, NodeKind},
    expressions::{Identifier, Unary, UnaryOp},
    interner::Interner,
    types::TypeDescriptor,
};

#[test]
fn test_descriptor_categories() {
    assert!(TypeDescriptor::U32.is_intlike());
    assert!(TypeDescriptor::U32.is_unsigned());
    assert!(!TypeDescriptor::U32.is_floatlike());
    assert_eq!(TypeDescriptor::U32.size(), 4);

    assert!(TypeDescriptor::F64.is_floatlike());
    assert!(!TypeDescriptor::F64.is_signed());
    assert!(TypeDescriptor::BOOL16.is_boollike());
    assert!(TypeDescriptor::VOID.is_void());
    assert!(TypeDescriptor::TYPE.is_type());
}

#[test]
fn test_abstract_descriptors() {
    for desc in [
        TypeDescriptor::INTLIKE,
        TypeDescriptor::FLOATLIKE,
        TypeDescriptor::NUMBERLIKE,
        TypeDescriptor::BOOLLIKE,
    ] {
        assert!(desc.is_abstract(), "{} should be abstract", desc);
        assert!(!desc.is_sized());
    }

    assert!(TypeDescriptor::NUMBERLIKE.is_intlike());
    assert!(TypeDescriptor::NUMBERLIKE.is_floatlike());
    assert!(!TypeDescriptor::S8.is_abstract());
    assert!(!TypeDescriptor::VOID.is_abstract());
}

#[test]
fn test_descriptor_construction() {
    assert_eq!(TypeDescriptor::INTLIKE.with_size(4).with_sign(true), TypeDescriptor::S32);
    assert_eq!(TypeDescriptor::INTLIKE.with_size(1).with_sign(false), TypeDescriptor::U8);
    assert_eq!(TypeDescriptor::S16.with_sign(false), TypeDescriptor::U16);
    assert_eq!(TypeDescriptor::FLOATLIKE.with_size(4), TypeDescriptor::F32);
    assert_eq!(TypeDescriptor::BOOLLIKE.with_size(8), TypeDescriptor::BOOL64);
    assert_eq!(TypeDescriptor::F32.with_sign(true), TypeDescriptor::F32);
}

#[test]
fn test_descriptor_names() {
    assert_eq!(TypeDescriptor::S64.to_string(), "s64");
    assert_eq!(TypeDescriptor::BOOL8.to_string(), "bool8");
    assert_eq!(TypeDescriptor::NUMBERLIKE.to_string(), "numberlike");
}

#[test]
fn test_interner_deduplicates() {
    let mut interner = Interner::new();
    let a = interner.intern("alpha");
    let b = interner.intern("beta");
    let again = interner.intern("alpha");

    assert_eq!(a, again);
    assert_ne!(a, b);
    assert_eq!(interner.resolve(b), "beta");
    assert_eq!(interner.len(), 2);
    assert_eq!(interner.get("gamma"), None);
}

#[test]
fn test_alloc_assigns_serials() {
    let mut ast = Ast::new();
    let first = ast.alloc(NodeKind::Bool(true), Span::null());
    let second = ast.alloc(NodeKind::Bool(false), Span::null());

    assert_eq!(ast[first].serial, 0);
    assert_eq!(ast[second].serial, 1);
    assert!(!ast[first].flags.contains(Flags::SYNTHETIC));
}

#[test]
fn test_synthesized_nodes_are_flagged() {
    let mut ast = Ast::new();
    let node = ast.synthesize(NodeKind::Primitive(TypeDescriptor::S32));

    assert!(ast[node].flags.contains(Flags::SYNTHETIC));
    assert_eq!(ast[node].span, Span::null());
}

#[test]
fn test_resolve_once() {
    let mut ast = Ast::new();
    let ty = ast.synthesize(NodeKind::Primitive(TypeDescriptor::BOOL8));
    let literal = ast.alloc(NodeKind::Bool(true), Span::null());

    assert_eq!(ast.resolved(literal), None);
    ast[literal].resolve(ty);
    assert_eq!(ast.resolved(literal), Some(ty));
}

#[test]
#[should_panic(expected = "resolved twice")]
fn test_resolve_twice_panics() {
    let mut ast = Ast::new();
    let ty = ast.synthesize(NodeKind::Primitive(TypeDescriptor::BOOL8));
    let literal = ast.alloc(NodeKind::Bool(true), Span::null());

    ast[literal].resolve(ty);
    ast[literal].resolve(ty);
}

#[test]
fn test_flags() {
    let mut flags = Flags::NONE;
    flags.insert(Flags::LVALUE | Flags::CONSTANT);

    assert!(flags.contains(Flags::LVALUE));
    assert!(flags.contains(Flags::LVALUE | Flags::CONSTANT));
    assert!(!flags.contains(Flags::LVALUE | Flags::FAILED));
    assert!(flags.intersects(Flags::FAILED | Flags::CONSTANT));

    flags.remove(Flags::CONSTANT);
    assert!(!flags.contains(Flags::CONSTANT));
}

#[test]
fn test_describe_pointer_type() {
    let mut ast = Ast::new();
    let atom = ast.interner.intern("Point");
    let ident = ast.alloc(NodeKind::Identifier(Identifier::new(atom)), Span::null());
    let pointer = ast.alloc(
        NodeKind::Unary(Unary { op: UnaryOp::Ref, operand: ident }),
        Span::null(),
    );

    assert_eq!(ast.describe(pointer), "&Point");
}
