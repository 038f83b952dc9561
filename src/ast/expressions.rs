//! Expression payloads stored in `NodeKind`.
//!
//! Types are ordinary expressions in this language: `s32`, `&T`, `fn (s32) -> s32`,
//! `struct { .. }` and `enum { .. }` are all parsed into the node kinds below and
//! checked the same way as any other expression.

use crate::scope::scope::ScopeId;

use super::{ast::NodeId, interner::Symbol};

/// An identifier, either a use site or the name of a binding.
///
/// Use sites carry the scope and insertion index recorded by the binder and,
/// once checked, the binding they refer to. Bindings carry the constant value
/// they were initialised with, if any.
#[derive(Debug, Clone)]
pub struct Identifier {
    pub atom: Symbol,
    pub scope: Option<ScopeId>,
    pub index: u32,
    pub declaration: Option<NodeId>,
    pub value: Option<NodeId>,
}

impl Identifier {
    pub fn new(atom: Symbol) -> Self {
        Identifier {
            atom,
            scope: None,
            index: 0,
            declaration: None,
            value: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: Option<NodeId>,
    pub ty: Option<NodeId>,
    pub default: Option<NodeId>,
}

/// `fn (params) -> returns` without a body.
#[derive(Debug, Clone)]
pub struct FunctionType {
    pub params: Vec<Param>,
    pub returns: Vec<NodeId>,
}

/// A function literal. `prototype` is a `FunctionType` node, `scope` holds the parameters.
#[derive(Debug, Clone)]
pub struct Function {
    pub prototype: NodeId,
    pub body: NodeId,
    pub scope: Option<ScopeId>,
}

#[derive(Debug, Clone)]
pub struct Call {
    pub callee: NodeId,
    pub args: Vec<NodeId>,
}

/// `lhs.member`. `member_decl` is the binding found by the checker.
#[derive(Debug, Clone)]
pub struct Access {
    pub lhs: NodeId,
    pub member: Symbol,
    pub member_decl: Option<NodeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Equals,
    NotEquals,
    Less,
    LessEquals,
    Greater,
    GreaterEquals,
    And,
    Or,
    Subscript,
}

impl BinaryOp {
    pub fn is_arithmetic(self) -> bool {
        matches!(self, BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div)
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Equals
                | BinaryOp::NotEquals
                | BinaryOp::Less
                | BinaryOp::LessEquals
                | BinaryOp::Greater
                | BinaryOp::GreaterEquals
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }
}

#[derive(Debug, Clone)]
pub struct Binary {
    pub op: BinaryOp,
    pub lhs: NodeId,
    pub rhs: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
    Deref,
    Ref,
}

#[derive(Debug, Clone)]
pub struct Unary {
    pub op: UnaryOp,
    pub operand: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberValue {
    Int(u64),
    Float(f64),
}

/// `struct { members }`. Constant members live in `constants`, the rest in `fields`.
#[derive(Debug, Clone)]
pub struct StructType {
    pub name: Option<Symbol>,
    pub members: Vec<NodeId>,
    pub constants: Option<ScopeId>,
    pub fields: Option<ScopeId>,
}

#[derive(Debug, Clone)]
pub struct EnumValue {
    pub name: NodeId,
    pub value: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct EnumType {
    pub name: Option<Symbol>,
    pub values: Vec<EnumValue>,
    pub scope: Option<ScopeId>,
}
