//! Statement payloads stored in `NodeKind`.

use crate::scope::scope::ScopeId;

use super::ast::NodeId;

/// `name : annotation = initializer`, `name := initializer`,
/// `name :: initializer` or `name : annotation : initializer`.
///
/// `name` is the binding identifier, the node every use site resolves to.
#[derive(Debug, Clone)]
pub struct Declaration {
    pub name: NodeId,
    pub annotation: Option<NodeId>,
    pub initializer: Option<NodeId>,
    pub constant: bool,
}

#[derive(Debug, Clone)]
pub struct Block {
    pub body: Vec<NodeId>,
    pub scope: Option<ScopeId>,
}

#[derive(Debug, Clone)]
pub struct While {
    pub guard: NodeId,
    pub body: NodeId,
}

#[derive(Debug, Clone)]
pub struct If {
    pub guard: NodeId,
    pub then: NodeId,
    pub otherwise: Option<NodeId>,
}

/// `for var in low..high body`. Without `high` the loop iterates over an array.
#[derive(Debug, Clone)]
pub struct For {
    pub var: NodeId,
    pub low: NodeId,
    pub high: Option<NodeId>,
    pub body: NodeId,
    pub scope: Option<ScopeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
}

impl AssignOp {
    pub fn symbol(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Assignment {
    pub op: AssignOp,
    pub lhs: NodeId,
    pub rhs: NodeId,
}

/// `function` is the innermost enclosing function literal, filled in by the binder.
#[derive(Debug, Clone)]
pub struct Return {
    pub value: Option<NodeId>,
    pub function: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct ExpressionStmt {
    pub expression: NodeId,
}
