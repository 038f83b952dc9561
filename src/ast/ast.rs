use std::ops::{BitOr, Index, IndexMut};

use la_arena::{Arena, Idx};

use crate::Span;

use super::{
    expressions::{
        Access, Binary, Call, EnumType, Function, FunctionType, Identifier, NumberValue,
        StructType, Unary, UnaryOp,
    },
    interner::{Interner, Symbol},
    statements::{Assignment, Block, Declaration, ExpressionStmt, For, If, Return, While},
    types::TypeDescriptor,
};

pub type NodeId = Idx<Node>;

/// Per-node bit flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Flags(u16);

impl Flags {
    pub const NONE: Flags = Flags(0);
    pub const NOT_LVALUE: Flags = Flags(1 << 0);
    pub const LVALUE: Flags = Flags(1 << 1);
    pub const CONSTANT: Flags = Flags(1 << 2);
    pub const COMPILE_TIME_CONSTANT: Flags = Flags(1 << 3);
    /// Number literal written with a fractional part.
    pub const FLOATLIKE: Flags = Flags(1 << 4);
    /// Created by the checker, not written by the user.
    pub const SYNTHETIC: Flags = Flags(1 << 5);
    pub const CHECKED: Flags = Flags(1 << 6);
    pub const FAILED: Flags = Flags(1 << 7);
    /// Identifier that names a declaration, parameter, loop variable or enum value.
    pub const BINDING: Flags = Flags(1 << 8);

    pub fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn intersects(self, other: Flags) -> bool {
        self.0 & other.0 != 0
    }

    pub fn insert(&mut self, other: Flags) {
        self.0 |= other.0;
    }
}

impl BitOr for Flags {
    type Output = Flags;

    fn bitor(self, rhs: Flags) -> Flags {
        Flags(self.0 | rhs.0)
    }
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    // Statements
    Declaration(Declaration),
    Block(Block),
    While(While),
    For(For),
    If(If),
    Assignment(Assignment),
    Return(Return),
    Expression(ExpressionStmt),

    // Expressions
    Identifier(Identifier),
    FunctionType(FunctionType),
    Function(Function),
    Call(Call),
    Access(Access),
    Binary(Binary),
    Unary(Unary),
    Number(NumberValue),
    String(String),
    Bool(bool),
    Struct(StructType),
    Enum(EnumType),
    Primitive(TypeDescriptor),
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Declaration(_) => "declaration",
            NodeKind::Block(_) => "block",
            NodeKind::While(_) => "while",
            NodeKind::For(_) => "for",
            NodeKind::If(_) => "if",
            NodeKind::Assignment(_) => "assignment",
            NodeKind::Return(_) => "return",
            NodeKind::Expression(_) => "expression statement",
            NodeKind::Identifier(_) => "identifier",
            NodeKind::FunctionType(_) => "function type",
            NodeKind::Function(_) => "function",
            NodeKind::Call(_) => "call",
            NodeKind::Access(_) => "member access",
            NodeKind::Binary(_) => "binary operator",
            NodeKind::Unary(_) => "unary operator",
            NodeKind::Number(_) => "number literal",
            NodeKind::String(_) => "string literal",
            NodeKind::Bool(_) => "bool literal",
            NodeKind::Struct(_) => "struct",
            NodeKind::Enum(_) => "enum",
            NodeKind::Primitive(_) => "primitive type",
        }
    }

    pub fn is_expression(&self) -> bool {
        !matches!(
            self,
            NodeKind::Declaration(_)
                | NodeKind::Block(_)
                | NodeKind::While(_)
                | NodeKind::For(_)
                | NodeKind::If(_)
                | NodeKind::Assignment(_)
                | NodeKind::Return(_)
                | NodeKind::Expression(_)
        )
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub flags: Flags,
    pub span: Span,
    /// Creation order, unique within one `Ast`.
    pub serial: u32,
    resolved: Option<NodeId>,
}

impl Node {
    /// The type expression this node was resolved to, if any.
    pub fn resolved(&self) -> Option<NodeId> {
        self.resolved
    }

    /// Fills the resolution slot.
    ///
    /// # Panics
    /// Panics if the slot is already filled or the node is a statement.
    pub fn resolve(&mut self, ty: NodeId) {
        assert!(self.kind.is_expression(), "statement node #{} cannot be resolved", self.serial);
        assert!(self.resolved.is_none(), "node #{} resolved twice", self.serial);
        self.resolved = Some(ty);
    }

    pub fn is_lvalue(&self) -> bool {
        self.flags.contains(Flags::LVALUE)
    }
}

/// The syntax tree of one source file.
///
/// Owns every node, the interner for names in the file and the ordered list
/// of top-level declarations.
#[derive(Debug, Default)]
pub struct Ast {
    pub nodes: Arena<Node>,
    pub interner: Interner,
    pub declarations: Vec<NodeId>,
    next_serial: u32,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let serial = self.next_serial;
        self.next_serial += 1;

        self.nodes.alloc(Node {
            kind,
            flags: Flags::NONE,
            span,
            serial,
            resolved: None,
        })
    }

    /// Allocates a node that has no place in the source text.
    pub fn synthesize(&mut self, kind: NodeKind) -> NodeId {
        let id = self.alloc(kind, Span::null());
        self.nodes[id].flags.insert(Flags::SYNTHETIC);
        id
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id].kind
    }

    pub fn resolved(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].resolved
    }

    pub fn name(&self, sym: Symbol) -> &str {
        self.interner.resolve(sym)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Renders a type expression for diagnostics.
    pub fn describe(&self, id: NodeId) -> String {
        match self.kind(id) {
            NodeKind::Primitive(desc) => desc.name().to_string(),
            NodeKind::Identifier(ident) => self.name(ident.atom).to_string(),
            NodeKind::Unary(Unary { op: UnaryOp::Ref, operand }) => {
                format!("&{}", self.describe(*operand))
            }
            NodeKind::Access(access) => {
                format!("{}.{}", self.describe(access.lhs), self.name(access.member))
            }
            NodeKind::Struct(StructType { name: Some(name), .. }) => self.name(*name).to_string(),
            NodeKind::Enum(EnumType { name: Some(name), .. }) => self.name(*name).to_string(),
            NodeKind::FunctionType(prototype) => {
                let params = prototype
                    .params
                    .iter()
                    .map(|param| match param.ty {
                        Some(ty) => self.describe(ty),
                        None => String::from("_"),
                    })
                    .collect::<Vec<_>>()
                    .join(", ");

                let returns = prototype
                    .returns
                    .iter()
                    .map(|ret| self.describe(*ret))
                    .collect::<Vec<_>>();

                match returns.len() {
                    0 => format!("fn ({})", params),
                    1 => format!("fn ({}) -> {}", params, returns[0]),
                    _ => format!("fn ({}) -> ({})", params, returns.join(", ")),
                }
            }
            other => other.name().to_string(),
        }
    }
}

impl Index<NodeId> for Ast {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }
}

impl IndexMut<NodeId> for Ast {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id]
    }
}
