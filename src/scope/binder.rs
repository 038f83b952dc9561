//! Scope construction.
//!
//! Walks the tree once, opening a scope for every block, function, loop,
//! struct and enum, declaring every binding identifier and recording on each
//! use-site identifier the scope and insertion index it was seen at. Lookup
//! itself is left to the type checker.

use log::debug;

use crate::{
    ast::{
        ast::{Ast, Flags, NodeId, NodeKind},
        expressions::Param,
    },
    errors::errors::{Error, ErrorImpl},
};

use super::scope::{Scope, ScopeId, Scopes};

struct Binder<'a> {
    ast: &'a mut Ast,
    scopes: Scopes,
    /// Enclosing function literals, innermost last.
    functions: Vec<NodeId>,
    errors: Vec<Error>,
}

impl<'a> Binder<'a> {
    fn declare(&mut self, scope: ScopeId, binding: NodeId) {
        let NodeKind::Identifier(ident) = self.ast.kind(binding) else {
            return;
        };

        let atom = ident.atom;
        let position = self.ast[binding].span.start.clone();
        let name = self.ast.name(atom).to_string();

        match self.scopes[scope].declare(atom, binding, &name, position) {
            Ok(index) => {
                if let NodeKind::Identifier(ident) = &mut self.ast[binding].kind {
                    ident.scope = Some(scope);
                    ident.index = index;
                }
            }
            Err(error) => self.errors.push(error),
        }
    }

    fn walk_all(&mut self, scope: ScopeId, nodes: &[NodeId]) {
        for &node in nodes {
            self.walk(scope, node);
        }
    }

    fn walk_params(&mut self, scope: ScopeId, params: &[Param], declare: bool) {
        for param in params {
            if let Some(ty) = param.ty {
                self.walk(scope, ty);
            }
            if let Some(default) = param.default {
                self.walk(scope, default);
            }
            if let (true, Some(name)) = (declare, param.name) {
                self.declare(scope, name);
            }
        }
    }

    fn walk(&mut self, scope: ScopeId, node: NodeId) {
        let kind = self.ast.kind(node).clone();

        match kind {
            NodeKind::Declaration(decl) => {
                if let Some(annotation) = decl.annotation {
                    self.walk(scope, annotation);
                }
                if let Some(initializer) = decl.initializer {
                    self.walk(scope, initializer);
                }
                // Unordered scopes declare all their members up front.
                if self.scopes[scope].ordered {
                    self.declare(scope, decl.name);
                }
            }
            NodeKind::Block(block) => {
                let inner = self.scopes.open(scope, true);
                if let NodeKind::Block(block) = &mut self.ast[node].kind {
                    block.scope = Some(inner);
                }
                self.walk_all(inner, &block.body);
            }
            NodeKind::While(stmt) => {
                self.walk(scope, stmt.guard);
                self.walk(scope, stmt.body);
            }
            NodeKind::If(stmt) => {
                self.walk(scope, stmt.guard);
                self.walk(scope, stmt.then);
                if let Some(otherwise) = stmt.otherwise {
                    self.walk(scope, otherwise);
                }
            }
            NodeKind::For(stmt) => {
                self.walk(scope, stmt.low);
                if let Some(high) = stmt.high {
                    self.walk(scope, high);
                }

                let inner = self.scopes.open(scope, true);
                if let NodeKind::For(stmt) = &mut self.ast[node].kind {
                    stmt.scope = Some(inner);
                }
                self.declare(inner, stmt.var);
                self.walk(inner, stmt.body);
            }
            NodeKind::Assignment(stmt) => {
                self.walk(scope, stmt.lhs);
                self.walk(scope, stmt.rhs);
            }
            NodeKind::Return(stmt) => {
                match self.functions.last().copied() {
                    Some(function) => {
                        if let NodeKind::Return(stmt) = &mut self.ast[node].kind {
                            stmt.function = Some(function);
                        }
                    }
                    None => self.errors.push(Error::new(
                        ErrorImpl::ReturnOutsideFunction,
                        self.ast[node].span.start.clone(),
                    )),
                }

                if let Some(value) = stmt.value {
                    self.walk(scope, value);
                }
            }
            NodeKind::Expression(stmt) => self.walk(scope, stmt.expression),
            NodeKind::Identifier(_) => {
                if self.ast[node].flags.contains(Flags::BINDING) {
                    return;
                }

                let index = self.scopes[scope].count();
                if let NodeKind::Identifier(ident) = &mut self.ast[node].kind {
                    ident.scope = Some(scope);
                    ident.index = index;
                }
            }
            NodeKind::FunctionType(prototype) => {
                self.walk_params(scope, &prototype.params, false);
                self.walk_all(scope, &prototype.returns);
            }
            NodeKind::Function(function) => {
                let params = self.scopes.open(scope, true);
                if let NodeKind::Function(function) = &mut self.ast[node].kind {
                    function.scope = Some(params);
                }

                if let NodeKind::FunctionType(prototype) = self.ast.kind(function.prototype).clone() {
                    self.walk_params(params, &prototype.params, true);
                    self.walk_all(params, &prototype.returns);
                }

                self.functions.push(node);
                self.walk(params, function.body);
                self.functions.pop();
            }
            NodeKind::Call(call) => {
                self.walk(scope, call.callee);
                self.walk_all(scope, &call.args);
            }
            NodeKind::Access(access) => self.walk(scope, access.lhs),
            NodeKind::Binary(binary) => {
                self.walk(scope, binary.lhs);
                self.walk(scope, binary.rhs);
            }
            NodeKind::Unary(unary) => self.walk(scope, unary.operand),
            NodeKind::Struct(structure) => {
                let constants = self.scopes.open(scope, false);
                let fields = self.scopes.open(constants, false);
                if let NodeKind::Struct(structure) = &mut self.ast[node].kind {
                    structure.constants = Some(constants);
                    structure.fields = Some(fields);
                }

                for &member in &structure.members {
                    let binding = match self.ast.kind(member) {
                        NodeKind::Declaration(decl) => Some((decl.constant, decl.name)),
                        _ => None,
                    };

                    if let Some((constant, name)) = binding {
                        self.declare(if constant { constants } else { fields }, name);
                    }
                }

                self.walk_all(fields, &structure.members);
            }
            NodeKind::Enum(enumeration) => {
                let values = self.scopes.open(scope, false);
                if let NodeKind::Enum(enumeration) = &mut self.ast[node].kind {
                    enumeration.scope = Some(values);
                }

                for value in &enumeration.values {
                    self.declare(values, value.name);
                }
                for value in &enumeration.values {
                    if let Some(expr) = value.value {
                        self.walk(values, expr);
                    }
                }
            }
            NodeKind::Number(_) | NodeKind::String(_) | NodeKind::Bool(_) | NodeKind::Primitive(_) => {}
        }
    }
}

/// Builds the scopes of `ast` and annotates its identifiers and returns.
///
/// Every redeclaration and every `return` outside a function is reported.
pub fn bind(ast: &mut Ast) -> Result<Scopes, Vec<Error>> {
    let mut scopes = Scopes::new();
    let global = scopes.alloc(Scope::new(None, false));
    scopes.set_global(global);

    let declarations = ast.declarations.clone();
    let mut binder = Binder {
        ast,
        scopes,
        functions: vec![],
        errors: vec![],
    };

    for &declaration in &declarations {
        let name = match binder.ast.kind(declaration) {
            NodeKind::Declaration(decl) => Some(decl.name),
            _ => None,
        };

        if let Some(name) = name {
            binder.declare(global, name);
        }
    }

    binder.walk_all(global, &declarations);

    debug!(
        "bound {} declarations in {} scopes, {} errors",
        declarations.len(),
        binder.scopes.len(),
        binder.errors.len()
    );

    if binder.errors.is_empty() {
        Ok(binder.scopes)
    } else {
        Err(binder.errors)
    }
}
