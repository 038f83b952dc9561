use crate::{
    ast::{
        ast::{Flags, NodeId, NodeKind},
        expressions::Identifier,
        statements::{AssignOp, Assignment, Block, Declaration, ExpressionStmt, For, If, Return, While},
        types::TypeDescriptor,
    },
    errors::errors::ErrorImpl,
};

use super::type_checker::{Job, Step, TypeChecker};

impl<'a> TypeChecker<'a> {
    /// Annotation first, then the initializer against the annotation, then the
    /// binding identifier takes whichever type is known.
    pub(super) fn check_declaration(&mut self, job: &mut Job, decl: &Declaration) -> Step {
        loop {
            match job.stage {
                0 => {
                    if let Some(annotation) = decl.annotation {
                        let ty = self.type_type();
                        self.typecheck(Some(ty), annotation);
                    }
                    job.stage = 1;
                }
                1 => {
                    if let Some(annotation) = decl.annotation {
                        self.resolved(annotation)?;
                    }
                    if let Some(initializer) = decl.initializer {
                        self.typecheck(decl.annotation, initializer);
                    }
                    job.stage = 2;
                }
                _ => {
                    let initialized = match decl.initializer {
                        Some(initializer) => Some(self.resolved(initializer)?),
                        None => None,
                    };
                    let ty = match decl.annotation.or(initialized) {
                        Some(ty) => ty,
                        None => self.primitive(TypeDescriptor::VOID),
                    };

                    self.bind(decl.name, ty, decl.constant, decl.initializer);
                    return Ok(());
                }
            }
        }
    }

    /// Resolves a binding identifier.
    pub(super) fn bind(&mut self, name: NodeId, ty: NodeId, constant: bool, value: Option<NodeId>) {
        if let NodeKind::Identifier(Identifier { value: slot, .. }) = &mut self.ast[name].kind {
            *slot = value;
        }

        let node = &mut self.ast[name];
        node.flags.insert(Flags::CHECKED);
        if constant {
            node.flags.insert(Flags::CONSTANT);
        }
        self.finish(name, ty, !constant);
    }

    pub(super) fn check_block(&mut self, block: &Block) -> Step {
        for &statement in &block.body {
            self.typecheck(None, statement);
        }
        Ok(())
    }

    pub(super) fn check_expression_stmt(&mut self, stmt: &ExpressionStmt) -> Step {
        self.typecheck(None, stmt.expression);
        Ok(())
    }

    pub(super) fn check_while(&mut self, stmt: &While) -> Step {
        let guard = self.primitive(TypeDescriptor::BOOLLIKE);
        self.typecheck(Some(guard), stmt.guard);
        self.typecheck(None, stmt.body);
        Ok(())
    }

    pub(super) fn check_if(&mut self, stmt: &If) -> Step {
        let guard = self.primitive(TypeDescriptor::BOOLLIKE);
        self.typecheck(Some(guard), stmt.guard);
        self.typecheck(None, stmt.then);
        if let Some(otherwise) = stmt.otherwise {
            self.typecheck(None, otherwise);
        }
        Ok(())
    }

    /// Range loops only. The loop variable is an `s64`.
    pub(super) fn check_for(&mut self, job: &mut Job, stmt: &For) -> Step {
        let Some(high) = stmt.high else {
            return Err(self.error_at(
                job.node,
                ErrorImpl::NotImplementedError {
                    feature: String::from("Iteration over arrays"),
                },
            ));
        };

        let s64 = self.primitive(TypeDescriptor::S64);
        self.bind(stmt.var, s64, false, None);

        let int = self.primitive(TypeDescriptor::INTLIKE);
        self.typecheck(Some(int), stmt.low);
        self.typecheck(Some(int), high);
        self.typecheck(None, stmt.body);
        Ok(())
    }

    pub(super) fn check_assignment(&mut self, job: &mut Job, stmt: &Assignment) -> Step {
        loop {
            match job.stage {
                0 => {
                    if stmt.op != AssignOp::Assign {
                        return Err(self.error_at(
                            job.node,
                            ErrorImpl::NotImplementedError {
                                feature: String::from("Compound assignment"),
                            },
                        ));
                    }

                    self.typecheck(None, stmt.lhs);
                    job.stage = 1;
                }
                _ => {
                    let ty = self.resolved(stmt.lhs)?;
                    let flags = self.ast[stmt.lhs].flags;

                    if !flags.contains(Flags::LVALUE) {
                        return Err(self.error_at(stmt.lhs, ErrorImpl::LvalueRequired));
                    }
                    if flags.contains(Flags::CONSTANT) {
                        return Err(self.error_at(stmt.lhs, ErrorImpl::AssignToConstant));
                    }

                    self.typecheck(Some(ty), stmt.rhs);
                    return Ok(());
                }
            }
        }
    }

    pub(super) fn check_return(&mut self, job: &mut Job, stmt: &Return) -> Step {
        let Some(function) = stmt.function else {
            return Err(self.error_at(job.node, ErrorImpl::ReturnOutsideFunction));
        };

        let returns = match self.ast.kind(function) {
            NodeKind::Function(function) => match self.ast.kind(function.prototype) {
                NodeKind::FunctionType(prototype) => prototype.returns.clone(),
                _ => vec![],
            },
            _ => vec![],
        };

        match (stmt.value, returns.as_slice()) {
            (None, []) => Ok(()),
            (None, _) => Err(self.error_at(job.node, ErrorImpl::MissingReturnValue)),
            (Some(value), [ty]) => {
                self.resolved(*ty)?;
                self.typecheck(Some(*ty), value);
                Ok(())
            }
            (Some(_), _) => Err(self.error_at(
                job.node,
                ErrorImpl::ExpectedOneReturnType {
                    found: returns.len(),
                },
            )),
        }
    }
}
