//! The worklist driver.
//!
//! Each node kind is checked by a small state machine (see `statements.rs`
//! and `expressions.rs`). A `Job` records how far a node's machine has got.
//! When a machine needs the type of a node that is not resolved yet it
//! returns `Halt::Yield` and the job is parked in the pending list with its
//! stage intact, so no stage ever runs its side effects twice.
//!
//! The driver seeds one job per top-level declaration and then sweeps the
//! pending list until it is empty. A sweep in which no job advanced means
//! the remaining jobs wait on each other; this is reported as an error
//! together with every job that was still pending.

use std::collections::HashMap;

use log::{debug, error, trace};

use crate::{
    ast::{
        ast::{Ast, Flags, NodeId, NodeKind},
        types::TypeDescriptor,
    },
    errors::errors::{Error, ErrorImpl},
    scope::scope::{Lookup, Scopes},
    Position,
};

/// Deferred work on one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Job {
    pub expected: Option<NodeId>,
    pub node: NodeId,
    /// Next stage to run.
    pub stage: u32,
}

/// Why a checker stopped before finishing.
#[derive(Debug)]
pub enum Halt {
    /// A dependency is not resolved yet, retry later.
    Yield,
    /// Hard error, reported and the node marked failed.
    Fail(Error),
    /// A dependency failed; the node fails without a diagnostic of its own.
    Poisoned,
}

impl From<Error> for Halt {
    fn from(error: Error) -> Self {
        Halt::Fail(error)
    }
}

pub type Step<T = ()> = Result<T, Halt>;

pub struct TypeChecker<'a> {
    pub(super) ast: &'a mut Ast,
    pub(super) lookup: &'a dyn Lookup,
    errors: Vec<Error>,
    success: bool,
    pending: Vec<Job>,
    /// One synthesized node per primitive descriptor.
    pub(super) primitives: HashMap<TypeDescriptor, NodeId>,
    /// One synthesized pointer node per canonical pointee.
    pub(super) pointers: HashMap<NodeId, NodeId>,
}

impl<'a> TypeChecker<'a> {
    pub fn new(ast: &'a mut Ast, lookup: &'a dyn Lookup) -> Self {
        TypeChecker {
            ast,
            lookup,
            errors: vec![],
            success: true,
            pending: vec![],
            primitives: HashMap::new(),
            pointers: HashMap::new(),
        }
    }

    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<Error> {
        self.errors
    }

    /// Checks `declarations` to a fixpoint.
    ///
    /// Returns false if any error was reported. On success every reachable
    /// expression node has its resolution slot and lvalue flags filled in.
    pub fn run(&mut self, declarations: &[NodeId]) -> bool {
        debug!("type checking {} declarations", declarations.len());

        for &declaration in declarations {
            self.typecheck(None, declaration);
        }

        let mut pass = 0;
        while !self.pending.is_empty() {
            pass += 1;
            let current = std::mem::take(&mut self.pending);
            debug!("pass {}: {} pending jobs", pass, current.len());

            let mut progressed = false;
            for job in current {
                progressed |= self.execute(job);
            }

            if !progressed {
                self.report_stuck();
                break;
            }
        }

        debug!(
            "type checking finished after {} passes with {} errors",
            pass,
            self.errors.len()
        );

        self.success
    }

    /// Starts checking `node`. Runs as far as it can right away; anything
    /// left over is picked up by a later pass.
    pub(super) fn typecheck(&mut self, expected: Option<NodeId>, node: NodeId) {
        self.execute(Job {
            expected,
            node,
            stage: 0,
        });
    }

    /// Runs one job. Returns whether it finished or advanced a stage.
    fn execute(&mut self, mut job: Job) -> bool {
        if self.ast[job.node].flags.intersects(Flags::CHECKED | Flags::FAILED) {
            return true;
        }

        let stage = job.stage;

        match self.dispatch(&mut job) {
            Ok(()) => {
                trace!("{} #{} checked", self.ast.kind(job.node).name(), self.ast[job.node].serial);
                self.ast[job.node].flags.insert(Flags::CHECKED);
                true
            }
            Err(Halt::Yield) => {
                trace!(
                    "{} #{} yields at stage {}",
                    self.ast.kind(job.node).name(),
                    self.ast[job.node].serial,
                    job.stage
                );
                self.pending.push(job);
                job.stage != stage
            }
            Err(Halt::Fail(error)) => {
                self.fail(job.node, Some(error));
                true
            }
            Err(Halt::Poisoned) => {
                self.fail(job.node, None);
                true
            }
        }
    }

    fn dispatch(&mut self, job: &mut Job) -> Step {
        match self.ast.kind(job.node).clone() {
            NodeKind::Declaration(decl) => self.check_declaration(job, &decl),
            NodeKind::Block(block) => self.check_block(&block),
            NodeKind::While(stmt) => self.check_while(&stmt),
            NodeKind::For(stmt) => self.check_for(job, &stmt),
            NodeKind::If(stmt) => self.check_if(&stmt),
            NodeKind::Assignment(stmt) => self.check_assignment(job, &stmt),
            NodeKind::Return(stmt) => self.check_return(job, &stmt),
            NodeKind::Expression(stmt) => self.check_expression_stmt(&stmt),
            NodeKind::Identifier(ident) => self.check_identifier(job, &ident),
            NodeKind::FunctionType(prototype) => self.check_function_type(job, &prototype),
            NodeKind::Function(function) => self.check_function(job, &function),
            NodeKind::Call(call) => self.check_call(job, &call),
            NodeKind::Access(access) => self.check_access(job, &access),
            NodeKind::Binary(binary) => self.check_binary(job, &binary),
            NodeKind::Unary(unary) => self.check_unary(job, &unary),
            NodeKind::Number(_) => self.check_number(job),
            NodeKind::String(_) => Err(self.error_at(
                job.node,
                ErrorImpl::NotImplementedError {
                    feature: String::from("String types"),
                },
            )),
            NodeKind::Bool(_) => self.check_bool(job),
            NodeKind::Struct(structure) => self.check_struct(job, &structure),
            NodeKind::Enum(enumeration) => self.check_enum(job, &enumeration),
            NodeKind::Primitive(_) => self.check_primitive(job),
        }
    }

    /// The resolved type of `node`, `Yield` while it has none.
    pub(super) fn resolved(&self, node: NodeId) -> Step<NodeId> {
        let node = &self.ast[node];

        if node.flags.contains(Flags::FAILED) {
            return Err(Halt::Poisoned);
        }

        node.resolved().ok_or(Halt::Yield)
    }

    /// Fills the resolution slot and the lvalue flag of `node`.
    pub(super) fn finish(&mut self, node: NodeId, ty: NodeId, lvalue: bool) {
        let node = &mut self.ast[node];

        if !node.flags.intersects(Flags::LVALUE | Flags::NOT_LVALUE) {
            node.flags.insert(if lvalue { Flags::LVALUE } else { Flags::NOT_LVALUE });
        }
        node.resolve(ty);
    }

    pub(super) fn position(&self, node: NodeId) -> Position {
        self.ast[node].span.start.clone()
    }

    pub(super) fn error_at(&self, node: NodeId, error: ErrorImpl) -> Halt {
        Halt::Fail(Error::new(error, self.position(node)))
    }

    fn fail(&mut self, node: NodeId, error: Option<Error>) {
        self.ast[node].flags.insert(Flags::FAILED);

        if let Some(error) = error {
            debug!("{} #{} failed: {}", self.ast.kind(node).name(), self.ast[node].serial, error);
            self.errors.push(error);
            self.success = false;
        }

        self.poison_bindings(node);
    }

    /// Marks the bindings a failed node would have resolved as failed too,
    /// so their users stop waiting.
    fn poison_bindings(&mut self, node: NodeId) {
        let bindings: Vec<NodeId> = match self.ast.kind(node) {
            NodeKind::Declaration(decl) => vec![decl.name],
            NodeKind::For(stmt) => vec![stmt.var],
            NodeKind::Enum(enumeration) => enumeration.values.iter().map(|value| value.name).collect(),
            NodeKind::Struct(structure) => structure
                .members
                .iter()
                .filter_map(|member| match self.ast.kind(*member) {
                    NodeKind::Declaration(decl) => Some(decl.name),
                    _ => None,
                })
                .collect(),
            NodeKind::Function(function) => match self.ast.kind(function.prototype) {
                NodeKind::FunctionType(prototype) => {
                    prototype.params.iter().filter_map(|param| param.name).collect()
                }
                _ => vec![],
            },
            _ => vec![],
        };

        for binding in bindings {
            if self.ast[binding].resolved().is_none() {
                self.ast[binding].flags.insert(Flags::FAILED);
            }
        }
    }

    fn report_stuck(&mut self) {
        let pending = std::mem::take(&mut self.pending);

        let position = pending
            .first()
            .map(|job| self.position(job.node))
            .unwrap_or_else(Position::null);

        error!("type checking made no progress, {} jobs pending", pending.len());
        self.errors.push(Error::new(
            ErrorImpl::NoProgress {
                pending: pending.len(),
            },
            position,
        ));

        for job in pending {
            let node = &self.ast[job.node];
            error!(
                "  {} #{} at offset {} waiting at stage {}",
                node.kind.name(),
                node.serial,
                node.span.start.0,
                job.stage
            );

            self.errors.push(Error::new(
                ErrorImpl::PendingJob {
                    kind: node.kind.name().to_string(),
                    stage: job.stage,
                },
                node.span.start.clone(),
            ));
        }

        self.success = false;
    }
}

/// Type checks every top-level declaration of `ast`.
pub fn type_check(ast: &mut Ast, scopes: &Scopes) -> Result<(), Vec<Error>> {
    let declarations = ast.declarations.clone();
    let mut checker = TypeChecker::new(ast, scopes);

    if checker.run(&declarations) {
        Ok(())
    } else {
        Err(checker.into_errors())
    }
}
