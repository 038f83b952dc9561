use crate::{
    ast::{
        ast::{Flags, NodeId, NodeKind},
        expressions::{
            Access, Binary, BinaryOp, Call, EnumType, Function, FunctionType, Identifier, StructType, Unary,
            UnaryOp,
        },
        types::TypeDescriptor,
    },
    errors::errors::ErrorImpl,
    scope::scope::ScopeId,
};

use super::type_checker::{Halt, Job, Step, TypeChecker};

impl<'a> TypeChecker<'a> {
    pub(super) fn check_identifier(&mut self, job: &mut Job, ident: &Identifier) -> Step {
        loop {
            match job.stage {
                0 => {
                    let binding = ident
                        .scope
                        .and_then(|scope| self.lookup.lookup(scope, ident.atom, ident.index));

                    let Some(binding) = binding else {
                        return Err(self.error_at(
                            job.node,
                            ErrorImpl::VariableNotDeclared {
                                variable: self.ast.name(ident.atom).to_string(),
                            },
                        ));
                    };

                    if let NodeKind::Identifier(ident) = &mut self.ast[job.node].kind {
                        ident.declaration = Some(binding);
                    }
                    job.stage = 1;
                }
                _ => {
                    let binding = match self.ast.kind(job.node) {
                        NodeKind::Identifier(Identifier {
                            declaration: Some(binding),
                            ..
                        }) => *binding,
                        _ => return Err(Halt::Yield),
                    };

                    let ty = self.resolved(binding)?;
                    self.match_types(job.expected, ty, job.node)?;

                    if self.ast[binding].flags.contains(Flags::CONSTANT) {
                        self.ast[job.node].flags.insert(Flags::CONSTANT);
                    }
                    self.finish(job.node, ty, true);
                    return Ok(());
                }
            }
        }
    }

    pub(super) fn check_call(&mut self, job: &mut Job, call: &Call) -> Step {
        loop {
            match job.stage {
                0 => {
                    self.typecheck(None, call.callee);
                    job.stage = 1;
                }
                _ => {
                    let callee = self.resolved(call.callee)?;
                    let reduced = self.reduce(callee)?;

                    let NodeKind::FunctionType(prototype) = self.ast.kind(reduced).clone() else {
                        return Err(self.error_at(
                            job.node,
                            ErrorImpl::NotCallable {
                                received: self.ast.describe(callee),
                            },
                        ));
                    };

                    let (expected, received) = (prototype.params.len(), call.args.len());
                    if received < expected {
                        return Err(self.error_at(job.node, ErrorImpl::MissingArguments { expected, received }));
                    }
                    if received > expected {
                        return Err(self.error_at(job.node, ErrorImpl::UnexpectedArguments { expected, received }));
                    }

                    let params = prototype
                        .params
                        .iter()
                        .map(|param| param.ty.ok_or(Halt::Yield))
                        .collect::<Step<Vec<NodeId>>>()?;

                    let ty = match prototype.returns.as_slice() {
                        [] => self.primitive(TypeDescriptor::VOID),
                        [ty] => *ty,
                        returns => {
                            return Err(self.error_at(
                                job.node,
                                ErrorImpl::MultipleReturnValues {
                                    found: returns.len(),
                                },
                            ))
                        }
                    };

                    self.match_types(job.expected, ty, job.node)?;

                    for (&arg, param) in call.args.iter().zip(params) {
                        self.typecheck(Some(param), arg);
                    }

                    self.finish(job.node, ty, false);
                    return Ok(());
                }
            }
        }
    }

    /// `value.member`, `pointer.member` or `Type.member`.
    pub(super) fn check_access(&mut self, job: &mut Job, access: &Access) -> Step {
        loop {
            match job.stage {
                0 => {
                    self.typecheck(None, access.lhs);
                    job.stage = 1;
                }
                1 => {
                    let lhs_ty = self.resolved(access.lhs)?;
                    let reduced = self.reduce(lhs_ty)?;

                    let (container, scopes, lvalue): (NodeId, Vec<Option<ScopeId>>, bool) =
                        if self.is_type_type(reduced) {
                            // Static access into the type itself.
                            let container = self.reduce(access.lhs)?;
                            let scopes = match self.ast.kind(container) {
                                NodeKind::Struct(structure) => vec![structure.constants],
                                NodeKind::Enum(enumeration) => vec![enumeration.scope],
                                _ => return Err(self.not_a_struct_or_enum(job.node, access.lhs)),
                            };
                            (container, scopes, false)
                        } else {
                            let (container, deref) = match self.pointee(reduced) {
                                Some(pointee) => (self.reduce(pointee)?, true),
                                None => (reduced, false),
                            };
                            let scopes = match self.ast.kind(container) {
                                NodeKind::Struct(structure) => vec![structure.fields, structure.constants],
                                NodeKind::Enum(enumeration) if !deref => vec![enumeration.scope],
                                _ => return Err(self.not_a_struct_or_enum(job.node, lhs_ty)),
                            };
                            let lvalue = deref || self.ast[access.lhs].flags.contains(Flags::LVALUE);
                            (container, scopes, lvalue)
                        };

                    let member = scopes
                        .into_iter()
                        .flatten()
                        .find_map(|scope| self.lookup.lookup_member(scope, access.member));

                    let Some(member) = member else {
                        return Err(self.error_at(
                            job.node,
                            ErrorImpl::NoSuchMember {
                                member: self.ast.name(access.member).to_string(),
                                container: self.ast.describe(container),
                            },
                        ));
                    };

                    let node = &mut self.ast[job.node];
                    if let NodeKind::Access(access) = &mut node.kind {
                        access.member_decl = Some(member);
                    }
                    node.flags.insert(if lvalue { Flags::LVALUE } else { Flags::NOT_LVALUE });
                    job.stage = 2;
                }
                _ => {
                    let member = match self.ast.kind(job.node) {
                        NodeKind::Access(Access {
                            member_decl: Some(member),
                            ..
                        }) => *member,
                        _ => return Err(Halt::Yield),
                    };

                    let ty = self.resolved(member)?;
                    self.match_types(job.expected, ty, job.node)?;

                    if self.ast[member].flags.contains(Flags::CONSTANT) {
                        self.ast[job.node].flags.insert(Flags::CONSTANT);
                    }
                    self.finish(job.node, ty, false);
                    return Ok(());
                }
            }
        }
    }

    fn not_a_struct_or_enum(&self, at: NodeId, ty: NodeId) -> Halt {
        self.error_at(
            at,
            ErrorImpl::NotAStructOrEnum {
                received: self.ast.describe(ty),
            },
        )
    }

    /// Expectation handed to the operands of an arithmetic operator: the
    /// caller's type when it is a concrete number, `numberlike` otherwise.
    fn operand_expectation(&mut self, expected: Option<NodeId>) -> Step<NodeId> {
        match (expected, self.expected_primitive(expected)?) {
            (Some(expected), Some(desc)) if desc.is_numberlike() && desc.is_sized() => Ok(expected),
            _ => Ok(self.primitive(TypeDescriptor::NUMBERLIKE)),
        }
    }

    /// The caller's type when it is a concrete bool, `bool8` otherwise.
    fn bool_result(&mut self, expected: Option<NodeId>) -> Step<NodeId> {
        match self.expected_primitive(expected)? {
            Some(desc) if desc.is_boollike() && desc.is_sized() => Ok(self.primitive(desc)),
            _ => Ok(self.primitive(TypeDescriptor::BOOL8)),
        }
    }

    pub(super) fn check_binary(&mut self, job: &mut Job, binary: &Binary) -> Step {
        match binary.op {
            BinaryOp::Subscript => self.check_subscript(job, binary),
            op if op.is_logical() => self.check_logical(job, binary),
            op if op.is_comparison() => self.check_comparison(job, binary),
            _ => self.check_arithmetic(job, binary),
        }
    }

    fn check_arithmetic(&mut self, job: &mut Job, binary: &Binary) -> Step {
        loop {
            match job.stage {
                0 => {
                    let operand = self.operand_expectation(job.expected)?;
                    self.typecheck(Some(operand), binary.lhs);
                    self.typecheck(Some(operand), binary.rhs);
                    job.stage = 1;
                }
                _ => {
                    let lhs = self.resolved(binary.lhs)?;
                    let rhs = self.resolved(binary.rhs)?;

                    let desc = self.combine(lhs, rhs, job.node)?;
                    let ty = self.primitive(desc);
                    self.match_types(job.expected, ty, job.node)?;

                    self.finish(job.node, ty, false);
                    return Ok(());
                }
            }
        }
    }

    fn check_comparison(&mut self, job: &mut Job, binary: &Binary) -> Step {
        loop {
            match job.stage {
                0 => {
                    let number = self.primitive(TypeDescriptor::NUMBERLIKE);
                    self.typecheck(Some(number), binary.lhs);
                    self.typecheck(Some(number), binary.rhs);
                    job.stage = 1;
                }
                _ => {
                    self.resolved(binary.lhs)?;
                    self.resolved(binary.rhs)?;

                    let ty = self.bool_result(job.expected)?;
                    self.match_types(job.expected, ty, job.node)?;

                    self.finish(job.node, ty, false);
                    return Ok(());
                }
            }
        }
    }

    fn check_logical(&mut self, job: &mut Job, binary: &Binary) -> Step {
        loop {
            match job.stage {
                0 => {
                    let ty = self.bool_result(job.expected)?;
                    self.typecheck(Some(ty), binary.lhs);
                    self.typecheck(Some(ty), binary.rhs);
                    job.stage = 1;
                }
                _ => {
                    self.resolved(binary.lhs)?;
                    self.resolved(binary.rhs)?;

                    let ty = self.bool_result(job.expected)?;
                    self.match_types(job.expected, ty, job.node)?;

                    self.finish(job.node, ty, false);
                    return Ok(());
                }
            }
        }
    }

    fn check_subscript(&mut self, job: &mut Job, binary: &Binary) -> Step {
        loop {
            match job.stage {
                0 => {
                    self.typecheck(None, binary.lhs);
                    let number = self.primitive(TypeDescriptor::NUMBERLIKE);
                    self.typecheck(Some(number), binary.rhs);
                    job.stage = 1;
                }
                _ => {
                    let lhs = self.resolved(binary.lhs)?;
                    self.resolved(binary.rhs)?;

                    let Some(element) = self.pointee(self.reduce(lhs)?) else {
                        return Err(self.error_at(
                            binary.lhs,
                            ErrorImpl::NotAPointer {
                                received: self.ast.describe(lhs),
                            },
                        ));
                    };
                    self.match_types(job.expected, element, job.node)?;

                    self.finish(job.node, element, true);
                    return Ok(());
                }
            }
        }
    }

    pub(super) fn check_unary(&mut self, job: &mut Job, unary: &Unary) -> Step {
        loop {
            match job.stage {
                0 => {
                    let expected = match unary.op {
                        UnaryOp::Plus | UnaryOp::Minus => Some(self.operand_expectation(job.expected)?),
                        UnaryOp::Not => match self.expected_primitive(job.expected)? {
                            Some(desc) if desc.is_boollike() && desc.is_sized() => job.expected,
                            _ => Some(self.primitive(TypeDescriptor::BOOLLIKE)),
                        },
                        UnaryOp::Deref | UnaryOp::Ref => None,
                    };
                    self.typecheck(expected, unary.operand);
                    job.stage = 1;
                }
                _ => {
                    let operand = self.resolved(unary.operand)?;

                    let (ty, lvalue) = match unary.op {
                        UnaryOp::Plus | UnaryOp::Minus | UnaryOp::Not => (operand, false),
                        UnaryOp::Deref => match self.pointee(self.reduce(operand)?) {
                            Some(pointee) => (pointee, true),
                            None => {
                                return Err(self.error_at(
                                    job.node,
                                    ErrorImpl::NotAPointer {
                                        received: self.ast.describe(operand),
                                    },
                                ))
                            }
                        },
                        UnaryOp::Ref => {
                            if self.is_type_type(self.reduce(operand)?) {
                                // `&T` where `T` is a type: a pointer type.
                                (operand, false)
                            } else if self.ast[unary.operand].flags.contains(Flags::LVALUE) {
                                (self.pointer_to(operand)?, false)
                            } else {
                                return Err(self.error_at(unary.operand, ErrorImpl::LvalueRequired));
                            }
                        }
                    };

                    self.match_types(job.expected, ty, job.node)?;

                    self.finish(job.node, ty, lvalue);
                    return Ok(());
                }
            }
        }
    }

    /// Integer literals follow the expected integer type, defaulting to `s64`;
    /// float literals follow the expected float type, defaulting to `f64`.
    pub(super) fn check_number(&mut self, job: &mut Job) -> Step {
        let float = self.ast[job.node].flags.contains(Flags::FLOATLIKE);

        let desc = match job.expected {
            None if float => TypeDescriptor::F64,
            None => TypeDescriptor::S64,
            Some(expected) => {
                let desc = match self.ast.kind(self.reduce(expected)?) {
                    NodeKind::Primitive(desc) if (float && desc.is_floatlike()) || (!float && desc.is_intlike()) => {
                        *desc
                    }
                    _ => {
                        let literal = if float { "float literal" } else { "integer literal" };
                        return Err(self.mismatch(expected, literal.to_string(), job.node));
                    }
                };

                let size = if desc.is_sized() { desc.size() } else { 8 };
                if float {
                    TypeDescriptor::FLOATLIKE.with_size(size)
                } else {
                    TypeDescriptor::INTLIKE.with_size(size).with_sign(!desc.is_unsigned())
                }
            }
        };

        self.finish_literal(job.node, desc);
        Ok(())
    }

    pub(super) fn check_bool(&mut self, job: &mut Job) -> Step {
        let desc = match job.expected {
            None => TypeDescriptor::BOOL8,
            Some(expected) => match self.ast.kind(self.reduce(expected)?) {
                NodeKind::Primitive(desc) if desc.is_boollike() && desc.is_sized() => *desc,
                NodeKind::Primitive(desc) if desc.is_boollike() => TypeDescriptor::BOOL8,
                _ => return Err(self.mismatch(expected, String::from("bool literal"), job.node)),
            },
        };

        self.finish_literal(job.node, desc);
        Ok(())
    }

    fn finish_literal(&mut self, node: NodeId, desc: TypeDescriptor) {
        debug_assert!(!desc.is_abstract(), "literal resolved to {}", desc);

        let ty = self.primitive(desc);
        self.ast[node].flags.insert(Flags::COMPILE_TIME_CONSTANT);
        self.finish(node, ty, false);
    }

    /// A type written in the source is a value of type `type`.
    fn resolve_as_type(&mut self, job: &Job) -> Step {
        let ty = self.type_type();
        self.match_types(job.expected, ty, job.node)?;

        self.ast[job.node].flags.insert(Flags::CONSTANT);
        self.finish(job.node, ty, false);
        Ok(())
    }

    pub(super) fn check_primitive(&mut self, job: &mut Job) -> Step {
        self.resolve_as_type(job)
    }

    pub(super) fn check_function_type(&mut self, job: &mut Job, prototype: &FunctionType) -> Step {
        self.resolve_as_type(job)?;

        let ty = self.type_type();
        for param in &prototype.params {
            if let Some(param_ty) = param.ty {
                self.typecheck(Some(ty), param_ty);
            }
        }
        for &ret in &prototype.returns {
            self.typecheck(Some(ty), ret);
        }
        Ok(())
    }

    pub(super) fn check_struct(&mut self, job: &mut Job, structure: &StructType) -> Step {
        self.resolve_as_type(job)?;

        for &member in &structure.members {
            self.typecheck(None, member);
        }
        Ok(())
    }

    /// Enum values are constants of the enum type. Explicit values are
    /// checked as integers.
    pub(super) fn check_enum(&mut self, job: &mut Job, enumeration: &EnumType) -> Step {
        self.resolve_as_type(job)?;

        for value in &enumeration.values {
            self.bind(value.name, job.node, true, value.value);
        }

        let int = self.primitive(TypeDescriptor::INTLIKE);
        for value in &enumeration.values {
            if let Some(expr) = value.value {
                self.typecheck(Some(int), expr);
            }
        }
        Ok(())
    }

    /// Prototype first, then default values, whose types fill in parameters
    /// written without one. Parameters are bound left to right so later
    /// defaults can use earlier parameters. The body is checked once the function has a type,
    /// so recursive and mutually recursive calls resolve.
    pub(super) fn check_function(&mut self, job: &mut Job, function: &Function) -> Step {
        loop {
            match job.stage {
                0 => {
                    self.typecheck(None, function.prototype);
                    job.stage = 1;
                }
                1 => {
                    self.resolved(function.prototype)?;

                    let prototype = self.prototype(function.prototype);
                    for ty in prototype.params.iter().filter_map(|param| param.ty) {
                        self.resolved(ty)?;
                    }
                    for &ret in &prototype.returns {
                        self.resolved(ret)?;
                    }
                    job.stage = 2;
                }
                2 => {
                    let prototype = self.prototype(function.prototype);
                    for param in &prototype.params {
                        if let Some(default) = param.default {
                            self.typecheck(param.ty, default);
                        }
                    }
                    job.stage = 3;
                }
                stage => {
                    // One stage per parameter, so each binding counts as progress.
                    let prototype = self.prototype(function.prototype);
                    let index = (stage - 3) as usize;

                    if let Some(param) = prototype.params.get(index) {
                        let ty = match (param.ty, param.default) {
                            (Some(ty), Some(default)) => {
                                self.resolved(default)?;
                                ty
                            }
                            (Some(ty), None) => ty,
                            (None, Some(default)) => self.resolved(default)?,
                            (None, None) => self.primitive(TypeDescriptor::VOID),
                        };

                        if let NodeKind::FunctionType(prototype) = &mut self.ast[function.prototype].kind {
                            prototype.params[index].ty = Some(ty);
                        }
                        if let Some(name) = param.name {
                            self.bind(name, ty, false, None);
                        }

                        job.stage += 1;
                        continue;
                    }

                    self.match_types(job.expected, function.prototype, job.node)?;

                    self.finish(job.node, function.prototype, false);
                    self.typecheck(None, function.body);
                    return Ok(());
                }
            }
        }
    }

    fn prototype(&self, node: NodeId) -> FunctionType {
        match self.ast.kind(node) {
            NodeKind::FunctionType(prototype) => prototype.clone(),
            _ => FunctionType {
                params: vec![],
                returns: vec![],
            },
        }
    }
}
