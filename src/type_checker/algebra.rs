//! Operations on type expressions: reduction to a canonical node, matching
//! an actual type against an expected one and combining numeric operands.

use crate::{
    ast::{
        ast::{Flags, NodeId, NodeKind},
        expressions::{Identifier, Unary, UnaryOp},
        types::TypeDescriptor,
    },
    errors::errors::{Error, ErrorImpl},
};

use super::type_checker::{Halt, Step, TypeChecker};

impl<'a> TypeChecker<'a> {
    /// The synthesized node for a primitive descriptor. `type` is its own
    /// type, every other primitive is of type `type`.
    pub(super) fn primitive(&mut self, desc: TypeDescriptor) -> NodeId {
        if let Some(&node) = self.primitives.get(&desc) {
            return node;
        }

        let node = self.ast.synthesize(NodeKind::Primitive(desc));
        self.primitives.insert(desc, node);

        let ty = if desc == TypeDescriptor::TYPE {
            node
        } else {
            self.primitive(TypeDescriptor::TYPE)
        };

        self.ast[node].flags.insert(Flags::CHECKED | Flags::CONSTANT);
        self.finish(node, ty, false);
        node
    }

    pub(super) fn type_type(&mut self) -> NodeId {
        self.primitive(TypeDescriptor::TYPE)
    }

    /// The synthesized pointer type to `pointee`, shared by every pointer to
    /// the same canonical type.
    pub(super) fn pointer_to(&mut self, pointee: NodeId) -> Step<NodeId> {
        let mut canonical = self.reduce(pointee)?;
        if let NodeKind::Primitive(desc) = self.ast.kind(canonical) {
            let desc = *desc;
            canonical = self.primitive(desc);
        }

        if let Some(&pointer) = self.pointers.get(&canonical) {
            return Ok(pointer);
        }

        let pointer = self.ast.synthesize(NodeKind::Unary(Unary {
            op: UnaryOp::Ref,
            operand: canonical,
        }));
        let ty = self.type_type();
        self.ast[pointer].flags.insert(Flags::CHECKED | Flags::CONSTANT);
        self.finish(pointer, ty, false);
        self.pointers.insert(canonical, pointer);

        Ok(pointer)
    }

    /// Whether `node` is the primitive `type`.
    pub(super) fn is_type_type(&self, node: NodeId) -> bool {
        matches!(self.ast.kind(node), NodeKind::Primitive(desc) if desc.is_type())
    }

    /// The pointee of a canonical pointer type.
    pub(super) fn pointee(&self, canonical: NodeId) -> Option<NodeId> {
        match self.ast.kind(canonical) {
            NodeKind::Unary(Unary {
                op: UnaryOp::Ref,
                operand,
            }) => Some(*operand),
            _ => None,
        }
    }

    /// Follows identifiers, constant bindings and member accesses until it
    /// reaches a node that is a type in its own right: a primitive, struct,
    /// enum, function type or pointer type.
    pub(super) fn reduce(&self, ty: NodeId) -> Step<NodeId> {
        let mut current = ty;

        loop {
            let node = &self.ast[current];
            if node.flags.contains(Flags::FAILED) {
                return Err(Halt::Poisoned);
            }

            match &node.kind {
                NodeKind::Primitive(_) | NodeKind::Struct(_) | NodeKind::Enum(_) | NodeKind::FunctionType(_) => {
                    return Ok(current);
                }
                NodeKind::Unary(Unary { op: UnaryOp::Ref, .. }) => {
                    if node.flags.contains(Flags::SYNTHETIC) {
                        return Ok(current);
                    }

                    // `&T` is only a pointer type when `T` is a type.
                    let of = self.reduce(node.resolved().ok_or(Halt::Yield)?)?;
                    if self.is_type_type(of) {
                        return Ok(current);
                    }
                    return Err(self.not_a_type(ty));
                }
                NodeKind::Identifier(Identifier { value, declaration, atom, .. }) => {
                    if node.resolved().is_none() {
                        return Err(Halt::Yield);
                    }

                    if !node.flags.contains(Flags::BINDING) {
                        current = declaration.ok_or(Halt::Yield)?;
                        continue;
                    }

                    if !node.flags.contains(Flags::CONSTANT) {
                        return Err(self.error_at(
                            ty,
                            ErrorImpl::NotAConstant {
                                name: self.ast.name(*atom).to_string(),
                            },
                        ));
                    }

                    match value {
                        Some(value) => current = *value,
                        None => return Err(self.not_a_type(ty)),
                    }
                }
                NodeKind::Access(access) => {
                    if node.resolved().is_none() {
                        return Err(Halt::Yield);
                    }
                    current = access.member_decl.ok_or(Halt::Yield)?;
                }
                _ => return Err(self.not_a_type(ty)),
            }
        }
    }

    fn not_a_type(&self, node: NodeId) -> Halt {
        self.error_at(
            node,
            ErrorImpl::NotAType {
                found: self.ast.describe(node),
            },
        )
    }

    /// Structural equivalence of two type expressions.
    ///
    /// Unsized categories absorb any primitive of the same category, so
    /// `intlike` matches every integer type. Arity mismatches between two
    /// function types are reported at `at` rather than as a plain mismatch.
    pub(super) fn types_equal(&self, expected: NodeId, actual: NodeId, at: NodeId) -> Step<bool> {
        let expected = self.reduce(expected)?;
        let actual = self.reduce(actual)?;

        if expected == actual {
            return Ok(true);
        }

        match (self.ast.kind(expected), self.ast.kind(actual)) {
            (NodeKind::Primitive(x), NodeKind::Primitive(y)) => Ok(primitives_match(*x, *y)),
            (
                NodeKind::Unary(Unary {
                    op: UnaryOp::Ref,
                    operand: x,
                }),
                NodeKind::Unary(Unary {
                    op: UnaryOp::Ref,
                    operand: y,
                }),
            ) => self.types_equal(*x, *y, at),
            (NodeKind::FunctionType(x), NodeKind::FunctionType(y)) => {
                if x.params.len() != y.params.len() {
                    return Err(self.error_at(
                        at,
                        ErrorImpl::ParameterCountMismatch {
                            expected: x.params.len(),
                            received: y.params.len(),
                        },
                    ));
                }
                if x.returns.len() != y.returns.len() {
                    return Err(self.error_at(
                        at,
                        ErrorImpl::ReturnCountMismatch {
                            expected: x.returns.len(),
                            received: y.returns.len(),
                        },
                    ));
                }

                for (p, q) in x.params.iter().zip(&y.params) {
                    // Parameter types inferred from defaults are filled in late.
                    let (Some(p), Some(q)) = (p.ty, q.ty) else {
                        return Err(Halt::Yield);
                    };
                    if !self.types_equal(p, q, at)? {
                        return Ok(false);
                    }
                }

                for (p, q) in x.returns.iter().zip(&y.returns) {
                    if !self.types_equal(*p, *q, at)? {
                        return Ok(false);
                    }
                }

                Ok(true)
            }
            // Structs and enums are nominal: only the same node matches.
            _ => Ok(false),
        }
    }

    /// Checks `actual` against `expected`, if there is an expectation.
    pub(super) fn match_types(&self, expected: Option<NodeId>, actual: NodeId, at: NodeId) -> Step {
        let Some(expected) = expected else {
            return Ok(());
        };

        if self.types_equal(expected, actual, at)? {
            return Ok(());
        }

        Err(self.mismatch(expected, self.ast.describe(actual), at))
    }

    pub(super) fn mismatch(&self, expected: NodeId, received: String, at: NodeId) -> Halt {
        Halt::Fail(
            Error::new(
                ErrorImpl::TypeMatchError {
                    expected: self.ast.describe(expected),
                    received,
                },
                self.position(at),
            )
            .with_related(self.position(expected)),
        )
    }

    /// The common type of two numeric operands.
    ///
    /// Two floats give the larger float. Two integers give the larger integer,
    /// unsigned only if both sides are unsigned. Mixing an integer with a
    /// float, or anything non-numeric, is an error.
    pub(super) fn combine(&self, left: NodeId, right: NodeId, at: NodeId) -> Step<TypeDescriptor> {
        let l = self.reduce(left)?;
        let r = self.reduce(right)?;

        let incompatible = || {
            self.error_at(
                at,
                ErrorImpl::NumberTypesMismatch {
                    left: self.ast.describe(left),
                    right: self.ast.describe(right),
                },
            )
        };

        let (NodeKind::Primitive(x), NodeKind::Primitive(y)) = (self.ast.kind(l), self.ast.kind(r)) else {
            return Err(incompatible());
        };
        let (x, y) = (*x, *y);
        let size = x.size().max(y.size());

        if x.is_floatlike() && y.is_floatlike() {
            Ok(TypeDescriptor::FLOATLIKE.with_size(size))
        } else if x.is_intlike() && y.is_intlike() {
            let int = TypeDescriptor::INTLIKE.with_size(size);
            if size == 0 {
                return Ok(int);
            }
            Ok(int.with_sign(!(x.is_unsigned() && y.is_unsigned())))
        } else {
            Err(incompatible())
        }
    }

    /// The expectation reduced to a primitive descriptor, when it is one.
    pub(super) fn expected_primitive(&self, expected: Option<NodeId>) -> Step<Option<TypeDescriptor>> {
        let Some(expected) = expected else {
            return Ok(None);
        };

        Ok(match self.ast.kind(self.reduce(expected)?) {
            NodeKind::Primitive(desc) => Some(*desc),
            _ => None,
        })
    }
}

/// Primitive compatibility. An unsized side absorbs any size of its category.
pub fn primitives_match(x: TypeDescriptor, y: TypeDescriptor) -> bool {
    if x.is_intlike() && y.is_intlike() {
        if !x.is_sized() || !y.is_sized() {
            return true;
        }
        return x.size() == y.size() && x.is_signed() == y.is_signed();
    }

    if x.is_floatlike() && y.is_floatlike() {
        return !x.is_sized() || !y.is_sized() || x.size() == y.size();
    }

    if x.is_boollike() && y.is_boollike() {
        return true;
    }

    (x.is_void() && y.is_void()) || (x.is_type() && y.is_type())
}
