use std::{
    collections::HashMap,
    ops::{Index, IndexMut},
};

use la_arena::{Arena, Idx};

use crate::{
    ast::{ast::NodeId, interner::Symbol},
    errors::errors::{Error, ErrorImpl},
    Position,
};

pub type ScopeId = Idx<Scope>;

/// One lexical scope.
///
/// Every binding gets the insertion index it was declared at. In an ordered
/// scope (blocks, parameters, loop variables) a binding is only visible to
/// use sites recorded after it was inserted. In an unordered scope (globals,
/// struct members, enum values) every binding is visible everywhere.
#[derive(Debug)]
pub struct Scope {
    /// Parent scope and the parent's insertion count when this scope was opened.
    pub parent: Option<(ScopeId, u32)>,
    pub ordered: bool,
    bindings: HashMap<Symbol, (u32, NodeId)>,
    count: u32,
}

impl Scope {
    pub fn new(parent: Option<(ScopeId, u32)>, ordered: bool) -> Self {
        Scope {
            parent,
            ordered,
            bindings: HashMap::new(),
            count: 0,
        }
    }

    pub fn declare(&mut self, atom: Symbol, binding: NodeId, name: &str, position: Position) -> Result<u32, Error> {
        if self.bindings.contains_key(&atom) {
            return Err(Error::new(
                ErrorImpl::VariableAlreadyDeclared {
                    variable: name.to_string(),
                },
                position,
            ));
        }

        let index = self.count;
        self.bindings.insert(atom, (index, binding));
        self.count += 1;

        Ok(index)
    }

    /// The binding of `atom` visible to a use site recorded at `index`.
    pub fn get(&self, atom: Symbol, index: u32) -> Option<NodeId> {
        let (binding_index, binding) = self.bindings.get(&atom)?;

        if self.ordered && *binding_index >= index {
            return None;
        }

        Some(*binding)
    }

    /// Number of bindings inserted so far, the index handed to the next use site.
    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Name resolution as seen by the type checker.
pub trait Lookup {
    /// Finds the binding for `atom` as seen from `index` in `scope`, walking
    /// out through parent scopes on a miss.
    fn lookup(&self, scope: ScopeId, atom: Symbol, index: u32) -> Option<NodeId>;

    /// Finds a member directly in `scope`, ignoring ordering and parents.
    fn lookup_member(&self, scope: ScopeId, atom: Symbol) -> Option<NodeId>;
}

/// Every scope of one file.
#[derive(Debug, Default)]
pub struct Scopes {
    arena: Arena<Scope>,
    global: Option<ScopeId>,
}

impl Scopes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, scope: Scope) -> ScopeId {
        self.arena.alloc(scope)
    }

    /// Opens a child of `parent` at the parent's current insertion count.
    pub fn open(&mut self, parent: ScopeId, ordered: bool) -> ScopeId {
        let count = self.arena[parent].count();
        self.alloc(Scope::new(Some((parent, count)), ordered))
    }

    pub fn global(&self) -> Option<ScopeId> {
        self.global
    }

    pub fn set_global(&mut self, scope: ScopeId) {
        self.global = Some(scope);
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }
}

impl Index<ScopeId> for Scopes {
    type Output = Scope;

    fn index(&self, id: ScopeId) -> &Scope {
        &self.arena[id]
    }
}

impl IndexMut<ScopeId> for Scopes {
    fn index_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.arena[id]
    }
}

impl Lookup for Scopes {
    fn lookup(&self, scope: ScopeId, atom: Symbol, index: u32) -> Option<NodeId> {
        let mut current = Some((scope, index));

        while let Some((id, index)) = current {
            let scope = &self.arena[id];
            if let Some(binding) = scope.get(atom, index) {
                return Some(binding);
            }
            current = scope.parent;
        }

        None
    }

    fn lookup_member(&self, scope: ScopeId, atom: Symbol) -> Option<NodeId> {
        self.arena[scope].bindings.get(&atom).map(|(_, binding)| *binding)
    }
}
