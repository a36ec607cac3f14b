//! Scope analysis for declarations
//!
//! This module provides a scope tree data structure for representing
//! nested C++ scopes (global, namespace, class, function, block).

use id_arena::{Arena, Id};

pub type ScopeId = Id<Scope>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Namespace,
    Class,
    Function,
    Block,
}

#[derive(Debug)]
pub struct Scope {
    pub id: ScopeId,
    pub kind: ScopeKind,
    /// Namespace or class name.
    pub name: Option<String>,
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    pub line: usize,
}

impl Scope {
    pub fn is_named_container(&self, name: &str) -> bool {
        matches!(self.kind, ScopeKind::Namespace | ScopeKind::Class)
            && self.name.as_deref() == Some(name)
    }
}

pub struct ScopeTree {
    arena: Arena<Scope>,
    root: Option<ScopeId>,
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTree {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    pub fn create_scope(
        &mut self,
        kind: ScopeKind,
        name: Option<String>,
        parent: Option<ScopeId>,
        line: usize,
    ) -> ScopeId {
        let id = self.arena.alloc_with_id(|id| Scope {
            id,
            kind,
            name,
            parent,
            children: Vec::new(),
            line,
        });

        if let Some(parent_id) = parent {
            self.arena[parent_id].children.push(id);
        }

        if self.root.is_none() {
            self.root = Some(id);
        }

        id
    }

    pub fn root(&self) -> Option<ScopeId> {
        self.root
    }

    pub fn get(&self, id: ScopeId) -> &Scope {
        &self.arena[id]
    }

    pub fn children(&self, id: ScopeId) -> impl Iterator<Item = &Scope> {
        self.arena[id].children.iter().map(|&c| &self.arena[c])
    }

    /// The namespace or class named `name` directly inside `id`.
    pub fn find_child(&self, id: ScopeId, name: &str) -> Option<ScopeId> {
        self.children(id)
            .find(|child| child.is_named_container(name))
            .map(|child| child.id)
    }

    /// Follows `path` downwards from `start`, one named child per segment.
    pub fn descend(&self, start: ScopeId, path: &[String]) -> Option<ScopeId> {
        path.iter()
            .try_fold(start, |scope, segment| self.find_child(scope, segment))
    }

    pub fn ancestors(&self, id: ScopeId) -> AncestorIter<'_> {
        AncestorIter {
            tree: self,
            current: Some(id),
        }
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.len() == 0
    }
}

pub struct AncestorIter<'a> {
    tree: &'a ScopeTree,
    current: Option<ScopeId>,
}

impl<'a> Iterator for AncestorIter<'a> {
    type Item = &'a Scope;

    fn next(&mut self) -> Option<Self::Item> {
        let current_id = self.current?;
        let scope = &self.tree.arena[current_id];
        self.current = scope.parent;
        Some(scope)
    }
}
