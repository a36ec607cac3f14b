//! Symbol table for variable and function declarations
//!
//! Variables are looked up through the scope chain, nearest scope first.
//! Function calls are resolved the same way unless the call is qualified,
//! in which case only the named scope is searched. Member calls never
//! resolve: without a type system the receiver's class is unknown.

use std::collections::HashMap;

use id_arena::{Arena, Id};

use super::scope::{ScopeId, ScopeTree};
use crate::syntax::Callee;

pub type VariableId = Id<VariableDecl>;
pub type FunctionId = Id<FunctionDecl>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableType {
    Boolean,
    Pointer,
    /// Standard arithmetic type other than `bool`.
    Integer,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnKind {
    Boolean,
    Other,
}

#[derive(Debug)]
pub struct VariableDecl {
    pub id: VariableId,
    pub name: String,
    pub scope: ScopeId,
    pub line: usize,
    pub ty: VariableType,
}

#[derive(Debug)]
pub struct FunctionDecl {
    pub id: FunctionId,
    pub name: String,
    pub scope: ScopeId,
    pub line: usize,
    pub return_kind: ReturnKind,
}

enum ScopeLookup<'a> {
    NotDeclared,
    Unique(&'a FunctionDecl),
    /// Same-scope declarations disagree on the return kind.
    Ambiguous,
}

pub struct SymbolTable {
    variables: Arena<VariableDecl>,
    functions: Arena<FunctionDecl>,
    variables_by_scope: HashMap<ScopeId, HashMap<String, VariableId>>,
    functions_by_scope: HashMap<ScopeId, HashMap<String, Vec<FunctionId>>>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            variables: Arena::new(),
            functions: Arena::new(),
            variables_by_scope: HashMap::new(),
            functions_by_scope: HashMap::new(),
        }
    }

    pub fn declare_variable(
        &mut self,
        name: &str,
        ty: VariableType,
        scope: ScopeId,
        line: usize,
    ) -> VariableId {
        let id = self.variables.alloc_with_id(|id| VariableDecl {
            id,
            name: name.to_string(),
            scope,
            line,
            ty,
        });

        self.variables_by_scope
            .entry(scope)
            .or_default()
            .insert(name.to_string(), id);

        id
    }

    pub fn declare_function(
        &mut self,
        name: &str,
        return_kind: ReturnKind,
        scope: ScopeId,
        line: usize,
    ) -> FunctionId {
        let id = self.functions.alloc_with_id(|id| FunctionDecl {
            id,
            name: name.to_string(),
            scope,
            line,
            return_kind,
        });

        self.functions_by_scope
            .entry(scope)
            .or_default()
            .entry(name.to_string())
            .or_default()
            .push(id);

        id
    }

    pub fn lookup_variable(
        &self,
        name: &str,
        scope: ScopeId,
        scope_tree: &ScopeTree,
    ) -> Option<&VariableDecl> {
        if let Some(&id) = self
            .variables_by_scope
            .get(&scope)
            .and_then(|vars| vars.get(name))
        {
            return Some(&self.variables[id]);
        }

        let parent = scope_tree.get(scope).parent?;
        self.lookup_variable(name, parent, scope_tree)
    }

    pub fn classify_variable(
        &self,
        name: &str,
        scope: ScopeId,
        scope_tree: &ScopeTree,
    ) -> VariableType {
        self.lookup_variable(name, scope, scope_tree)
            .map(|decl| decl.ty)
            .unwrap_or(VariableType::Other)
    }

    pub fn resolve_call(
        &self,
        callee: &Callee,
        scope: ScopeId,
        scope_tree: &ScopeTree,
    ) -> Option<&FunctionDecl> {
        match callee {
            Callee::Member { .. } | Callee::Opaque => None,
            Callee::Unqualified(name) => {
                for candidate in scope_tree.ancestors(scope) {
                    match self.lookup_in_scope(name, candidate.id) {
                        ScopeLookup::NotDeclared => continue,
                        ScopeLookup::Unique(decl) => return Some(decl),
                        ScopeLookup::Ambiguous => return None,
                    }
                }
                None
            }
            Callee::Qualified { global, path, name } => {
                let target = if *global {
                    scope_tree
                        .root()
                        .and_then(|root| scope_tree.descend(root, path))
                } else {
                    scope_tree
                        .ancestors(scope)
                        .find_map(|candidate| scope_tree.descend(candidate.id, path))
                }?;

                match self.lookup_in_scope(name, target) {
                    ScopeLookup::Unique(decl) => Some(decl),
                    ScopeLookup::NotDeclared | ScopeLookup::Ambiguous => None,
                }
            }
        }
    }

    fn lookup_in_scope(&self, name: &str, scope: ScopeId) -> ScopeLookup<'_> {
        let Some(ids) = self
            .functions_by_scope
            .get(&scope)
            .and_then(|functions| functions.get(name))
        else {
            return ScopeLookup::NotDeclared;
        };

        let mut decls = ids.iter().map(|&id| &self.functions[id]);
        let Some(first) = decls.next() else {
            return ScopeLookup::NotDeclared;
        };

        if decls.all(|decl| decl.return_kind == first.return_kind) {
            ScopeLookup::Unique(first)
        } else {
            ScopeLookup::Ambiguous
        }
    }

    pub fn all_functions(&self) -> impl Iterator<Item = &FunctionDecl> {
        self.functions.iter().map(|(_, f)| f)
    }

    pub fn all_variables(&self) -> impl Iterator<Item = &VariableDecl> {
        self.variables.iter().map(|(_, v)| v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::scope::ScopeKind;

    struct Fixture {
        tree: ScopeTree,
        symbols: SymbolTable,
        global: ScopeId,
    }

    fn fixture() -> Fixture {
        let mut tree = ScopeTree::new();
        let global = tree.create_scope(ScopeKind::Global, None, None, 1);
        Fixture {
            tree,
            symbols: SymbolTable::new(),
            global,
        }
    }

    fn unqualified(name: &str) -> Callee {
        Callee::Unqualified(name.to_string())
    }

    #[test]
    fn lookup_variable_in_parent_scope() {
        let mut f = fixture();
        let func = f
            .tree
            .create_scope(ScopeKind::Function, None, Some(f.global), 2);
        let block = f.tree.create_scope(ScopeKind::Block, None, Some(func), 3);
        f.symbols
            .declare_variable("flag", VariableType::Boolean, f.global, 1);

        assert_eq!(
            f.symbols.classify_variable("flag", block, &f.tree),
            VariableType::Boolean
        );
        assert_eq!(
            f.symbols.classify_variable("missing", block, &f.tree),
            VariableType::Other
        );
    }

    #[test]
    fn shadowing_returns_local_variable() {
        let mut f = fixture();
        let func = f
            .tree
            .create_scope(ScopeKind::Function, None, Some(f.global), 2);
        f.symbols.declare_variable("x", VariableType::Boolean, f.global, 1);
        f.symbols.declare_variable("x", VariableType::Integer, func, 2);

        assert_eq!(
            f.symbols.classify_variable("x", func, &f.tree),
            VariableType::Integer
        );
        assert_eq!(
            f.symbols.classify_variable("x", f.global, &f.tree),
            VariableType::Boolean
        );
    }

    #[test]
    fn nearest_function_declaration_wins() {
        let mut f = fixture();
        let ns = f.tree.create_scope(
            ScopeKind::Namespace,
            Some("Foo".to_string()),
            Some(f.global),
            2,
        );
        let func = f.tree.create_scope(ScopeKind::Function, None, Some(ns), 4);
        f.symbols
            .declare_function("compare1", ReturnKind::Other, f.global, 1);
        f.symbols
            .declare_function("compare1", ReturnKind::Boolean, ns, 3);

        let from_ns = f.symbols.resolve_call(&unqualified("compare1"), func, &f.tree);
        assert_eq!(from_ns.map(|d| d.return_kind), Some(ReturnKind::Boolean));

        let from_global = f
            .symbols
            .resolve_call(&unqualified("compare1"), f.global, &f.tree);
        assert_eq!(from_global.map(|d| d.return_kind), Some(ReturnKind::Other));
    }

    #[test]
    fn global_qualification_bypasses_enclosing_scopes() {
        let mut f = fixture();
        let ns = f.tree.create_scope(
            ScopeKind::Namespace,
            Some("Foo".to_string()),
            Some(f.global),
            2,
        );
        f.symbols
            .declare_function("compare1", ReturnKind::Other, f.global, 1);
        f.symbols
            .declare_function("compare1", ReturnKind::Boolean, ns, 3);

        let callee = Callee::Qualified {
            global: true,
            path: Vec::new(),
            name: "compare1".to_string(),
        };
        let decl = f.symbols.resolve_call(&callee, ns, &f.tree);

        assert_eq!(decl.map(|d| d.return_kind), Some(ReturnKind::Other));
    }

    #[test]
    fn relative_qualification_searches_named_scope_only() {
        let mut f = fixture();
        let ns = f.tree.create_scope(
            ScopeKind::Namespace,
            Some("Foo".to_string()),
            Some(f.global),
            1,
        );
        let func = f
            .tree
            .create_scope(ScopeKind::Function, None, Some(f.global), 5);
        f.symbols.declare_function("check", ReturnKind::Boolean, ns, 2);
        f.symbols
            .declare_function("other", ReturnKind::Boolean, f.global, 4);

        let check = Callee::Qualified {
            global: false,
            path: vec!["Foo".to_string()],
            name: "check".to_string(),
        };
        let other = Callee::Qualified {
            global: false,
            path: vec!["Foo".to_string()],
            name: "other".to_string(),
        };
        let unknown = Callee::Qualified {
            global: false,
            path: vec!["Bar".to_string()],
            name: "check".to_string(),
        };

        assert!(f.symbols.resolve_call(&check, func, &f.tree).is_some());
        assert!(f.symbols.resolve_call(&other, func, &f.tree).is_none());
        assert!(f.symbols.resolve_call(&unknown, func, &f.tree).is_none());
    }

    #[test]
    fn member_calls_never_resolve() {
        let mut f = fixture();
        f.symbols
            .declare_function("compare1", ReturnKind::Boolean, f.global, 1);

        let callee = Callee::Member {
            object: Box::new(crate::syntax::Expr::opaque(1, 1)),
            name: "compare1".to_string(),
        };

        assert!(f.symbols.resolve_call(&callee, f.global, &f.tree).is_none());
        assert!(f.symbols.resolve_call(&Callee::Opaque, f.global, &f.tree).is_none());
    }

    #[test]
    fn conflicting_same_scope_declarations_are_ambiguous() {
        let mut f = fixture();
        let func = f
            .tree
            .create_scope(ScopeKind::Function, None, Some(f.global), 3);
        f.symbols.declare_function("g", ReturnKind::Boolean, f.global, 1);
        f.symbols.declare_function("g", ReturnKind::Other, f.global, 2);

        assert!(f.symbols.resolve_call(&unqualified("g"), func, &f.tree).is_none());
    }

    #[test]
    fn prototype_and_definition_agree() {
        let mut f = fixture();
        f.symbols.declare_function("g", ReturnKind::Boolean, f.global, 1);
        f.symbols.declare_function("g", ReturnKind::Boolean, f.global, 9);

        let decl = f.symbols.resolve_call(&unqualified("g"), f.global, &f.tree);
        assert_eq!(decl.map(|d| d.line), Some(1));
    }

    #[test]
    fn unknown_function_resolves_to_none() {
        let f = fixture();

        assert!(f
            .symbols
            .resolve_call(&unqualified("printf"), f.global, &f.tree)
            .is_none());
    }
}
