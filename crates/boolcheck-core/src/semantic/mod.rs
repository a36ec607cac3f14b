//! Semantic model of one translation unit: scopes, declarations and the
//! expression roots the rules inspect.

pub mod builder;
pub mod classify;
pub mod scope;
pub mod symbols;

pub use builder::ScopeBuilder;
pub use classify::{ValueClass, bool_returning_call, bool_variable_name, classify};
pub use scope::{Scope, ScopeId, ScopeKind, ScopeTree};
pub use symbols::{FunctionDecl, ReturnKind, SymbolTable, VariableDecl, VariableType};

use crate::syntax::{Callee, Expr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootContext {
    /// `if`, `while`, `do`, `for` and `switch` conditions.
    Condition,
    Statement,
    Return,
    Initializer,
}

/// A top-level expression together with the scope it is evaluated in.
#[derive(Debug, Clone)]
pub struct ExprRoot {
    pub expr: Expr,
    pub scope: ScopeId,
    pub context: RootContext,
}

pub struct SemanticModel {
    scopes: ScopeTree,
    symbols: SymbolTable,
    roots: Vec<ExprRoot>,
    global: ScopeId,
}

impl SemanticModel {
    pub(crate) fn new(
        scopes: ScopeTree,
        symbols: SymbolTable,
        roots: Vec<ExprRoot>,
        global: ScopeId,
    ) -> Self {
        Self {
            scopes,
            symbols,
            roots,
            global,
        }
    }

    /// Model with a single global scope and nothing declared.
    pub fn empty() -> Self {
        let mut scopes = ScopeTree::new();
        let global = scopes.create_scope(ScopeKind::Global, None, None, 1);
        Self::new(scopes, SymbolTable::new(), Vec::new(), global)
    }

    pub fn scopes(&self) -> &ScopeTree {
        &self.scopes
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn roots(&self) -> &[ExprRoot] {
        &self.roots
    }

    pub fn global_scope(&self) -> ScopeId {
        self.global
    }

    pub fn classify_variable(&self, name: &str, scope: ScopeId) -> VariableType {
        self.symbols.classify_variable(name, scope, &self.scopes)
    }

    pub fn resolve_call(&self, callee: &Callee, scope: ScopeId) -> Option<&FunctionDecl> {
        self.symbols.resolve_call(callee, scope, &self.scopes)
    }
}

impl std::fmt::Debug for SemanticModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SemanticModel")
            .field("scope_count", &self.scopes.len())
            .field("root_count", &self.roots.len())
            .finish()
    }
}
