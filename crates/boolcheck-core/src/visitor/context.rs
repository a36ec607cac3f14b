//! Visitor context providing file and scope information during traversal.

use crate::parser::ParsedFile;
use crate::semantic::{
    self, FunctionDecl, ScopeId, SemanticModel, ValueClass, VariableType,
};
use crate::syntax::{Callee, Expr};

#[derive(Clone, Copy)]
pub struct VisitorContext<'a> {
    file: &'a ParsedFile,
    scope: ScopeId,
    in_condition: bool,
}

impl<'a> VisitorContext<'a> {
    /// Context at the global scope, outside any condition.
    pub fn new(file: &'a ParsedFile) -> Self {
        Self {
            file,
            scope: file.semantic().global_scope(),
            in_condition: false,
        }
    }

    pub(crate) fn at(file: &'a ParsedFile, scope: ScopeId, in_condition: bool) -> Self {
        Self {
            file,
            scope,
            in_condition,
        }
    }

    pub(crate) fn entering_condition(self) -> Self {
        Self {
            in_condition: true,
            ..self
        }
    }

    pub fn file(&self) -> &'a ParsedFile {
        self.file
    }

    pub fn filename(&self) -> &'a str {
        &self.file.metadata().filename
    }

    pub fn model(&self) -> &'a SemanticModel {
        self.file.semantic()
    }

    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    /// True inside an `if`/`while`/`do`/`for` condition or the condition
    /// of a `?:`, at any depth.
    pub fn in_condition(&self) -> bool {
        self.in_condition
    }

    pub fn classify(&self, expr: &Expr) -> ValueClass {
        semantic::classify(self.model(), expr, self.scope)
    }

    pub fn classify_variable(&self, name: &str) -> VariableType {
        self.model().classify_variable(name, self.scope)
    }

    pub fn resolve_call(&self, callee: &Callee) -> Option<&'a FunctionDecl> {
        self.model().resolve_call(callee, self.scope)
    }

    pub fn bool_returning_call<'e>(&self, expr: &'e Expr) -> Option<&'e Expr> {
        semantic::bool_returning_call(self.model(), expr, self.scope)
    }

    pub fn bool_variable_name<'e>(&self, expr: &'e Expr) -> Option<&'e str> {
        semantic::bool_variable_name(self.model(), expr, self.scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_provides_file_reference() {
        let parsed = ParsedFile::from_source("test.cpp", "int x = 1;");
        let ctx = VisitorContext::new(&parsed);

        assert_eq!(ctx.filename(), "test.cpp");
        assert!(!ctx.in_condition());
        assert_eq!(ctx.scope(), parsed.semantic().global_scope());
    }

    #[test]
    fn classify_variable_uses_scope() {
        let parsed = ParsedFile::from_source("test.cpp", "bool flag;\nint *ptr;");
        let ctx = VisitorContext::new(&parsed);

        assert_eq!(ctx.classify_variable("flag"), VariableType::Boolean);
        assert_eq!(ctx.classify_variable("ptr"), VariableType::Pointer);
        assert_eq!(ctx.classify_variable("missing"), VariableType::Other);
    }

    #[test]
    fn entering_condition_keeps_scope() {
        let parsed = ParsedFile::from_source("test.cpp", "");
        let ctx = VisitorContext::new(&parsed).entering_condition();

        assert!(ctx.in_condition());
        assert_eq!(ctx.scope(), parsed.semantic().global_scope());
    }
}
