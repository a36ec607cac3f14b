//! assign-bool-to-pointer rule (B003): `true`/`false` assigned to a pointer

use std::ops::ControlFlow;

use crate::declare_rule;
use crate::diagnostic::Diagnostic;
use crate::parser::ParsedFile;
use crate::rules::{Rule, RuleMetadata};
use crate::semantic::VariableType;
use crate::syntax::Expr;
use crate::visitor::{ExprVisitor, VisitorContext, walk_file};

const MESSAGE: &str = "Boolean value assigned to pointer.";

declare_rule!(
    AssignBoolToPointer,
    id = "B003",
    name = "assign-bool-to-pointer",
    description = "Boolean literal assigned to a pointer variable",
    severity = Error,
    examples = "// Bad\nvoid f(bool *p) { p = false; }\n\n// Good\nvoid f(bool *p) { *p = false; }"
);

impl Rule for AssignBoolToPointer {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, file: &ParsedFile) -> Vec<Diagnostic> {
        let mut visitor = AssignBoolToPointerVisitor {
            metadata: &self.metadata,
            diagnostics: Vec::new(),
        };
        walk_file(file, &mut visitor);
        visitor.diagnostics
    }
}

struct AssignBoolToPointerVisitor<'a> {
    metadata: &'a RuleMetadata,
    diagnostics: Vec<Diagnostic>,
}

impl ExprVisitor for AssignBoolToPointerVisitor<'_> {
    fn visit_assign(
        &mut self,
        node: &Expr,
        compound: bool,
        target: &Expr,
        value: &Expr,
        ctx: &VisitorContext,
    ) -> ControlFlow<()> {
        if compound || value.bool_literal().is_none() {
            return ControlFlow::Continue(());
        }
        let Some(name) = target.variable_name() else {
            return ControlFlow::Continue(());
        };
        if ctx.classify_variable(name) == VariableType::Pointer {
            let diagnostic = self
                .metadata
                .diagnostic(MESSAGE, ctx.filename(), node.line, node.column)
                .with_explanation(MESSAGE)
                .with_suggestion(format!("Did you mean '*{name}'?"));
            self.diagnostics.push(diagnostic);
        }
        ControlFlow::Continue(())
    }
}
