//! compare-bool-with-bool rule (B007): relational comparison of two
//! boolean variables

use std::ops::ControlFlow;

use super::RELATIONAL_RISK;
use crate::declare_rule;
use crate::diagnostic::Diagnostic;
use crate::parser::ParsedFile;
use crate::rules::{Rule, RuleMetadata};
use crate::semantic::VariableType;
use crate::syntax::{BinaryOp, Expr};
use crate::visitor::{ExprVisitor, VisitorContext, walk_file};

const MESSAGE: &str = "Comparison of a variable having boolean value using relational (<, >, <= or >=) operator.";

declare_rule!(
    BoolWithBool,
    id = "B007",
    name = "compare-bool-with-bool",
    description = "Relational comparison of two boolean variables",
    severity = Style,
    experimental = true,
    examples = "// Bad\nif (a > b) {}\n\n// Good\nif (a && !b) {}"
);

impl Rule for BoolWithBool {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, file: &ParsedFile) -> Vec<Diagnostic> {
        let mut visitor = BoolWithBoolVisitor {
            metadata: &self.metadata,
            diagnostics: Vec::new(),
        };
        walk_file(file, &mut visitor);
        visitor.diagnostics
    }
}

struct BoolWithBoolVisitor<'a> {
    metadata: &'a RuleMetadata,
    diagnostics: Vec<Diagnostic>,
}

impl ExprVisitor for BoolWithBoolVisitor<'_> {
    fn visit_binary(
        &mut self,
        node: &Expr,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
        ctx: &VisitorContext,
    ) -> ControlFlow<()> {
        if !op.is_relational() {
            return ControlFlow::Continue(());
        }
        let is_bool = |expr: &Expr| {
            expr.variable_name()
                .is_some_and(|name| ctx.classify_variable(name) == VariableType::Boolean)
        };
        if !(is_bool(left) && is_bool(right)) {
            return ControlFlow::Continue(());
        }

        let name = left.variable_name().unwrap_or_default();
        let diagnostic = self
            .metadata
            .diagnostic(MESSAGE, ctx.filename(), node.line, node.column)
            .with_explanation(format!(
                "The variable '{name}' is of type 'bool'. {RELATIONAL_RISK}"
            ));
        self.diagnostics.push(diagnostic);
        ControlFlow::Continue(())
    }
}
