//! compare-function-returning-bool rule (B006): relational comparison of
//! calls to functions returning `bool`

use std::ops::ControlFlow;

use super::RELATIONAL_RISK;
use crate::declare_rule;
use crate::diagnostic::Diagnostic;
use crate::parser::ParsedFile;
use crate::rules::{Rule, RuleMetadata};
use crate::syntax::{BinaryOp, Expr, ExprKind};
use crate::visitor::{ExprVisitor, VisitorContext, walk_file};

const TWO_FUNCTIONS: &str = "Comparison of two functions returning boolean value using relational (<, >, <= or >=) operator.";
const ONE_FUNCTION: &str = "Comparison of a function returning boolean value using relational (<, >, <= or >=) operator.";

declare_rule!(
    FunctionReturningBool,
    id = "B006",
    name = "compare-function-returning-bool",
    description = "Relational comparison involving a function that returns bool",
    severity = Style,
    examples = "// Bad\nif (isReady() > isValid()) {}\n\n// Good\nif (isReady() && !isValid()) {}"
);

impl Rule for FunctionReturningBool {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, file: &ParsedFile) -> Vec<Diagnostic> {
        let mut visitor = FunctionReturningBoolVisitor {
            metadata: &self.metadata,
            diagnostics: Vec::new(),
        };
        walk_file(file, &mut visitor);
        visitor.diagnostics
    }
}

struct FunctionReturningBoolVisitor<'a> {
    metadata: &'a RuleMetadata,
    diagnostics: Vec<Diagnostic>,
}

fn callee_name(call: &Expr) -> &str {
    match &call.kind {
        ExprKind::Call { callee, .. } => callee.name().unwrap_or("?"),
        _ => "?",
    }
}

impl ExprVisitor for FunctionReturningBoolVisitor<'_> {
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

        let (message, explanation) =
            match (ctx.bool_returning_call(left), ctx.bool_returning_call(right)) {
                (Some(first), Some(second)) => (
                    TWO_FUNCTIONS,
                    format!(
                        "The return type of function '{}' and function '{}' is 'bool' and result is of type 'bool'. {RELATIONAL_RISK}",
                        callee_name(first),
                        callee_name(second)
                    ),
                ),
                (Some(call), None) | (None, Some(call)) => (
                    ONE_FUNCTION,
                    format!(
                        "The return type of function '{}' is 'bool' and result is of type 'bool'. {RELATIONAL_RISK}",
                        callee_name(call)
                    ),
                ),
                (None, None) => return ControlFlow::Continue(()),
            };

        let diagnostic = self
            .metadata
            .diagnostic(message, ctx.filename(), node.line, node.column)
            .with_explanation(explanation);
        self.diagnostics.push(diagnostic);
        ControlFlow::Continue(())
    }
}
