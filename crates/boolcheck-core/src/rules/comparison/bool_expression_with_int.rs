//! compare-bool-expression-with-int rule (B004): a boolean expression
//! compared with an integer

use std::ops::ControlFlow;

use super::is_zero_or_one;
use crate::declare_rule;
use crate::diagnostic::Diagnostic;
use crate::parser::ParsedFile;
use crate::rules::{Rule, RuleMetadata};
use crate::semantic::ValueClass;
use crate::syntax::{BinaryOp, Expr};
use crate::visitor::{ExprVisitor, VisitorContext, walk_file};

const OUT_OF_RANGE: &str =
    "Comparison of a boolean expression with an integer other than 0 or 1.";
const WITH_INTEGER: &str = "Comparison of a boolean expression with an integer.";

const EXPLANATION: &str = "The result of a boolean expression is either 0 or 1. Comparing it with an integer is suspicious and usually means the parentheses or the operator are wrong.";

declare_rule!(
    BoolExpressionWithInt,
    id = "B004",
    name = "compare-bool-expression-with-int",
    description = "Boolean expression compared with an integer",
    severity = Warning,
    examples = "// Bad\nif (!x == 10) {}\n\n// Good\nif (x != 10) {}"
);

impl Rule for BoolExpressionWithInt {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, file: &ParsedFile) -> Vec<Diagnostic> {
        let mut visitor = BoolExpressionWithIntVisitor {
            metadata: &self.metadata,
            diagnostics: Vec::new(),
        };
        walk_file(file, &mut visitor);
        visitor.diagnostics
    }
}

struct BoolExpressionWithIntVisitor<'a> {
    metadata: &'a RuleMetadata,
    diagnostics: Vec<Diagnostic>,
}

/// Message for `<bool expression> op <other>`, with the boolean
/// expression already moved to the left.
fn finding(op: BinaryOp, other: ValueClass) -> Option<&'static str> {
    match other {
        ValueClass::NumberLiteral(value) if op.is_equality() => {
            (!is_zero_or_one(value)).then_some(OUT_OF_RANGE)
        }
        ValueClass::NumberLiteral(value) => {
            let always_defined = matches!(
                (op, value),
                (BinaryOp::Gt, Some(0)) | (BinaryOp::Lt, Some(1))
            );
            (!always_defined).then_some(OUT_OF_RANGE)
        }
        ValueClass::IntVariable if op.is_equality() => Some(WITH_INTEGER),
        _ => None,
    }
}

impl ExprVisitor for BoolExpressionWithIntVisitor<'_> {
    fn visit_binary(
        &mut self,
        node: &Expr,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
        ctx: &VisitorContext,
    ) -> ControlFlow<()> {
        if !op.is_comparison() {
            return ControlFlow::Continue(());
        }

        let left_class = ctx.classify(left);
        let right_class = ctx.classify(right);
        let message = match (left_class, right_class) {
            (ValueClass::BoolExpr, ValueClass::BoolExpr) => None,
            (ValueClass::BoolExpr, other) => finding(op, other),
            (other, ValueClass::BoolExpr) => finding(op.mirrored(), other),
            _ => None,
        };

        if let Some(message) = message {
            let diagnostic = self
                .metadata
                .diagnostic(message, ctx.filename(), node.line, node.column)
                .with_explanation(EXPLANATION);
            self.diagnostics.push(diagnostic);
        }
        ControlFlow::Continue(())
    }
}
