//! compare-bool-with-int rule (B005): a boolean variable or literal
//! compared with an integer

use std::ops::ControlFlow;

use super::{RELATIONAL_RISK, is_zero_or_one};
use crate::declare_rule;
use crate::diagnostic::Diagnostic;
use crate::parser::ParsedFile;
use crate::rules::{Rule, RuleMetadata};
use crate::semantic::ValueClass;
use crate::syntax::{BinaryOp, Expr};
use crate::visitor::{ExprVisitor, VisitorContext, walk_file};

const WITH_INTEGER: &str = "Comparison of a boolean with an integer.";
const NEITHER_ONE_NOR_ZERO: &str =
    "Comparison of a boolean with an integer that is neither 1 nor 0.";
const RELATIONAL: &str =
    "Comparison of a boolean value using relational operator (<, >, <= or >=).";

declare_rule!(
    BoolWithInt,
    id = "B005",
    name = "compare-bool-with-int",
    description = "Boolean variable or literal compared with an integer",
    severity = Warning,
    examples = "// Bad\nif (flag == 10) {}\nif (count > false) {}\n\n// Good\nif (flag) {}\nif (count > 0) {}"
);

impl Rule for BoolWithInt {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, file: &ParsedFile) -> Vec<Diagnostic> {
        let mut visitor = BoolWithIntVisitor {
            metadata: &self.metadata,
            diagnostics: Vec::new(),
        };
        walk_file(file, &mut visitor);
        visitor.diagnostics
    }
}

struct BoolWithIntVisitor<'a> {
    metadata: &'a RuleMetadata,
    diagnostics: Vec<Diagnostic>,
}

/// Symmetric in operand order; `boolean` is the boolean-typed side.
fn finding(op: BinaryOp, boolean: ValueClass, other: ValueClass) -> Option<&'static str> {
    use ValueClass::{BoolLiteral, BoolVariable, IntVariable, NumberLiteral};

    match (boolean, other) {
        (BoolVariable, NumberLiteral(value)) if op.is_equality() => {
            (!is_zero_or_one(value)).then_some(NEITHER_ONE_NOR_ZERO)
        }
        (BoolVariable, NumberLiteral(_))
        | (BoolVariable, IntVariable)
        | (BoolLiteral(_), IntVariable)
        | (BoolLiteral(_), NumberLiteral(_)) => Some(WITH_INTEGER),
        (BoolLiteral(_), BoolVariable) if op.is_relational() => Some(RELATIONAL),
        _ => None,
    }
}

fn explanation(message: &str) -> String {
    if message == RELATIONAL {
        format!("The result of the expression is of type 'bool'. {RELATIONAL_RISK}")
    } else {
        "A boolean value is 0 or 1. Comparing it with an integer is suspicious; compare with true or false, or convert the integer explicitly.".to_string()
    }
}

impl ExprVisitor for BoolWithIntVisitor<'_> {
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
        let message =
            finding(op, left_class, right_class).or_else(|| finding(op, right_class, left_class));

        if let Some(message) = message {
            let diagnostic = self
                .metadata
                .diagnostic(message, ctx.filename(), node.line, node.column)
                .with_explanation(explanation(message));
            self.diagnostics.push(diagnostic);
        }
        ControlFlow::Continue(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_rule(params: &str, condition: &str) -> Vec<String> {
        let code = format!("void f({params}) {{\n    if ({condition}) {{\n    }}\n}}");
        let file = ParsedFile::from_source("test.cpp", &code);
        BoolWithInt::new()
            .check(&file)
            .into_iter()
            .map(|d| d.message)
            .collect()
    }

    #[test]
    fn boolean_variable_against_literal() {
        assert_eq!(run_rule("bool x", "x < 10"), vec![WITH_INTEGER]);
        assert_eq!(run_rule("bool x", "10 >= x"), vec![WITH_INTEGER]);
        assert_eq!(run_rule("bool x", "x != 10"), vec![NEITHER_ONE_NOR_ZERO]);
        assert_eq!(run_rule("bool x", "x == 10"), vec![NEITHER_ONE_NOR_ZERO]);
        assert!(run_rule("bool x", "x != 0").is_empty());
        assert!(run_rule("bool x", "x == 1").is_empty());
    }

    #[test]
    fn boolean_variable_against_integer_variable() {
        assert_eq!(run_rule("bool x, int y", "x == y"), vec![WITH_INTEGER]);
        assert_eq!(run_rule("int x, bool y", "x == y"), vec![WITH_INTEGER]);
        assert!(run_rule("bool x, bool y", "x == y").is_empty());
        assert!(run_rule("bool x, fooClass y", "x == y").is_empty());
    }

    #[test]
    fn boolean_literal_against_integer() {
        assert_eq!(run_rule("int y", "y > false"), vec![WITH_INTEGER]);
        assert_eq!(run_rule("int y", "true == y"), vec![WITH_INTEGER]);
        assert_eq!(run_rule("bool y", "false < 5"), vec![WITH_INTEGER]);
        assert!(run_rule("bool y", "y == true").is_empty());
    }

    #[test]
    fn boolean_literal_against_boolean_variable() {
        for condition in [
            "x > false",
            "false < x",
            "x < false",
            "false > x",
            "x >= false",
            "false >= x",
            "x <= false",
            "false <= x",
        ] {
            assert_eq!(run_rule("bool x", condition), vec![RELATIONAL], "{condition}");
        }
    }

    #[test]
    fn explicit_cast_suppresses() {
        assert!(run_rule("bool b, int i", "b == (bool)i").is_empty());
    }
}
