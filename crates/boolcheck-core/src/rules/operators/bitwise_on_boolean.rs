//! bitwise-on-boolean rule (B001): `&` or `|` on a boolean variable in a condition

use std::ops::ControlFlow;

use crate::declare_rule;
use crate::diagnostic::Diagnostic;
use crate::parser::ParsedFile;
use crate::rules::{Rule, RuleMetadata};
use crate::syntax::{BinaryOp, Expr};
use crate::visitor::{ExprVisitor, VisitorContext, walk_file};

declare_rule!(
    BitwiseOnBoolean,
    id = "B001",
    name = "bitwise-on-boolean",
    description = "Boolean variable used in a bitwise operation inside a condition",
    severity = Style,
    confidence = Inconclusive,
    examples = "// Bad\nif (ready & valid) {}\n\n// Good\nif (ready && valid) {}"
);

impl Rule for BitwiseOnBoolean {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, file: &ParsedFile) -> Vec<Diagnostic> {
        let mut visitor = BitwiseOnBooleanVisitor {
            metadata: &self.metadata,
            diagnostics: Vec::new(),
        };
        walk_file(file, &mut visitor);
        visitor.diagnostics
    }
}

struct BitwiseOnBooleanVisitor<'a> {
    metadata: &'a RuleMetadata,
    diagnostics: Vec<Diagnostic>,
}

impl ExprVisitor for BitwiseOnBooleanVisitor<'_> {
    fn visit_binary(
        &mut self,
        node: &Expr,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
        ctx: &VisitorContext,
    ) -> ControlFlow<()> {
        if !ctx.in_condition() {
            return ControlFlow::Continue(());
        }
        let logical = match op {
            BinaryOp::BitAnd => "&&",
            BinaryOp::BitOr => "||",
            _ => return ControlFlow::Continue(()),
        };
        let Some(name) = ctx
            .bool_variable_name(left)
            .or_else(|| ctx.bool_variable_name(right))
        else {
            return ControlFlow::Continue(());
        };

        let message = format!(
            "Boolean variable '{name}' is used in bitwise operation. Did you mean '{logical}'?"
        );
        let diagnostic = self
            .metadata
            .diagnostic(&message, ctx.filename(), node.line, node.column)
            .with_explanation(message.clone())
            .with_suggestion(format!("Replace '{}' with '{logical}'", op.as_str()));
        self.diagnostics.push(diagnostic);

        ControlFlow::Continue(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Confidence, Severity};

    fn run_bitwise(code: &str) -> Vec<Diagnostic> {
        let file = ParsedFile::from_source("test.cpp", code);
        BitwiseOnBoolean::new().check(&file)
    }

    #[test]
    fn detects_bitwise_and_on_parameters() {
        let diagnostics = run_bitwise("void f(bool a, bool b) {\n    if(a & b) {}\n}");

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].line, 2);
        assert_eq!(
            diagnostics[0].message,
            "Boolean variable 'a' is used in bitwise operation. Did you mean '&&'?"
        );
        assert_eq!(diagnostics[0].confidence, Confidence::Inconclusive);
    }

    #[test]
    fn suggests_logical_or_for_bitwise_or() {
        let diagnostics = run_bitwise("void f(bool a, bool b) {\n    if(a | !b) {}\n}");

        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.ends_with("Did you mean '||'?"));
        assert_eq!(
            diagnostics[0].suggestion.as_deref(),
            Some("Replace '|' with '||'")
        );
    }

    #[test]
    fn names_the_boolean_operand() {
        let diagnostics = run_bitwise("void f(int a, bool b) {\n    if(a & b) {}\n}");

        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("'b'"));
    }

    #[test]
    fn names_negated_boolean_operand() {
        let diagnostics = run_bitwise("void f(int a, bool b) {\n    if(a & !b) {}\n}");

        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("'b'"));
    }

    #[test]
    fn ignores_integer_operands() {
        assert!(run_bitwise("void f(int a, int b) {\n    if(a & b) {}\n}").is_empty());
    }

    #[test]
    fn ignores_bitwise_outside_conditions() {
        assert!(run_bitwise("void f(bool a, bool b, int c) {\n    c = a & b;\n}").is_empty());
    }

    #[test]
    fn detects_in_ternary_condition() {
        let diagnostics = run_bitwise("int f(bool a, bool b) {\n    return (a & b) ? 1 : 0;\n}");

        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn address_of_is_not_bitwise() {
        assert!(run_bitwise("void f(bool b) {\n    foo(bar, &b);\n}").is_empty());
    }

    #[test]
    fn metadata_is_correct() {
        let rule = BitwiseOnBoolean::new();
        let metadata = rule.metadata();

        assert_eq!(metadata.id, "B001");
        assert_eq!(metadata.name, "bitwise-on-boolean");
        assert_eq!(metadata.severity, Severity::Style);
        assert_eq!(metadata.confidence, Confidence::Inconclusive);
    }
}
