//! increment-boolean rule (B002): postfix `++` on a `bool`

use std::ops::ControlFlow;

use crate::declare_rule;
use crate::diagnostic::Diagnostic;
use crate::parser::ParsedFile;
use crate::rules::{Rule, RuleMetadata};
use crate::semantic::VariableType;
use crate::syntax::{Expr, UnaryOp};
use crate::visitor::{ExprVisitor, VisitorContext, walk_file};

const MESSAGE: &str = "Incrementing a variable of type 'bool' with postfix operator++ is deprecated by the C++ Standard. You should assign it the value 'true' instead.";

const EXPLANATION: &str = "The operand of a postfix increment operator may be of type bool but it is deprecated by the C++ Standard (Annex D-1) and the operand is always set to true. You should assign it the value 'true' instead.";

declare_rule!(
    IncrementBoolean,
    id = "B002",
    name = "increment-boolean",
    description = "Postfix increment of a boolean variable",
    severity = Style,
    examples = "// Bad\nfound++;\n\n// Good\nfound = true;"
);

impl Rule for IncrementBoolean {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, file: &ParsedFile) -> Vec<Diagnostic> {
        let mut visitor = IncrementBooleanVisitor {
            metadata: &self.metadata,
            diagnostics: Vec::new(),
        };
        walk_file(file, &mut visitor);
        visitor.diagnostics
    }
}

struct IncrementBooleanVisitor<'a> {
    metadata: &'a RuleMetadata,
    diagnostics: Vec<Diagnostic>,
}

impl ExprVisitor for IncrementBooleanVisitor<'_> {
    fn visit_unary(
        &mut self,
        node: &Expr,
        op: UnaryOp,
        operand: &Expr,
        ctx: &VisitorContext,
    ) -> ControlFlow<()> {
        if op != UnaryOp::PostIncrement {
            return ControlFlow::Continue(());
        }
        let Some(name) = operand.variable_name() else {
            return ControlFlow::Continue(());
        };
        if ctx.classify_variable(name) == VariableType::Boolean {
            let diagnostic = self
                .metadata
                .diagnostic(MESSAGE, ctx.filename(), node.line, node.column)
                .with_explanation(EXPLANATION)
                .with_suggestion(format!("Replace '{name}++' with '{name} = true'"));
            self.diagnostics.push(diagnostic);
        }
        ControlFlow::Continue(())
    }
}
