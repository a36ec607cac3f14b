//! Visitor pattern for expression traversal.
//!
//! Walks every expression root of a file with the root's scope and
//! condition context.

mod context;
mod traits;

pub use context::VisitorContext;
pub use traits::ExprVisitor;

use std::ops::ControlFlow;

use crate::parser::ParsedFile;
use crate::semantic::RootContext;
use crate::syntax::{Expr, ExprKind};

struct Walker<'a, V: ExprVisitor> {
    visitor: &'a mut V,
    stopped: bool,
}

impl<V: ExprVisitor> Walker<'_, V> {
    fn walk(&mut self, expr: &Expr, ctx: &VisitorContext) {
        if self.stopped {
            return;
        }

        let flow = match &expr.kind {
            ExprKind::Binary { op, left, right } => {
                self.visitor.visit_binary(expr, *op, left, right, ctx)
            }
            ExprKind::Unary { op, operand } => self.visitor.visit_unary(expr, *op, operand, ctx),
            ExprKind::Assign {
                compound,
                target,
                value,
            } => self.visitor.visit_assign(expr, *compound, target, value, ctx),
            ExprKind::Call { callee, args } => self.visitor.visit_call(expr, callee, args, ctx),
            _ => ControlFlow::Continue(()),
        };
        if let ControlFlow::Break(()) = flow {
            self.stopped = true;
            return;
        }

        if let ExprKind::Conditional {
            condition,
            then,
            otherwise,
        } = &expr.kind
        {
            self.walk(condition, &ctx.entering_condition());
            if let Some(then) = then {
                self.walk(then, ctx);
            }
            self.walk(otherwise, ctx);
            return;
        }

        for child in expr.children() {
            self.walk(child, ctx);
        }
    }
}

/// Visits the expression roots of `file` in source order.
pub fn walk_file<V: ExprVisitor>(file: &ParsedFile, visitor: &mut V) {
    let mut walker = Walker {
        visitor,
        stopped: false,
    };
    for root in file.semantic().roots() {
        if walker.stopped {
            break;
        }
        let in_condition = root.context == RootContext::Condition;
        let ctx = VisitorContext::at(file, root.scope, in_condition);
        walker.walk(&root.expr, &ctx);
    }
}

#[cfg(test)]
mod tests {
    use std::ops::ControlFlow;

    use super::*;
    use crate::syntax::{BinaryOp, Callee};

    #[derive(Default)]
    struct BinaryCollector {
        seen: Vec<(BinaryOp, bool)>,
    }

    impl ExprVisitor for BinaryCollector {
        fn visit_binary(
            &mut self,
            _node: &Expr,
            op: BinaryOp,
            _left: &Expr,
            _right: &Expr,
            ctx: &VisitorContext,
        ) -> ControlFlow<()> {
            self.seen.push((op, ctx.in_condition()));
            ControlFlow::Continue(())
        }
    }

    #[test]
    fn visitor_tracks_condition_context() {
        let code = "void f(int a, int b) {\n  if (a & b) {}\n  a = a | b;\n  b = (a ^ b) ? 1 : 2;\n}\n";
        let parsed = ParsedFile::from_source("test.cpp", code);

        let mut collector = BinaryCollector::default();
        walk_file(&parsed, &mut collector);

        assert_eq!(
            collector.seen,
            vec![
                (BinaryOp::BitAnd, true),
                (BinaryOp::BitOr, false),
                (BinaryOp::BitXor, true),
            ]
        );
    }

    #[test]
    fn visitor_finds_all_calls() {
        let code = "void f() {\n  foo();\n  bar(1, baz());\n  obj.qux();\n}\n";
        let parsed = ParsedFile::from_source("test.cpp", code);

        struct CallCollector {
            calls: Vec<String>,
        }

        impl ExprVisitor for CallCollector {
            fn visit_call(
                &mut self,
                _node: &Expr,
                callee: &Callee,
                _args: &[Expr],
                _ctx: &VisitorContext,
            ) -> ControlFlow<()> {
                if let Some(name) = callee.name() {
                    self.calls.push(name.to_string());
                }
                ControlFlow::Continue(())
            }
        }

        let mut collector = CallCollector { calls: Vec::new() };
        walk_file(&parsed, &mut collector);

        assert_eq!(collector.calls, vec!["foo", "bar", "baz", "qux"]);
    }

    #[test]
    fn visitor_stops_on_break() {
        let code = "void f(int a) {\n  a = 1;\n  a = 2;\n}\n";
        let parsed = ParsedFile::from_source("test.cpp", code);

        struct FirstAssign {
            count: usize,
        }

        impl ExprVisitor for FirstAssign {
            fn visit_assign(
                &mut self,
                _node: &Expr,
                _compound: bool,
                _target: &Expr,
                _value: &Expr,
                _ctx: &VisitorContext,
            ) -> ControlFlow<()> {
                self.count += 1;
                ControlFlow::Break(())
            }
        }

        let mut visitor = FirstAssign { count: 0 };
        walk_file(&parsed, &mut visitor);

        assert_eq!(visitor.count, 1);
    }
}
