//! ExprVisitor trait for uniform expression traversal.

use std::ops::ControlFlow;

use super::context::VisitorContext;
use crate::syntax::{BinaryOp, Callee, Expr, UnaryOp};

/// Callbacks receive the node itself followed by its destructured parts.
pub trait ExprVisitor {
    fn visit_binary(
        &mut self,
        _node: &Expr,
        _op: BinaryOp,
        _left: &Expr,
        _right: &Expr,
        _ctx: &VisitorContext,
    ) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    fn visit_unary(
        &mut self,
        _node: &Expr,
        _op: UnaryOp,
        _operand: &Expr,
        _ctx: &VisitorContext,
    ) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    fn visit_assign(
        &mut self,
        _node: &Expr,
        _compound: bool,
        _target: &Expr,
        _value: &Expr,
        _ctx: &VisitorContext,
    ) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    fn visit_call(
        &mut self,
        _node: &Expr,
        _callee: &Callee,
        _args: &[Expr],
        _ctx: &VisitorContext,
    ) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}
