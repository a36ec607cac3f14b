//! Expression classification used by the comparison rules.

use super::{ReturnKind, ScopeId, SemanticModel, VariableType};
use crate::syntax::{Callee, Expr, ExprKind, Literal, UnaryOp};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueClass {
    BoolLiteral(bool),
    /// Variable declared `bool`.
    BoolVariable,
    /// Variable of a standard arithmetic type.
    IntVariable,
    /// Integer literal; `None` when the value is unknown (floats, overflow).
    NumberLiteral(Option<u64>),
    /// Boolean by operator or by a resolved `bool` callee.
    BoolExpr,
    /// Explicit conversion to `bool`.
    BoolCast,
    Other,
}

impl ValueClass {
    pub fn is_boolean(self) -> bool {
        matches!(
            self,
            ValueClass::BoolLiteral(_)
                | ValueClass::BoolVariable
                | ValueClass::BoolExpr
                | ValueClass::BoolCast
        )
    }
}

pub fn classify(model: &SemanticModel, expr: &Expr, scope: ScopeId) -> ValueClass {
    match &expr.kind {
        ExprKind::Literal(Literal::Bool(value)) => ValueClass::BoolLiteral(*value),
        ExprKind::Literal(Literal::Number(value)) => ValueClass::NumberLiteral(*value),
        ExprKind::Variable(name) => match model.classify_variable(name, scope) {
            VariableType::Boolean => ValueClass::BoolVariable,
            VariableType::Integer => ValueClass::IntVariable,
            VariableType::Pointer | VariableType::Other => ValueClass::Other,
        },
        ExprKind::Unary {
            op: UnaryOp::Not, ..
        } => ValueClass::BoolExpr,
        ExprKind::Binary { op, .. } if op.is_logical() || op.is_comparison() => {
            ValueClass::BoolExpr
        }
        ExprKind::Call { callee, .. } if returns_bool(model, callee, scope) => ValueClass::BoolExpr,
        ExprKind::Cast { to_bool: true, .. } => ValueClass::BoolCast,
        _ => ValueClass::Other,
    }
}

fn returns_bool(model: &SemanticModel, callee: &Callee, scope: ScopeId) -> bool {
    model
        .resolve_call(callee, scope)
        .is_some_and(|decl| decl.return_kind == ReturnKind::Boolean)
}

/// The call under at most one `!` when it resolves to a function
/// returning `bool`.
pub fn bool_returning_call<'e>(
    model: &SemanticModel,
    expr: &'e Expr,
    scope: ScopeId,
) -> Option<&'e Expr> {
    let inner = expr.strip_not();
    match &inner.kind {
        ExprKind::Call { callee, .. } if returns_bool(model, callee, scope) => Some(inner),
        _ => None,
    }
}

/// Variable declared `bool`, optionally under one `!`.
pub fn bool_variable_name<'e>(
    model: &SemanticModel,
    expr: &'e Expr,
    scope: ScopeId,
) -> Option<&'e str> {
    let name = expr.strip_not().variable_name()?;
    (model.classify_variable(name, scope) == VariableType::Boolean).then_some(name)
}
