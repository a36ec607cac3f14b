//! Expression model and the lowering from the C++ syntax tree.

pub mod expr;
pub mod lower;

pub use expr::{BinaryOp, Callee, Expr, ExprKind, Literal, UnaryOp};
pub use lower::lower_expression;
