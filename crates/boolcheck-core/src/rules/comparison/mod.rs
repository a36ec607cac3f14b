//! Rules for comparisons that mix booleans with integers or use ordering
//! operators on boolean values

pub mod bool_expression_with_int;
pub mod bool_with_bool;
pub mod bool_with_int;
pub mod function_returning_bool;

pub use bool_expression_with_int::BoolExpressionWithInt;
pub use bool_with_bool::BoolWithBool;
pub use bool_with_int::BoolWithInt;
pub use function_returning_bool::FunctionReturningBool;

/// Shared tail of the relational-comparison explanations.
pub(crate) const RELATIONAL_RISK: &str = "Comparing 'bool' value using relational (<, >, <= or >=) operator could cause unexpected results.";

fn is_zero_or_one(value: Option<u64>) -> bool {
    matches!(value, Some(0 | 1))
}
