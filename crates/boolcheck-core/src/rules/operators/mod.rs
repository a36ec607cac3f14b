//! Rules for operators applied to boolean variables

pub mod assign_bool_to_pointer;
pub mod bitwise_on_boolean;
pub mod increment_boolean;

pub use assign_bool_to_pointer::AssignBoolToPointer;
pub use bitwise_on_boolean::BitwiseOnBoolean;
pub use increment_boolean::IncrementBoolean;
