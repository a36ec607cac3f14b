//! Output formatters for diagnostic display

pub mod json;
pub mod text;
