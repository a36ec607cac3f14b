//! Core analysis engine for boolcheck
//!
//! Detects misuse of boolean values in C and C++ translation units: bitwise
//! operators on booleans, booleans compared with integers, increments of
//! booleans, booleans assigned to pointers and relational comparisons of
//! functions returning `bool`.

pub mod analysis;
pub mod config;
pub mod diagnostic;
pub mod disable_comments;
pub mod parser;
pub mod rules;
pub mod semantic;
pub mod syntax;
pub mod visitor;
