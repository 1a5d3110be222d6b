//! Matcher factory: composite include/exclude predicate chains for scope
//! names, type names, and member names, validated once at construction.

pub mod combinators;
pub mod patterns;
pub mod string_matcher;
pub mod type_matcher;

pub use string_matcher::{string_matcher, StringMatcher};
pub use type_matcher::{type_matcher, TypeMatcher};
