//! Pointcut expression sub-language.
//!
//! Declarative predicates over scope names, type names, and member names:
//!
//! ```text
//! type("com.acme.*") && member("get*") && !scope("boot")
//! ```
//!
//! Primitives: `scope("pat")`, `type("pat")`, `member("pat")`. A `type`
//! pattern may end with `+` to also match subtypes (resolved through the
//! type universe). Operators `&&`/`||`/`!` with word forms `and`/`or`/`not`,
//! precedence NOT > AND > OR, parentheses for grouping.
//!
//! Parsing and compilation fail loudly with the offending expression and
//! character span; matching never silently coerces an error to "no match".

pub mod ast;
pub mod compiled;
pub mod parser;
pub mod universe;

pub use ast::{Atom, AtomKind, Expr};
pub use compiled::CompiledPointcut;
pub use parser::parse;
pub use universe::{CachingUniverse, InMemoryUniverse, TypeUniverse};
