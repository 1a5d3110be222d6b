//! # weft-engine
//!
//! The aspect resolution and matching engine. Turns declarative
//! specifications into resolvable advice repositories, matches them against
//! incoming types and members, caches results per isolation scope, and
//! exposes the query surface the external code transformer drives.
//!
//! Pipeline, leaves first: matchers → pointcut expressions → specification
//! catalog → repository resolution → per-application factories → the
//! aggregating factory → match cache → weaving driver.

pub mod advice;
pub mod cache;
pub mod catalog;
pub mod driver;
pub mod expr;
pub mod factory;
pub mod matcher;
pub mod repository;
pub mod scope;

// Re-export the most commonly used types at the crate root.
pub use advice::{Advice, AdviceChain, AdviceRef, BehaviorDefinition, BehaviorRegistry, EntryPoint};
pub use cache::{MatchCache, TypeMatchEntry};
pub use catalog::{Catalog, Pointcut, SpecKind, Specification};
pub use driver::WeavingDriver;
pub use expr::{CompiledPointcut, InMemoryUniverse, TypeUniverse};
pub use factory::{
    AggregatingFactory, ApplicationBuilder, ApplicationDefinition, ApplicationFactory,
    MemberAdviceMap,
};
pub use scope::Scope;
