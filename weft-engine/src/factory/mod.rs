//! Advice factories: per-application resolution and querying, and the
//! aggregating fan-out the weaving driver talks to.

pub mod aggregating;
pub mod application;

pub use aggregating::{AggregatingFactory, ApplicationBuilder, ApplicationDefinition};
pub use application::{ApplicationFactory, MemberAdviceMap};
