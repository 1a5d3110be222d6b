//! # weft-core
//!
//! Foundation crate for the Weft weaving engine.
//! Defines descriptors, identifiers, errors, config, and telemetry counters.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod telemetry;
pub mod types;

// Re-export the most commonly used types at the crate root.
pub use config::{ApplicationConfig, GlobalConfig, PatternSet, WeaveConfig};
pub use errors::error_code::WeftErrorCode;
pub use errors::{ConfigError, ExpressionError, WeaveError};
pub use types::collections::{FxHashMap, FxHashSet};
pub use types::descriptors::{MemberDescriptor, MemberKind, TypeDescriptor};
pub use types::identifiers::BehaviorId;
