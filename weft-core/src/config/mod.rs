//! Configuration types.

pub mod weave_config;

pub use weave_config::{ApplicationConfig, GlobalConfig, PatternSet, WeaveConfig};
