//! Error taxonomy for the weaving engine.
//!
//! Only `ConfigError` is allowed to escape to callers, and only at startup.
//! Everything else is recovered locally and degrades to "fewer matches".

pub mod config_error;
pub mod error_code;
pub mod weave_error;

pub use config_error::ConfigError;
pub use error_code::WeftErrorCode;
pub use weave_error::{ExpressionError, WeaveError};
