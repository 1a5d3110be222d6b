//! Configuration errors — fatal at construction time.

use super::error_code::WeftErrorCode;

/// Errors raised while building matchers, factories, or loading config.
///
/// A `ConfigError` aborts startup of the offending application factory only;
/// it takes the whole aggregate down only when that application is the sole
/// one configured.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid pattern '{pattern}' for '{context_key}': {reason}")]
    InvalidPattern {
        context_key: String,
        pattern: String,
        reason: String,
    },

    #[error("Application '{application}' failed to start: {reason}")]
    ApplicationFailed {
        application: String,
        reason: String,
    },

    #[error("All {count} configured applications failed to start")]
    AllApplicationsFailed { count: usize },

    #[error("No applications configured")]
    NoApplications,

    #[error("Failed to parse config: {message}")]
    Parse { message: String },
}

impl WeftErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidPattern { .. } => "WEFT_CONFIG_INVALID_PATTERN",
            Self::ApplicationFailed { .. } => "WEFT_CONFIG_APPLICATION_FAILED",
            Self::AllApplicationsFailed { .. } => "WEFT_CONFIG_ALL_APPLICATIONS_FAILED",
            Self::NoApplications => "WEFT_CONFIG_NO_APPLICATIONS",
            Self::Parse { .. } => "WEFT_CONFIG_PARSE",
        }
    }
}
