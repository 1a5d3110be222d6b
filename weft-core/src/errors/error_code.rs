//! Stable error codes for downstream attribution.

/// Implemented by every error enum in the workspace. Codes are stable
/// identifiers — logs and host tooling key on them, so never rename one.
pub trait WeftErrorCode {
    fn error_code(&self) -> &'static str;
}
