//! Workspace-wide constants.

/// Name of the implicit static-initializer pseudo-member every type exposes.
pub const STATIC_INITIALIZER: &str = "<clinit>";

/// Name of the sentinel scope used when the host runtime supplies none.
pub const DEFAULT_SCOPE_NAME: &str = "<default>";

/// Name of the throwaway scope used for repository validation at startup.
pub const VALIDATION_SCOPE_NAME: &str = "<validation>";

/// Order weight assigned to specifications that declare none ("apply last").
pub const DEFAULT_ORDER: i32 = i32::MAX;
