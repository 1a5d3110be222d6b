//! Runtime weaving errors — recovered locally, never escape the query surface.

use super::error_code::WeftErrorCode;

/// A pointcut expression failed to parse or resolve.
///
/// Carries the full expression and the character span of the offending
/// fragment so misconfiguration is attributable to its source.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message} in '{expression}' at {}..{}", span.0, span.1)]
pub struct ExpressionError {
    pub expression: String,
    /// Byte span `(start, end)` of the offending fragment.
    pub span: (usize, usize),
    pub message: String,
}

impl ExpressionError {
    pub fn new(
        expression: impl Into<String>,
        span: (usize, usize),
        message: impl Into<String>,
    ) -> Self {
        Self {
            expression: expression.into(),
            span,
            message: message.into(),
        }
    }
}

impl WeftErrorCode for ExpressionError {
    fn error_code(&self) -> &'static str {
        "WEFT_EXPRESSION_ERROR"
    }
}

/// Errors that can occur while resolving specifications or producing advice.
#[derive(Debug, thiserror::Error)]
pub enum WeaveError {
    /// One specification failed to resolve into repositories.
    #[error("Specification '{specification}' failed to resolve: {reason}")]
    Resolution {
        specification: String,
        reason: String,
    },

    /// Advice construction failed for one behavior.
    #[error("Behavior '{behavior}' failed to instantiate: {reason}")]
    Instantiation { behavior: String, reason: String },

    /// A member predicate failed (panicked) during evaluation.
    #[error("Match evaluation failed for '{specification}' on '{member}'")]
    MatchEvaluation {
        specification: String,
        member: String,
    },

    /// An indirection specification references a behavior with no definition.
    #[error("Unknown behavior '{behavior}' referenced by '{specification}'")]
    UnknownBehavior {
        specification: String,
        behavior: String,
    },

    #[error(transparent)]
    Expression(#[from] ExpressionError),
}

impl WeftErrorCode for WeaveError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Resolution { .. } => "WEFT_RESOLUTION_FAILED",
            Self::Instantiation { .. } => "WEFT_INSTANTIATION_FAILED",
            Self::MatchEvaluation { .. } => "WEFT_MATCH_EVALUATION_FAILED",
            Self::UnknownBehavior { .. } => "WEFT_UNKNOWN_BEHAVIOR",
            Self::Expression(e) => e.error_code(),
        }
    }
}
