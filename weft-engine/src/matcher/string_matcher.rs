//! Boolean string matchers over wildcard pattern sets.

use regex::RegexSet;
use weft_core::errors::ConfigError;

use super::patterns::pattern_to_regex_source;

/// A predicate over names, built once from validated patterns.
///
/// Constant variants keep the hot path branch-free for the common cases
/// "no include filter configured" and "no exclude filter configured".
#[derive(Debug, Clone)]
pub enum StringMatcher {
    /// Constant matcher: always the given answer.
    Always(bool),
    /// Disjunction over a compiled pattern set, with optional polarity flip.
    Set { set: RegexSet, negate: bool },
    /// All inner matchers must accept.
    All(Vec<StringMatcher>),
    /// At least one inner matcher must accept.
    Any(Vec<StringMatcher>),
    /// Inverts the inner matcher.
    Not(Box<StringMatcher>),
}

impl StringMatcher {
    pub fn always(value: bool) -> Self {
        Self::Always(value)
    }

    /// Fast-path shortcut: `Some(answer)` when this matcher is constant.
    pub fn constant(&self) -> Option<bool> {
        match self {
            Self::Always(v) => Some(*v),
            _ => None,
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::Always(v) => *v,
            Self::Set { set, negate } => set.is_match(value) != *negate,
            Self::All(inner) => inner.iter().all(|m| m.matches(value)),
            Self::Any(inner) => inner.iter().any(|m| m.matches(value)),
            Self::Not(inner) => !inner.matches(value),
        }
    }
}

/// Build a string matcher from wildcard patterns.
///
/// `context_key` names the configuration entry the patterns came from, so a
/// validation failure is attributable to its source. An empty pattern set
/// degenerates to a constant matcher: `allow_empty` picks whether the empty
/// set accepts everything, and `negate` then flips the polarity (of both the
/// constant and the compiled set).
pub fn string_matcher(
    context_key: &str,
    patterns: &[String],
    negate: bool,
    allow_empty: bool,
) -> Result<StringMatcher, ConfigError> {
    if patterns.is_empty() {
        return Ok(StringMatcher::always(allow_empty != negate));
    }

    let mut sources = Vec::with_capacity(patterns.len());
    for pattern in patterns {
        let source =
            pattern_to_regex_source(pattern).map_err(|reason| ConfigError::InvalidPattern {
                context_key: context_key.to_string(),
                pattern: pattern.clone(),
                reason,
            })?;
        sources.push(source);
    }

    let set = RegexSet::new(&sources).map_err(|e| ConfigError::InvalidPattern {
        context_key: context_key.to_string(),
        pattern: patterns.join(","),
        reason: e.to_string(),
    })?;

    Ok(StringMatcher::Set { set, negate })
}
