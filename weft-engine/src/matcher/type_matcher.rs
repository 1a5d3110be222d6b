//! Type matchers: name-pattern predicates over type descriptors with a
//! cheap conservative pre-filter.

use aho_corasick::AhoCorasick;
use weft_core::errors::ConfigError;
use weft_core::types::collections::FxHashMap;
use weft_core::types::descriptors::TypeDescriptor;

use super::patterns::{expand_placeholders, literal_prefix};
use super::string_matcher::{string_matcher, StringMatcher};

/// Predicate over type descriptors.
///
/// `fast_match` uses an Aho-Corasick automaton over the patterns' literal
/// prefixes as a conservative pre-filter: it may answer true for a type the
/// full match rejects, never false for one it accepts.
#[derive(Debug, Clone)]
pub struct TypeMatcher {
    name: StringMatcher,
    prefilter: Option<AhoCorasick>,
}

impl TypeMatcher {
    pub fn always(value: bool) -> Self {
        Self {
            name: StringMatcher::always(value),
            prefilter: None,
        }
    }

    pub fn matches(&self, ty: &TypeDescriptor) -> bool {
        self.name.matches(&ty.name)
    }

    pub fn matches_name(&self, name: &str) -> bool {
        self.name.matches(name)
    }

    /// Conservative type-level pre-filter.
    pub fn fast_match(&self, ty: &TypeDescriptor) -> bool {
        match &self.prefilter {
            Some(ac) => ac.is_match(&ty.name),
            None => match self.name.constant() {
                Some(answer) => answer,
                // No usable prefixes: cannot cheaply reject, so maybe.
                None => true,
            },
        }
    }

    pub fn constant(&self) -> Option<bool> {
        self.name.constant()
    }
}

/// Build a type matcher from wildcard name patterns.
///
/// `${key}` placeholders in the patterns are substituted from
/// `placeholders` before compilation; an unresolvable key fails
/// construction, attributed to the context key. The pre-filter is only
/// installed when every expanded pattern has a non-empty literal prefix and
/// the matcher is not negated; otherwise prefix absence proves nothing and
/// `fast_match` degrades to "maybe".
pub fn type_matcher(
    context_key: &str,
    patterns: &[String],
    negate: bool,
    allow_empty: bool,
    placeholders: &FxHashMap<String, String>,
) -> Result<TypeMatcher, ConfigError> {
    let mut expanded = Vec::with_capacity(patterns.len());
    for pattern in patterns {
        let value = expand_placeholders(pattern, placeholders).map_err(|reason| {
            ConfigError::InvalidPattern {
                context_key: context_key.to_string(),
                pattern: pattern.clone(),
                reason,
            }
        })?;
        expanded.push(value);
    }

    let name = string_matcher(context_key, &expanded, negate, allow_empty)?;

    let prefilter = if negate || expanded.is_empty() {
        None
    } else {
        let prefixes: Vec<&str> = expanded.iter().map(|p| literal_prefix(p)).collect();
        if prefixes.iter().any(|p| p.is_empty()) {
            None
        } else {
            // Build failure is not fatal: fall back to full matching.
            AhoCorasick::new(&prefixes).ok()
        }
    };

    Ok(TypeMatcher { name, prefilter })
}
