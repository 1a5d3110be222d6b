//! Boolean composition of matchers without re-parsing patterns.
//!
//! Constant operands are folded away so composing with "accept all" or
//! "reject all" costs nothing at evaluation time.

use super::string_matcher::StringMatcher;

/// Both matchers must accept.
pub fn and(a: StringMatcher, b: StringMatcher) -> StringMatcher {
    match (a.constant(), b.constant()) {
        (Some(false), _) | (_, Some(false)) => StringMatcher::always(false),
        (Some(true), _) => b,
        (_, Some(true)) => a,
        _ => StringMatcher::All(vec![a, b]),
    }
}

/// At least one matcher must accept.
pub fn or(a: StringMatcher, b: StringMatcher) -> StringMatcher {
    match (a.constant(), b.constant()) {
        (Some(true), _) | (_, Some(true)) => StringMatcher::always(true),
        (Some(false), _) => b,
        (_, Some(false)) => a,
        _ => StringMatcher::Any(vec![a, b]),
    }
}

/// Inverts a matcher.
pub fn not(m: StringMatcher) -> StringMatcher {
    match m.constant() {
        Some(v) => StringMatcher::always(!v),
        None => StringMatcher::Not(Box::new(m)),
    }
}
