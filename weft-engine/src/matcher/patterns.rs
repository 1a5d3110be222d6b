//! Wildcard name patterns compiled to anchored regexes.
//!
//! Pattern syntax: `*` matches any run of characters (including dots),
//! `?` matches exactly one character, everything else is literal.
//! Patterns match whole names, never substrings.

use regex::Regex;
use weft_core::types::collections::FxHashMap;

/// Substitute `${key}` placeholders in a pattern from the given map.
///
/// A `$` not followed by `{` is literal. Unknown keys and unterminated
/// placeholders are errors, so a typoed key fails construction instead of
/// silently matching nothing.
pub fn expand_placeholders(
    pattern: &str,
    placeholders: &FxHashMap<String, String>,
) -> Result<String, String> {
    if !pattern.contains("${") {
        return Ok(pattern.to_string());
    }
    let mut out = String::with_capacity(pattern.len());
    let mut rest = pattern;
    while let Some(idx) = rest.find("${") {
        out.push_str(&rest[..idx]);
        let after = &rest[idx + 2..];
        let Some(end) = after.find('}') else {
            return Err("unterminated placeholder".to_string());
        };
        let key = &after[..end];
        match placeholders.get(key) {
            Some(value) => out.push_str(value),
            None => return Err(format!("unresolved placeholder '${{{key}}}'")),
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Translate a wildcard pattern into an anchored regex source string.
/// Fails on patterns that cannot be meaningful (empty, embedded whitespace).
pub fn pattern_to_regex_source(pattern: &str) -> Result<String, String> {
    if pattern.is_empty() {
        return Err("pattern is empty".to_string());
    }
    if pattern.chars().any(char::is_whitespace) {
        return Err("pattern contains whitespace".to_string());
    }
    let mut source = String::with_capacity(pattern.len() + 8);
    source.push('^');
    for c in pattern.chars() {
        match c {
            '*' => source.push_str(".*"),
            '?' => source.push('.'),
            c => source.push_str(&regex::escape(&c.to_string())),
        }
    }
    source.push('$');
    Ok(source)
}

/// Compile a single wildcard pattern.
pub fn compile_pattern(pattern: &str) -> Result<Regex, String> {
    let source = pattern_to_regex_source(pattern)?;
    Regex::new(&source).map_err(|e| e.to_string())
}

/// The literal prefix of a pattern, up to its first wildcard.
/// Empty when the pattern starts with a wildcard.
pub fn literal_prefix(pattern: &str) -> &str {
    match pattern.find(['*', '?']) {
        Some(idx) => &pattern[..idx],
        None => pattern,
    }
}

/// Whether a pattern contains no wildcards at all.
pub fn is_literal(pattern: &str) -> bool {
    !pattern.contains(['*', '?'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_crosses_segments() {
        let re = compile_pattern("com.acme.*").unwrap();
        assert!(re.is_match("com.acme.Service"));
        assert!(re.is_match("com.acme.internal.Helper"));
        assert!(!re.is_match("org.acme.Service"));
    }

    #[test]
    fn question_mark_matches_one_char() {
        let re = compile_pattern("Foo?").unwrap();
        assert!(re.is_match("Food"));
        assert!(!re.is_match("Foo"));
        assert!(!re.is_match("Foods"));
    }

    #[test]
    fn patterns_are_anchored() {
        let re = compile_pattern("acme.*").unwrap();
        assert!(!re.is_match("com.acme.Service"));
    }

    #[test]
    fn dots_are_literal() {
        let re = compile_pattern("a.b").unwrap();
        assert!(re.is_match("a.b"));
        assert!(!re.is_match("aXb"));
    }

    #[test]
    fn empty_and_whitespace_patterns_rejected() {
        assert!(compile_pattern("").is_err());
        assert!(compile_pattern("com. acme").is_err());
    }

    #[test]
    fn placeholders_expand_from_map() {
        let mut map = FxHashMap::default();
        map.insert("app_root".to_string(), "com.acme".to_string());
        assert_eq!(
            expand_placeholders("${app_root}.internal.*", &map).unwrap(),
            "com.acme.internal.*"
        );
        // Placeholder-free patterns pass through untouched.
        assert_eq!(
            expand_placeholders("org.other.*", &map).unwrap(),
            "org.other.*"
        );
    }

    #[test]
    fn unresolved_placeholder_is_an_error() {
        let map = FxHashMap::default();
        let err = expand_placeholders("${missing}.x", &map).unwrap_err();
        assert!(err.contains("${missing}"));
        assert!(expand_placeholders("${open", &map).is_err());
    }

    #[test]
    fn literal_prefix_extraction() {
        assert_eq!(literal_prefix("com.acme.*"), "com.acme.");
        assert_eq!(literal_prefix("*.Service"), "");
        assert_eq!(literal_prefix("exact.Name"), "exact.Name");
    }
}
