//! Name filters: include/exclude pattern pairs applied to specification,
//! advice, and application names.

use weft_core::config::PatternSet;
use weft_core::errors::ConfigError;

use crate::matcher::{string_matcher, StringMatcher};

/// An include/exclude filter over names. A name passes when the include
/// matcher accepts it and the exclude matcher does not.
///
/// Stacking filters from several configuration levels yields the required
/// combined semantics: a conjunction of includes and a disjunction of
/// excludes.
#[derive(Debug, Clone)]
pub struct NameFilter {
    include: StringMatcher,
    exclude: StringMatcher,
}

impl NameFilter {
    /// Build from a pattern set. `context_key` prefixes the reported
    /// location of any invalid pattern (`{context_key}.include` etc.).
    pub fn from_patterns(context_key: &str, patterns: &PatternSet) -> Result<Self, ConfigError> {
        let include = string_matcher(
            &format!("{context_key}.include"),
            &patterns.include,
            false,
            true,
        )?;
        let exclude = string_matcher(
            &format!("{context_key}.exclude"),
            &patterns.exclude,
            false,
            false,
        )?;
        Ok(Self { include, exclude })
    }

    /// A filter that passes everything.
    pub fn pass_all() -> Self {
        Self {
            include: StringMatcher::always(true),
            exclude: StringMatcher::always(false),
        }
    }

    pub fn accepts(&self, name: &str) -> bool {
        self.include.matches(name) && !self.exclude.matches(name)
    }
}

/// True when every filter in the stack accepts the name.
pub fn accepted_by_all(filters: &[&NameFilter], name: &str) -> bool {
    filters.iter().all(|f| f.accepts(name))
}
