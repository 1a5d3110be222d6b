//! Weaving engine configuration.
//!
//! Pattern lists exist at two independently configurable levels: a global
//! level applying to every application, and per-application overrides.
//! Both levels are consulted — includes conjoin, excludes disjoin.

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::types::collections::FxHashMap;

/// An include/exclude pair of wildcard name patterns.
///
/// Patterns use `*` (any run of characters, crossing dots) and `?` (exactly
/// one character); everything else is literal.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct PatternSet {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl PatternSet {
    pub fn include(patterns: &[&str]) -> Self {
        Self {
            include: patterns.iter().map(|s| s.to_string()).collect(),
            exclude: Vec::new(),
        }
    }

    pub fn with_exclude(mut self, patterns: &[&str]) -> Self {
        self.exclude = patterns.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }
}

/// Global (process-wide) configuration level.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GlobalConfig {
    /// Isolation-scope name filter for the driver's pre-filter gate.
    pub scopes: PatternSet,
    /// Type name filter for the driver's pre-filter gate.
    pub types: PatternSet,
    /// Advice-name filter applied during every catalog scan.
    pub advice: PatternSet,
    /// Which configured applications participate at all.
    pub applications: PatternSet,
    /// Values substituted for `${key}` placeholders in type patterns.
    pub placeholders: FxHashMap<String, String>,
    /// Fan-out batch size. 0 = process all applications in one batch.
    pub batch_size: Option<usize>,
    /// Validate every repository at startup by instantiating its advice
    /// once against a throwaway scope. Default: true.
    pub validate_repositories: Option<bool>,
}

impl GlobalConfig {
    /// Effective batch size; 0 means one batch for everything.
    pub fn effective_batch_size(&self) -> usize {
        self.batch_size.unwrap_or(0)
    }

    pub fn effective_validate_repositories(&self) -> bool {
        self.validate_repositories.unwrap_or(true)
    }
}

/// Per-application configuration level.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ApplicationConfig {
    pub name: String,
    /// Scope gate evaluated inside this application's query path,
    /// independent from the driver's pre-filter gate.
    pub scopes: PatternSet,
    /// Type gate evaluated inside this application's query path.
    pub types: PatternSet,
    /// Advice-name filter for this application's catalog scan.
    pub advice: PatternSet,
}

impl ApplicationConfig {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Top-level configuration for the weaving engine.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct WeaveConfig {
    pub global: GlobalConfig,
    #[serde(rename = "application")]
    pub applications: Vec<ApplicationConfig>,
}

impl WeaveConfig {
    /// Parse a config from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Per-application config by name, if present.
    pub fn application(&self, name: &str) -> Option<&ApplicationConfig> {
        self.applications.iter().find(|a| a.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_toml() {
        let config = WeaveConfig::from_toml_str("").unwrap();
        assert!(config.applications.is_empty());
        assert_eq!(config.global.effective_batch_size(), 0);
        assert!(config.global.effective_validate_repositories());
    }

    #[test]
    fn parses_two_level_patterns() {
        let text = r#"
            [global]
            batch_size = 4
            [global.types]
            include = ["com.acme.*"]
            exclude = ["com.acme.internal.*"]

            [[application]]
            name = "billing"
            [application.advice]
            include = ["Audit*"]
        "#;
        let config = WeaveConfig::from_toml_str(text).unwrap();
        assert_eq!(config.global.effective_batch_size(), 4);
        assert_eq!(config.global.types.include, vec!["com.acme.*"]);
        let app = config.application("billing").unwrap();
        assert_eq!(app.advice.include, vec!["Audit*"]);
    }

    #[test]
    fn parses_placeholder_table() {
        let text = r#"
            [global.placeholders]
            app_root = "com.acme"

            [global.types]
            include = ["${app_root}.internal.*"]
        "#;
        let config = WeaveConfig::from_toml_str(text).unwrap();
        assert_eq!(
            config.global.placeholders.get("app_root").map(String::as_str),
            Some("com.acme")
        );
        assert_eq!(config.global.types.include, vec!["${app_root}.internal.*"]);
    }

    #[test]
    fn bad_toml_is_a_parse_error() {
        let err = WeaveConfig::from_toml_str("global = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
