//! Aggregating factory: fans one query out across every configured
//! application and merges the results into a single ordered view.

use std::sync::Arc;

use rayon::prelude::*;
use weft_core::config::{ApplicationConfig, PatternSet, WeaveConfig};
use weft_core::errors::{ConfigError, WeftErrorCode};
use weft_core::telemetry::WeaveCounters;
use weft_core::types::descriptors::TypeDescriptor;

use crate::advice::BehaviorRegistry;
use crate::catalog::{Catalog, NameFilter, Specification};
use crate::expr::TypeUniverse;
use crate::scope::Scope;

use super::application::{ApplicationFactory, MemberAdviceMap};

/// One application to aggregate: its configuration plus the specification
/// catalog declared for it.
pub struct ApplicationDefinition {
    pub config: ApplicationConfig,
    pub catalog: Catalog,
}

impl ApplicationDefinition {
    pub fn new(config: ApplicationConfig, catalog: Catalog) -> Self {
        Self { config, catalog }
    }

    pub fn builder(name: impl Into<String>) -> ApplicationBuilder {
        ApplicationBuilder {
            config: ApplicationConfig::named(name),
            catalog: Catalog::new(),
        }
    }
}

/// Programmatic assembly of one application, for embedders that configure
/// in code rather than TOML.
pub struct ApplicationBuilder {
    config: ApplicationConfig,
    catalog: Catalog,
}

impl ApplicationBuilder {
    pub fn scopes(mut self, patterns: PatternSet) -> Self {
        self.config.scopes = patterns;
        self
    }

    pub fn types(mut self, patterns: PatternSet) -> Self {
        self.config.types = patterns;
        self
    }

    pub fn advice_filter(mut self, patterns: PatternSet) -> Self {
        self.config.advice = patterns;
        self
    }

    /// Append a specification. Declaration order is scan order.
    pub fn spec(mut self, spec: Specification) -> Self {
        self.catalog.push(spec);
        self
    }

    pub fn build(self) -> ApplicationDefinition {
        ApplicationDefinition::new(self.config, self.catalog)
    }
}

/// The single factory the weaving driver queries. Holds one
/// `ApplicationFactory` per surviving application, in configuration order.
pub struct AggregatingFactory {
    factories: Vec<ApplicationFactory>,
    batch_size: usize,
}

impl std::fmt::Debug for AggregatingFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AggregatingFactory")
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

impl AggregatingFactory {
    /// Build every configured application factory.
    ///
    /// Applications are first filtered by the global application-name
    /// patterns, then built in parallel batches. A failing application is
    /// logged and dropped; construction only fails outright when nothing is
    /// configured or every application fails.
    pub fn build(
        config: &WeaveConfig,
        definitions: Vec<ApplicationDefinition>,
        behaviors: &BehaviorRegistry,
        universe: Arc<dyn TypeUniverse>,
        counters: Arc<WeaveCounters>,
    ) -> Result<Self, ConfigError> {
        let app_filter = NameFilter::from_patterns("global.applications", &config.global.applications)?;

        let selected: Vec<ApplicationDefinition> = definitions
            .into_iter()
            .filter(|def| {
                let accepted = app_filter.accepts(&def.config.name);
                if !accepted {
                    tracing::debug!(application = %def.config.name, "application filtered out");
                }
                accepted
            })
            .collect();

        if selected.is_empty() {
            return Err(ConfigError::NoApplications);
        }

        let batch_size = effective_batch(config.global.effective_batch_size(), selected.len());

        let mut factories = Vec::with_capacity(selected.len());
        let mut failures = 0usize;
        for batch in selected.chunks(batch_size) {
            let built: Vec<Result<ApplicationFactory, ConfigError>> = batch
                .par_iter()
                .map(|def| {
                    ApplicationFactory::build(
                        &def.config,
                        &config.global,
                        &def.catalog,
                        behaviors,
                        universe.clone(),
                        counters.clone(),
                    )
                    .map_err(|e| ConfigError::ApplicationFailed {
                        application: def.config.name.clone(),
                        reason: e.to_string(),
                    })
                })
                .collect();
            for result in built {
                match result {
                    Ok(factory) => factories.push(factory),
                    Err(e) => {
                        failures += 1;
                        tracing::warn!(
                            error = %e,
                            error_code = e.error_code(),
                            "application failed to build, dropping"
                        );
                    }
                }
            }
        }

        if factories.is_empty() {
            return Err(ConfigError::AllApplicationsFailed { count: failures });
        }

        tracing::info!(
            applications = factories.len(),
            failed = failures,
            batch_size,
            "aggregating factory ready"
        );

        Ok(Self {
            factories,
            batch_size,
        })
    }

    pub fn application_count(&self) -> usize {
        self.factories.len()
    }

    pub fn application(&self, name: &str) -> Option<&ApplicationFactory> {
        self.factories.iter().find(|f| f.name() == name)
    }

    /// Query every application for the type and merge the per-member chains.
    ///
    /// Chains concatenate in application configuration order, then sort
    /// stably by ascending order weight, so equal weights preserve both the
    /// application order and each application's scan order.
    pub fn advice_for_type(&self, ty: &TypeDescriptor, scope: &Arc<Scope>) -> MemberAdviceMap {
        let mut merged = MemberAdviceMap::default();
        for batch in self.factories.chunks(self.batch_size) {
            let maps: Vec<MemberAdviceMap> = batch
                .par_iter()
                .map(|factory| factory.advice_for_type(ty, scope))
                .collect();
            for map in maps {
                for (member, chain) in map {
                    merged.entry(member).or_default().extend(chain);
                }
            }
        }
        for chain in merged.values_mut() {
            chain.sort_by_key(|advice| advice.order);
        }
        merged
    }

    /// Release the factory. Per-scope advice materialized by the
    /// applications is dropped with it.
    pub fn close(self) {
        tracing::info!(applications = self.factories.len(), "closing aggregating factory");
    }
}

fn effective_batch(configured: usize, total: usize) -> usize {
    if configured == 0 {
        total.max(1)
    } else {
        configured
    }
}
