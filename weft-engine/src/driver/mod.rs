//! The weaving driver: the host runtime's single entry point into the
//! engine.
//!
//! The driver owns the aggregating factory, the match cache, and the
//! telemetry counters, and runs the per-type pipeline: global pre-filter
//! gates, cache lookup, factory query, cache insert. It computes match
//! results only; applying them to actual type definitions belongs to the
//! host's transformer.

use std::sync::Arc;

use weft_core::config::WeaveConfig;
use weft_core::errors::ConfigError;
use weft_core::telemetry::{CountersSnapshot, WeaveCounters};
use weft_core::types::descriptors::TypeDescriptor;

use crate::advice::{AdviceChain, BehaviorRegistry};
use crate::cache::{MarkOutcome, MatchCache, TypeMatchEntry};
use crate::catalog::NameFilter;
use crate::expr::TypeUniverse;
use crate::factory::{AggregatingFactory, ApplicationDefinition};
use crate::scope::Scope;

pub struct WeavingDriver {
    scope_gate: NameFilter,
    type_gate: NameFilter,
    factory: AggregatingFactory,
    cache: MatchCache,
    counters: Arc<WeaveCounters>,
}

impl WeavingDriver {
    /// Build the driver: global gates, then every application factory.
    /// Fails only on invalid configuration or when no usable application
    /// remains.
    pub fn new(
        config: &WeaveConfig,
        definitions: Vec<ApplicationDefinition>,
        behaviors: &BehaviorRegistry,
        universe: Arc<dyn TypeUniverse>,
    ) -> Result<Self, ConfigError> {
        let scope_gate = NameFilter::from_patterns("global.scopes", &config.global.scopes)?;
        let type_gate = NameFilter::from_patterns("global.types", &config.global.types)?;
        let counters = Arc::new(WeaveCounters::new());
        let factory = AggregatingFactory::build(
            config,
            definitions,
            behaviors,
            universe,
            counters.clone(),
        )?;
        tracing::info!(
            applications = factory.application_count(),
            "weaving driver initialized"
        );
        Ok(Self {
            scope_gate,
            type_gate,
            factory,
            cache: MatchCache::new(),
            counters,
        })
    }

    /// Global pre-filter: should this type be considered at all? Cheap
    /// name-only check, run before any descriptor is built. Applications
    /// apply their own narrower gates on top.
    pub fn should_accept(&self, scope: &Scope, type_name: &str) -> bool {
        self.counters.record_type_seen();
        let accepted = self.scope_gate.accepts(scope.name()) && self.type_gate.accepts(type_name);
        if accepted {
            self.counters.record_type_accepted();
        }
        accepted
    }

    /// Full match computation for one type under one scope.
    ///
    /// Answers from the cache when possible. A type matching nothing
    /// returns `None` and is deliberately not cached; the factory-side
    /// gates already make recomputing a non-match cheap, and never caching
    /// non-matches is what keeps the cache proportional to the (small)
    /// matched population.
    pub fn compute_advice(
        &self,
        scope: &Arc<Scope>,
        ty: &TypeDescriptor,
    ) -> Option<Arc<TypeMatchEntry>> {
        if let Some(entry) = self.cache.lookup(scope, &ty.name) {
            self.counters.record_cache_hit();
            return Some(entry);
        }

        let members = self.factory.advice_for_type(ty, scope);
        if members.is_empty() {
            return None;
        }

        self.counters.record_type_matched();
        tracing::debug!(
            scope = %scope.name(),
            ty = %ty.name,
            members = members.len(),
            "type matched, caching advice"
        );
        let entry = Arc::new(TypeMatchEntry::new(members));
        Some(self.cache.insert_if_absent(scope, &ty.name, entry))
    }

    /// Cache-only read of one member's advice chain. Never triggers
    /// computation, so it is safe on any thread at any time.
    pub fn advice_chain(
        &self,
        scope: &Arc<Scope>,
        type_name: &str,
        member: &str,
    ) -> Option<AdviceChain> {
        self.cache
            .lookup(scope, type_name)
            .and_then(|entry| entry.chain(member).cloned())
    }

    /// Record that the host transformer has woven the type. Weaving the
    /// same type twice under one scope indicates a host-side defect and is
    /// logged as anomalous, not treated as an error.
    pub fn mark_transformed(&self, scope: &Arc<Scope>, type_name: &str) {
        match self.cache.mark_transformed(scope, type_name) {
            MarkOutcome::First => {}
            MarkOutcome::AlreadyTransformed => {
                self.counters.record_anomalous_reweave();
                tracing::warn!(
                    scope = %scope.name(),
                    ty = %type_name,
                    "re-weave of an already-woven type"
                );
            }
            MarkOutcome::NotFound => {
                tracing::warn!(
                    scope = %scope.name(),
                    ty = %type_name,
                    "woven type has no cached match entry"
                );
            }
        }
    }

    /// Drop a cached match result, forcing recomputation on next query.
    pub fn invalidate(&self, scope: &Arc<Scope>, type_name: &str) {
        self.cache.remove(scope, type_name);
    }

    /// Drop cache slots for scopes the host runtime has discarded.
    pub fn prune_dead_scopes(&self) -> usize {
        self.cache.prune_dead_scopes()
    }

    pub fn counters(&self) -> CountersSnapshot {
        self.counters.snapshot()
    }

    /// Number of cached type entries across all scopes (diagnostics).
    pub fn cached_type_count(&self) -> usize {
        self.cache.entry_count()
    }

    pub fn factory(&self) -> &AggregatingFactory {
        &self.factory
    }

    /// Shut the driver down, releasing the factory and the cache.
    pub fn close(self) {
        let snapshot = self.counters.snapshot();
        tracing::info!(
            types_seen = snapshot.types_seen,
            types_matched = snapshot.types_matched,
            cache_hits = snapshot.cache_hits,
            "closing weaving driver"
        );
        self.factory.close();
    }
}
