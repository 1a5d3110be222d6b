//! Per-application advice factory.
//!
//! One factory per independently configured bundle of specifications.
//! Construction resolves and validates everything up front so that
//! misconfiguration surfaces at startup, not at first real match.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use dashmap::DashMap;
use weft_core::config::{ApplicationConfig, GlobalConfig};
use weft_core::errors::{ConfigError, WeaveError, WeftErrorCode};
use weft_core::telemetry::WeaveCounters;
use weft_core::types::collections::FxHashMap;
use weft_core::types::descriptors::TypeDescriptor;
use weft_core::types::identifiers::ScopeId;

use crate::advice::{Advice, AdviceChain, AdviceRef, BehaviorRegistry};
use crate::catalog::{Catalog, NameFilter, ScanContext};
use crate::expr::TypeUniverse;
use crate::matcher::{string_matcher, type_matcher, StringMatcher, TypeMatcher};
use crate::repository::{Repository, ResolveContext, ResolverTable};
use crate::scope::Scope;

/// Member signature → ordered advice chain.
pub type MemberAdviceMap = FxHashMap<String, AdviceChain>;

/// One shared (non-per-instance) advice instance materialized for a scope,
/// still attached to the repository that produced it.
pub struct ScopedAdvice {
    pub repository: Arc<Repository>,
    pub advice: Arc<dyn Advice>,
}

/// Factory for one application's advice.
pub struct ApplicationFactory {
    name: String,
    scope_include: StringMatcher,
    scope_exclude: StringMatcher,
    type_include: TypeMatcher,
    type_exclude: TypeMatcher,
    /// Scan-ordered repositories; order indices break sort ties downstream.
    repositories: Vec<Arc<Repository>>,
    /// Shared advice instances per scope. The entry closure runs under the
    /// shard lock, so materialization happens exactly once per scope even
    /// under concurrent first access.
    shared: DashMap<ScopeId, Arc<Vec<ScopedAdvice>>>,
    counters: Arc<WeaveCounters>,
}

impl ApplicationFactory {
    /// Build one application factory: gates, catalog scan, repository
    /// resolution, and (unless disabled) repository validation.
    pub fn build(
        config: &ApplicationConfig,
        global: &GlobalConfig,
        catalog: &Catalog,
        behaviors: &BehaviorRegistry,
        universe: Arc<dyn TypeUniverse>,
        counters: Arc<WeaveCounters>,
    ) -> Result<Self, ConfigError> {
        let name = &config.name;

        let scope_include = string_matcher(
            &format!("application.{name}.scopes.include"),
            &config.scopes.include,
            false,
            true,
        )?;
        let scope_exclude = string_matcher(
            &format!("application.{name}.scopes.exclude"),
            &config.scopes.exclude,
            false,
            false,
        )?;
        let type_include = type_matcher(
            &format!("application.{name}.types.include"),
            &config.types.include,
            false,
            true,
            &global.placeholders,
        )?;
        let type_exclude = type_matcher(
            &format!("application.{name}.types.exclude"),
            &config.types.exclude,
            false,
            false,
            &global.placeholders,
        )?;

        let global_advice_filter = NameFilter::from_patterns("global.advice", &global.advice)?;
        let app_advice_filter =
            NameFilter::from_patterns(&format!("application.{name}.advice"), &config.advice)?;
        let filters = vec![&global_advice_filter, &app_advice_filter];

        let specs = catalog.scan(&ScanContext {
            behaviors,
            filters: filters.clone(),
        });

        let resolve_ctx = ResolveContext {
            behaviors,
            universe,
            filters,
        };
        let repositories: Vec<Arc<Repository>> = ResolverTable::standard()
            .resolve_all(&specs, &resolve_ctx)
            .into_iter()
            .map(Arc::new)
            .collect();

        tracing::debug!(
            application = %name,
            specifications = specs.len(),
            repositories = repositories.len(),
            "application factory resolved"
        );

        let factory = Self {
            name: name.clone(),
            scope_include,
            scope_exclude,
            type_include,
            type_exclude,
            repositories,
            shared: DashMap::new(),
            counters,
        };

        if global.effective_validate_repositories() {
            factory.validate_repositories();
        }

        Ok(factory)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn repository_count(&self) -> usize {
        self.repositories.len()
    }

    /// Instantiate every repository's advice once against a throwaway
    /// scope. A failing repository is logged and left in place — it may
    /// still work for real scopes, and skipping validation must never
    /// block its siblings.
    fn validate_repositories(&self) {
        let scope = Scope::validation_scope();
        for repository in &self.repositories {
            if let Err(e) = repository.instantiate(&scope) {
                tracing::warn!(
                    application = %self.name,
                    specification = %repository.spec().name,
                    error = %e,
                    error_code = e.error_code(),
                    "repository failed validation"
                );
            }
        }
    }

    /// The accept-type gate: scope-include, scope-exclude, type-include,
    /// type-exclude, short-circuiting in that order.
    fn accepts(&self, ty: &TypeDescriptor, scope: &Scope) -> bool {
        self.scope_include.matches(scope.name())
            && !self.scope_exclude.matches(scope.name())
            && self.type_include.matches(ty)
            && !self.type_exclude.matches(ty)
    }

    /// Shared advice for a scope, materializing on first access.
    /// Per-instance repositories are excluded: their advice is created per
    /// target instance elsewhere, not per scope.
    fn scoped_advice(&self, scope: &Arc<Scope>) -> Arc<Vec<ScopedAdvice>> {
        if let Some(existing) = self.shared.get(&scope.id()) {
            return existing.value().clone();
        }
        self.shared
            .entry(scope.id())
            .or_insert_with(|| {
                let mut materialized = Vec::new();
                for repository in &self.repositories {
                    if repository.per_instance() {
                        continue;
                    }
                    match repository.instantiate(scope) {
                        Ok(advice) => materialized.push(ScopedAdvice {
                            repository: repository.clone(),
                            advice,
                        }),
                        Err(e) => {
                            self.counters.record_instantiation_failure();
                            tracing::warn!(
                                application = %self.name,
                                specification = %repository.spec().name,
                                scope = %scope.name(),
                                error = %e,
                                error_code = e.error_code(),
                                "advice instantiation failed, skipping"
                            );
                        }
                    }
                }
                tracing::debug!(
                    application = %self.name,
                    scope = %scope.name(),
                    advice = materialized.len(),
                    "materialized shared advice for scope"
                );
                Arc::new(materialized)
            })
            .value()
            .clone()
    }

    /// All advice applicable to one type's members under one scope.
    ///
    /// Returns an empty map when the gate rejects the type or nothing
    /// matches. Never fails: evaluation errors degrade to fewer matches.
    pub fn advice_for_type(&self, ty: &TypeDescriptor, scope: &Arc<Scope>) -> MemberAdviceMap {
        if !self.accepts(ty, scope) {
            return MemberAdviceMap::default();
        }

        let advice = self.scoped_advice(scope);
        if advice.is_empty() {
            return MemberAdviceMap::default();
        }

        // Type-level fast match, then the exact type-level match. Both may
        // be evaluated again per member by expression selectors; purity
        // makes that safe.
        let surviving: Vec<&ScopedAdvice> = advice
            .iter()
            .filter(|sa| {
                sa.repository.selector().fast_match(scope.name(), ty)
                    && sa.repository.selector().matches_type(scope.name(), ty)
            })
            .collect();
        if surviving.is_empty() {
            return MemberAdviceMap::default();
        }

        let mut result = MemberAdviceMap::default();
        for member in ty.queryable_members() {
            let mut chain = AdviceChain::new();
            for sa in &surviving {
                let selector = sa.repository.selector();
                let matched = catch_unwind(AssertUnwindSafe(|| {
                    selector.matches_member(scope.name(), ty, &member)
                }))
                .unwrap_or_else(|_| {
                    // A panicking predicate is "no match" for this one
                    // candidate; the rest keep evaluating.
                    self.counters.record_match_evaluation_failure();
                    let e = WeaveError::MatchEvaluation {
                        specification: sa.repository.spec().name.clone(),
                        member: member.signature(),
                    };
                    tracing::warn!(
                        application = %self.name,
                        error = %e,
                        error_code = e.error_code(),
                        "member predicate panicked during evaluation"
                    );
                    false
                });
                if !matched {
                    continue;
                }
                // First-by-scan-order wins when two selectors resolve to
                // the same behavior for the same join point.
                if chain
                    .iter()
                    .any(|a: &AdviceRef| &a.behavior == sa.repository.behavior_id())
                {
                    continue;
                }
                chain.push(AdviceRef {
                    behavior: sa.repository.behavior_id().clone(),
                    specification: sa.repository.spec().name.clone(),
                    order: sa.repository.order(),
                    instance: sa.advice.clone(),
                });
            }
            if !chain.is_empty() {
                result.insert(member.signature(), chain);
            }
        }
        result
    }

    /// Number of scopes with materialized shared advice (diagnostics).
    pub fn materialized_scope_count(&self) -> usize {
        self.shared.len()
    }
}
