//! Specification → repository resolution via a capability table.
//!
//! One resolver per specification variant, tried in declaration order. A
//! failing specification is logged and contributes zero repositories;
//! resolution of the others always proceeds (partial-failure isolation).

use std::sync::Arc;

use weft_core::errors::WeaveError;
use weft_core::errors::WeftErrorCode;

use crate::advice::BehaviorRegistry;
use crate::catalog::filters::{accepted_by_all, NameFilter};
use crate::catalog::indirection;
use crate::catalog::specification::{SpecKind, Specification};
use crate::expr::{CompiledPointcut, TypeUniverse};

use super::{Repository, Selector};

/// Shared context for one resolution pass.
pub struct ResolveContext<'a> {
    pub behaviors: &'a BehaviorRegistry,
    pub universe: Arc<dyn TypeUniverse>,
    /// Name filter stack, applied to names synthesized during resolution
    /// (declared names were already filtered by the catalog scan).
    pub filters: Vec<&'a NameFilter>,
}

/// Capability interface: can this resolver handle the specification, and
/// if so, what repositories does it produce?
pub trait SpecResolver: Send + Sync {
    fn supports(&self, spec: &Specification) -> bool;
    fn resolve(
        &self,
        spec: &Arc<Specification>,
        ctx: &ResolveContext<'_>,
    ) -> Result<Vec<Repository>, WeaveError>;
}

/// Resolves programmatic predicate specifications.
pub struct PredicateResolver;

impl SpecResolver for PredicateResolver {
    fn supports(&self, spec: &Specification) -> bool {
        matches!(spec.kind, SpecKind::Predicate(_))
    }

    fn resolve(
        &self,
        spec: &Arc<Specification>,
        ctx: &ResolveContext<'_>,
    ) -> Result<Vec<Repository>, WeaveError> {
        let SpecKind::Predicate(ref pointcut) = spec.kind else {
            unreachable!("supports() gates the variant");
        };
        let behavior = lookup_behavior(spec, ctx)?;
        Ok(vec![Repository::new(
            spec.clone(),
            Selector::Predicate(pointcut.clone()),
            behavior,
        )])
    }
}

/// Resolves declarative expression specifications by compiling their
/// pointcut against the context's type universe.
pub struct ExpressionResolver;

impl SpecResolver for ExpressionResolver {
    fn supports(&self, spec: &Specification) -> bool {
        matches!(spec.kind, SpecKind::Expression(_))
    }

    fn resolve(
        &self,
        spec: &Arc<Specification>,
        ctx: &ResolveContext<'_>,
    ) -> Result<Vec<Repository>, WeaveError> {
        let SpecKind::Expression(ref source) = spec.kind else {
            unreachable!("supports() gates the variant");
        };
        let compiled = CompiledPointcut::compile(source, ctx.universe.clone())?;
        let behavior = lookup_behavior(spec, ctx)?;
        Ok(vec![Repository::new(
            spec.clone(),
            Selector::Expression(compiled),
            behavior,
        )])
    }
}

/// Resolves indirection markers: expands them into synthetic expression
/// specifications, filters the synthetic names, and compiles each survivor.
pub struct IndirectionResolver;

impl SpecResolver for IndirectionResolver {
    fn supports(&self, spec: &Specification) -> bool {
        matches!(spec.kind, SpecKind::Indirection)
    }

    fn resolve(
        &self,
        spec: &Arc<Specification>,
        ctx: &ResolveContext<'_>,
    ) -> Result<Vec<Repository>, WeaveError> {
        let expanded = indirection::expand(spec, ctx.behaviors);
        let mut repositories = Vec::with_capacity(expanded.len());
        for synthetic in expanded {
            if !accepted_by_all(&ctx.filters, &synthetic.name) {
                tracing::debug!(
                    specification = %synthetic.name,
                    "synthetic specification filtered out by name"
                );
                continue;
            }
            // One bad entry-point selector must not sink its siblings.
            match ExpressionResolver.resolve(&synthetic, ctx) {
                Ok(repos) => repositories.extend(repos),
                Err(e) => {
                    tracing::warn!(
                        specification = %synthetic.name,
                        error = %e,
                        error_code = e.error_code(),
                        "failed to resolve expanded entry point, skipping"
                    );
                }
            }
        }
        Ok(repositories)
    }
}

/// The standard resolver table: one resolver per specification variant.
pub struct ResolverTable {
    resolvers: Vec<Box<dyn SpecResolver>>,
}

impl ResolverTable {
    pub fn standard() -> Self {
        Self {
            resolvers: vec![
                Box::new(PredicateResolver),
                Box::new(ExpressionResolver),
                Box::new(IndirectionResolver),
            ],
        }
    }

    /// Resolve one specification through the first supporting resolver.
    pub fn resolve(
        &self,
        spec: &Arc<Specification>,
        ctx: &ResolveContext<'_>,
    ) -> Result<Vec<Repository>, WeaveError> {
        for resolver in &self.resolvers {
            if resolver.supports(spec) {
                return resolver.resolve(spec, ctx);
            }
        }
        Err(WeaveError::Resolution {
            specification: spec.name.clone(),
            reason: "no resolver supports this specification variant".to_string(),
        })
    }

    /// Resolve every specification, isolating per-spec failures: a failed
    /// specification is logged and yields no repositories.
    pub fn resolve_all(
        &self,
        specs: &[Arc<Specification>],
        ctx: &ResolveContext<'_>,
    ) -> Vec<Repository> {
        let mut repositories = Vec::new();
        for spec in specs {
            match self.resolve(spec, ctx) {
                Ok(repos) => repositories.extend(repos),
                Err(e) => {
                    tracing::warn!(
                        specification = %spec.name,
                        error = %e,
                        error_code = e.error_code(),
                        "specification failed to resolve, skipping"
                    );
                }
            }
        }
        repositories
    }
}

fn lookup_behavior(
    spec: &Specification,
    ctx: &ResolveContext<'_>,
) -> Result<Arc<crate::advice::BehaviorDefinition>, WeaveError> {
    ctx.behaviors
        .get(&spec.behavior)
        .ok_or_else(|| WeaveError::UnknownBehavior {
            specification: spec.name.clone(),
            behavior: spec.behavior.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advice::{BehaviorDefinition, EntryPoint, MarkerAdvice};
    use crate::catalog::specification::Pointcut;
    use crate::expr::InMemoryUniverse;
    use weft_core::types::descriptors::TypeDescriptor;

    fn registry() -> BehaviorRegistry {
        let mut r = BehaviorRegistry::new();
        r.register(BehaviorDefinition::new("Logging", MarkerAdvice::factory("Logging")));
        r.register(
            BehaviorDefinition::new("Audit", MarkerAdvice::factory("Audit")).with_entry_points(
                vec![
                    EntryPoint::new("pre", r#"type("com.*")"#),
                    EntryPoint::new("post", r#"type("org.*")"#),
                ],
            ),
        );
        r
    }

    fn ctx<'a>(behaviors: &'a BehaviorRegistry, universe: &Arc<InMemoryUniverse>) -> ResolveContext<'a> {
        ResolveContext {
            behaviors,
            universe: universe.clone() as Arc<dyn TypeUniverse>,
            filters: Vec::new(),
        }
    }

    #[test]
    fn resolves_each_variant() {
        let behaviors = registry();
        let universe = Arc::new(InMemoryUniverse::new());
        let table = ResolverTable::standard();
        let ctx = ctx(&behaviors, &universe);

        let pred = Arc::new(Specification::predicate("p", "Logging", Pointcut::any()));
        assert_eq!(table.resolve(&pred, &ctx).unwrap().len(), 1);

        let expr = Arc::new(Specification::expression("e", "Logging", r#"type("com.*")"#));
        assert_eq!(table.resolve(&expr, &ctx).unwrap().len(), 1);

        let indirect = Arc::new(Specification::indirection("Audit"));
        assert_eq!(table.resolve(&indirect, &ctx).unwrap().len(), 2);
    }

    #[test]
    fn malformed_expression_fails_only_itself() {
        let behaviors = registry();
        let universe = Arc::new(InMemoryUniverse::new());
        let table = ResolverTable::standard();
        let ctx = ctx(&behaviors, &universe);

        let specs = vec![
            Arc::new(Specification::expression("good1", "Logging", r#"type("com.*")"#)),
            Arc::new(Specification::expression("bad", "Logging", r#"type("com.*" &&"#)),
            Arc::new(Specification::expression("good2", "Logging", r#"member("run")"#)),
        ];
        let repos = table.resolve_all(&specs, &ctx);
        assert_eq!(repos.len(), 2);
        assert_eq!(repos[0].spec().name, "good1");
        assert_eq!(repos[1].spec().name, "good2");
    }

    #[test]
    fn unknown_behavior_fails_only_itself() {
        let behaviors = registry();
        let universe = Arc::new(InMemoryUniverse::new());
        let table = ResolverTable::standard();
        let ctx = ctx(&behaviors, &universe);

        let specs = vec![
            Arc::new(Specification::expression("ghost", "NoSuch", r#"type("com.*")"#)),
            Arc::new(Specification::expression("real", "Logging", r#"type("com.*")"#)),
        ];
        let repos = table.resolve_all(&specs, &ctx);
        assert_eq!(repos.len(), 1);
        assert_eq!(repos[0].spec().name, "real");
    }

    #[test]
    fn selector_two_phase_matching() {
        let behaviors = registry();
        let universe = Arc::new(InMemoryUniverse::new());
        let table = ResolverTable::standard();
        let ctx = ctx(&behaviors, &universe);

        let spec = Arc::new(Specification::expression(
            "e",
            "Logging",
            r#"type("com.acme.*") && member("bar")"#,
        ));
        let repo = table.resolve(&spec, &ctx).unwrap().remove(0);
        let ty = TypeDescriptor::new("com.acme.Foo");
        assert!(repo.selector().fast_match("s", &ty));
        assert!(repo.selector().matches_type("s", &ty));
        let other = TypeDescriptor::new("net.x.Y");
        assert!(!repo.selector().matches_type("s", &other));
    }
}
