//! Repositories: resolved, context-bound factories for advice instances.

pub mod resolvers;

pub use resolvers::{ResolveContext, ResolverTable, SpecResolver};

use std::sync::Arc;

use weft_core::errors::WeaveError;
use weft_core::types::descriptors::{MemberDescriptor, TypeDescriptor};
use weft_core::types::identifiers::BehaviorId;

use crate::advice::{Advice, BehaviorDefinition};
use crate::catalog::specification::{Pointcut, Specification};
use crate::expr::CompiledPointcut;
use crate::scope::Scope;

/// The resolved form of a specification's selector.
pub enum Selector {
    Predicate(Pointcut),
    Expression(CompiledPointcut),
}

impl Selector {
    /// Could any type loaded under this scope match?
    pub fn matches_scope(&self, scope: &str) -> bool {
        match self {
            Self::Predicate(pc) => pc.scope.as_ref().map_or(true, |p| p(scope)),
            Self::Expression(pc) => pc.matches_scope(scope),
        }
    }

    /// Conservative type-level pre-filter; may over-approximate.
    pub fn fast_match(&self, scope: &str, ty: &TypeDescriptor) -> bool {
        match self {
            // Programmatic predicates are required to be cheap and pure;
            // evaluating them exactly is a valid fast match.
            Self::Predicate(pc) => {
                pc.scope.as_ref().map_or(true, |p| p(scope))
                    && pc.ty.as_ref().map_or(true, |p| p(ty))
            }
            Self::Expression(pc) => pc.fast_match(scope, ty),
        }
    }

    /// Full type-level match.
    pub fn matches_type(&self, scope: &str, ty: &TypeDescriptor) -> bool {
        match self {
            Self::Predicate(pc) => {
                pc.scope.as_ref().map_or(true, |p| p(scope))
                    && pc.ty.as_ref().map_or(true, |p| p(ty))
            }
            Self::Expression(pc) => pc.matches_type(scope, ty),
        }
    }

    /// Member-level match with all facets known.
    pub fn matches_member(
        &self,
        scope: &str,
        ty: &TypeDescriptor,
        member: &MemberDescriptor,
    ) -> bool {
        match self {
            Self::Predicate(pc) => {
                pc.scope.as_ref().map_or(true, |p| p(scope))
                    && pc.ty.as_ref().map_or(true, |p| p(ty))
                    && pc.member.as_ref().map_or(true, |p| p(member))
            }
            Self::Expression(pc) => pc.matches_member(scope, ty, member),
        }
    }
}

/// One resolved specification, able to produce advice instances.
///
/// A repository never outlives the application factory that created it, and
/// caches nothing per scope itself — scope-level caching belongs to the
/// factory and the match cache.
pub struct Repository {
    spec: Arc<Specification>,
    selector: Selector,
    behavior: Arc<BehaviorDefinition>,
}

impl Repository {
    pub fn new(
        spec: Arc<Specification>,
        selector: Selector,
        behavior: Arc<BehaviorDefinition>,
    ) -> Self {
        Self {
            spec,
            selector,
            behavior,
        }
    }

    pub fn spec(&self) -> &Arc<Specification> {
        &self.spec
    }

    pub fn behavior_id(&self) -> &BehaviorId {
        self.behavior.id()
    }

    pub fn per_instance(&self) -> bool {
        self.spec.per_instance
    }

    pub fn order(&self) -> i32 {
        self.spec.order
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Produce one advice instance bound to the given scope.
    pub fn instantiate(&self, scope: &Arc<Scope>) -> Result<Arc<dyn Advice>, WeaveError> {
        self.behavior.instantiate(scope)
    }
}
