//! Specifications: immutable records binding a pointcut to a behavior.

use std::fmt;
use std::sync::Arc;

use weft_core::constants::DEFAULT_ORDER;
use weft_core::types::descriptors::{MemberDescriptor, TypeDescriptor};
use weft_core::types::identifiers::BehaviorId;

use crate::matcher::{StringMatcher, TypeMatcher};

/// Programmatic scope predicate.
pub type ScopePredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;
/// Programmatic type predicate.
pub type TypePredicate = Arc<dyn Fn(&TypeDescriptor) -> bool + Send + Sync>;
/// Programmatic member predicate.
pub type MemberPredicate = Arc<dyn Fn(&MemberDescriptor) -> bool + Send + Sync>;

/// Predicate triple over (scope-name, type, member). Any element may be
/// absent, meaning "always true". Predicates must be pure: the cache
/// assumes evaluating twice with the same input yields the same result.
#[derive(Clone, Default)]
pub struct Pointcut {
    pub scope: Option<ScopePredicate>,
    pub ty: Option<TypePredicate>,
    pub member: Option<MemberPredicate>,
}

impl Pointcut {
    /// Matches every join point.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn with_scope(mut self, predicate: ScopePredicate) -> Self {
        self.scope = Some(predicate);
        self
    }

    pub fn with_type(mut self, predicate: TypePredicate) -> Self {
        self.ty = Some(predicate);
        self
    }

    pub fn with_member(mut self, predicate: MemberPredicate) -> Self {
        self.member = Some(predicate);
        self
    }

    /// Bind a pre-built scope matcher.
    pub fn with_scope_matcher(self, matcher: StringMatcher) -> Self {
        self.with_scope(Arc::new(move |scope| matcher.matches(scope)))
    }

    /// Bind a pre-built type matcher.
    pub fn with_type_matcher(self, matcher: TypeMatcher) -> Self {
        self.with_type(Arc::new(move |ty| matcher.matches(ty)))
    }

    /// Bind a pre-built member-name matcher.
    pub fn with_member_matcher(self, matcher: StringMatcher) -> Self {
        self.with_member(Arc::new(move |member| matcher.matches(&member.name)))
    }
}

impl fmt::Debug for Pointcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pointcut")
            .field("scope", &self.scope.as_ref().map(|_| "<predicate>"))
            .field("ty", &self.ty.as_ref().map(|_| "<predicate>"))
            .field("member", &self.member.as_ref().map(|_| "<predicate>"))
            .finish()
    }
}

/// The three specification variants, as a closed sum.
#[derive(Debug, Clone)]
pub enum SpecKind {
    /// Host-language predicate objects supplied programmatically.
    Predicate(Pointcut),
    /// Declarative pointcut expression, compiled at resolution time.
    Expression(String),
    /// Marker expanding into one synthetic expression specification per
    /// eligible entry point of the referenced behavior.
    Indirection,
}

/// One unit of advice to attach: selector, behavior, lifecycle, order.
#[derive(Debug, Clone)]
pub struct Specification {
    pub name: String,
    pub kind: SpecKind,
    pub behavior: BehaviorId,
    /// One advice instance per target instance instead of one per scope.
    pub per_instance: bool,
    /// Ascending = higher priority. Defaults to "apply last".
    pub order: i32,
}

impl Specification {
    pub fn predicate(
        name: impl Into<String>,
        behavior: impl Into<BehaviorId>,
        pointcut: Pointcut,
    ) -> Self {
        Self {
            name: name.into(),
            kind: SpecKind::Predicate(pointcut),
            behavior: behavior.into(),
            per_instance: false,
            order: DEFAULT_ORDER,
        }
    }

    pub fn expression(
        name: impl Into<String>,
        behavior: impl Into<BehaviorId>,
        expression: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: SpecKind::Expression(expression.into()),
            behavior: behavior.into(),
            per_instance: false,
            order: DEFAULT_ORDER,
        }
    }

    /// Indirection marker. The name defaults to a stable identifier derived
    /// from its definition site — here, the referenced behavior id.
    pub fn indirection(behavior: impl Into<BehaviorId>) -> Self {
        let behavior = behavior.into();
        Self {
            name: behavior.to_string(),
            kind: SpecKind::Indirection,
            behavior,
            per_instance: false,
            order: DEFAULT_ORDER,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn per_instance(mut self) -> Self {
        self.per_instance = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_last_and_shared() {
        let spec = Specification::expression("s", "B", r#"type("X")"#);
        assert_eq!(spec.order, DEFAULT_ORDER);
        assert!(!spec.per_instance);
    }

    #[test]
    fn indirection_name_derives_from_behavior() {
        let spec = Specification::indirection("Audit");
        assert_eq!(spec.name, "Audit");
        assert!(matches!(spec.kind, SpecKind::Indirection));
    }

    #[test]
    fn empty_pointcut_matches_everything_via_absence() {
        let pc = Pointcut::any();
        assert!(pc.scope.is_none() && pc.ty.is_none() && pc.member.is_none());
    }
}
