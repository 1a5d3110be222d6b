//! Indirection expansion: one declarative marker becomes many synthetic
//! expression specifications, one per eligible entry point of the
//! referenced behavior definition.

use std::sync::Arc;

use crate::advice::BehaviorRegistry;

use super::specification::{SpecKind, Specification};

/// Expand an indirection specification.
///
/// Ineligible entry points (abstract, or not externally invocable) are
/// skipped with a warning. Zero usable entry points is "ignore with a
/// warning", not a failure. An unknown behavior id yields an empty
/// expansion; the caller decides whether that is an error.
pub fn expand(spec: &Specification, behaviors: &BehaviorRegistry) -> Vec<Arc<Specification>> {
    debug_assert!(matches!(spec.kind, SpecKind::Indirection));

    let Some(definition) = behaviors.get(&spec.behavior) else {
        tracing::warn!(
            specification = %spec.name,
            behavior = %spec.behavior,
            "indirection references unknown behavior, ignoring"
        );
        return Vec::new();
    };

    let mut expanded = Vec::new();
    for entry in definition.entry_points() {
        if !entry.eligible() {
            tracing::warn!(
                specification = %spec.name,
                entry = %entry.name,
                is_abstract = entry.is_abstract,
                exported = entry.exported,
                "skipping ineligible entry point"
            );
            continue;
        }
        let name = format!("{}_{}_Advice{}", spec.name, entry.name, expanded.len());
        expanded.push(Arc::new(Specification {
            name,
            kind: SpecKind::Expression(entry.selector.clone()),
            behavior: spec.behavior.clone(),
            per_instance: spec.per_instance,
            order: spec.order,
        }));
    }

    if expanded.is_empty() {
        tracing::warn!(
            specification = %spec.name,
            behavior = %spec.behavior,
            "indirection expanded to zero usable entry points, ignoring"
        );
    }

    expanded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advice::{BehaviorDefinition, EntryPoint, MarkerAdvice};

    fn registry_with_entries(entries: Vec<EntryPoint>) -> BehaviorRegistry {
        let mut registry = BehaviorRegistry::new();
        registry.register(
            BehaviorDefinition::new("Audit", MarkerAdvice::factory("Audit"))
                .with_entry_points(entries),
        );
        registry
    }

    #[test]
    fn expands_eligible_entry_points_only() {
        let registry = registry_with_entries(vec![
            EntryPoint::new("before", r#"type("com.A")"#),
            EntryPoint::abstract_entry("template", r#"type("com.B")"#),
            EntryPoint::new("after", r#"type("com.C")"#),
        ]);
        let spec = Specification::indirection("Audit");
        let expanded = expand(&spec, &registry);
        assert_eq!(expanded.len(), 2);
        assert_eq!(expanded[0].name, "Audit_before_Advice0");
        assert_eq!(expanded[1].name, "Audit_after_Advice1");
        assert!(matches!(expanded[0].kind, SpecKind::Expression(_)));
    }

    #[test]
    fn expansion_inherits_order_and_lifecycle() {
        let registry =
            registry_with_entries(vec![EntryPoint::new("e", r#"type("com.A")"#)]);
        let spec = Specification::indirection("Audit")
            .with_order(7)
            .per_instance();
        let expanded = expand(&spec, &registry);
        assert_eq!(expanded[0].order, 7);
        assert!(expanded[0].per_instance);
    }

    #[test]
    fn zero_usable_entry_points_is_empty_not_error() {
        let registry = registry_with_entries(vec![EntryPoint::abstract_entry(
            "only",
            r#"type("com.A")"#,
        )]);
        let spec = Specification::indirection("Audit");
        assert!(expand(&spec, &registry).is_empty());
    }

    #[test]
    fn unknown_behavior_is_empty() {
        let registry = BehaviorRegistry::new();
        let spec = Specification::indirection("Nope");
        assert!(expand(&spec, &registry).is_empty());
    }
}
