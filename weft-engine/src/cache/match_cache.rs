//! Per-scope cache of type match results.
//!
//! Only matched types are ever inserted, which is what bounds the cache:
//! in a typical process the overwhelming majority of types match nothing,
//! and those produce no entry at all. Scope slots hold only weak
//! back-references to their scope, so dropping a scope makes its whole
//! slot collectible via `prune_dead_scopes`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use dashmap::DashMap;
use weft_core::types::collections::FxHashMap;
use weft_core::types::identifiers::ScopeId;

use crate::advice::AdviceChain;
use crate::scope::Scope;

/// Immutable match result for one type under one scope, plus the mutable
/// woven flag used to detect anomalous re-weaves.
#[derive(Debug, Default)]
pub struct TypeMatchEntry {
    members: FxHashMap<String, AdviceChain>,
    transformed: AtomicBool,
}

impl TypeMatchEntry {
    pub fn new(members: FxHashMap<String, AdviceChain>) -> Self {
        Self {
            members,
            transformed: AtomicBool::new(false),
        }
    }

    pub fn members(&self) -> &FxHashMap<String, AdviceChain> {
        &self.members
    }

    /// Advice chain for one member signature.
    pub fn chain(&self, member: &str) -> Option<&AdviceChain> {
        self.members.get(member)
    }

    pub fn is_transformed(&self) -> bool {
        self.transformed.load(Ordering::Acquire)
    }

    /// Set the woven flag. Returns whether it was already set.
    fn mark_transformed(&self) -> bool {
        self.transformed.swap(true, Ordering::AcqRel)
    }
}

/// Outcome of marking a type as woven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    /// No cache entry exists for the type under this scope.
    NotFound,
    /// First mark; the expected case.
    First,
    /// The type was already marked woven under this scope.
    AlreadyTransformed,
}

#[derive(Debug)]
struct ScopeSlot {
    scope: Weak<Scope>,
    types: DashMap<String, Arc<TypeMatchEntry>>,
}

/// Concurrent cache of match results, keyed by (scope id, type name).
///
/// Writes race benignly: two threads computing the same type concurrently
/// both produce the same pure result, and the first insert wins. Readers
/// never block writers of other entries.
#[derive(Debug, Default)]
pub struct MatchCache {
    scopes: DashMap<ScopeId, ScopeSlot>,
}

impl MatchCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached entry for the type under the scope, if present.
    pub fn lookup(&self, scope: &Arc<Scope>, type_name: &str) -> Option<Arc<TypeMatchEntry>> {
        self.scopes
            .get(&scope.id())
            .and_then(|slot| slot.types.get(type_name).map(|e| e.value().clone()))
    }

    /// Insert a computed entry unless one already exists; returns the entry
    /// that is actually cached. First insert wins.
    pub fn insert_if_absent(
        &self,
        scope: &Arc<Scope>,
        type_name: &str,
        entry: Arc<TypeMatchEntry>,
    ) -> Arc<TypeMatchEntry> {
        let slot = self.scopes.entry(scope.id()).or_insert_with(|| ScopeSlot {
            scope: Arc::downgrade(scope),
            types: DashMap::new(),
        });
        let cached = slot
            .types
            .entry(type_name.to_string())
            .or_insert(entry)
            .value()
            .clone();
        cached
    }

    /// Drop the entry for one type under one scope, if present.
    pub fn remove(&self, scope: &Arc<Scope>, type_name: &str) {
        if let Some(slot) = self.scopes.get(&scope.id()) {
            slot.types.remove(type_name);
        }
    }

    /// Mark a cached type as woven.
    pub fn mark_transformed(&self, scope: &Arc<Scope>, type_name: &str) -> MarkOutcome {
        match self.lookup(scope, type_name) {
            None => MarkOutcome::NotFound,
            Some(entry) => {
                if entry.mark_transformed() {
                    MarkOutcome::AlreadyTransformed
                } else {
                    MarkOutcome::First
                }
            }
        }
    }

    /// Total cached type entries across all live scope slots.
    pub fn entry_count(&self) -> usize {
        self.scopes.iter().map(|slot| slot.types.len()).sum()
    }

    /// Drop slots whose scope has been discarded by the host runtime.
    /// Returns the number of slots removed.
    pub fn prune_dead_scopes(&self) -> usize {
        let before = self.scopes.len();
        self.scopes.retain(|_, slot| slot.scope.strong_count() > 0);
        let removed = before - self.scopes.len();
        if removed > 0 {
            tracing::debug!(removed, "pruned dead scope slots from match cache");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advice::{AdviceRef, MarkerAdvice};
    use smallvec::smallvec;
    use weft_core::types::identifiers::BehaviorId;

    fn entry_with(member: &str) -> Arc<TypeMatchEntry> {
        let mut members = FxHashMap::default();
        let chain: AdviceChain = smallvec![AdviceRef {
            behavior: BehaviorId::new("Logging"),
            specification: "s".to_string(),
            order: 1,
            instance: MarkerAdvice::new("Logging"),
        }];
        members.insert(member.to_string(), chain);
        Arc::new(TypeMatchEntry::new(members))
    }

    #[test]
    fn lookup_misses_then_hits() {
        let cache = MatchCache::new();
        let scope = Scope::new("app");
        assert!(cache.lookup(&scope, "com.acme.Foo").is_none());
        cache.insert_if_absent(&scope, "com.acme.Foo", entry_with("bar"));
        let entry = cache.lookup(&scope, "com.acme.Foo").unwrap();
        assert!(entry.chain("bar").is_some());
        assert!(entry.chain("other").is_none());
    }

    #[test]
    fn first_insert_wins() {
        let cache = MatchCache::new();
        let scope = Scope::new("app");
        let first = cache.insert_if_absent(&scope, "T", entry_with("a"));
        let second = cache.insert_if_absent(&scope, "T", entry_with("b"));
        assert!(Arc::ptr_eq(&first, &second));
        assert!(second.chain("a").is_some());
        assert!(second.chain("b").is_none());
    }

    #[test]
    fn scopes_with_equal_names_do_not_collide() {
        let cache = MatchCache::new();
        let a = Scope::new("app");
        let b = Scope::new("app");
        cache.insert_if_absent(&a, "T", entry_with("x"));
        assert!(cache.lookup(&a, "T").is_some());
        assert!(cache.lookup(&b, "T").is_none());
    }

    #[test]
    fn mark_transformed_state_machine() {
        let cache = MatchCache::new();
        let scope = Scope::new("app");
        assert_eq!(cache.mark_transformed(&scope, "T"), MarkOutcome::NotFound);
        cache.insert_if_absent(&scope, "T", entry_with("m"));
        assert_eq!(cache.mark_transformed(&scope, "T"), MarkOutcome::First);
        assert_eq!(
            cache.mark_transformed(&scope, "T"),
            MarkOutcome::AlreadyTransformed
        );
        assert!(cache.lookup(&scope, "T").unwrap().is_transformed());
    }

    #[test]
    fn remove_allows_recompute() {
        let cache = MatchCache::new();
        let scope = Scope::new("app");
        cache.insert_if_absent(&scope, "T", entry_with("a"));
        cache.remove(&scope, "T");
        assert!(cache.lookup(&scope, "T").is_none());
        let replaced = cache.insert_if_absent(&scope, "T", entry_with("b"));
        assert!(replaced.chain("b").is_some());
    }

    #[test]
    fn dead_scope_slots_are_prunable() {
        let cache = MatchCache::new();
        let scope = Scope::new("short-lived");
        cache.insert_if_absent(&scope, "T", entry_with("m"));
        assert_eq!(cache.entry_count(), 1);
        drop(scope);
        assert_eq!(cache.prune_dead_scopes(), 1);
        assert_eq!(cache.entry_count(), 0);
    }
}
