//! Type universe: the queryable index over declared types reachable from an
//! isolation scope. Supplied by the host runtime; this engine only consumes
//! symbol resolution.

use std::sync::Arc;

use dashmap::DashMap;
use moka::sync::Cache;
use weft_core::types::collections::FxHashSet;
use weft_core::types::descriptors::TypeDescriptor;

/// Symbol resolution over the reachable type space.
pub trait TypeUniverse: Send + Sync {
    /// Resolve a fully-qualified type name. `None` means the symbol is
    /// unknown in this universe.
    fn resolve_type(&self, name: &str) -> Option<Arc<TypeDescriptor>>;
}

/// Walk the transitive supertype closure of `ty`, returning true as soon as
/// `predicate` accepts a supertype name. Cycle-safe: malformed hierarchies
/// terminate instead of looping.
pub fn any_supertype(
    universe: &dyn TypeUniverse,
    ty: &TypeDescriptor,
    predicate: impl Fn(&str) -> bool,
) -> bool {
    let mut visited: FxHashSet<String> = FxHashSet::default();
    let mut frontier: Vec<String> = ty.supertypes.clone();
    while let Some(name) = frontier.pop() {
        if !visited.insert(name.clone()) {
            continue;
        }
        if predicate(&name) {
            return true;
        }
        if let Some(parent) = universe.resolve_type(&name) {
            frontier.extend(parent.supertypes.iter().cloned());
        }
    }
    false
}

/// Simple map-backed universe. Useful for embedders that enumerate their
/// type space up front, and for tests.
#[derive(Debug, Default)]
pub struct InMemoryUniverse {
    types: DashMap<String, Arc<TypeDescriptor>>,
}

impl InMemoryUniverse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&self, ty: TypeDescriptor) {
        self.types.insert(ty.name.clone(), Arc::new(ty));
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TypeUniverse for InMemoryUniverse {
    fn resolve_type(&self, name: &str) -> Option<Arc<TypeDescriptor>> {
        self.types.get(name).map(|t| t.value().clone())
    }
}

/// Caching wrapper for universes whose resolution is expensive (e.g. ones
/// that delegate to the host runtime). Negative results are cached too —
/// unknown symbols are queried repeatedly by fast-match pre-filters.
pub struct CachingUniverse {
    inner: Arc<dyn TypeUniverse>,
    cache: Cache<String, Option<Arc<TypeDescriptor>>>,
}

impl CachingUniverse {
    pub fn new(inner: Arc<dyn TypeUniverse>, capacity: u64) -> Self {
        Self {
            inner,
            cache: Cache::new(capacity),
        }
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

impl TypeUniverse for CachingUniverse {
    fn resolve_type(&self, name: &str) -> Option<Arc<TypeDescriptor>> {
        if let Some(cached) = self.cache.get(name) {
            return cached;
        }
        let resolved = self.inner.resolve_type(name);
        self.cache.insert(name.to_string(), resolved.clone());
        resolved
    }
}
