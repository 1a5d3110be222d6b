//! Advice behaviors: the externally supplied cross-cutting logic this
//! engine attaches to matched join points.
//!
//! Discovery and loading of advice packages is out of scope; embedders
//! register `BehaviorDefinition`s programmatically. The engine only ever
//! instantiates them through their factory closures.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use smallvec::SmallVec;
use weft_core::errors::WeaveError;
use weft_core::types::collections::FxHashMap;
use weft_core::types::identifiers::BehaviorId;

use crate::scope::Scope;

/// A runtime advice instance, bound to exactly one isolation scope (or one
/// target instance when the owning specification is per-instance).
pub trait Advice: Send + Sync {
    /// Behavior id of the implementation this instance belongs to.
    fn id(&self) -> &str;
}

impl fmt::Debug for dyn Advice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Advice").field("id", &self.id()).finish()
    }
}

/// One resolved entry in a member's advice chain.
#[derive(Clone)]
pub struct AdviceRef {
    pub behavior: BehaviorId,
    /// Name of the specification that selected this join point.
    pub specification: String,
    /// Ascending = higher priority. Ties keep insertion order.
    pub order: i32,
    pub instance: Arc<dyn Advice>,
}

impl fmt::Debug for AdviceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdviceRef")
            .field("behavior", &self.behavior)
            .field("specification", &self.specification)
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

/// Ordered advice chain for one member. Most members attract few advice.
pub type AdviceChain = SmallVec<[AdviceRef; 4]>;

/// Factory closure producing one advice instance for a scope.
pub type AdviceFactory =
    Arc<dyn Fn(&Arc<Scope>) -> Result<Arc<dyn Advice>, WeaveError> + Send + Sync>;

/// An externally invocable entry point of a behavior definition, carrying
/// its declared selector expression. Used by indirection expansion.
#[derive(Debug, Clone)]
pub struct EntryPoint {
    pub name: String,
    /// Declarative pointcut expression attached to this entry point.
    pub selector: String,
    pub is_abstract: bool,
    /// Whether the entry point is externally invocable.
    pub exported: bool,
}

impl EntryPoint {
    pub fn new(name: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            selector: selector.into(),
            is_abstract: false,
            exported: true,
        }
    }

    pub fn abstract_entry(name: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            is_abstract: true,
            ..Self::new(name, selector)
        }
    }

    pub fn eligible(&self) -> bool {
        !self.is_abstract && self.exported
    }
}

/// Definition of one advice behavior: an id, a factory, and the entry
/// points indirection specifications expand over.
pub struct BehaviorDefinition {
    id: BehaviorId,
    factory: AdviceFactory,
    entry_points: Vec<EntryPoint>,
}

impl BehaviorDefinition {
    pub fn new(id: impl Into<BehaviorId>, factory: AdviceFactory) -> Self {
        Self {
            id: id.into(),
            factory,
            entry_points: Vec::new(),
        }
    }

    pub fn with_entry_points(mut self, entry_points: Vec<EntryPoint>) -> Self {
        self.entry_points = entry_points;
        self
    }

    pub fn id(&self) -> &BehaviorId {
        &self.id
    }

    pub fn entry_points(&self) -> &[EntryPoint] {
        &self.entry_points
    }

    /// Instantiate one advice for the given scope. A panicking factory is
    /// contained here and surfaces as an `Instantiation` failure.
    pub fn instantiate(&self, scope: &Arc<Scope>) -> Result<Arc<dyn Advice>, WeaveError> {
        let factory = &self.factory;
        match catch_unwind(AssertUnwindSafe(|| factory(scope))) {
            Ok(result) => result,
            Err(_) => Err(WeaveError::Instantiation {
                behavior: self.id.to_string(),
                reason: "advice factory panicked".to_string(),
            }),
        }
    }
}

impl fmt::Debug for BehaviorDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BehaviorDefinition")
            .field("id", &self.id)
            .field("entry_points", &self.entry_points)
            .finish_non_exhaustive()
    }
}

/// Registry of behavior definitions, keyed by behavior id.
#[derive(Debug, Default)]
pub struct BehaviorRegistry {
    behaviors: FxHashMap<BehaviorId, Arc<BehaviorDefinition>>,
}

impl BehaviorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition. Re-registering an id replaces the previous
    /// definition and is logged; repositories resolved earlier keep the
    /// definition they captured.
    pub fn register(&mut self, definition: BehaviorDefinition) {
        let definition = Arc::new(definition);
        if self
            .behaviors
            .insert(definition.id().clone(), definition.clone())
            .is_some()
        {
            tracing::warn!(behavior = %definition.id(), "behavior re-registered, replacing definition");
        }
    }

    pub fn get(&self, id: &BehaviorId) -> Option<Arc<BehaviorDefinition>> {
        self.behaviors.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.behaviors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.behaviors.is_empty()
    }
}

/// Minimal advice implementation carrying only its behavior id. Sufficient
/// for behaviors whose logic lives entirely in the external transformer.
#[derive(Debug)]
pub struct MarkerAdvice {
    id: String,
}

impl MarkerAdvice {
    pub fn new(id: impl Into<String>) -> Arc<Self> {
        Arc::new(Self { id: id.into() })
    }

    /// Factory producing one `MarkerAdvice` per scope.
    pub fn factory(id: impl Into<String>) -> AdviceFactory {
        let id = id.into();
        Arc::new(move |_scope| Ok(MarkerAdvice::new(id.clone()) as Arc<dyn Advice>))
    }
}

impl Advice for MarkerAdvice {
    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panicking_factory_is_contained() {
        let def = BehaviorDefinition::new(
            "boom",
            Arc::new(|_scope| panic!("factory bug")),
        );
        let err = def.instantiate(&Scope::new("s")).unwrap_err();
        assert!(matches!(err, WeaveError::Instantiation { .. }));
    }

    #[test]
    fn marker_factory_produces_advice() {
        let def = BehaviorDefinition::new("Logging", MarkerAdvice::factory("Logging"));
        let advice = def.instantiate(&Scope::new("s")).unwrap();
        assert_eq!(advice.id(), "Logging");
    }

    #[test]
    fn registry_replaces_on_reregister() {
        let mut registry = BehaviorRegistry::new();
        registry.register(BehaviorDefinition::new("A", MarkerAdvice::factory("A")));
        registry.register(
            BehaviorDefinition::new("A", MarkerAdvice::factory("A"))
                .with_entry_points(vec![EntryPoint::new("e", "type(\"X\")")]),
        );
        assert_eq!(registry.len(), 1);
        let def = registry.get(&BehaviorId::new("A")).unwrap();
        assert_eq!(def.entry_points().len(), 1);
    }
}
