//! Catalog scan: ordered, name-filtered specification sequences.

use std::sync::Arc;

use crate::advice::BehaviorRegistry;

use super::filters::{accepted_by_all, NameFilter};
use super::specification::Specification;

/// Context for one catalog scan.
pub struct ScanContext<'a> {
    pub behaviors: &'a BehaviorRegistry,
    /// Name filter stack, outermost (global) first.
    pub filters: Vec<&'a NameFilter>,
}

/// Ordered collection of declared specifications for one application.
///
/// Insertion order is meaningful: it is the scan order, which breaks order
/// ties and drives first-wins deduplication downstream.
#[derive(Debug, Default)]
pub struct Catalog {
    specs: Vec<Arc<Specification>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_specs(specs: Vec<Specification>) -> Self {
        Self {
            specs: specs.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn push(&mut self, spec: Specification) {
        self.specs.push(Arc::new(spec));
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Produce the filtered, insertion-ordered specification sequence.
    ///
    /// Indirection markers pass through intact; they expand during
    /// repository resolution, where the same filter stack is applied to the
    /// synthetic names they produce.
    pub fn scan(&self, ctx: &ScanContext<'_>) -> Vec<Arc<Specification>> {
        self.specs
            .iter()
            .filter(|spec| {
                let accepted = accepted_by_all(&ctx.filters, &spec.name);
                if !accepted {
                    tracing::debug!(specification = %spec.name, "filtered out by name");
                }
                accepted
            })
            .cloned()
            .collect()
    }
}
