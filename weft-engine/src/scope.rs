//! Isolation scopes.
//!
//! A scope is the boundary under which types are loaded and resolved; two
//! scopes may define identically-named types independently. The engine
//! never owns scopes — callers hold `Arc<Scope>` and the match cache keeps
//! only weak back-references, so a scope discarded by the host runtime
//! becomes collectible.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock};

use weft_core::constants::{DEFAULT_SCOPE_NAME, VALIDATION_SCOPE_NAME};
use weft_core::types::identifiers::ScopeId;

static NEXT_SCOPE_ID: AtomicU64 = AtomicU64::new(1);

static DEFAULT_SCOPE: LazyLock<Arc<Scope>> = LazyLock::new(|| Scope::new(DEFAULT_SCOPE_NAME));

/// One isolation scope. Identity is the process-unique id, not the name:
/// the host runtime may create many scopes with equal names.
#[derive(Debug)]
pub struct Scope {
    id: ScopeId,
    name: String,
}

impl Scope {
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            id: ScopeId(NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed)),
            name: name.into(),
        })
    }

    /// The sentinel scope used when the host runtime supplies none.
    /// Always returns the same instance.
    pub fn default_scope() -> Arc<Self> {
        DEFAULT_SCOPE.clone()
    }

    /// A fresh throwaway scope for startup repository validation.
    pub fn validation_scope() -> Arc<Self> {
        Scope::new(VALIDATION_SCOPE_NAME)
    }

    pub fn id(&self) -> ScopeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
