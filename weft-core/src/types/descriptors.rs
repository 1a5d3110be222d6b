//! Type and member descriptors — the engine's view of a loadable program unit.
//!
//! Descriptors are supplied by the host runtime's type universe. They are
//! immutable snapshots; the matching pipeline never mutates them.

use serde::{Deserialize, Serialize};

use crate::constants::STATIC_INITIALIZER;

/// Kind of a type member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemberKind {
    Method,
    Constructor,
    /// The implicit static-initializer pseudo-member.
    StaticInitializer,
}

/// A function/procedure-like element of a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberDescriptor {
    pub name: String,
    /// Parameter/return signature, e.g. `(String,int)void`. May be empty.
    #[serde(default)]
    pub descriptor: String,
    pub kind: MemberKind,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub is_native: bool,
    #[serde(default)]
    pub is_static: bool,
}

impl MemberDescriptor {
    /// A concrete instance or static method.
    pub fn method(name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            descriptor: descriptor.into(),
            kind: MemberKind::Method,
            is_abstract: false,
            is_native: false,
            is_static: false,
        }
    }

    /// The implicit static-initializer pseudo-member.
    pub fn static_initializer() -> Self {
        Self {
            name: STATIC_INITIALIZER.to_string(),
            descriptor: String::new(),
            kind: MemberKind::StaticInitializer,
            is_abstract: false,
            is_native: false,
            is_static: true,
        }
    }

    /// Stable signature key used in member → advice-chain maps.
    pub fn signature(&self) -> String {
        if self.descriptor.is_empty() {
            self.name.clone()
        } else {
            format!("{}{}", self.name, self.descriptor)
        }
    }

    /// Whether the member-level matcher should consider this member at all.
    /// Native and abstract members have no body to weave into.
    pub fn is_queryable(&self) -> bool {
        !self.is_abstract && !self.is_native
    }
}

/// A named program unit with zero or more members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// Fully-qualified dotted name, e.g. `com.acme.Service`.
    pub name: String,
    /// Direct supertype names (class + interfaces). Resolution of the
    /// transitive closure goes through the type universe.
    #[serde(default)]
    pub supertypes: Vec<String>,
    #[serde(default)]
    pub members: Vec<MemberDescriptor>,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            supertypes: Vec::new(),
            members: Vec::new(),
        }
    }

    pub fn with_supertypes(mut self, supertypes: Vec<String>) -> Self {
        self.supertypes = supertypes;
        self
    }

    pub fn with_members(mut self, members: Vec<MemberDescriptor>) -> Self {
        self.members = members;
        self
    }

    /// Unqualified (simple) name — everything after the last dot.
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// Members eligible for member-level matching: every queryable declared
    /// member plus the implicit static-initializer pseudo-member.
    pub fn queryable_members(&self) -> Vec<MemberDescriptor> {
        let mut out: Vec<MemberDescriptor> = self
            .members
            .iter()
            .filter(|m| m.is_queryable())
            .cloned()
            .collect();
        if !out
            .iter()
            .any(|m| m.kind == MemberKind::StaticInitializer)
        {
            out.push(MemberDescriptor::static_initializer());
        }
        out
    }
}
