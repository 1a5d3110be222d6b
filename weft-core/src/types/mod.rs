//! Shared type definitions.

pub mod collections;
pub mod descriptors;
pub mod identifiers;
