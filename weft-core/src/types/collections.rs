//! Collection type aliases used across the workspace.
//!
//! FxHash is faster than SipHash for the short, trusted keys this engine
//! hashes (type names, member signatures, behavior ids).

pub use rustc_hash::{FxHashMap, FxHashSet};
