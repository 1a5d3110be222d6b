//! Match caching for the weaving hot path.

pub mod match_cache;

pub use match_cache::{MarkOutcome, MatchCache, TypeMatchEntry};
