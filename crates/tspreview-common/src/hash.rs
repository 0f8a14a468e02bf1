//! Content hashing for cache keys.

use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};

/// Hash file contents for the per-file parse cache.
///
/// Not cryptographic: collisions only cost a missed re-parse, and the cache
/// is additionally keyed by path.
pub fn content_hash(content: &str) -> u64 {
    let mut hasher = FxHasher::default();
    content.len().hash(&mut hasher);
    content.hash(&mut hasher);
    hasher.finish()
}
