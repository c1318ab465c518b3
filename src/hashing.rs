use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};

/// Deterministic across runs, unlike the std `RandomState` hasher, so it can be used to derive
/// per-generator seeds.
pub(crate) fn hash_str(data: &str) -> u64 {
    let mut hasher = FxHasher::default();
    data.hash(&mut hasher);
    hasher.finish()
}
