//! Key-hashed partitioning for the shuffle stages.
//!
//! Records sharing a key always land in the same partition, so grouping and
//! reduction stay key-local and partitions never communicate. Within a
//! partition processing is sequential; across partitions it is embarrassingly
//! parallel.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Splits `items` into `partitions` shards by key hash.
///
/// `partitions` is clamped to at least 1. With `partitions = 1` this is the
/// sequential reference path; any partition count yields the same output
/// set downstream because every grouping invariant is expressed per key.
pub(crate) fn shard_by_key<T, K, F>(items: Vec<T>, partitions: usize, key_of: F) -> Vec<Vec<T>>
where
    K: Hash,
    F: Fn(&T) -> K,
{
    let partitions = partitions.max(1);
    let mut shards: Vec<Vec<T>> = (0..partitions).map(|_| Vec::new()).collect();
    for item in items {
        let mut hasher = DefaultHasher::new();
        key_of(&item).hash(&mut hasher);
        let slot = (hasher.finish() % partitions as u64) as usize;
        shards[slot].push(item);
    }
    shards
}
