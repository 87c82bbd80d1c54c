//! Join and multiply.
//!
//! Groups replicas by exact join key. A full bucket holds one A-origin and
//! one B-origin replica (enforced by how keys are constructed, not
//! re-checked here); those multiply into a partial product. Buckets with a
//! single replica are structurally missing terms — the partner entry is an
//! implicit zero — and produce nothing. Buckets with more than two replicas
//! can only arise from duplicate input cells and abort the run.

use std::collections::HashMap;

use rayon::prelude::*;
use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::shuffle::shard_by_key;
use crate::types::{KeyedValue, PartialProduct};

/// Multiplies every matched replica pair, shuffling by join key across
/// `partitions` parallel shards. Products use checked arithmetic; overflow
/// is a reported error, never a silent wrap.
pub fn multiply_matches(
    replicas: Vec<KeyedValue>,
    partitions: usize,
) -> CoreResult<Vec<PartialProduct>> {
    let shards = shard_by_key(replicas, partitions, |kv| kv.key);

    let per_shard: Vec<Vec<PartialProduct>> = shards
        .into_par_iter()
        .map(multiply_shard)
        .collect::<CoreResult<_>>()?;

    let products: Vec<PartialProduct> = per_shard.into_iter().flatten().collect();
    debug!(partial_products = products.len(), "join stage complete");
    Ok(products)
}

fn multiply_shard(shard: Vec<KeyedValue>) -> CoreResult<Vec<PartialProduct>> {
    let mut buckets: HashMap<_, Vec<i64>> = HashMap::new();
    for replica in shard {
        buckets.entry(replica.key).or_default().push(replica.value);
    }

    let mut products = Vec::new();
    for (key, values) in buckets {
        match values.as_slice() {
            [] | [_] => {}
            [left, right] => {
                let product = left.checked_mul(*right).ok_or(CoreError::ProductOverflow {
                    target_row: key.target_row,
                    target_col: key.target_col,
                    sum_index: key.sum_index,
                })?;
                products.push(PartialProduct {
                    target_row: key.target_row,
                    target_col: key.target_col,
                    product,
                });
            }
            _ => {
                return Err(CoreError::DuplicateCell {
                    key,
                    count: values.len(),
                });
            }
        }
    }
    Ok(products)
}
