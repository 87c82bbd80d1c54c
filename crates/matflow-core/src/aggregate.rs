//! Aggregation.
//!
//! Re-keys partial products by target cell, discarding the summation index,
//! and sums each group. Integer addition is commutative and associative, so
//! neither grouping nor ordering can affect the result — which is what lets
//! this stage run over unordered parallel partitions. A target cell with no
//! contributions never appears in the output (implicit zero).

use std::collections::HashMap;

use rayon::prelude::*;
use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::shuffle::shard_by_key;
use crate::types::{PartialProduct, ResultCell};

/// Sums partial products into final result cells, shuffling by
/// `(target_row, target_col)` across `partitions` parallel shards.
pub fn sum_products(
    products: Vec<PartialProduct>,
    partitions: usize,
) -> CoreResult<Vec<ResultCell>> {
    let shards = shard_by_key(products, partitions, |p| (p.target_row, p.target_col));

    let per_shard: Vec<Vec<ResultCell>> = shards
        .into_par_iter()
        .map(sum_shard)
        .collect::<CoreResult<_>>()?;

    let cells: Vec<ResultCell> = per_shard.into_iter().flatten().collect();
    debug!(result_cells = cells.len(), "aggregation complete");
    Ok(cells)
}

fn sum_shard(shard: Vec<PartialProduct>) -> CoreResult<Vec<ResultCell>> {
    let mut sums: HashMap<(u32, u32), i64> = HashMap::new();
    for part in shard {
        let slot = sums.entry((part.target_row, part.target_col)).or_insert(0);
        *slot = slot
            .checked_add(part.product)
            .ok_or(CoreError::SumOverflow {
                row: part.target_row,
                col: part.target_col,
            })?;
    }
    Ok(sums
        .into_iter()
        .map(|((row, col), value)| ResultCell::new(row, col, value))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pp(row: u32, col: u32, product: i64) -> PartialProduct {
        PartialProduct {
            target_row: row,
            target_col: col,
            product,
        }
    }

    #[test]
    fn partial_products_sum_per_target_cell() {
        let products = vec![pp(1, 1, 1), pp(1, 1, 12), pp(1, 1, -12), pp(2, 1, 6)];
        let mut cells = sum_products(products, 1).unwrap();
        cells.sort_by_key(|c| (c.row, c.col));
        assert_eq!(
            cells,
            vec![ResultCell::new(1, 1, 1), ResultCell::new(2, 1, 6)]
        );
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(sum_products(Vec::new(), 4).unwrap().is_empty());
    }

    #[test]
    fn sum_overflow_is_surfaced() {
        let products = vec![pp(3, 2, i64::MAX), pp(3, 2, 1)];
        assert!(matches!(
            sum_products(products, 1),
            Err(CoreError::SumOverflow { row: 3, col: 2 })
        ));
    }

    #[test]
    fn grouping_is_order_independent() {
        let forward = vec![pp(1, 2, 5), pp(2, 1, 7), pp(1, 2, -3)];
        let mut reversed = forward.clone();
        reversed.reverse();

        let mut a = sum_products(forward, 3).unwrap();
        let mut b = sum_products(reversed, 3).unwrap();
        a.sort_by_key(|c| (c.row, c.col));
        b.sort_by_key(|c| (c.row, c.col));
        assert_eq!(a, b);
    }
}
