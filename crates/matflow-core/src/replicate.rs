//! Replication fan-out.
//!
//! Instead of a broadcast join, every matching (A-cell, B-cell) pair meets
//! at exactly one place: each A-cell is copied once per target column and
//! each B-cell once per target row, with a join key encoding the target
//! coordinates plus the shared summation index. A key-partitioned grouping
//! then performs the meeting with no global synchronization.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CoreError, CoreResult, DimensionAxis};
use crate::types::{Cell, JoinKey, KeyedValue};

/// Result-matrix dimensions, supplied by the caller. The replicator cannot
/// infer them from sparse, possibly incomplete data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Number of target rows (rows of matrix A).
    pub rows_a: u32,
    /// Number of target columns (columns of matrix B).
    pub cols_b: u32,
}

impl Dimensions {
    pub fn new(rows_a: u32, cols_b: u32) -> Self {
        Self { rows_a, cols_b }
    }

    /// Checks the declared dimensions against the indices actually observed.
    ///
    /// An under-declared dimension would make replication skip target rows
    /// or columns and silently drop valid product terms, so it is refused
    /// here, before any fan-out. Over-declaration only widens the fan-out
    /// and is allowed.
    pub fn validate(&self, matrix_a: &[Cell], matrix_b: &[Cell]) -> CoreResult<()> {
        let max_row_a = matrix_a.iter().map(|c| c.row).max().unwrap_or(0);
        if max_row_a > self.rows_a {
            return Err(CoreError::DimensionMismatch {
                axis: DimensionAxis::RowsOfA,
                declared: self.rows_a,
                observed: max_row_a,
            });
        }
        let max_col_b = matrix_b.iter().map(|c| c.col).max().unwrap_or(0);
        if max_col_b > self.cols_b {
            return Err(CoreError::DimensionMismatch {
                axis: DimensionAxis::ColsOfB,
                declared: self.cols_b,
                observed: max_col_b,
            });
        }
        Ok(())
    }
}

/// Fans both cell sets out into keyed replicas.
///
/// - `A[i,j] = v` emits `((i, k, j), v)` for every target column `k`;
/// - `B[j,k] = v` emits `((i, k, j), v)` for every target row `i`.
///
/// For any valid term `A[i,j] * B[j,k]` exactly one replica from each side
/// carries the key `(i, k, j)`, and no other replica can: the key pins the
/// originating cell's row (A side) or column (B side) alongside the shared
/// index. Output volume is `|A|·cols_b + |B|·rows_a` — the designed blow-up
/// and the dominant cost of the algorithm.
pub fn replicate(matrix_a: &[Cell], matrix_b: &[Cell], dims: Dimensions) -> Vec<KeyedValue> {
    let capacity =
        matrix_a.len() * dims.cols_b as usize + matrix_b.len() * dims.rows_a as usize;
    let mut replicas = Vec::with_capacity(capacity);

    for cell in matrix_a {
        for k in 1..=dims.cols_b {
            replicas.push(KeyedValue::new(
                JoinKey::new(cell.row, k, cell.col),
                cell.value,
            ));
        }
    }
    for cell in matrix_b {
        for i in 1..=dims.rows_a {
            replicas.push(KeyedValue::new(
                JoinKey::new(i, cell.col, cell.row),
                cell.value,
            ));
        }
    }

    debug!(replicas = replicas.len(), "replication fan-out complete");
    replicas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MatrixTag;

    #[test]
    fn matching_cells_meet_under_exactly_one_key() {
        let a = [Cell::new(MatrixTag::A, 2, 3, 7)];
        let b = [Cell::new(MatrixTag::B, 3, 1, -4)];
        let dims = Dimensions::new(2, 2);

        let replicas = replicate(&a, &b, dims);
        let shared = JoinKey::new(2, 1, 3);
        let hits: Vec<_> = replicas.iter().filter(|kv| kv.key == shared).collect();

        assert_eq!(hits.len(), 2, "one replica per side must carry (2,1,3)");
        let values: Vec<i64> = hits.iter().map(|kv| kv.value).collect();
        assert!(values.contains(&7) && values.contains(&-4));
    }

    #[test]
    fn fan_out_volume_matches_formula() {
        let a = vec![Cell::new(MatrixTag::A, 1, 1, 1); 3];
        let b = vec![Cell::new(MatrixTag::B, 1, 1, 1); 5];
        let dims = Dimensions::new(4, 2);
        // |A|*cols_b + |B|*rows_a = 3*2 + 5*4
        assert_eq!(replicate(&a, &b, dims).len(), 26);
    }

    #[test]
    fn under_declared_rows_are_refused() {
        let a = [Cell::new(MatrixTag::A, 5, 1, 1)];
        let err = Dimensions::new(2, 2).validate(&a, &[]).unwrap_err();
        match err {
            CoreError::DimensionMismatch {
                axis: DimensionAxis::RowsOfA,
                declared,
                observed,
            } => {
                assert_eq!((declared, observed), (2, 5));
            }
            other => panic!("expected DimensionMismatch, got {other:?}"),
        }
    }

    #[test]
    fn under_declared_cols_are_refused() {
        let b = [Cell::new(MatrixTag::B, 1, 9, 1)];
        assert!(matches!(
            Dimensions::new(2, 2).validate(&[], &b),
            Err(CoreError::DimensionMismatch {
                axis: DimensionAxis::ColsOfB,
                ..
            })
        ));
    }

    #[test]
    fn over_declared_dimensions_pass_validation() {
        let a = [Cell::new(MatrixTag::A, 1, 1, 1)];
        let b = [Cell::new(MatrixTag::B, 1, 1, 1)];
        assert!(Dimensions::new(10, 10).validate(&a, &b).is_ok());
    }

    #[test]
    fn a_side_inner_index_is_unconstrained_by_validation() {
        // The summation index (A's column) has no declared bound.
        let a = [Cell::new(MatrixTag::A, 1, 999, 1)];
        assert!(Dimensions::new(1, 1).validate(&a, &[]).is_ok());
    }
}
