//! matflow core: key-partitioned sparse matrix multiplication.
//!
//! Multiplies two sparse matrices supplied as coordinate-triple lists
//! without ever materializing either matrix densely. The dataflow is a
//! replicate/join/aggregate shuffle: each A-cell is copied once per target
//! column and each B-cell once per target row, tagged with a join key
//! `(target_row, target_col, sum_index)` whose `sum_index` is the true
//! shared summation index; a key-partitioned grouping then multiplies
//! matched pairs and a second grouping sums them per result cell.
//!
//! # Example
//!
//! ```
//! use matflow_core::{multiply_cells, Cell, Dimensions, MatrixTag};
//!
//! let a = [Cell::new(MatrixTag::A, 1, 1, 5)];
//! let b = [Cell::new(MatrixTag::B, 1, 1, 3)];
//! let product = multiply_cells(&a, &b, Dimensions::new(1, 1), 1).unwrap();
//! assert_eq!(product[0].value, 15);
//! ```

pub mod aggregate;
pub mod error;
pub mod ingest;
pub mod join;
pub mod pipeline;
pub mod replicate;
mod shuffle;
pub mod sink;
pub mod types;

// Re-exports for convenience
pub use error::{CoreError, CoreResult, DimensionAxis, Stage};
pub use pipeline::{multiply_cells, Pipeline};
pub use replicate::Dimensions;
pub use sink::{CollectingSink, DiscardSink, Sink, StdoutSink};
pub use types::{Cell, JoinKey, KeyedValue, MatrixTag, PartialProduct, ResultCell};
