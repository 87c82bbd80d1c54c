//! Pipeline orchestration.
//!
//! Wires the stages into one batch run and owns the pre-flight dimension
//! check, so a bad declaration is refused before any fan-out instead of
//! being discovered mid-pipeline.
//!
//! ```text
//! matrix A ──ingest──┐
//!                    ├─ validate ─ replicate ─ join ─ aggregate ─ sink
//! matrix B ──ingest──┘
//! ```
//!
//! The replicate, join, and aggregate stages are pure transformations; the
//! two shuffles run over key-hashed rayon partitions with no cross-partition
//! communication. There is no cancellation mid-run: this is a batch
//! computation, not a service.

use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::aggregate::sum_products;
use crate::error::CoreResult;
use crate::ingest::read_matrix;
use crate::join::multiply_matches;
use crate::replicate::{replicate, Dimensions};
use crate::sink::{CollectingSink, Sink};
use crate::types::{Cell, MatrixTag, ResultCell};

/// Multiplies two cell sets already in memory. Validates the declared
/// dimensions, then runs replicate → join → aggregate.
pub fn multiply_cells(
    matrix_a: &[Cell],
    matrix_b: &[Cell],
    dims: Dimensions,
    partitions: usize,
) -> CoreResult<Vec<ResultCell>> {
    dims.validate(matrix_a, matrix_b)?;
    let replicas = replicate(matrix_a, matrix_b, dims);
    let products = multiply_matches(replicas, partitions)?;
    sum_products(products, partitions)
}

/// A configured batch multiplication over two triple files.
#[derive(Debug, Clone)]
pub struct Pipeline {
    matrix_a: PathBuf,
    matrix_b: PathBuf,
    dims: Dimensions,
    partitions: usize,
}

impl Pipeline {
    /// Creates a pipeline with the partition count defaulting to the rayon
    /// thread pool size.
    pub fn new(matrix_a: impl Into<PathBuf>, matrix_b: impl Into<PathBuf>, dims: Dimensions) -> Self {
        Self {
            matrix_a: matrix_a.into(),
            matrix_b: matrix_b.into(),
            dims,
            partitions: rayon::current_num_threads(),
        }
    }

    /// Overrides the shuffle partition count. `1` is the sequential
    /// reference path; any count yields the same output set.
    pub fn with_partitions(mut self, partitions: usize) -> Self {
        self.partitions = partitions.max(1);
        self
    }

    pub fn partitions(&self) -> usize {
        self.partitions
    }

    /// Renders the stage graph for this run as text.
    pub fn execution_plan(&self) -> String {
        format!(
            "ingest '{}' as A, '{}' as B\n\
             -> validate dimensions (rows_a = {}, cols_b = {})\n\
             -> replicate: A x {} target columns, B x {} target rows\n\
             -> join: shuffle by (target_row, target_col, sum_index), {} partitions\n\
             -> aggregate: shuffle by (target_row, target_col), {} partitions\n\
             -> sink",
            self.matrix_a.display(),
            self.matrix_b.display(),
            self.dims.rows_a,
            self.dims.cols_b,
            self.dims.cols_b,
            self.dims.rows_a,
            self.partitions,
            self.partitions,
        )
    }

    /// Runs the full pipeline into `sink`, failing fast on the first error.
    pub fn run(&self, sink: &mut dyn Sink) -> CoreResult<()> {
        let outcome = self.run_inner(sink);
        if let Err(e) = &outcome {
            error!(stage = %e.stage(), error = %e, "pipeline run failed");
        }
        outcome
    }

    /// Runs the pipeline and returns the result cells directly.
    pub fn collect(&self) -> CoreResult<Vec<ResultCell>> {
        let mut sink = CollectingSink::new();
        self.run_inner(&mut sink)?;
        Ok(sink.into_cells())
    }

    fn run_inner(&self, sink: &mut dyn Sink) -> CoreResult<()> {
        let matrix_a = read_matrix(self.path_a(), MatrixTag::A)?;
        let matrix_b = read_matrix(self.path_b(), MatrixTag::B)?;
        info!(
            a_cells = matrix_a.len(),
            b_cells = matrix_b.len(),
            rows_a = self.dims.rows_a,
            cols_b = self.dims.cols_b,
            "starting multiplication"
        );

        let cells = multiply_cells(&matrix_a, &matrix_b, self.dims, self.partitions)?;
        info!(result_cells = cells.len(), "multiplication complete");
        sink.consume(cells)
    }

    fn path_a(&self) -> &Path {
        &self.matrix_a
    }

    fn path_b(&self) -> &Path {
        &self.matrix_b
    }
}
