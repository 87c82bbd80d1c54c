//! Core error types.
//!
//! Every pipeline stage fails fast and surfaces the first error to the
//! caller; there is no partial-result recovery within a run. Each variant
//! carries enough context to report which input and which stage failed.

use thiserror::Error;

use crate::types::JoinKey;

/// The pipeline stage an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Reading and parsing the input triple files.
    Ingest,
    /// Dimension validation performed by the orchestrator before fan-out.
    Validate,
    /// Grouping replicas by join key and multiplying matched pairs.
    Join,
    /// Summing partial products per result cell.
    Aggregate,
    /// Delivering result cells to the configured sink.
    Sink,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Ingest => "ingest",
            Stage::Validate => "validate",
            Stage::Join => "join",
            Stage::Aggregate => "aggregate",
            Stage::Sink => "sink",
        };
        write!(f, "{name}")
    }
}

/// Which declared dimension a mismatch was detected on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionAxis {
    /// `rows_a`, the number of target rows (rows of matrix A).
    RowsOfA,
    /// `cols_b`, the number of target columns (columns of matrix B).
    ColsOfB,
}

impl std::fmt::Display for DimensionAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DimensionAxis::RowsOfA => write!(f, "rows of A"),
            DimensionAxis::ColsOfB => write!(f, "columns of B"),
        }
    }
}

/// Pipeline errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Input file could not be opened.
    #[error("failed to open '{path}': {source}")]
    MissingFile {
        /// Path of the triple file.
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Input file could not be read past the point it was opened.
    #[error("failed to read '{path}': {source}")]
    ReadFailed {
        /// Path of the triple file.
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A line did not parse as a `row,col,value` integer triple.
    #[error("'{path}' line {line_number}: malformed triple '{line}'")]
    MalformedInput {
        /// Path of the triple file.
        path: String,
        /// 1-based line number.
        line_number: usize,
        /// The offending line, as read.
        line: String,
    },

    /// A declared dimension is smaller than an index observed in the data.
    /// Replication driven by the under-declared dimension would silently
    /// drop valid product terms, so the run is refused up front.
    #[error("declared {axis} = {declared} but observed index {observed}")]
    DimensionMismatch {
        axis: DimensionAxis,
        declared: u32,
        observed: u32,
    },

    /// More than two replicas share one join key, which can only happen when
    /// an input matrix carries duplicate cells at one coordinate.
    #[error("{count} replicas share join key {key}; duplicate input cell")]
    DuplicateCell { key: JoinKey, count: usize },

    /// Multiplying a matched replica pair overflowed `i64`.
    #[error("product overflow for result cell ({target_row},{target_col}) at summation index {sum_index}")]
    ProductOverflow {
        target_row: u32,
        target_col: u32,
        sum_index: u32,
    },

    /// Summing partial products for one result cell overflowed `i64`.
    #[error("sum overflow for result cell ({row},{col})")]
    SumOverflow { row: u32, col: u32 },

    /// The sink rejected the result stream.
    #[error("sink failed: {0}")]
    SinkFailed(String),
}

impl CoreError {
    /// The stage that raised this error, for orchestrator reporting.
    pub fn stage(&self) -> Stage {
        match self {
            CoreError::MissingFile { .. }
            | CoreError::ReadFailed { .. }
            | CoreError::MalformedInput { .. } => Stage::Ingest,
            CoreError::DimensionMismatch { .. } => Stage::Validate,
            CoreError::DuplicateCell { .. } | CoreError::ProductOverflow { .. } => Stage::Join,
            CoreError::SumOverflow { .. } => Stage::Aggregate,
            CoreError::SinkFailed(_) => Stage::Sink,
        }
    }
}

/// Convenient Result type for pipeline operations.
pub type CoreResult<T> = Result<T, CoreError>;
