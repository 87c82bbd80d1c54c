//! Result sinks.
//!
//! The sink contract: consume an unordered sequence of result cells, order
//! not guaranteed, duplicates impossible by construction of the aggregator.

use std::io::Write;

use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::types::ResultCell;

/// Terminal consumer of the result stream.
pub trait Sink {
    fn consume(&mut self, cells: Vec<ResultCell>) -> CoreResult<()>;
}

/// Prints result triples to stdout. Sorts by (row, col) purely for stable
/// console output; the stream itself is unordered.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl Sink for StdoutSink {
    fn consume(&mut self, mut cells: Vec<ResultCell>) -> CoreResult<()> {
        cells.sort_by_key(|c| (c.row, c.col));
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        for cell in &cells {
            writeln!(out, "{cell}").map_err(|e| CoreError::SinkFailed(e.to_string()))?;
        }
        Ok(())
    }
}

/// Drops the result stream after counting it.
#[derive(Debug, Default)]
pub struct DiscardSink;

impl Sink for DiscardSink {
    fn consume(&mut self, cells: Vec<ResultCell>) -> CoreResult<()> {
        debug!(discarded = cells.len(), "result cells discarded");
        Ok(())
    }
}

/// Retains the result cells for the caller. Used by tests and library
/// callers that want the product back in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    cells: Vec<ResultCell>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cells(&self) -> &[ResultCell] {
        &self.cells
    }

    pub fn into_cells(self) -> Vec<ResultCell> {
        self.cells
    }
}

impl Sink for CollectingSink {
    fn consume(&mut self, mut cells: Vec<ResultCell>) -> CoreResult<()> {
        self.cells.append(&mut cells);
        Ok(())
    }
}
