//! Batch multiplication command.
//!
//! # Usage
//!
//! ```bash
//! matflow multiply --matrix-a data/matrix-a.csv --matrix-b data/matrix-b.csv \
//!     --rows-a 2 --cols-b 2
//! ```
//!
//! Prints `row,col,value` result triples to stdout, or discards them with
//! `--discard`. On failure the offending stage and input are reported and
//! the process exits nonzero.

use std::path::PathBuf;

use clap::Args;
use matflow_core::{Dimensions, DiscardSink, Pipeline, Sink, StdoutSink};
use tracing::{error, info};

/// Arguments for the multiply command
#[derive(Args)]
pub struct MultiplyArgs {
    /// Triple file for the left operand
    #[arg(long)]
    pub matrix_a: PathBuf,

    /// Triple file for the right operand
    #[arg(long)]
    pub matrix_b: PathBuf,

    /// Number of rows of matrix A (target rows of the result)
    #[arg(long)]
    pub rows_a: u32,

    /// Number of columns of matrix B (target columns of the result)
    #[arg(long)]
    pub cols_b: u32,

    /// Shuffle partition count; defaults to the worker thread count
    #[arg(long)]
    pub partitions: Option<usize>,

    /// Discard results instead of printing them
    #[arg(long)]
    pub discard: bool,

    /// Print the execution plan before running
    #[arg(long)]
    pub show_plan: bool,
}

/// Handle the multiply command
pub fn handle_multiply(args: MultiplyArgs) -> i32 {
    let dims = Dimensions::new(args.rows_a, args.cols_b);
    let mut pipeline = Pipeline::new(&args.matrix_a, &args.matrix_b, dims);
    if let Some(partitions) = args.partitions {
        pipeline = pipeline.with_partitions(partitions);
    }

    if args.show_plan {
        println!("{}", pipeline.execution_plan());
    }

    let mut sink: Box<dyn Sink> = if args.discard {
        Box::new(DiscardSink)
    } else {
        Box::new(StdoutSink)
    };

    match pipeline.run(sink.as_mut()) {
        Ok(()) => {
            info!("multiplication finished");
            0
        }
        Err(e) => {
            error!(stage = %e.stage(), error = %e, "multiplication failed");
            1
        }
    }
}
