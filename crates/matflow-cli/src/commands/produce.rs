//! Feed producer command.
//!
//! # Usage
//!
//! ```bash
//! matflow produce --input data/traffic-feed.json --topic city/traffic \
//!     --interval-ms 2000
//! ```
//!
//! Emitted payloads are echoed to stdout. Stdin is the control channel:
//! a bare integer sets a new emission interval in milliseconds, `shutdown`
//! drains the producer and stops it. `--max-count` bounds the run for
//! non-interactive use.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use matflow_sources::{FeedMessage, FeedProducer, FileSource, ProducerConfig};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

/// Arguments for the produce command
#[derive(Args)]
pub struct ProduceArgs {
    /// File whose content is emitted as the payload of every tick
    #[arg(long)]
    pub input: PathBuf,

    /// Channel name stamped on every payload
    #[arg(long, default_value = "matflow/feed")]
    pub topic: String,

    /// Initial emission interval in milliseconds
    #[arg(long, default_value_t = 10_000)]
    pub interval_ms: u64,

    /// Stop after this many emissions
    #[arg(long)]
    pub max_count: Option<u64>,
}

/// Handle the produce command
pub async fn handle_produce(args: ProduceArgs) -> i32 {
    let config = ProducerConfig {
        topic: args.topic,
        interval: Duration::from_millis(args.interval_ms),
        max_count: args.max_count,
        ..ProducerConfig::default()
    };
    let source = Box::new(FileSource::new(&args.input));

    let (handle, mut rx) = match FeedProducer::spawn(source, config) {
        Ok(producer) => producer,
        Err(e) => {
            error!(error = %e, "failed to start producer");
            return 1;
        }
    };

    let mut control_lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            message = rx.recv() => match message {
                Some(FeedMessage::Payload { topic, sequence, body }) => {
                    println!("[{topic} #{sequence}] {} bytes", body.len());
                    println!("{body}");
                }
                Some(FeedMessage::Shutdown) => {
                    info!("termination token received");
                    break;
                }
                None => break,
            },
            line = control_lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => {
                    if apply_control(&handle, line.trim()).await.is_err() {
                        break;
                    }
                }
                Ok(None) => stdin_open = false,
                Err(e) => {
                    warn!(error = %e, "control input unavailable");
                    stdin_open = false;
                }
            },
        }
    }

    match handle.join().await {
        Ok(emitted) => {
            info!(emitted, "producer finished");
            0
        }
        Err(e) => {
            error!(error = %e, "producer failed");
            1
        }
    }
}

/// Interprets one control line: an integer is a new interval in
/// milliseconds, `shutdown` stops the producer. Anything else is ignored
/// with a warning. Returns `Err` when the producer is already gone.
async fn apply_control(
    handle: &matflow_sources::ProducerHandle,
    line: &str,
) -> Result<(), ()> {
    if line.is_empty() {
        return Ok(());
    }
    if line.eq_ignore_ascii_case("shutdown") {
        return handle.request_shutdown().await.map_err(|_| ());
    }
    match line.parse::<u64>() {
        Ok(ms) => handle
            .set_interval(Duration::from_millis(ms))
            .await
            .map_err(|_| ()),
        Err(_) => {
            warn!(input = line, "expected an interval in milliseconds or 'shutdown'");
            Ok(())
        }
    }
}
