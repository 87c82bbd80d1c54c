//! Feed polling command.
//!
//! # Usage
//!
//! ```bash
//! matflow feed --kind traffic --source data/traffic-feed.json \
//!     --cache /tmp/traffic-cache.json --interval-ms 5000 --polls 3
//! ```
//!
//! Each parsed record is printed as one JSON line.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, ValueEnum};
use matflow_sources::{FeedKind, FeedPoller, FileSource};
use tokio::sync::mpsc;
use tracing::error;

/// Record kind selector.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    Traffic,
    AirQuality,
    Noise,
}

impl From<KindArg> for FeedKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Traffic => FeedKind::Traffic,
            KindArg::AirQuality => FeedKind::AirQuality,
            KindArg::Noise => FeedKind::Noise,
        }
    }
}

/// Arguments for the feed command
#[derive(Args)]
pub struct FeedArgs {
    /// Record kind to parse the feed as
    #[arg(long, value_enum)]
    pub kind: KindArg,

    /// Feed document to poll
    #[arg(long)]
    pub source: PathBuf,

    /// Cache file for the last successful payload
    #[arg(long)]
    pub cache: PathBuf,

    /// Polling interval in milliseconds
    #[arg(long, default_value_t = 10_000)]
    pub interval_ms: u64,

    /// Cache freshness window in milliseconds; defaults to the interval
    #[arg(long)]
    pub cache_max_age_ms: Option<u64>,

    /// Stop after this many polls
    #[arg(long)]
    pub polls: Option<u64>,
}

/// Handle the feed command
pub async fn handle_feed(args: FeedArgs) -> i32 {
    let mut poller = FeedPoller::new(
        args.kind.into(),
        Box::new(FileSource::new(&args.source)),
        &args.cache,
        Duration::from_millis(args.interval_ms),
    );
    if let Some(max_age) = args.cache_max_age_ms {
        poller = poller.with_cache_max_age(Duration::from_millis(max_age));
    }

    let (tx, mut rx) = mpsc::channel(256);
    let worker = tokio::spawn(async move { poller.run(tx, args.polls).await });

    while let Some(item) = rx.recv().await {
        match serde_json::to_string(&item) {
            Ok(line) => println!("{line}"),
            Err(e) => {
                error!(error = %e, "failed to serialize feed item");
                return 1;
            }
        }
    }

    match worker.await {
        Ok(Ok(())) => 0,
        Ok(Err(e)) => {
            error!(error = %e, "feed poller failed");
            1
        }
        Err(e) => {
            error!(error = %e, "feed poller panicked");
            1
        }
    }
}
