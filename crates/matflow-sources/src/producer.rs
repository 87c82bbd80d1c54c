//! Interval feed producer with a runtime control channel.
//!
//! A background task fetches a payload from its source every interval and
//! pushes it to a bounded data channel under a topic name. The emission
//! interval is mutable at runtime through an in-band control message, read
//! at each iteration boundary; a shutdown control message (or an exhausted
//! emission budget) drains pending sends, emits a distinguished termination
//! token, and stops the task.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::error::{SourceError, SourceResult};
use crate::source::RemoteSource;

/// Producer configuration.
#[derive(Debug, Clone)]
pub struct ProducerConfig {
    /// Channel name stamped on every payload.
    pub topic: String,
    /// Initial emission interval.
    pub interval: Duration,
    /// Stop after this many emissions; `None` runs until shut down.
    pub max_count: Option<u64>,
    /// Data channel capacity. Bounds in-flight messages: once the buffer is
    /// full, the producer waits for the consumer before emitting more.
    pub buffer: usize,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            topic: "matflow/feed".to_string(),
            interval: Duration::from_secs(10),
            max_count: None,
            buffer: 1000,
        }
    }
}

impl ProducerConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> SourceResult<()> {
        if self.buffer == 0 {
            return Err(SourceError::TaskFailed(
                "buffer capacity must be > 0".to_string(),
            ));
        }
        if self.interval.is_zero() {
            return Err(SourceError::TaskFailed(
                "emission interval must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// In-band control messages understood by the producer task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProducerControl {
    /// Change the emission interval; applied at the next iteration boundary.
    SetInterval(Duration),
    /// Drain pending sends, emit the termination token, stop.
    Shutdown,
}

/// Messages arriving on the data channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedMessage {
    /// One fetched payload.
    Payload {
        /// Topic the payload was published under.
        topic: String,
        /// 1-based emission counter.
        sequence: u64,
        /// Raw document body.
        body: String,
    },
    /// Termination token: nothing follows it.
    Shutdown,
}

/// Handle to a running producer task.
pub struct ProducerHandle {
    control: mpsc::Sender<ProducerControl>,
    interval: Arc<RwLock<Duration>>,
    task: JoinHandle<SourceResult<u64>>,
}

impl ProducerHandle {
    /// Sends an interval change; it takes effect at the next iteration.
    pub async fn set_interval(&self, interval: Duration) -> SourceResult<()> {
        self.control
            .send(ProducerControl::SetInterval(interval))
            .await
            .map_err(|_| SourceError::ChannelClosed)
    }

    /// Asks the producer to drain and stop. Consumers will still receive
    /// every pending payload followed by [`FeedMessage::Shutdown`].
    pub async fn request_shutdown(&self) -> SourceResult<()> {
        self.control
            .send(ProducerControl::Shutdown)
            .await
            .map_err(|_| SourceError::ChannelClosed)
    }

    /// The interval currently in effect, reflecting applied control
    /// messages.
    pub fn current_interval(&self) -> Duration {
        *self.interval.read()
    }

    /// Waits for the task to finish; returns the number of emissions.
    pub async fn join(self) -> SourceResult<u64> {
        self.task
            .await
            .map_err(|e| SourceError::TaskFailed(e.to_string()))?
    }
}

/// Spawns the producer task.
pub struct FeedProducer;

impl FeedProducer {
    /// Starts emitting from `source` under `config`. Returns the control
    /// handle and the data channel receiver.
    pub fn spawn(
        source: Box<dyn RemoteSource>,
        config: ProducerConfig,
    ) -> SourceResult<(ProducerHandle, mpsc::Receiver<FeedMessage>)> {
        config.validate()?;

        let (data_tx, data_rx) = mpsc::channel(config.buffer);
        let (control_tx, control_rx) = mpsc::channel(8);
        let interval = Arc::new(RwLock::new(config.interval));

        info!(
            topic = %config.topic,
            source = %source.describe(),
            interval = ?config.interval,
            max_count = ?config.max_count,
            "feed producer starting; interval is adjustable via the control channel"
        );

        let task = tokio::spawn(run_loop(
            source,
            config,
            data_tx,
            control_rx,
            Arc::clone(&interval),
        ));

        Ok((
            ProducerHandle {
                control: control_tx,
                interval,
                task,
            },
            data_rx,
        ))
    }
}

async fn run_loop(
    source: Box<dyn RemoteSource>,
    config: ProducerConfig,
    data_tx: mpsc::Sender<FeedMessage>,
    mut control_rx: mpsc::Receiver<ProducerControl>,
    interval: Arc<RwLock<Duration>>,
) -> SourceResult<u64> {
    let mut sequence = 0u64;

    loop {
        // Iteration boundary: the current interval is re-read here, so a
        // SetInterval applies to the very next wait.
        let wait = *interval.read();
        tokio::select! {
            control = control_rx.recv() => match control {
                Some(ProducerControl::SetInterval(new_interval)) => {
                    *interval.write() = new_interval;
                    info!(interval = ?new_interval, "emission interval updated");
                }
                Some(ProducerControl::Shutdown) | None => break,
            },
            _ = sleep(wait) => {
                let body = source.fetch().map_err(|e| SourceError::Fetch {
                    origin: source.describe(),
                    source: e,
                })?;
                sequence += 1;
                debug!(sequence, bytes = body.len(), "emitting payload");
                data_tx
                    .send(FeedMessage::Payload {
                        topic: config.topic.clone(),
                        sequence,
                        body,
                    })
                    .await
                    .map_err(|_| SourceError::ChannelClosed)?;

                if config.max_count.is_some_and(|max| sequence >= max) {
                    break;
                }
            }
        }
    }

    // Pending payloads were delivered into the bounded channel in order;
    // the token queues behind all of them.
    data_tx
        .send(FeedMessage::Shutdown)
        .await
        .map_err(|_| SourceError::ChannelClosed)?;
    info!(emitted = sequence, "feed producer stopped");
    Ok(sequence)
}
