//! matflow sources: the data-producing collaborators.
//!
//! These sit at the boundary of the multiplication core: they only ever
//! hand it labeled records and consume result streams. This crate provides:
//!
//! - [`producer`]: a background task pushing payloads to a named channel at
//!   a runtime-adjustable interval, with an in-band control channel and a
//!   distinguished termination token;
//! - [`feed`]: a geographic feed poller that caches the last successful
//!   payload to disk and parses feature documents into typed records;
//! - [`sensor`]: the camera snapshot record;
//! - [`source`]: the [`RemoteSource`] seam the producer and poller fetch
//!   through.

pub mod error;
pub mod feed;
pub mod producer;
pub mod sensor;
pub mod source;

// Re-exports for convenience
pub use error::{SourceError, SourceResult};
pub use feed::{FeedItem, FeedKind, FeedPoller, FeedReading, GeoPoint};
pub use producer::{FeedMessage, FeedProducer, ProducerConfig, ProducerControl, ProducerHandle};
pub use sensor::CameraSnapshot;
pub use source::{FileSource, RemoteSource, StaticSource};
