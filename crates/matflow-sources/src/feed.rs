//! Geographic feed polling and parsing.
//!
//! The feed is a GeoJSON-like feature collection published by an open-data
//! portal. The poller keeps a local cache of the last successful payload
//! and only refetches when the cache is older than its freshness window;
//! the parser turns features into typed records according to a
//! caller-supplied record kind.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::{SourceError, SourceResult};
use crate::source::RemoteSource;

/// The record kinds the feed can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeedKind {
    /// Road segment congestion states.
    Traffic,
    /// Air quality measurement stations.
    AirQuality,
    /// Noise sensors. Present in the portal, parser not implemented.
    Noise,
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedKind::Traffic => write!(f, "traffic"),
            FeedKind::AirQuality => write!(f, "air-quality"),
            FeedKind::Noise => write!(f, "noise"),
        }
    }
}

impl FromStr for FeedKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "traffic" => Ok(FeedKind::Traffic),
            "air-quality" => Ok(FeedKind::AirQuality),
            "noise" => Ok(FeedKind::Noise),
            other => Err(format!("unknown feed kind '{other}'")),
        }
    }
}

/// One coordinate in the feed's reference system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub x: f64,
    pub y: f64,
}

/// The kind-specific measurement attached to a feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FeedReading {
    /// Congestion state code (0 free-flowing .. 3 closed).
    TrafficState(i64),
    /// Raw measurement string from the station.
    AirQuality(String),
}

/// One typed record parsed from the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedItem {
    pub kind: FeedKind,
    /// When this record was parsed out of the document.
    pub observed_at: DateTime<Utc>,
    /// Coordinate reference, e.g. `EPSG:25830`. Empty when the document
    /// carries none.
    pub crs: String,
    pub points: Vec<GeoPoint>,
    pub reading: FeedReading,
}

// Wire shape of the feature collection. Only the fields the parser touches
// are modeled; `properties` stays a raw value because its layout differs per
// record kind.
#[derive(Debug, Deserialize)]
struct FeatureDocument {
    crs: Option<Crs>,
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Crs {
    properties: CrsProperties,
}

#[derive(Debug, Deserialize)]
struct CrsProperties {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: serde_json::Value,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    coordinates: serde_json::Value,
}

/// Parses a raw feed document into typed records of the given kind.
pub fn parse_document(
    kind: FeedKind,
    raw: &str,
    observed_at: DateTime<Utc>,
) -> SourceResult<Vec<FeedItem>> {
    if kind == FeedKind::Noise {
        return Err(SourceError::UnsupportedKind { kind });
    }

    let document: FeatureDocument = serde_json::from_str(raw)?;
    let crs = match document.crs {
        Some(crs) => normalize_crs(&crs.properties.name),
        None => {
            warn!("feed document carries no coordinate reference system");
            String::new()
        }
    };

    let mut items = Vec::with_capacity(document.features.len());
    for feature in document.features {
        items.push(parse_feature(kind, feature, &crs, observed_at)?);
    }
    debug!(kind = %kind, items = items.len(), "parsed feed document");
    Ok(items)
}

/// `urn:ogc:def:crs:EPSG::25830` → `EPSG:25830`.
fn normalize_crs(name: &str) -> String {
    match name.find("EPSG") {
        Some(at) => name[at..].replace("::", ":"),
        None => {
            warn!(crs = %name, "unrecognized coordinate reference system");
            String::new()
        }
    }
}

fn parse_feature(
    kind: FeedKind,
    feature: Feature,
    crs: &str,
    observed_at: DateTime<Utc>,
) -> SourceResult<FeedItem> {
    let (points, reading) = match kind {
        FeedKind::Traffic => {
            // Line string: every coordinate pair belongs to the segment.
            let pairs: Vec<[f64; 2]> = serde_json::from_value(feature.geometry.coordinates)?;
            let state = feature
                .properties
                .get("estado")
                .and_then(|v| v.as_i64())
                .ok_or(SourceError::MissingField { field: "estado" })?;
            (
                pairs.iter().map(|&[x, y]| GeoPoint { x, y }).collect(),
                FeedReading::TrafficState(state),
            )
        }
        FeedKind::AirQuality => {
            // Single station point.
            let [x, y]: [f64; 2] = serde_json::from_value(feature.geometry.coordinates)?;
            let measurements = feature
                .properties
                .get("mediciones")
                .and_then(|v| v.as_str())
                .ok_or(SourceError::MissingField {
                    field: "mediciones",
                })?;
            (
                vec![GeoPoint { x, y }],
                FeedReading::AirQuality(measurements.to_string()),
            )
        }
        FeedKind::Noise => unreachable!("rejected before parsing"),
    };

    Ok(FeedItem {
        kind,
        observed_at,
        crs: crs.to_string(),
        points,
        reading,
    })
}

/// Polls a feed source on a timer, caching payloads to disk.
pub struct FeedPoller {
    kind: FeedKind,
    source: Box<dyn RemoteSource>,
    cache_path: PathBuf,
    poll_interval: Duration,
    cache_max_age: Duration,
}

impl FeedPoller {
    /// Creates a poller whose cache freshness window equals the polling
    /// interval: within one interval the cache is served as-is.
    pub fn new(
        kind: FeedKind,
        source: Box<dyn RemoteSource>,
        cache_path: impl Into<PathBuf>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            kind,
            source,
            cache_path: cache_path.into(),
            poll_interval,
            cache_max_age: poll_interval,
        }
    }

    /// Overrides the cache freshness window.
    pub fn with_cache_max_age(mut self, max_age: Duration) -> Self {
        self.cache_max_age = max_age;
        self
    }

    /// Refreshes the cache if it is absent or stale, then parses it.
    pub fn poll_once(&self) -> SourceResult<Vec<FeedItem>> {
        self.refresh_cache()?;
        let raw = std::fs::read_to_string(&self.cache_path).map_err(|source| {
            SourceError::CacheUnavailable {
                path: self.cache_path.display().to_string(),
                source,
            }
        })?;
        parse_document(self.kind, &raw, Utc::now())
    }

    /// Sends parsed items to `tx` every poll interval. Fetch and parse
    /// failures are logged and polling continues; an unusable cache
    /// location or an unsupported kind aborts. Stops cleanly when the
    /// receiver goes away or after `max_polls` rounds.
    pub async fn run(
        &self,
        tx: mpsc::Sender<FeedItem>,
        max_polls: Option<u64>,
    ) -> SourceResult<()> {
        info!(
            kind = %self.kind,
            source = %self.source.describe(),
            cache = %self.cache_path.display(),
            interval = ?self.poll_interval,
            "feed poller starting"
        );

        let mut polls = 0u64;
        loop {
            match self.poll_once() {
                Ok(items) => {
                    for item in items {
                        if tx.send(item).await.is_err() {
                            debug!("feed consumer went away; poller stopping");
                            return Ok(());
                        }
                    }
                }
                Err(fatal @ (SourceError::CacheUnavailable { .. }
                | SourceError::UnsupportedKind { .. })) => return Err(fatal),
                Err(transient) => {
                    warn!(error = %transient, "poll failed; retrying next interval");
                }
            }

            polls += 1;
            if max_polls.is_some_and(|max| polls >= max) {
                info!(polls, "feed poller reached its poll budget");
                return Ok(());
            }
            sleep(self.poll_interval).await;
        }
    }

    fn cache_is_fresh(&self) -> bool {
        let Ok(metadata) = std::fs::metadata(&self.cache_path) else {
            return false;
        };
        let Ok(modified) = metadata.modified() else {
            return false;
        };
        match modified.elapsed() {
            Ok(age) => age < self.cache_max_age,
            // Modification time in the future: treat as fresh.
            Err(_) => true,
        }
    }

    /// Fetches and atomically rewrites the cache when it is stale. A fetch
    /// failure with a usable stale cache downgrades to a warning; without
    /// any cache it is fatal for this round.
    fn refresh_cache(&self) -> SourceResult<bool> {
        if self.cache_is_fresh() {
            debug!(cache = %self.cache_path.display(), "cache is fresh; skipping fetch");
            return Ok(false);
        }

        let payload = match self.source.fetch() {
            Ok(payload) => payload,
            Err(e) if self.cache_path.exists() => {
                warn!(error = %e, "fetch failed; serving stale cache");
                return Ok(false);
            }
            Err(e) => {
                return Err(SourceError::Fetch {
                    origin: self.source.describe(),
                    source: e,
                });
            }
        };

        let staging = self.cache_path.with_extension("tmp");
        let write = std::fs::write(&staging, &payload)
            .and_then(|()| std::fs::rename(&staging, &self.cache_path));
        write.map_err(|source| SourceError::CacheUnavailable {
            path: self.cache_path.display().to_string(),
            source,
        })?;

        debug!(cache = %self.cache_path.display(), bytes = payload.len(), "cache refreshed");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_kind_round_trips_through_strings() {
        for kind in [FeedKind::Traffic, FeedKind::AirQuality, FeedKind::Noise] {
            assert_eq!(kind.to_string().parse::<FeedKind>().unwrap(), kind);
        }
        assert!("weather".parse::<FeedKind>().is_err());
    }

    #[test]
    fn crs_name_is_normalized() {
        assert_eq!(normalize_crs("urn:ogc:def:crs:EPSG::25830"), "EPSG:25830");
        assert_eq!(normalize_crs("EPSG:4326"), "EPSG:4326");
        assert_eq!(normalize_crs("totally-custom"), "");
    }
}
