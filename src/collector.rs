//! The collection core: one fetch-and-aggregate pass per scrape.
//!
//! Every scrape request drives exactly one cycle: fetch both upstream
//! documents, partition aircraft by position fix, and aggregate count
//! and maximum distance per compass sector. Nothing is cached between
//! cycles; the only shared state is the mutex that keeps concurrent
//! cycles from interleaving.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::feed::{DataSource, FeedError};
use crate::geo::LatLon;
use crate::sectors::sector;

/// A metric this exporter can emit: name, help text, and label schema.
#[derive(Debug, Clone, Copy)]
pub struct MetricDesc {
    pub name: &'static str,
    pub help: &'static str,
    pub labels: &'static [&'static str],
}

/// Number of aircraft in view, split by position fix and direction.
pub const AIRCRAFT_COUNT: MetricDesc = MetricDesc {
    name: "dump1090_aircraft_count",
    help: "Number of aircraft in view",
    labels: &["with_position", "direction"],
};

/// Cumulative ADS-B message count reported by the feed.
pub const MESSAGE_COUNT: MetricDesc = MetricDesc {
    name: "dump1090_aircraft_messages",
    help: "Number of ADSB messages received",
    labels: &[],
};

/// Feed timestamp of the last message.
pub const TIMESTAMP: MetricDesc = MetricDesc {
    name: "dump1090_aircraft_timestamp",
    help: "Timestamp of last message",
    labels: &[],
};

/// Maximum observed aircraft distance per direction, meters.
pub const MAX_DISTANCE: MetricDesc = MetricDesc {
    name: "dump1090_aircraft_max_distance",
    help: "Maximum distance (meters)",
    labels: &["direction"],
};

/// Everything this exporter can emit.
pub const DESCRIPTORS: &[MetricDesc] = &[AIRCRAFT_COUNT, MESSAGE_COUNT, TIMESTAMP, MAX_DISTANCE];

/// Aggregate for one compass sector within a single cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct SectorBucket {
    /// Sector label from the configured compass point list.
    pub direction: String,
    /// Aircraft with a position fix whose bearing falls in this sector.
    pub count: u64,
    /// Largest observed distance in this sector, meters.
    pub max_distance_m: f64,
}

/// The immutable result of one successful collection cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSnapshot {
    /// Feed timestamp, seconds since the Unix epoch.
    pub timestamp: f64,
    /// Cumulative message count reported by the feed.
    pub messages: u64,
    /// Total aircraft in the feed this cycle.
    pub total_aircraft: u64,
    /// Aircraft with no position fix.
    pub without_position: u64,
    /// Per-sector aggregates; `None` when the receiver location is
    /// unknown and no distance or bearing can be computed.
    pub sectors: Option<Vec<SectorBucket>>,
}

/// Collects aircraft state from a [`DataSource`] and aggregates it by
/// compass sector relative to the receiver.
///
/// [`Exporter::collect`] holds a mutex for the whole cycle so
/// concurrent scrapes serialize instead of racing. All aggregation
/// state is local to one call, so each snapshot reflects exactly one
/// internally consistent fetch.
pub struct Exporter {
    source: Arc<dyn DataSource>,
    compass_points: Vec<String>,
    cycle: Mutex<()>,
}

impl Exporter {
    /// `compass_points` carries one label per sector, clockwise from
    /// north. It must be non-empty; the configuration layer validates
    /// that before construction.
    pub fn new(source: Arc<dyn DataSource>, compass_points: Vec<String>) -> Self {
        debug_assert!(!compass_points.is_empty());
        Self {
            source,
            compass_points,
            cycle: Mutex::new(()),
        }
    }

    /// The fixed set of metrics this exporter can emit. No I/O.
    pub fn describe(&self) -> &'static [MetricDesc] {
        DESCRIPTORS
    }

    /// Run one collection cycle.
    ///
    /// Fetches both upstream documents, then aggregates. Either fetch
    /// failing aborts the whole cycle: no snapshot is ever built from
    /// a single document.
    pub async fn collect(&self) -> Result<MetricSnapshot, FeedError> {
        let _cycle = self.cycle.lock().await;

        let feed = self.source.fetch_aircraft().await?;
        let receiver = self.source.fetch_receiver().await?;

        let start = std::time::Instant::now();
        let total_aircraft = feed.aircraft.len() as u64;
        let mut without_position = 0u64;

        let sectors = if receiver.has_position() {
            let here = LatLon::new(receiver.lat, receiver.lon);
            let mut buckets: Vec<SectorBucket> = self
                .compass_points
                .iter()
                .map(|direction| SectorBucket {
                    direction: direction.clone(),
                    count: 0,
                    max_distance_m: 0.0,
                })
                .collect();

            for a in &feed.aircraft {
                if !a.has_position() {
                    without_position += 1;
                    continue;
                }
                let there = LatLon::new(a.lat, a.lon);
                let distance = here.distance_to(there);
                let s = sector(
                    self.compass_points.len(),
                    here.initial_bearing_to(there) as i64,
                );
                buckets[s].count += 1;
                if distance > buckets[s].max_distance_m {
                    buckets[s].max_distance_m = distance;
                }
            }

            Some(buckets)
        } else {
            without_position = feed
                .aircraft
                .iter()
                .filter(|a| !a.has_position())
                .count() as u64;
            None
        };

        tracing::debug!(
            aircraft = total_aircraft,
            without_position,
            elapsed = ?start.elapsed(),
            "collection cycle aggregated"
        );

        Ok(MetricSnapshot {
            timestamp: feed.now,
            messages: feed.messages,
            total_aircraft,
            without_position,
            sectors,
        })
    }
}
