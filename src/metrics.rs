//! Prometheus text exposition for collected snapshots.
//!
//! The collector produces a plain [`MetricSnapshot`]; this module owns
//! the mapping onto Prometheus metric types. Every value is recomputed
//! from scratch each cycle, so a fresh registry is built per scrape
//! rather than mutating long-lived metric instances.

use prometheus::{Counter, GaugeVec, IntCounter, Opts, Registry, TextEncoder};

use crate::collector::{MetricSnapshot, AIRCRAFT_COUNT, MAX_DISTANCE, MESSAGE_COUNT, TIMESTAMP};

/// Content type of the Prometheus text exposition format.
pub const TEXT_FORMAT: &str = "text/plain; version=0.0.4";

/// Render one snapshot as Prometheus text exposition format.
pub fn encode_snapshot(snapshot: &MetricSnapshot) -> Result<String, prometheus::Error> {
    let registry = Registry::new();

    let aircraft_count = GaugeVec::new(
        Opts::new(AIRCRAFT_COUNT.name, AIRCRAFT_COUNT.help),
        AIRCRAFT_COUNT.labels,
    )?;
    let messages = IntCounter::new(MESSAGE_COUNT.name, MESSAGE_COUNT.help)?;
    let timestamp = Counter::new(TIMESTAMP.name, TIMESTAMP.help)?;

    registry.register(Box::new(aircraft_count.clone()))?;
    registry.register(Box::new(messages.clone()))?;
    registry.register(Box::new(timestamp.clone()))?;

    messages.inc_by(snapshot.messages);
    // Counters reject negative increments; a feed reporting a negative
    // `now` renders as 0 instead of failing the scrape handler.
    timestamp.inc_by(snapshot.timestamp.max(0.0));

    aircraft_count
        .with_label_values(&["false", ""])
        .set(snapshot.without_position as f64);

    // Per-sector series only exist when the receiver location was
    // known this cycle; an unknown receiver emits no sector metrics
    // rather than zeros that were never computed.
    if let Some(buckets) = &snapshot.sectors {
        let max_distance = GaugeVec::new(
            Opts::new(MAX_DISTANCE.name, MAX_DISTANCE.help),
            MAX_DISTANCE.labels,
        )?;
        registry.register(Box::new(max_distance.clone()))?;

        for bucket in buckets {
            aircraft_count
                .with_label_values(&["true", bucket.direction.as_str()])
                .set(bucket.count as f64);
            max_distance
                .with_label_values(&[bucket.direction.as_str()])
                .set(bucket.max_distance_m);
        }
    }

    TextEncoder::new().encode_to_string(&registry.gather())
}
