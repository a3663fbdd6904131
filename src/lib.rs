//! dump1090 ADS-B Prometheus Exporter
//!
//! Scrapes aircraft and receiver state from a dump1090 instance (over
//! HTTP or from its JSON files on disk) and exposes aggregate metrics
//! on a Prometheus endpoint: aircraft counts split by position fix and
//! compass direction, cumulative message count, feed timestamp, and
//! the maximum observed distance per compass sector.
//!
//! # Architecture
//!
//! - [`feed`]: upstream data source abstraction (HTTP or filesystem)
//! - [`collector`]: one fetch-and-aggregate pass per scrape
//! - [`sectors`]: compass sector classification
//! - [`geo`]: great-circle distance and bearing
//! - [`metrics`]: Prometheus text exposition
//! - [`server`]: Axum HTTP listener
//! - [`config`]: YAML configuration with CLI/env overrides

pub mod collector;
pub mod config;
pub mod feed;
pub mod geo;
pub mod metrics;
pub mod sectors;
pub mod server;

pub use collector::{Exporter, MetricSnapshot, SectorBucket};
pub use config::{ConfigError, ExporterConfig};
pub use feed::{
    AircraftFeed, AircraftObservation, DataSource, FeedError, FileSource, HttpSource, ReceiverInfo,
};
