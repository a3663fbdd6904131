//! Upstream dump1090 data source.
//!
//! dump1090 publishes two JSON documents: `aircraft.json` (the live
//! aircraft table plus cumulative message count) and `receiver.json`
//! (the ground station location). Depending on how dump1090 is
//! deployed they are either served over HTTP or written to a path on
//! disk; [`DataSource`] abstracts over the two so the collector can
//! also be exercised against a fake in tests.

use std::path::PathBuf;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

/// Name of the aircraft state document.
pub const AIRCRAFT_FILE: &str = "aircraft.json";

/// Name of the receiver info document.
pub const RECEIVER_FILE: &str = "receiver.json";

/// Errors raised while fetching upstream documents.
///
/// The sub-cases are distinguishable for logging, but the collector
/// treats them identically: any of them aborts the collection cycle.
#[derive(Debug, Error)]
pub enum FeedError {
    /// HTTP request failed or returned a non-success status.
    #[error("http fetch of {file} failed: {source}")]
    Http {
        file: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// Local file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Document was fetched but is not valid JSON for its schema.
    #[error("malformed document {file}: {source}")]
    Parse {
        file: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// One aircraft row from `aircraft.json`.
///
/// dump1090 omits `lat`/`lon` while an aircraft has no position fix;
/// the serde defaults turn that into (0, 0), the same sentinel the
/// feed itself uses. An aircraft genuinely at (0, 0) is therefore
/// counted as having no fix — upstream feeds do not reliably
/// distinguish the two cases, so neither do we.
#[derive(Debug, Clone, Deserialize)]
pub struct AircraftObservation {
    /// 24-bit ICAO address as a hex string.
    pub hex: String,
    /// Callsign, when broadcast.
    #[serde(default)]
    pub flight: Option<String>,
    /// Transponder squawk code.
    #[serde(default)]
    pub squawk: Option<String>,
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lon: f64,
    /// Messages received from this aircraft.
    #[serde(default)]
    pub messages: u64,
    /// Seconds since the last message from this aircraft.
    #[serde(default)]
    pub seen: f64,
    /// Seconds since the last position update, when positioned.
    #[serde(default)]
    pub seen_pos: Option<f64>,
}

impl AircraftObservation {
    /// Whether this aircraft has a position fix.
    pub fn has_position(&self) -> bool {
        self.lat != 0.0 || self.lon != 0.0
    }
}

/// The `aircraft.json` document.
#[derive(Debug, Clone, Deserialize)]
pub struct AircraftFeed {
    /// Feed timestamp, seconds since the Unix epoch.
    pub now: f64,
    /// Cumulative count of Mode S messages processed.
    pub messages: u64,
    #[serde(default)]
    pub aircraft: Vec<AircraftObservation>,
}

/// The `receiver.json` document. A (0, 0) location means the ground
/// station position is not configured upstream.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReceiverInfo {
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lon: f64,
}

impl ReceiverInfo {
    /// Whether the ground station location is known.
    pub fn has_position(&self) -> bool {
        self.lat != 0.0 || self.lon != 0.0
    }
}

/// Capability interface over the two upstream fetches.
#[async_trait::async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch_aircraft(&self) -> Result<AircraftFeed, FeedError>;
    async fn fetch_receiver(&self) -> Result<ReceiverInfo, FeedError>;
}

/// Fetches documents from a dump1090 HTTP endpoint.
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSource {
    /// `base_url` is the dump1090 data root, e.g.
    /// `http://localhost/dump1090/data`.
    ///
    /// # Errors
    /// Returns the underlying error if the HTTP client cannot be
    /// built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    async fn get<T: DeserializeOwned>(&self, file: &'static str) -> Result<T, FeedError> {
        let url = format!("{}/{}", self.base_url, file);
        let body = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|source| FeedError::Http { file, source })?
            .text()
            .await
            .map_err(|source| FeedError::Http { file, source })?;

        serde_json::from_str(&body).map_err(|source| FeedError::Parse { file, source })
    }
}

#[async_trait::async_trait]
impl DataSource for HttpSource {
    async fn fetch_aircraft(&self) -> Result<AircraftFeed, FeedError> {
        self.get(AIRCRAFT_FILE).await
    }

    async fn fetch_receiver(&self) -> Result<ReceiverInfo, FeedError> {
        self.get(RECEIVER_FILE).await
    }
}

/// Reads documents from dump1090's JSON files on disk.
///
/// The template may contain a `{}` placeholder for the file name
/// (e.g. `/run/dump1090/{}` or `/dev/shm/rbfeeder_{}`); a template
/// without a placeholder is treated as a directory.
pub struct FileSource {
    template: String,
}

impl FileSource {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    fn path_for(&self, file: &str) -> PathBuf {
        if self.template.contains("{}") {
            PathBuf::from(self.template.replace("{}", file))
        } else {
            PathBuf::from(&self.template).join(file)
        }
    }

    async fn read<T: DeserializeOwned>(&self, file: &'static str) -> Result<T, FeedError> {
        let path = self.path_for(file);
        let body = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| FeedError::Io {
                path: path.clone(),
                source,
            })?;

        serde_json::from_str(&body).map_err(|source| FeedError::Parse { file, source })
    }
}

#[async_trait::async_trait]
impl DataSource for FileSource {
    async fn fetch_aircraft(&self) -> Result<AircraftFeed, FeedError> {
        self.read(AIRCRAFT_FILE).await
    }

    async fn fetch_receiver(&self) -> Result<ReceiverInfo, FeedError> {
        self.read(RECEIVER_FILE).await
    }
}
