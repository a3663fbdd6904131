//! Exporter configuration.
//!
//! Settings come from an optional YAML file with CLI/env overrides
//! applied on top (CLI > ENV > config file > defaults). Validation
//! runs once at startup; a bad configuration is fatal before the
//! first collection cycle.

use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Constants
// =============================================================================

/// Default exporter port, from the Prometheus exporter port registry.
pub const DEFAULT_PORT: u16 = 9799;

/// Default timeout per upstream HTTP request.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Default compass point labels, one per sector, clockwise from north.
pub const DEFAULT_COMPASS_POINTS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

fn default_compass_points() -> Vec<String> {
    DEFAULT_COMPASS_POINTS.iter().map(|s| s.to_string()).collect()
}

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse YAML configuration.
    #[error("failed to parse YAML config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Configuration validation failed.
    #[error("config validation error: {0}")]
    Validation(String),
}

// =============================================================================
// Server Configuration
// =============================================================================

/// Web server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (default: "0.0.0.0").
    pub bind: String,

    /// Port (default: 9799).
    pub port: u16,

    /// Path under which to expose metrics (default: "/metrics").
    pub telemetry_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            telemetry_path: "/metrics".to_string(),
        }
    }
}

// =============================================================================
// Source Configuration
// =============================================================================

/// Upstream dump1090 source selection. Exactly one of `url` and
/// `files` must be set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Base URL of a dump1090 instance, e.g.
    /// `http://localhost/dump1090/data`.
    pub url: Option<String>,

    /// Path template for dump1090's JSON files, e.g.
    /// `/run/dump1090/{}` or a plain directory.
    pub files: Option<String>,

    /// Timeout per upstream HTTP request (default: 10s).
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: None,
            files: None,
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

// =============================================================================
// Compass Configuration
// =============================================================================

/// Compass sector configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompassConfig {
    /// Number of equal compass sectors (default: 8).
    pub sectors: usize,

    /// One label per sector, clockwise from north.
    pub points: Vec<String>,
}

impl Default for CompassConfig {
    fn default() -> Self {
        Self {
            sectors: DEFAULT_COMPASS_POINTS.len(),
            points: default_compass_points(),
        }
    }
}

// =============================================================================
// Exporter Configuration
// =============================================================================

/// Top-level exporter configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExporterConfig {
    /// Web server configuration.
    pub server: ServerConfig,

    /// Upstream dump1090 source.
    pub source: SourceConfig,

    /// Compass sector layout.
    pub compass: CompassConfig,
}

impl ExporterConfig {
    /// Load configuration from a YAML file. Validation is deferred
    /// until after CLI/env overrides are applied.
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    /// Returns `ConfigError::Validation` if any field is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.bind.parse::<IpAddr>().map_err(|_| {
            ConfigError::Validation(format!(
                "invalid server bind address: '{}'",
                self.server.bind
            ))
        })?;

        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server port must be non-zero".to_string(),
            ));
        }

        if !self.server.telemetry_path.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "telemetry path must start with '/': '{}'",
                self.server.telemetry_path
            )));
        }

        // The router already serves these; a colliding telemetry path
        // would panic at route registration instead of failing cleanly.
        if matches!(self.server.telemetry_path.as_str(), "/" | "/healthz") {
            return Err(ConfigError::Validation(format!(
                "telemetry path collides with a built-in route: '{}'",
                self.server.telemetry_path
            )));
        }

        match (&self.source.url, &self.source.files) {
            (Some(_), Some(_)) | (None, None) => {
                return Err(ConfigError::Validation(
                    "exactly one of source.url and source.files must be set".to_string(),
                ));
            }
            _ => {}
        }

        if self.compass.sectors == 0 {
            return Err(ConfigError::Validation(
                "compass.sectors must be at least 1".to_string(),
            ));
        }

        if self.compass.points.len() != self.compass.sectors {
            return Err(ConfigError::Validation(format!(
                "compass.points has {} labels but compass.sectors is {}",
                self.compass.points.len(),
                self.compass.sectors
            )));
        }

        Ok(())
    }
}
