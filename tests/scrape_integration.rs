//! Scrape integration tests.
//!
//! Boots the exporter HTTP server against dump1090 JSON files on disk
//! and scrapes it the way Prometheus would.

use std::sync::Arc;

use dump1090_exporter::{
    collector::Exporter,
    feed::FileSource,
    server::{create_router, AppState},
};
use tempfile::TempDir;
use tokio::net::TcpListener;

// =============================================================================
// Test Helpers
// =============================================================================

const AIRCRAFT_JSON: &str = r#"{
  "now": 1700000000.5,
  "messages": 4242,
  "aircraft": [
    { "hex": "4008f1", "flight": "BAW123", "lat": 52.1, "lon": -0.4, "messages": 110, "seen": 0.2 },
    { "hex": "406b9e", "lat": 50.9, "lon": 0.2, "messages": 58, "seen": 1.1 },
    { "hex": "a1b2c3", "squawk": "7000", "messages": 9, "seen": 5.0 }
  ]
}"#;

const RECEIVER_JSON: &str = r#"{ "version": "3.8.1", "refresh": 1000, "lat": 51.47, "lon": -0.45 }"#;

/// Write the given documents into a fresh feed directory.
fn write_feed_dir(aircraft: Option<&str>, receiver: Option<&str>) -> TempDir {
    let dir = tempfile::tempdir().expect("create tempdir");
    if let Some(body) = aircraft {
        std::fs::write(dir.path().join("aircraft.json"), body).unwrap();
    }
    if let Some(body) = receiver {
        std::fs::write(dir.path().join("receiver.json"), body).unwrap();
    }
    dir
}

/// Start the exporter over the given feed directory, return base URL.
async fn start_test_server(dir: &TempDir) -> String {
    let source = Arc::new(FileSource::new(dir.path().display().to_string()));
    let exporter = Arc::new(Exporter::new(
        source,
        ["N", "NE", "E", "SE", "S", "SW", "W", "NW"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    ));
    let router = create_router(AppState {
        exporter,
        telemetry_path: "/metrics".to_string(),
    });

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let addr = listener.local_addr().expect("Failed to get local addr");

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://{}", addr)
}

/// Sum the sample values of every `dump1090_aircraft_count` series.
fn sum_aircraft_count(body: &str) -> f64 {
    body.lines()
        .filter(|line| line.starts_with("dump1090_aircraft_count{"))
        .map(|line| {
            line.rsplit(' ')
                .next()
                .and_then(|v| v.parse::<f64>().ok())
                .unwrap_or_else(|| panic!("unparseable sample line: {line}"))
        })
        .sum()
}

// =============================================================================
// Scrape Tests
// =============================================================================

#[tokio::test]
async fn test_scrape_full_feed() {
    let dir = write_feed_dir(Some(AIRCRAFT_JSON), Some(RECEIVER_JSON));
    let base_url = start_test_server(&dir).await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{}/metrics", base_url))
        .send()
        .await
        .expect("Failed to scrape metrics");
    assert_eq!(resp.status(), 200);

    let body = resp.text().await.expect("Failed to read body");
    assert!(body.contains("dump1090_aircraft_messages 4242"), "{body}");
    assert!(body.contains("dump1090_aircraft_timestamp"), "{body}");

    // 4008f1 is almost due north of the receiver, 406b9e to the
    // southeast, a1b2c3 has no fix.
    assert!(
        body.contains(r#"dump1090_aircraft_count{direction="N",with_position="true"} 1"#),
        "{body}"
    );
    assert!(
        body.contains(r#"dump1090_aircraft_count{direction="SE",with_position="true"} 1"#),
        "{body}"
    );
    assert!(body.contains(r#"with_position="false"} 1"#), "{body}");
    assert!(
        body.contains(r#"dump1090_aircraft_max_distance{direction="N"}"#),
        "{body}"
    );

    // Positioned counts plus the no-fix count account for every
    // aircraft in the feed.
    assert_eq!(sum_aircraft_count(&body), 3.0);
}

#[tokio::test]
async fn test_scrape_with_unknown_receiver_location() {
    let dir = write_feed_dir(Some(AIRCRAFT_JSON), Some(r#"{ "lat": 0, "lon": 0 }"#));
    let base_url = start_test_server(&dir).await;

    let resp = reqwest::get(format!("{}/metrics", base_url))
        .await
        .expect("Failed to scrape metrics");
    assert_eq!(resp.status(), 200);

    let body = resp.text().await.expect("Failed to read body");
    assert!(!body.contains("dump1090_aircraft_max_distance"), "{body}");
    assert!(!body.contains(r#"with_position="true""#), "{body}");
    assert!(body.contains(r#"with_position="false"} 1"#), "{body}");
    assert!(body.contains("dump1090_aircraft_messages 4242"), "{body}");
}

#[tokio::test]
async fn test_scrape_fails_when_receiver_document_missing() {
    let dir = write_feed_dir(Some(AIRCRAFT_JSON), None);
    let base_url = start_test_server(&dir).await;

    let resp = reqwest::get(format!("{}/metrics", base_url))
        .await
        .expect("Failed to scrape metrics");
    assert_eq!(resp.status(), 503);

    let body = resp.text().await.expect("Failed to read body");
    assert!(!body.contains("dump1090_aircraft"), "{body}");
}

#[tokio::test]
async fn test_scrape_fails_on_malformed_document() {
    let dir = write_feed_dir(Some("{ truncated"), Some(RECEIVER_JSON));
    let base_url = start_test_server(&dir).await;

    let resp = reqwest::get(format!("{}/metrics", base_url))
        .await
        .expect("Failed to scrape metrics");
    assert_eq!(resp.status(), 503);
}

#[tokio::test]
async fn test_concurrent_scrapes_are_consistent() {
    let dir = write_feed_dir(Some(AIRCRAFT_JSON), Some(RECEIVER_JSON));
    let base_url = start_test_server(&dir).await;
    let client = reqwest::Client::new();

    let (a, b) = tokio::join!(
        client.get(format!("{}/metrics", base_url)).send(),
        client.get(format!("{}/metrics", base_url)).send(),
    );

    for resp in [a.unwrap(), b.unwrap()] {
        assert_eq!(resp.status(), 200);
        let body = resp.text().await.unwrap();
        assert_eq!(sum_aircraft_count(&body), 3.0);
    }
}

#[tokio::test]
async fn test_landing_page() {
    let dir = write_feed_dir(Some(AIRCRAFT_JSON), Some(RECEIVER_JSON));
    let base_url = start_test_server(&dir).await;

    let resp = reqwest::get(&base_url)
        .await
        .expect("Failed to fetch landing page");
    assert_eq!(resp.status(), 200);

    let body = resp.text().await.expect("Failed to read body");
    assert!(body.contains(r#"<a href="/metrics">"#), "{body}");
}
