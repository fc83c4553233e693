//! Common fixtures for terminology-viewer integration tests

#![allow(dead_code)]

use flate2::Compression;
use flate2::write::GzEncoder;
use std::io::Write;
use std::time::Duration;
use terminology_viewer::{FetchConfig, HttpFetcher, ResourceLocator};
use wiremock::{Match, MockServer, Request};

/// Gzip-compress `data` as a single member
pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).expect("gzip write");
    encoder.finish().expect("gzip finish")
}

/// Terminology-shaped CSV text with `rows` lines and three columns
pub fn terminology_csv(rows: usize) -> String {
    (0..rows)
        .map(|i| format!("{i:06},C{i},\"Concept {i}, preferred term\"\n"))
        .collect()
}

/// HTTP fetcher with a short timeout for tests
pub fn http_fetcher() -> HttpFetcher {
    HttpFetcher::new(&FetchConfig {
        timeout: Duration::from_secs(10),
        ..FetchConfig::default()
    })
    .expect("build fetcher")
}

/// Locator for `path` on the mock server
pub fn locator(server: &MockServer, path: &str) -> ResourceLocator {
    ResourceLocator::parse(&format!("{}{}", server.uri(), path)).expect("valid locator")
}

/// Matches requests without a `Range` header
pub struct NoRangeHeader;

impl Match for NoRangeHeader {
    fn matches(&self, request: &Request) -> bool {
        !request.headers.contains_key("range")
    }
}
