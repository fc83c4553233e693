//! Viewer session tests over HTTP

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{gzip, terminology_csv};
use std::time::Duration;
use terminology_viewer::{
    CatalogConfig, Classification, Config, Event, FetchConfig, LoadTicket, RowView,
    ViewerSession,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn session_for(server: &MockServer) -> ViewerSession {
    ViewerSession::new(Config {
        fetch: FetchConfig {
            timeout: Duration::from_secs(10),
            ..FetchConfig::default()
        },
        catalog: CatalogConfig {
            base_url: server.uri(),
            ..CatalogConfig::default()
        },
        ..Config::default()
    })
    .unwrap()
}

#[tokio::test]
async fn open_file_then_filter_and_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/versioned_terminology/0.14.12/gender.csv_0_0_0.csv.gz"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(gzip(terminology_csv(250).as_bytes())))
        .mount(&server)
        .await;

    let session = session_for(&server);
    let ticket = session.open("gender.csv_0_0_0.csv.gz").await.unwrap();
    assert!(ticket.is_published());

    let file = session.current().await.unwrap();
    let outcome = file.report.outcome.as_ref().unwrap();
    assert_eq!(outcome.rows.len(), 250);
    assert_eq!(outcome.placeholder_headers(), vec!["Column 1", "Column 2", "Column 3"]);

    let all = RowView::new(&outcome.rows, "");
    assert_eq!(all.total_pages(100), 3);
    assert_eq!(all.page(3, 100).rows.len(), 50);

    let filtered = RowView::new(&outcome.rows, "concept 12");
    // Concept 12 and Concept 120..129
    assert_eq!(filtered.len(), 11);
}

#[tokio::test]
async fn slow_stale_response_is_discarded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/versioned_terminology/0.14.12/loinc.csv_0_0_0.csv.gz"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(gzip(terminology_csv(10).as_bytes()))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/versioned_terminology/0.14.12/race.csv_0_0_0.csv.gz"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(gzip(terminology_csv(3).as_bytes())))
        .mount(&server)
        .await;

    let session = std::sync::Arc::new(session_for(&server));
    let mut events = session.subscribe();

    let slow_session = session.clone();
    let slow = tokio::spawn(async move {
        slow_session.open("loinc.csv_0_0_0.csv.gz").await.unwrap()
    });

    // Let the slow request get on the wire before superseding it
    tokio::time::sleep(Duration::from_millis(100)).await;
    let fast = session.open("race.csv_0_0_0.csv.gz").await.unwrap();
    assert!(fast.is_published());

    let stale = slow.await.unwrap();
    assert!(matches!(stale, LoadTicket::Superseded { .. }));

    let file = session.current().await.unwrap();
    assert_eq!(file.report.locator.file_name(), "race.csv_0_0_0.csv.gz");
    assert_eq!(file.report.outcome.as_ref().unwrap().rows.len(), 3);

    let mut saw_superseded = false;
    while let Ok(event) = events.try_recv() {
        if let Event::Superseded { .. } = event {
            saw_superseded = true;
        }
    }
    assert!(saw_superseded);
}

#[tokio::test]
async fn truncated_file_reports_fallback_event() {
    let server = MockServer::start().await;
    let compressed = gzip(terminology_csv(5_000).as_bytes());
    let cut = compressed[..compressed.len() / 2].to_vec();
    Mock::given(method("GET"))
        .and(path("/versioned_terminology/0.14.12/ndc.csv_0_0_0.csv.gz"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(cut))
        .mount(&server)
        .await;

    let session = session_for(&server);
    let mut events = session.subscribe();
    session.open("ndc.csv_0_0_0.csv.gz").await.unwrap();

    let mut kinds = Vec::new();
    while let Ok(event) = events.try_recv() {
        kinds.push(event);
    }
    assert!(matches!(kinds[0], Event::LoadStarted { .. }));
    assert!(matches!(kinds[1], Event::FallbackStarted { .. }));
    match &kinds[2] {
        Event::Loaded { classification, .. } => {
            assert_eq!(*classification, Classification::Partial)
        }
        other => panic!("expected Loaded, got {other:?}"),
    }
}
