//! Integration tests for the notes fetcher against a mock notes service.

use std::sync::Arc;

use mapnotes_core::{LatLonBounds, NoteSource};
use mapnotes_feed::{FeedConfig, NoteFetcher, ViewportCache};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher_for(server: &MockServer) -> NoteFetcher {
    let config = FeedConfig::default()
        .with_api_url(server.uri())
        .with_timeout_secs(5);
    NoteFetcher::new(&config).expect("Failed to create fetcher")
}

fn feed_with_two_comments() -> String {
    let first = "Crossing lights not working at night!!!!"; // 40 characters
    let second = "b".repeat(200);
    assert_eq!(first.chars().count(), 40);
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<osm version="0.6">
  <note lon="13.3777" lat="52.5163">
    <id>901</id>
    <status>open</status>
    <comments>
      <comment><date>2024-06-01 09:00:00 UTC</date><user>alice</user><text>{}</text></comment>
      <comment><date>2024-06-02 09:00:00 UTC</date><user>bob</user><text>{}</text></comment>
    </comments>
  </note>
</osm>"#,
        first, second
    )
}

#[tokio::test]
async fn test_fetch_region_with_one_open_note() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/0.6/notes"))
        .and(query_param("bbox", "13.3,52.4,13.5,52.6"))
        .respond_with(ResponseTemplate::new(200).set_body_string(feed_with_two_comments()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = fetcher_for(&mock_server);
    let notes = fetcher.fetch(52.6, 13.3, 52.4, 13.5).await;

    assert_eq!(notes.len(), 1);
    let note = &notes[0];
    assert_eq!(note.id, 901);
    assert!(note.opened);
    assert_eq!(
        note.description.as_deref(),
        Some("Crossing lights not working at night!!!!")
    );
    assert_eq!(note.type_name.as_deref(), Some("2024-06-01 09:00:00 UTC alice"));
    assert_eq!(note.comments.len(), 1);
    assert_eq!(note.comments[0].user, "bob");
    assert_eq!(note.comments[0].text.len(), 200);
}

#[tokio::test]
async fn test_fetch_server_error_yields_empty_list() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/0.6/notes"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let fetcher = fetcher_for(&mock_server);
    assert!(fetcher.fetch(1.0, 0.0, 0.0, 1.0).await.is_empty());

    let err = fetcher.try_fetch(1.0, 0.0, 0.0, 1.0).await.unwrap_err();
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn test_fetch_malformed_feed_yields_empty_list() {
    let mock_server = MockServer::start().await;

    let body = r#"<osm><note lon="1" lat="1"><id>1</id></note><note lon="2" lat="2"><id>two</id></note></osm>"#;
    Mock::given(method("GET"))
        .and(path("/api/0.6/notes"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&mock_server)
        .await;

    let fetcher = fetcher_for(&mock_server);
    // One bad record fails the whole fetch
    assert!(fetcher.fetch(3.0, 0.0, 0.0, 3.0).await.is_empty());
    assert!(fetcher.try_fetch(3.0, 0.0, 0.0, 3.0).await.is_err());
}

#[tokio::test]
async fn test_fetch_unreachable_service_yields_empty_list() {
    let config = FeedConfig::default()
        .with_api_url("http://127.0.0.1:9")
        .with_timeout_secs(2);
    let fetcher = NoteFetcher::new(&config).unwrap();

    let bounds = LatLonBounds::new(1.0, 0.0, 0.0, 1.0);
    assert!(fetcher.fetch_notes(bounds).await.is_empty());
}

#[tokio::test]
async fn test_viewport_cache_loads_through_fetcher() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/0.6/notes"))
        .respond_with(ResponseTemplate::new(200).set_body_string(feed_with_two_comments()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = Arc::new(fetcher_for(&mock_server));
    let cache = ViewportCache::new(fetcher, tokio::runtime::Handle::current());
    let viewport = mapnotes_core::MercatorViewport::new(52.5163, 13.3777, 15, 600, 400);

    cache
        .query_new_data(&viewport)
        .expect("empty cache fetches")
        .await
        .unwrap();
    assert!(cache.query_new_data(&viewport).is_none());

    let notes = cache.results().expect("results stored");
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].id, 901);
}
