use super::*;
use crate::types::SourceId;
use chrono::{TimeZone, Utc};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RSS_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
    <channel>
        <title>Test Feed</title>
        <link>https://example.com</link>
        <description>Test RSS Feed</description>
        <item>
            <title>Model release notes</title>
            <link>https://example.com/posts/1</link>
            <description><![CDATA[<p>First paragraph</p>]]></description>
            <pubDate>Mon, 01 Jan 2024 12:00:00 +0200</pubDate>
            <category>AI</category>
            <category>Research</category>
        </item>
        <item>
            <title>No link here</title>
            <description>dropped</description>
        </item>
        <item>
            <title>Undated</title>
            <link>https://example.com/posts/2</link>
        </item>
    </channel>
</rss>"#;

const ATOM_FEED: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
    <title>Atom Feed</title>
    <id>urn:uuid:feed</id>
    <updated>2024-01-02T00:00:00Z</updated>
    <entry>
        <title>Atom entry</title>
        <id>urn:uuid:1</id>
        <link rel="alternate" href="https://example.com/atom/1"/>
        <updated>2024-01-02T00:00:00Z</updated>
        <published>2024-01-01T08:30:00-05:00</published>
        <summary>Short summary</summary>
        <category term="rust"/>
    </entry>
    <entry>
        <title>Only updated</title>
        <id>urn:uuid:2</id>
        <link href="https://example.com/atom/2"/>
        <updated>2024-01-03T00:00:00Z</updated>
        <content type="html">&lt;p&gt;Body&lt;/p&gt;</content>
    </entry>
</feed>"#;

fn source(url: String) -> Source {
    Source {
        id: SourceId(1),
        name: "Test".to_string(),
        feed_url: url,
        created_at: Utc::now(),
    }
}

#[test]
fn test_parse_rss_items() {
    let items = parse_rss(RSS_FEED.as_bytes()).unwrap();

    // The link-less item is dropped
    assert_eq!(items.len(), 2);

    let first = &items[0];
    assert_eq!(first.title, "Model release notes");
    assert_eq!(first.link, "https://example.com/posts/1");
    assert_eq!(first.summary, "<p>First paragraph</p>");
    assert_eq!(first.categories, vec!["AI", "Research"]);
    assert_eq!(
        first.published_at.with_timezone(&Utc),
        Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap()
    );

    let undated = &items[1];
    assert_eq!(undated.summary, "");
    let age = Utc::now() - undated.published_at.with_timezone(&Utc);
    assert!(age.num_seconds() < 60, "missing pubDate should fall back to now");
}

#[test]
fn test_parse_atom_entries() {
    let items = parse_atom(ATOM_FEED.as_bytes()).unwrap();
    assert_eq!(items.len(), 2);

    assert_eq!(items[0].title, "Atom entry");
    assert_eq!(items[0].link, "https://example.com/atom/1");
    assert_eq!(items[0].summary, "Short summary");
    assert_eq!(items[0].categories, vec!["rust"]);
    assert_eq!(
        items[0].published_at.with_timezone(&Utc),
        Utc.with_ymd_and_hms(2024, 1, 1, 13, 30, 0).unwrap()
    );

    // Falls back to updated and content
    assert_eq!(
        items[1].published_at.with_timezone(&Utc),
        Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap()
    );
    assert_eq!(items[1].summary, "<p>Body</p>");
}

#[test]
fn test_parse_feed_falls_back_to_atom() {
    let items = parse_feed(ATOM_FEED.as_bytes()).unwrap();
    assert_eq!(items.len(), 2);
}

#[test]
fn test_parse_feed_rejects_garbage() {
    let err = parse_feed(b"<html><body>not a feed</body></html>").unwrap_err();
    match err {
        Error::Feed(msg) => {
            assert!(msg.contains("RSS error"), "got: {msg}");
            assert!(msg.contains("Atom error"), "got: {msg}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_http_fetch_parses_feed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed.xml"))
        .and(header("user-agent", "news-relay-test"))
        .respond_with(ResponseTemplate::new(200).set_body_string(RSS_FEED))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = HttpFeedFetcher::new(Duration::from_secs(5), "news-relay-test").unwrap();
    let items = fetcher
        .fetch(&source(format!("{}/feed.xml", server.uri())))
        .await
        .unwrap();

    assert_eq!(items.len(), 2);
}

#[tokio::test]
async fn test_http_fetch_rejects_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed.xml"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let fetcher = HttpFeedFetcher::new(Duration::from_secs(5), "news-relay-test").unwrap();
    let err = fetcher
        .fetch(&source(format!("{}/feed.xml", server.uri())))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Feed(ref msg) if msg.contains("503")), "got: {err:?}");
}

#[tokio::test]
async fn test_http_fetch_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(RSS_FEED)
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let fetcher = HttpFeedFetcher::new(Duration::from_millis(200), "news-relay-test").unwrap();
    let err = fetcher
        .fetch(&source(format!("{}/feed.xml", server.uri())))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Network(_)), "got: {err:?}");
}
