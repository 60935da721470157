//! Disk cache freshness, pagination, and rate-limit accounting

#[path = "support.rs"]
mod support;

use std::fs;
use std::sync::atomic::Ordering;
use std::time::{Duration, SystemTime};

use mirror_api::{ApiClient, ResponseCache};
use mirror_core::Policy;
use mirror_test_utils::{MockTransport, json_response};
use pretty_assertions::assert_eq;
use serde_json::json;
use support::*;

/// Rewind a cache entry's mtime so it looks `age` old.
fn backdate(cache_dir: &std::path::Path, url: &str, age: Duration) {
    let path = ResponseCache::new(cache_dir).entry_path(url);
    let file = fs::File::options().write(true).open(&path).unwrap();
    file.set_modified(SystemTime::now() - age).unwrap();
}

#[test]
fn second_walk_is_served_entirely_from_cache() {
    let local = tempfile::tempdir().unwrap();
    let cache = tempfile::tempdir().unwrap();
    fs::write(local.path().join("a.txt"), "hello\n").unwrap();

    let transport = transport_with_snapshot(vec![blob("a.txt", "100644", 6, HELLO_SHA)]);
    let calls = transport.calls_handle();
    let session = session(transport, local.path(), Some(cache.path()));

    let opts = mirror_core::WalkOptions::default();
    session
        .walk(&Policy::ReadOnly.hooks(), &Policy::ReadOnly.effects(), &opts)
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let report = session
        .walk(&Policy::ReadOnly.hooks(), &Policy::ReadOnly.effects(), &opts)
        .unwrap();
    assert_eq!(report.stats.matched, 1);
    // the tree listing came from disk: zero additional round trips
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn entry_younger_than_ttl_is_a_hit_older_is_a_miss() {
    let cache_dir = tempfile::tempdir().unwrap();
    let url = "https://api.github.com/repos/octocat/hello";
    let transport = MockTransport::new().route(url, json_response(json!({"ok": true})));
    let calls = transport.calls_handle();
    let client = ApiClient::new(Box::new(transport), Some(cache_dir.path().to_path_buf()));

    let ttl = Duration::from_secs(3600);
    client.fetch_cached(url, ttl).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // just inside the window: served from disk
    backdate(cache_dir.path(), url, Duration::from_secs(3599));
    client.fetch_cached(url, ttl).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // just past the window: exactly one refetch
    backdate(cache_dir.path(), url, Duration::from_secs(3601));
    client.fetch_cached(url, ttl).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn failed_refresh_propagates_and_preserves_the_stale_entry() {
    let cache_dir = tempfile::tempdir().unwrap();
    let url = "https://api.github.com/repos/octocat/hello";

    // populate, then swap the transport for a failing one
    let transport = MockTransport::new().route(url, json_response(json!({"ok": true})));
    let client = ApiClient::new(Box::new(transport), Some(cache_dir.path().to_path_buf()));
    client.fetch_cached(url, Duration::from_secs(3600)).unwrap();

    backdate(cache_dir.path(), url, Duration::from_secs(7200));
    let failing = ApiClient::new(
        Box::new(MockTransport::new().fail(url)),
        Some(cache_dir.path().to_path_buf()),
    );
    let err = failing.fetch_cached(url, Duration::from_secs(3600)).unwrap_err();
    assert!(matches!(err, mirror_api::Error::Transport { .. }));

    // the stale body is still on disk, untouched by the failure
    let entry = ResponseCache::new(cache_dir.path()).entry_path(url);
    assert!(entry.exists());
}

#[test]
fn listing_pages_through_all_pages_announced_by_the_link_header() {
    let page1_url = "https://api.github.com/users/octocat/repos?per_page=100&page=1";
    let page2_url = "https://api.github.com/users/octocat/repos?per_page=100&page=2";

    let page1 = json_response(json!([{"name": "one", "default_branch": "main"}])).with_header(
        "Link",
        &format!("<{page2_url}>; rel=\"next\", <{page2_url}>; rel=\"last\""),
    );
    let page2 = json_response(json!([{"name": "two", "default_branch": "main"}]));

    let local = tempfile::tempdir().unwrap();
    let transport = MockTransport::new()
        .route(page1_url, page1)
        .route(page2_url, page2);
    let calls = transport.calls_handle();
    let session = session(transport, local.path(), None);

    let repos = session.user_repositories(Some("octocat"), None).unwrap();
    let names: Vec<_> = repos.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["one", "two"]);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn short_final_page_stops_the_listing_without_a_link_header() {
    let page1_url = "https://api.github.com/users/octocat/repos?per_page=100&page=1";
    let local = tempfile::tempdir().unwrap();
    let transport = MockTransport::new().route(
        page1_url,
        json_response(json!([{"name": "only", "default_branch": "main"}])),
    );
    let calls = transport.calls_handle();
    let session = session(transport, local.path(), None);

    let repos = session.user_repositories(Some("octocat"), None).unwrap();
    assert_eq!(repos.len(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn rate_limit_counters_come_from_the_latest_round_trip() {
    let local = tempfile::tempdir().unwrap();
    fs::write(local.path().join("a.txt"), "hello\n").unwrap();

    let reset_epoch = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs()
        + 1800;
    let response = json_response(snapshot(vec![blob("a.txt", "100644", 6, HELLO_SHA)]))
        .with_header("X-RateLimit-Limit", "60")
        .with_header("X-RateLimit-Remaining", "42")
        .with_header("X-RateLimit-Reset", &reset_epoch.to_string());
    let transport = MockTransport::new().route(TREE_URL, response);
    let session = session(transport, local.path(), None);

    let report = session
        .walk(
            &Policy::ReadOnly.hooks(),
            &Policy::ReadOnly.effects(),
            &mirror_core::WalkOptions::default(),
        )
        .unwrap();

    let state = session.api().rate_limit().expect("rate limit recorded");
    assert_eq!(state.limit, 60);
    assert_eq!(state.remaining, 42);

    let reset = report.rate_limit_reset_secs.expect("reset seconds reported");
    assert!(reset > 0 && reset <= 1800, "reset was {reset}");
}

#[test]
fn cache_hit_does_not_refresh_rate_limit_counters() {
    let cache_dir = tempfile::tempdir().unwrap();
    let url = "https://api.github.com/repos/octocat/hello";
    let response = json_response(json!({"ok": true}))
        .with_header("X-RateLimit-Limit", "60")
        .with_header("X-RateLimit-Remaining", "10")
        .with_header("X-RateLimit-Reset", "1700000000");
    let transport = MockTransport::new().route(url, response);
    let client = ApiClient::new(Box::new(transport), Some(cache_dir.path().to_path_buf()));

    client.fetch_cached(url, Duration::from_secs(3600)).unwrap();
    let first = client.rate_limit().expect("recorded on the round trip");

    // hit: the counters stay exactly as the round trip left them
    client.fetch_cached(url, Duration::from_secs(3600)).unwrap();
    let second = client.rate_limit().expect("still present");
    assert_eq!(first, second);
}
