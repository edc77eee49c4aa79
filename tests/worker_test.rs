use std::sync::Arc;

use url::Url;

use gangway::config::{FetchPolicy, WorkerSettings};
use gangway::headless::FixtureFetcher;
use gangway::worker::{AssetResponse, CacheWorker, WorkerError};

const SCOPE: &str = "https://host/";

fn settings() -> WorkerSettings {
    WorkerSettings::new("reader", 2, Url::parse(SCOPE).unwrap()).with_data_path("/data/book.json")
}

fn fetcher_with_manifest() -> Arc<FixtureFetcher> {
    let fetcher = Arc::new(FixtureFetcher::new());
    for path in ["/", "/index.html", "/bundle.css", "/bundle.js", "/data/book.json"] {
        fetcher.respond(&format!("https://host{path}"), b"asset");
    }
    fetcher
}

fn url(raw: &str) -> Url {
    Url::parse(raw).unwrap()
}

#[tokio::test]
async fn install_pre_caches_every_manifest_entry() {
    let fetcher = fetcher_with_manifest();
    let worker = CacheWorker::new(settings(), Arc::clone(&fetcher));

    worker.install().await.unwrap();

    let mut keys = worker.storage().keys_in("reader-v2").await;
    keys.sort();
    assert_eq!(
        keys,
        vec![
            "https://host/",
            "https://host/bundle.css",
            "https://host/bundle.js",
            "https://host/data/book.json",
            "https://host/index.html",
        ]
    );
}

#[tokio::test]
async fn failed_precache_fails_the_install() {
    let fetcher = fetcher_with_manifest();
    fetcher.fail("https://host/bundle.js", "unreachable");
    let worker = CacheWorker::new(settings(), Arc::clone(&fetcher));

    let err = worker.install().await.unwrap_err();
    assert!(matches!(err, WorkerError::Install { ref url, .. } if url == "https://host/bundle.js"));
}

#[tokio::test]
async fn activate_prunes_only_this_manifests_stale_versions() {
    let fetcher = fetcher_with_manifest();
    let worker = CacheWorker::new(settings(), Arc::clone(&fetcher));
    worker.install().await.unwrap();

    worker
        .storage()
        .put("reader-v1", "https://host/old", AssetResponse::ok(b"x".to_vec()))
        .await;
    worker
        .storage()
        .put("other-app-v1", "https://host/y", AssetResponse::ok(b"y".to_vec()))
        .await;

    let pruned = worker.activate().await;
    assert_eq!(pruned, vec!["reader-v1".to_string()]);
    assert!(!worker.storage().has("reader-v1").await);
    assert!(worker.storage().has("other-app-v1").await);
    assert!(worker.storage().has("reader-v2").await);
}

#[tokio::test]
async fn manifest_asset_with_query_string_still_matches() {
    let fetcher = fetcher_with_manifest();
    fetcher.respond("https://host/app/bundle.js?v=2", b"versioned");
    let worker = CacheWorker::new(settings(), Arc::clone(&fetcher));

    let response = worker
        .handle_fetch(&url("https://host/app/bundle.js?v=2"))
        .await
        .unwrap();
    assert_eq!(response.body, b"versioned");

    // Treated as a manifest asset: the live fetch refreshed the cache.
    assert!(worker
        .storage()
        .match_in("reader-v2", "https://host/app/bundle.js?v=2")
        .await
        .is_some());
}

#[tokio::test]
async fn cached_unlisted_asset_is_served_without_network() {
    let fetcher = fetcher_with_manifest();
    let worker = CacheWorker::new(settings(), Arc::clone(&fetcher));
    worker
        .storage()
        .put(
            "reader-v2",
            "https://host/api/chapters",
            AssetResponse::ok(b"cached".to_vec()),
        )
        .await;

    let response = worker
        .handle_fetch(&url("https://host/api/chapters"))
        .await
        .unwrap();
    assert_eq!(response.body, b"cached");
    assert_eq!(fetcher.call_count("https://host/api/chapters"), 0);
}

#[tokio::test]
async fn network_first_policy_refreshes_unlisted_assets_too() {
    let fetcher = fetcher_with_manifest();
    fetcher.respond("https://host/api/chapters", b"live");
    let worker = CacheWorker::new(
        settings().with_policy(FetchPolicy::NetworkFirst),
        Arc::clone(&fetcher),
    );
    worker
        .storage()
        .put(
            "reader-v2",
            "https://host/api/chapters",
            AssetResponse::ok(b"cached".to_vec()),
        )
        .await;

    let response = worker
        .handle_fetch(&url("https://host/api/chapters"))
        .await
        .unwrap();
    assert_eq!(response.body, b"live");
    assert_eq!(fetcher.call_count("https://host/api/chapters"), 1);
}

#[tokio::test]
async fn manifest_fetch_returns_live_response_and_refreshes_cache() {
    let fetcher = fetcher_with_manifest();
    let worker = CacheWorker::new(settings(), Arc::clone(&fetcher));
    worker
        .storage()
        .put(
            "reader-v2",
            "https://host/bundle.js",
            AssetResponse::ok(b"stale".to_vec()),
        )
        .await;

    let response = worker
        .handle_fetch(&url("https://host/bundle.js"))
        .await
        .unwrap();
    assert_eq!(response.body, b"asset");

    let cached = worker
        .storage()
        .match_in("reader-v2", "https://host/bundle.js")
        .await
        .unwrap();
    assert_eq!(cached.body, b"asset");
}

#[tokio::test]
async fn urls_containing_test_are_served_but_never_cached() {
    let fetcher = fetcher_with_manifest();
    fetcher.respond("https://host/test/bundle.js", b"fixture");
    let worker = CacheWorker::new(settings(), Arc::clone(&fetcher));

    let response = worker
        .handle_fetch(&url("https://host/test/bundle.js"))
        .await
        .unwrap();
    assert_eq!(response.body, b"fixture");
    assert!(worker
        .storage()
        .match_any("https://host/test/bundle.js")
        .await
        .is_none());
}

#[tokio::test]
async fn network_failure_falls_back_to_the_cached_copy() {
    let fetcher = fetcher_with_manifest();
    let worker = CacheWorker::new(settings(), Arc::clone(&fetcher));
    worker.install().await.unwrap();

    fetcher.fail("https://host/bundle.js", "offline");
    let response = worker
        .handle_fetch(&url("https://host/bundle.js"))
        .await
        .unwrap();
    assert_eq!(response.body, b"asset");
}

#[tokio::test]
async fn network_failure_without_cache_surfaces_the_error() {
    let fetcher = fetcher_with_manifest();
    fetcher.fail("https://host/bundle.js", "offline");
    let worker = CacheWorker::new(settings(), Arc::clone(&fetcher));

    let err = worker
        .handle_fetch(&url("https://host/bundle.js"))
        .await
        .unwrap_err();
    assert!(matches!(err, WorkerError::Fetch(_)));
    // The request is re-issued once before the failure propagates.
    assert_eq!(fetcher.call_count("https://host/bundle.js"), 2);
}
