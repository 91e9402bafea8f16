//! App-shell lifecycle and fetch strategy scenarios

use cadence_shell::{
    CacheStorage, Destination, Fetcher, LifecycleState, Request, Response, ShellConfig,
    ShellError, ShellMessage, ShellReply, ShellWorker,
};
use std::collections::HashMap;

const ORIGIN: &str = "https://player.example/";

/// Network double serving fixed bodies, switchable offline
#[derive(Default)]
struct FakeNetwork {
    pages: HashMap<String, Response>,
    online: bool,
    requests: Vec<String>,
}

impl FakeNetwork {
    fn with_shell() -> Self {
        let mut network = Self {
            online: true,
            ..Self::default()
        };
        for path in cadence_shell::DEFAULT_APP_SHELL {
            let url = format!("{ORIGIN}{}", path.trim_start_matches("./"));
            network.serve(&url, &format!("body of {path}"));
        }
        network
    }

    fn serve(&mut self, url: &str, body: &str) {
        self.pages
            .insert(url.to_string(), Response::ok("text/plain", body));
    }
}

impl Fetcher for FakeNetwork {
    fn fetch(&mut self, request: &Request) -> Result<Response, ShellError> {
        self.requests.push(request.url.to_string());
        if !self.online {
            return Err(ShellError::network("offline"));
        }
        Ok(self
            .pages
            .get(request.url.as_str())
            .cloned()
            .unwrap_or_else(|| Response::new(404, "text/plain", "missing")))
    }
}

fn active_worker(network: &mut FakeNetwork) -> ShellWorker {
    let mut worker = ShellWorker::new(ShellConfig::for_origin(ORIGIN).unwrap());
    worker.install(network).unwrap();
    worker.activate();
    worker
}

#[test]
fn install_precaches_the_manifest() {
    let mut network = FakeNetwork::with_shell();
    let mut worker = ShellWorker::new(ShellConfig::for_origin(ORIGIN).unwrap());
    assert_eq!(worker.state(), LifecycleState::Installing);

    worker.install(&mut network).unwrap();
    assert_eq!(worker.state(), LifecycleState::Installed);

    let status = worker.cache_status();
    assert_eq!(status.cached_items, 7);
    assert_eq!(status.app_shell_items, 7);
}

#[test]
fn failed_install_caches_nothing() {
    let mut network = FakeNetwork::with_shell();
    network.pages.remove("https://player.example/icons/icon-512.png");

    let mut worker = ShellWorker::new(ShellConfig::for_origin(ORIGIN).unwrap());
    let err = worker.install(&mut network).unwrap_err();
    assert!(matches!(err, ShellError::Install(_)));
    assert_eq!(worker.state(), LifecycleState::Installing);
    assert_eq!(worker.cache_status().cached_items, 0);
}

#[test]
fn waiting_worker_does_not_intercept() {
    let mut network = FakeNetwork::with_shell();
    let mut worker = ShellWorker::new(ShellConfig::for_origin(ORIGIN).unwrap());
    worker.install(&mut network).unwrap();

    let request = Request::get("https://player.example/index.html").unwrap();
    assert!(worker.handle_fetch(&request, &mut network).is_none());

    assert_eq!(worker.handle_message(ShellMessage::SkipWaiting), ShellReply::Ack);
    assert_eq!(worker.state(), LifecycleState::Active);
    assert!(worker.handle_fetch(&request, &mut network).is_some());
}

#[test]
fn shell_assets_are_served_from_cache_when_offline() {
    let mut network = FakeNetwork::with_shell();
    let mut worker = active_worker(&mut network);
    network.online = false;
    network.requests.clear();

    let request = Request::get("https://player.example/app.js").unwrap();
    let response = worker.handle_fetch(&request, &mut network).unwrap();
    assert_eq!(response.text(), "body of ./app.js");
    // Cache hit never touches the network
    assert!(network.requests.is_empty());
}

#[test]
fn network_first_falls_back_to_cache() {
    let mut network = FakeNetwork::with_shell();
    network.serve("https://player.example/api/status", "fresh");
    let mut worker = active_worker(&mut network);

    let request = Request::get("https://player.example/api/status").unwrap();
    assert_eq!(worker.handle_fetch(&request, &mut network).unwrap().text(), "fresh");

    network.serve("https://player.example/api/status", "newer");
    assert_eq!(worker.handle_fetch(&request, &mut network).unwrap().text(), "newer");

    network.online = false;
    assert_eq!(worker.handle_fetch(&request, &mut network).unwrap().text(), "newer");
}

#[test]
fn error_responses_are_not_cached() {
    let mut network = FakeNetwork::with_shell();
    let mut worker = active_worker(&mut network);

    let request = Request::get("https://player.example/missing.css").unwrap();
    let response = worker.handle_fetch(&request, &mut network).unwrap();
    assert_eq!(response.status, 404);
    assert_eq!(worker.cache_status().cached_items, 7);
}

#[test]
fn total_failure_uses_offline_fallbacks() {
    let mut network = FakeNetwork::with_shell();
    let mut worker = active_worker(&mut network);
    network.online = false;

    let page = Request::document("https://player.example/playlists").unwrap();
    let response = worker.handle_fetch(&page, &mut network).unwrap();
    assert!(response.is_ok());
    assert!(response.content_type.starts_with("text/html"));
    assert!(response.text().contains("offline"));

    let data = Request::get("https://player.example/api/status")
        .unwrap()
        .with_destination(Destination::Other);
    let response = worker.handle_fetch(&data, &mut network).unwrap();
    assert_eq!(response.status, 503);
    assert_eq!(response.status_text, "Service Unavailable");
}

#[test]
fn object_urls_are_never_intercepted() {
    let mut network = FakeNetwork::with_shell();
    let mut worker = active_worker(&mut network);
    network.requests.clear();

    for url in [
        "blob:https://player.example/0f8c5e3a-1111-4222-8333-944445555666",
        "data:audio/mpeg;base64,SUQz",
        "https://fonts.other.example/font.css",
    ] {
        let request = Request::get(url).unwrap();
        assert!(worker.handle_fetch(&request, &mut network).is_none(), "{url}");
    }
    assert!(network.requests.is_empty());
}

#[test]
fn activation_drops_old_versions() {
    let mut network = FakeNetwork::with_shell();
    let old = active_worker(&mut network);
    let storage: CacheStorage = old.into_storage();
    assert_eq!(storage.names(), vec!["cadence-shell-v2".to_string()]);

    let config = ShellConfig::for_origin(ORIGIN)
        .unwrap()
        .with_cache_name("cadence-shell-v3", "3.0.0");
    let mut next = ShellWorker::with_storage(config, storage);
    next.install(&mut network).unwrap();
    let removed = next.activate();

    assert_eq!(removed, vec!["cadence-shell-v2".to_string()]);
    assert_eq!(next.storage().names(), vec!["cadence-shell-v3".to_string()]);
}

#[test]
fn messages_report_version_and_status() {
    let mut network = FakeNetwork::with_shell();
    let mut worker = active_worker(&mut network);

    assert_eq!(
        worker.handle_message(ShellMessage::GetVersion),
        ShellReply::Version {
            version: "2.0.0".to_string()
        }
    );

    let reply = worker.handle_message(ShellMessage::CacheStatus);
    let json = serde_json::to_value(&reply).unwrap();
    assert_eq!(json["cacheName"], "cadence-shell-v2");
    assert_eq!(json["cachedItems"], 7);
    assert_eq!(json["appShellItems"], 7);

    let parsed: ShellMessage = serde_json::from_str(r#"{"action":"SKIP_WAITING"}"#).unwrap();
    assert_eq!(parsed, ShellMessage::SkipWaiting);
}
