//! Cache strategy engine.
//!
//! Applies the per-class policy to every intercepted request: cache-first
//! for tiles, network-first with a bounded timeout for everything else.
//! Network errors and timeouts are converted to the fallback path locally
//! and never propagate to callers.

use super::key::derive_cache_key;
use super::policy::{PolicyConfig, StrategyKind};
use super::response::MapResponse;
use crate::backend::{AsyncHttpClient, HttpResponse};
use crate::cache::{CacheEntry, CacheError, CacheNamespace, CacheStore, PartitionHandle};
use crate::network::NetworkMonitor;
use crate::router::{MapRequest, Method, ResourceClass};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Strategy engine over an injected HTTP client and cache store.
pub struct CacheStrategyEngine<C, S> {
    client: Arc<C>,
    store: Arc<S>,
    static_partition: PartitionHandle,
    runtime_partition: PartitionHandle,
    monitor: Arc<NetworkMonitor>,
    policies: PolicyConfig,
    /// Origin prepended to request paths when talking to the backend
    origin: String,
    /// Set when the backend reports `offline_mode`; forces offline behavior
    /// even while the platform reports connectivity
    forced_offline: AtomicBool,
}

impl<C, S> CacheStrategyEngine<C, S>
where
    C: AsyncHttpClient,
    S: CacheStore,
{
    /// Create an engine, opening both cache partitions.
    pub async fn new(
        client: Arc<C>,
        store: Arc<S>,
        monitor: Arc<NetworkMonitor>,
        namespace: &CacheNamespace,
        policies: PolicyConfig,
        origin: impl Into<String>,
    ) -> Result<Self, CacheError> {
        let static_partition = store.open(&namespace.static_partition()).await?;
        let runtime_partition = store.open(&namespace.runtime_partition()).await?;

        Ok(Self {
            client,
            store,
            static_partition,
            runtime_partition,
            monitor,
            policies,
            origin: origin.into(),
            forced_offline: AtomicBool::new(false),
        })
    }

    /// Force offline behavior regardless of monitor state.
    pub fn set_forced_offline(&self, forced: bool) {
        self.forced_offline.store(forced, Ordering::Relaxed);
    }

    /// True when the network leg must be skipped.
    pub fn is_offline(&self) -> bool {
        !self.monitor.is_online() || self.forced_offline.load(Ordering::Relaxed)
    }

    /// The cache partition a resource class lives in.
    ///
    /// Tiles, routes and geocoding results go to the runtime partition;
    /// styles and generic resources to the versioned static one.
    pub fn partition_for(&self, class: ResourceClass) -> &PartitionHandle {
        match class {
            ResourceClass::Tile | ResourceClass::Routing | ResourceClass::Geocoding => {
                &self.runtime_partition
            }
            ResourceClass::Style | ResourceClass::Generic => &self.static_partition,
        }
    }

    /// Apply the class policy to a request.
    pub async fn execute(&self, class: ResourceClass, request: &MapRequest) -> MapResponse {
        match self.policies.strategy_for(class) {
            StrategyKind::CacheFirst => self.cache_first(class, request).await,
            StrategyKind::NetworkFirst => self.network_first(class, request).await,
        }
    }

    async fn fetch(&self, request: &MapRequest) -> Result<HttpResponse, crate::backend::BackendError> {
        let url = format!("{}{}", self.origin, request.path);
        match request.method {
            Method::Get => self.client.get(&url).await,
            Method::Post => {
                let body = request.body.as_deref().unwrap_or_default();
                self.client.post_json(&url, body).await
            }
        }
    }

    /// Store a successful response, cloning the body so the caller never
    /// observes a consumed buffer. Write failures degrade to "not cached".
    async fn store_response(&self, partition: &PartitionHandle, key: &str, response: &HttpResponse) {
        let entry = CacheEntry::new(response.body.clone(), response.content_type.clone());
        if let Err(e) = self.store.put(partition, key, entry).await {
            warn!(%key, error = %e, "Failed to cache response");
        }
    }

    /// Cache-first: serve a hit without touching the network; fetch and
    /// store on a miss; placeholder tile when offline with nothing cached.
    async fn cache_first(&self, class: ResourceClass, request: &MapRequest) -> MapResponse {
        let key = derive_cache_key(request);
        let partition = self.partition_for(class).clone();

        if let Some(entry) = self.store.get(&partition, &key).await {
            debug!(%key, %class, "Cache-first hit");
            return MapResponse::from_cache(entry);
        }

        if self.is_offline() {
            debug!(%key, %class, "Cache-first miss while offline, serving placeholder");
            return self.synthesize_fallback(class);
        }

        match self.fetch(request).await {
            Ok(response) => {
                if response.is_success() {
                    self.store_response(&partition, &key, &response).await;
                }
                MapResponse::from_network(response)
            }
            Err(e) => {
                warn!(%key, %class, error = %e, "Cache-first fetch failed, serving placeholder");
                self.synthesize_fallback(class)
            }
        }
    }

    /// Network-first: try the backend inside the class timeout, fall back to
    /// the newest cached entry, then to the class's synthesized fallback.
    async fn network_first(&self, class: ResourceClass, request: &MapRequest) -> MapResponse {
        let key = derive_cache_key(request);
        let partition = self.partition_for(class).clone();

        if !self.is_offline() {
            let outcome = match self.policies.timeout_for(class) {
                Some(budget) => match tokio::time::timeout(budget, self.fetch(request)).await {
                    Ok(result) => result,
                    Err(_) => {
                        warn!(%key, %class, budget_ms = budget.as_millis() as u64, "Network request timed out");
                        Err(crate::backend::BackendError::Http("timeout".to_string()))
                    }
                },
                None => self.fetch(request).await,
            };

            match outcome {
                Ok(response) => {
                    if response.is_success() {
                        self.store_response(&partition, &key, &response).await;
                    }
                    return MapResponse::from_network(response);
                }
                Err(e) => {
                    debug!(%key, %class, error = %e, "Network leg failed, trying cache");
                }
            }
        } else {
            debug!(%key, %class, "Offline, skipping network leg");
        }

        if let Some(entry) = self.store.get(&partition, &key).await {
            debug!(%key, %class, "Serving cached entry after network failure");
            return MapResponse::from_cache(entry);
        }

        self.synthesize_fallback(class)
    }

    fn synthesize_fallback(&self, class: ResourceClass) -> MapResponse {
        match class {
            ResourceClass::Tile => MapResponse::placeholder_tile(),
            ResourceClass::Style => MapResponse::fallback_style(),
            ResourceClass::Routing | ResourceClass::Geocoding | ResourceClass::Generic => {
                MapResponse::degraded(class)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendError;
    use crate::cache::MemoryCacheStore;
    use crate::network::NetworkStatus;
    use crate::strategy::response::ServedFrom;
    use bytes::Bytes;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    /// Mock client that counts calls and serves scripted responses in order,
    /// repeating the last one when the script runs out.
    struct ScriptedClient {
        responses: Mutex<Vec<Result<HttpResponse, BackendError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedClient {
        fn new(responses: Vec<Result<HttpResponse, BackendError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                calls: AtomicUsize::new(0),
            }
        }

        fn ok(status: u16, content_type: &str, body: &[u8]) -> Result<HttpResponse, BackendError> {
            Ok(HttpResponse {
                status,
                content_type: content_type.to_string(),
                body: Bytes::copy_from_slice(body),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn next(&self) -> Result<HttpResponse, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut responses = self.responses.lock().unwrap();
            if responses.len() > 1 {
                responses.remove(0)
            } else {
                responses[0].clone()
            }
        }
    }

    impl AsyncHttpClient for ScriptedClient {
        async fn get(&self, _url: &str) -> Result<HttpResponse, BackendError> {
            self.next()
        }

        async fn post_json(&self, _url: &str, _body: &[u8]) -> Result<HttpResponse, BackendError> {
            self.next()
        }
    }

    async fn engine_with(
        client: ScriptedClient,
        online: bool,
    ) -> (
        CacheStrategyEngine<ScriptedClient, MemoryCacheStore>,
        Arc<ScriptedClient>,
        Arc<MemoryCacheStore>,
    ) {
        let client = Arc::new(client);
        let store = Arc::new(MemoryCacheStore::new());
        let monitor = Arc::new(NetworkMonitor::new(if online {
            NetworkStatus::online()
        } else {
            NetworkStatus::offline()
        }));
        let namespace = CacheNamespace::new("revierkompass-maps", "v1");

        let engine = CacheStrategyEngine::new(
            Arc::clone(&client),
            Arc::clone(&store),
            monitor,
            &namespace,
            PolicyConfig::default(),
            "",
        )
        .await
        .unwrap();

        (engine, client, store)
    }

    fn tile_request() -> MapRequest {
        MapRequest::get("/api/maps/tiles/streets/14/8606/5626.pbf")
    }

    #[tokio::test]
    async fn test_cache_first_second_request_skips_network() {
        let client = ScriptedClient::new(vec![ScriptedClient::ok(
            200,
            "application/x-protobuf",
            b"tile-bytes",
        )]);
        let (engine, client, _) = engine_with(client, true).await;

        let first = engine.execute(ResourceClass::Tile, &tile_request()).await;
        assert_eq!(first.served_from, ServedFrom::Network);
        assert_eq!(client.call_count(), 1);

        let second = engine.execute(ResourceClass::Tile, &tile_request()).await;
        assert_eq!(second.served_from, ServedFrom::Cache);
        assert_eq!(&second.body[..], b"tile-bytes");
        assert_eq!(client.call_count(), 1, "second request must not hit the network");
    }

    #[tokio::test]
    async fn test_cache_first_miss_offline_serves_placeholder() {
        let client = ScriptedClient::new(vec![ScriptedClient::ok(200, "", b"")]);
        let (engine, client, _) = engine_with(client, false).await;

        let resp = engine.execute(ResourceClass::Tile, &tile_request()).await;
        assert_eq!(resp.status, 200);
        assert_eq!(resp.content_type, "application/x-protobuf");
        assert!(resp.body.is_empty());
        assert_eq!(client.call_count(), 0, "offline must not attempt the network");
    }

    #[tokio::test]
    async fn test_cache_first_network_error_serves_placeholder() {
        let client = ScriptedClient::new(vec![Err(BackendError::Http("refused".into()))]);
        let (engine, _, _) = engine_with(client, true).await;

        let resp = engine.execute(ResourceClass::Tile, &tile_request()).await;
        assert_eq!(resp.status, 200);
        assert!(resp.offline);
        assert!(resp.body.is_empty());
    }

    #[tokio::test]
    async fn test_cache_first_does_not_cache_404() {
        let client = ScriptedClient::new(vec![
            ScriptedClient::ok(404, "text/plain", b"not found"),
            ScriptedClient::ok(200, "application/x-protobuf", b"tile"),
        ]);
        let (engine, client, _) = engine_with(client, true).await;

        let first = engine.execute(ResourceClass::Tile, &tile_request()).await;
        assert_eq!(first.status, 404);
        assert_eq!(first.served_from, ServedFrom::Network);

        // 404 was not cached, so the next request re-attempts the network
        let second = engine.execute(ResourceClass::Tile, &tile_request()).await;
        assert_eq!(second.status, 200);
        assert_eq!(client.call_count(), 2);
    }

    #[tokio::test]
    async fn test_network_first_falls_back_to_cache_after_failure() {
        let client = ScriptedClient::new(vec![
            ScriptedClient::ok(200, "application/json", br#"{"trip":1}"#),
            Err(BackendError::Http("refused".into())),
        ]);
        let (engine, _, _) = engine_with(client, true).await;
        let request = MapRequest::post("/api/maps/route", &br#"{"start":"a"}"#[..]);

        let first = engine.execute(ResourceClass::Routing, &request).await;
        assert_eq!(first.served_from, ServedFrom::Network);

        let second = engine.execute(ResourceClass::Routing, &request).await;
        assert_eq!(second.served_from, ServedFrom::Cache);
        assert_eq!(&second.body[..], br#"{"trip":1}"#);
    }

    #[tokio::test]
    async fn test_network_first_distinct_post_bodies_do_not_share_cache() {
        let client = ScriptedClient::new(vec![
            ScriptedClient::ok(200, "application/json", b"route-a"),
            Err(BackendError::Http("down".into())),
        ]);
        let (engine, _, _) = engine_with(client, true).await;

        let req_a = MapRequest::post("/api/maps/route", &br#"{"q":"a"}"#[..]);
        let req_b = MapRequest::post("/api/maps/route", &br#"{"q":"b"}"#[..]);

        engine.execute(ResourceClass::Routing, &req_a).await;

        // Different body: cached entry for req_a must not satisfy req_b
        let resp_b = engine.execute(ResourceClass::Routing, &req_b).await;
        assert_eq!(resp_b.status, 503);
        assert!(resp_b.offline);
    }

    #[tokio::test]
    async fn test_network_first_offline_without_cache_degrades() {
        let client = ScriptedClient::new(vec![ScriptedClient::ok(200, "", b"")]);
        let (engine, client, _) = engine_with(client, false).await;

        let req = MapRequest::get("/api/maps/geocode?q=Stuttgart");
        let resp = engine.execute(ResourceClass::Geocoding, &req).await;

        assert_eq!(resp.status, 503);
        assert!(resp.offline);
        assert_eq!(client.call_count(), 0);

        let body: serde_json::Value = serde_json::from_slice(&resp.body).unwrap();
        assert_eq!(body["results"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_network_first_style_fallback_is_valid_style() {
        let client = ScriptedClient::new(vec![Err(BackendError::Http("down".into()))]);
        let (engine, _, _) = engine_with(client, true).await;

        let req = MapRequest::get("/api/maps/styles/police-day");
        let resp = engine.execute(ResourceClass::Style, &req).await;

        assert_eq!(resp.status, 200);
        let doc: serde_json::Value = serde_json::from_slice(&resp.body).unwrap();
        assert_eq!(doc["version"], 8);
    }

    #[tokio::test]
    async fn test_forced_offline_skips_network() {
        let client = ScriptedClient::new(vec![ScriptedClient::ok(200, "", b"x")]);
        let (engine, client, _) = engine_with(client, true).await;

        engine.set_forced_offline(true);
        assert!(engine.is_offline());

        let resp = engine
            .execute(ResourceClass::Generic, &MapRequest::get("/api/maps/capabilities"))
            .await;
        assert_eq!(resp.status, 503);
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_partitions_by_class() {
        let client = ScriptedClient::new(vec![ScriptedClient::ok(200, "", b"x")]);
        let (engine, _, _) = engine_with(client, true).await;

        assert_eq!(
            engine.partition_for(ResourceClass::Tile).name(),
            "revierkompass-maps-runtime"
        );
        assert_eq!(
            engine.partition_for(ResourceClass::Routing).name(),
            "revierkompass-maps-runtime"
        );
        assert_eq!(
            engine.partition_for(ResourceClass::Style).name(),
            "revierkompass-maps-v1"
        );
        assert_eq!(
            engine.partition_for(ResourceClass::Generic).name(),
            "revierkompass-maps-v1"
        );
    }

    #[tokio::test]
    async fn test_cached_body_independent_of_returned_body() {
        let client = ScriptedClient::new(vec![ScriptedClient::ok(
            200,
            "application/json",
            b"shared-buffer",
        )]);
        let (engine, _, store) = engine_with(client, true).await;
        let request = MapRequest::get("/api/maps/capabilities");

        let returned = engine.execute(ResourceClass::Generic, &request).await;
        drop(returned);

        // The cached copy survives the caller dropping its response
        let partition = engine.partition_for(ResourceClass::Generic).clone();
        let cached = store.get(&partition, "/api/maps/capabilities").await.unwrap();
        assert_eq!(&cached.payload[..], b"shared-buffer");
    }
}
