//! High-level service facade.
//!
//! [`OfflineMapService`] owns the cache store handles, the network monitor
//! subscription and all components of the interception pipeline. It is an
//! explicit, constructible object: callers inject the HTTP client and cache
//! store, which is what makes isolated unit tests possible.

use super::config::ServiceConfig;
use super::error::ServiceError;
use super::push::{handle_push, Notification};
use super::types::{ActivationSummary, GeocodeResponse, OfflineCapabilities};
use crate::backend::AsyncHttpClient;
use crate::cache::{CacheNamespace, CacheStats, CacheStore};
use crate::coord::BoundingBox;
use crate::network::{NetworkMonitor, NetworkStatus};
use crate::preload::{PreloadJob, PreloadReport, TilePreloader};
use crate::router::{MapRequest, RequestRouter, ResourceClass};
use crate::routing::{
    default_route_profiles, FallbackRouteCalculator, RouteProfileInfo, RouteRequest, RouteResult,
};
use crate::strategy::{CacheStrategyEngine, MapResponse};
use crate::sync::{BackgroundSyncQueue, DrainReport, OperationKind, OperationReplayer, SYNC_TAG};
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

/// Percent-encode a query-string value.
fn encode_query(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for b in value.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => {
                out.push('%');
                out.push_str(&format!("{:02X}", b));
            }
        }
    }
    out
}

/// Offline map service over injected HTTP client and cache store.
pub struct OfflineMapService<C, S> {
    config: ServiceConfig,
    namespace: CacheNamespace,
    router: RequestRouter,
    engine: CacheStrategyEngine<C, S>,
    fallback: FallbackRouteCalculator,
    preloader: TilePreloader<C, S>,
    sync_queue: BackgroundSyncQueue,
    monitor: Arc<NetworkMonitor>,
    store: Arc<S>,
    capabilities: RwLock<Option<OfflineCapabilities>>,
}

impl<C, S> OfflineMapService<C, S>
where
    C: AsyncHttpClient,
    S: CacheStore,
{
    /// Create the service, opening its cache partitions.
    pub async fn new(
        config: ServiceConfig,
        client: Arc<C>,
        store: Arc<S>,
        monitor: Arc<NetworkMonitor>,
    ) -> Result<Self, ServiceError> {
        let namespace = config.cache_namespace();

        let engine = CacheStrategyEngine::new(
            Arc::clone(&client),
            Arc::clone(&store),
            Arc::clone(&monitor),
            &namespace,
            config.policies.clone(),
            config.origin.clone(),
        )
        .await?;

        let runtime_partition = store.open(&namespace.runtime_partition()).await?;
        let preloader = TilePreloader::new(
            Arc::clone(&client),
            Arc::clone(&store),
            runtime_partition,
            config.origin.clone(),
            config.namespace.clone(),
            config.preload.clone(),
        );

        let fallback = FallbackRouteCalculator::new()
            .with_road_factor(config.road_factor)
            .with_speeds(config.speeds.clone());

        let sync_queue = BackgroundSyncQueue::with_retry_budget(config.sync_retry_budget);

        let router = RequestRouter::new(config.namespace.clone());

        Ok(Self {
            config,
            namespace,
            router,
            engine,
            fallback,
            preloader,
            sync_queue,
            monitor,
            store,
            capabilities: RwLock::new(None),
        })
    }

    /// Activate the service: purge stale cache namespaces, then eagerly
    /// fetch and cache the pre-cache manifest. Individual manifest failures
    /// are tolerated; an unreachable backend must not block activation.
    pub async fn activate(&self) -> Result<ActivationSummary, ServiceError> {
        let purged = self
            .store
            .purge_stale_namespaces(&self.namespace.prefix(), &self.namespace.current_partitions())
            .await?;

        let mut precached = 0;
        for path in &self.config.precache_manifest {
            let request = MapRequest::get(path.clone());
            match self.handle_request(&request).await {
                Some(response) if response.is_success() && !response.offline => precached += 1,
                _ => warn!(path = %path, "Precache fetch did not produce a cacheable response"),
            }
        }

        // Capability probe also seeds the forced-offline flag.
        self.check_capabilities().await;

        info!(purged, precached, "Offline map service activated");
        Ok(ActivationSummary {
            purged_partitions: purged,
            precached,
        })
    }

    /// Run a request through the interception pipeline.
    ///
    /// Returns `None` for requests outside the service namespace; those
    /// must be passed through to the network untouched by the caller.
    pub async fn handle_request(&self, request: &MapRequest) -> Option<MapResponse> {
        let class = self.router.classify(request)?;
        Some(self.engine.execute(class, request).await)
    }

    /// Fetch and parse the backend capability document.
    ///
    /// An unreachable or unparsable capability endpoint yields the all-false
    /// default. A backend-declared `offline_mode` forces offline behavior
    /// for every subsequent request.
    pub async fn check_capabilities(&self) -> OfflineCapabilities {
        let path = format!("{}/capabilities", self.config.namespace);
        let response = self
            .engine
            .execute(ResourceClass::Generic, &MapRequest::get(path))
            .await;

        let caps = if response.is_success() {
            serde_json::from_slice(&response.body).unwrap_or_default()
        } else {
            OfflineCapabilities::default()
        };

        self.engine.set_forced_offline(caps.offline_mode);
        *self.capabilities.write().unwrap_or_else(|e| e.into_inner()) = Some(caps);
        caps
    }

    /// Last capability document seen, if any.
    pub fn cached_capabilities(&self) -> Option<OfflineCapabilities> {
        *self.capabilities.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Whether requests are currently handled offline (platform offline or
    /// backend-declared offline mode).
    pub fn is_offline_mode(&self) -> bool {
        self.engine.is_offline()
    }

    /// Current network status.
    pub fn network_status(&self) -> NetworkStatus {
        self.monitor.status()
    }

    /// The network monitor driving this service.
    pub fn monitor(&self) -> &Arc<NetworkMonitor> {
        &self.monitor
    }

    /// Calculate a route.
    ///
    /// Never fails: offline or degraded backends yield an approximate route
    /// from the fallback calculator, flagged `is_fallback` so the UI can
    /// mark degraded accuracy. While offline the network is never attempted.
    pub async fn calculate_route(&self, request: &RouteRequest) -> RouteResult {
        if self.is_offline_mode() {
            return self.fallback.compute(request);
        }

        let body = match serde_json::to_vec(request) {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "Failed to serialize route request");
                return self.fallback.compute(request);
            }
        };

        let path = format!("{}/route", self.config.namespace);
        let response = self
            .engine
            .execute(ResourceClass::Routing, &MapRequest::post(path, body))
            .await;

        if response.is_success() {
            match serde_json::from_slice::<RouteResult>(&response.body) {
                Ok(route) => return route,
                Err(e) => warn!(error = %e, "Unparsable route response, using fallback"),
            }
        }

        self.fallback.compute(request)
    }

    /// Calculate alternative routes for several profiles.
    ///
    /// Degrades to a single (possibly fallback) route when the alternatives
    /// endpoint is unreachable.
    pub async fn calculate_alternative_routes(
        &self,
        request: &RouteRequest,
    ) -> Vec<RouteResult> {
        if !self.is_offline_mode() {
            let path = format!("{}/route/alternatives", self.config.namespace);
            if let Ok(body) = serde_json::to_vec(request) {
                let response = self
                    .engine
                    .execute(ResourceClass::Routing, &MapRequest::post(path, body))
                    .await;
                if response.is_success() {
                    if let Ok(routes) = serde_json::from_slice::<Vec<RouteResult>>(&response.body)
                    {
                        if !routes.is_empty() {
                            return routes;
                        }
                    }
                }
            }
        }

        vec![self.calculate_route(request).await]
    }

    /// Geocode an address query.
    ///
    /// Degraded results carry `offline: true` with an empty result list so
    /// callers can distinguish "no matches" from "no service".
    pub async fn geocode(&self, query: &str) -> GeocodeResponse {
        let path = format!(
            "{}/geocode?q={}",
            self.config.namespace,
            encode_query(query)
        );
        let response = self
            .engine
            .execute(ResourceClass::Geocoding, &MapRequest::get(path))
            .await;

        if response.is_success() {
            if let Ok(results) = serde_json::from_slice(&response.body) {
                return GeocodeResponse {
                    results,
                    offline: false,
                };
            }
        }

        GeocodeResponse {
            results: Vec::new(),
            offline: true,
        }
    }

    /// Fetch the style catalog.
    pub async fn map_styles(&self) -> MapResponse {
        let path = format!("{}/styles", self.config.namespace);
        self.engine
            .execute(ResourceClass::Style, &MapRequest::get(path))
            .await
    }

    /// Fetch one style document. Offline with nothing cached yields the
    /// minimal fallback style, which always parses.
    pub async fn map_style(&self, style_id: &str) -> MapResponse {
        let path = format!("{}/styles/{}", self.config.namespace, style_id);
        self.engine
            .execute(ResourceClass::Style, &MapRequest::get(path))
            .await
    }

    /// Fetch the routing profile catalog, falling back to the compiled-in
    /// defaults when the backend is unreachable and nothing is cached.
    pub async fn routing_profiles(&self) -> Vec<RouteProfileInfo> {
        let path = format!("{}/profiles", self.config.namespace);
        let response = self
            .engine
            .execute(ResourceClass::Generic, &MapRequest::get(path))
            .await;

        if response.is_success() {
            if let Ok(profiles) = serde_json::from_slice::<Vec<RouteProfileInfo>>(&response.body) {
                if !profiles.is_empty() {
                    return profiles;
                }
            }
        }

        default_route_profiles()
    }

    /// Plan a preload without starting it; the returned job can be observed
    /// and cancelled while [`OfflineMapService::run_preload`] drives it.
    pub fn plan_preload(
        &self,
        style: &str,
        bounds: BoundingBox,
        min_zoom: u8,
        max_zoom: u8,
    ) -> Result<PreloadJob, ServiceError> {
        Ok(PreloadJob::plan(style, bounds, min_zoom, max_zoom)?)
    }

    /// Drive a planned preload to completion or cancellation.
    pub async fn run_preload<F>(&self, job: &PreloadJob, on_progress: F) -> PreloadReport
    where
        F: FnMut(f64) + Send,
    {
        self.preloader.run(job, on_progress).await
    }

    /// Plan and run a preload in one call.
    pub async fn preload_tiles<F>(
        &self,
        style: &str,
        bounds: BoundingBox,
        min_zoom: u8,
        max_zoom: u8,
        on_progress: F,
    ) -> Result<PreloadJob, ServiceError>
    where
        F: FnMut(f64) + Send,
    {
        let job = self.plan_preload(style, bounds, min_zoom, max_zoom)?;
        self.run_preload(&job, on_progress).await;
        Ok(job)
    }

    /// Clear both cache partitions.
    pub async fn clear_offline_cache(&self) -> Result<(), ServiceError> {
        self.store
            .clear(self.engine.partition_for(ResourceClass::Tile))
            .await?;
        self.store
            .clear(self.engine.partition_for(ResourceClass::Style))
            .await?;
        info!("Offline cache cleared");
        Ok(())
    }

    /// Aggregated cache statistics.
    pub fn cache_stats(&self) -> CacheStats {
        self.store.stats()
    }

    /// Record a mutation attempted while offline. Returns its id.
    pub fn enqueue_offline(&self, kind: OperationKind, payload: serde_json::Value) -> u64 {
        self.sync_queue.enqueue(kind, payload)
    }

    /// Operations awaiting replay.
    pub fn pending_operations(&self) -> usize {
        self.sync_queue.len()
    }

    /// Replay all queued offline operations.
    pub async fn drain_sync_queue<R>(&self, replayer: &R) -> DrainReport
    where
        R: OperationReplayer,
    {
        self.sync_queue.drain(replayer).await
    }

    /// React to a named sync event. Only the service's sync tag triggers a
    /// drain; other tags are ignored.
    pub async fn handle_sync_event<R>(&self, tag: &str, replayer: &R) -> Option<DrainReport>
    where
        R: OperationReplayer,
    {
        if tag != SYNC_TAG {
            return None;
        }
        Some(self.drain_sync_queue(replayer).await)
    }

    /// Handle a push payload, producing a notification when recognized.
    pub fn handle_push(&self, payload: &[u8]) -> Option<Notification> {
        handle_push(payload)
    }
}
