//! The asset engine: priority scheduling, bounded concurrency, public API
//!
//! A cloneable handle over shared state. The scheduler is event-driven: it
//! sleeps on a notify that fires on enqueue and on slot release, with a short
//! fallback interval so idle-gate flips are picked up without their own
//! notification. Loads are dispatched while slots are free, strictly in
//! priority order, and a loader failure never stops the loop.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};
use tokio::sync::Notify;

use crate::asset::{AssetCategory, AssetDescriptor, AssetState, Payload, Priority};
use crate::cache::{AssetCache, DEFAULT_MAX_CACHE_SIZE};
use crate::error::{AssetError, Result};
use crate::fetch::{FetchClient, MockFetcher};
use crate::idle::{IdleDetector, DEFAULT_QUIET_PERIOD};
use crate::loaders::{self, LoaderOptions};
use crate::metrics::{EngineMetricsHandle, EngineStats};
use crate::queue::{PriorityQueueSet, QueueEntry};
use crate::runtime::{AsyncSpawner, JoinHandle, TokioSpawner};
use crate::thumbnail::render::{MockRenderer, ThumbnailRenderer};
use crate::thumbnail::{self, ThumbnailPool};

/// Engine tunables. `Default` matches the shipped editor configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Hard cap on simultaneously loading assets.
    pub max_concurrent_loads: usize,
    /// Cache byte budget.
    pub max_cache_size: usize,
    /// Texture loads are abandoned after this long.
    pub texture_timeout: Duration,
    /// Quiet period before background (Idle) work is eligible.
    pub idle_quiet_period: Duration,
    /// Fallback scheduler wakeup interval.
    pub tick_interval: Duration,
    /// Generic assets at or below this size are buffered as blobs.
    pub blob_threshold: usize,
    /// Worker pool size; `None` means `min(available_parallelism, 4)`.
    pub thumbnail_pool_size: Option<usize>,
    /// Base URL of the project/file-storage API.
    pub base_url: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_loads: 3,
            max_cache_size: DEFAULT_MAX_CACHE_SIZE,
            texture_timeout: Duration::from_secs(5),
            idle_quiet_period: DEFAULT_QUIET_PERIOD,
            tick_interval: Duration::from_millis(25),
            blob_threshold: 1024 * 1024,
            thumbnail_pool_size: None,
            base_url: String::new(),
        }
    }
}

struct EngineInner<F: FetchClient> {
    config: EngineConfig,
    fetcher: Arc<F>,
    cache: AssetCache,
    queues: Mutex<PriorityQueueSet>,
    states: RwLock<HashMap<String, AssetState>>,
    idle: IdleDetector,
    metrics: EngineMetricsHandle,
    pool: ThumbnailPool,
    current_loads: AtomicUsize,
    /// Installed by `start`; every task the engine creates goes through it.
    spawner: RwLock<Arc<dyn AsyncSpawner>>,
    current_project: RwLock<String>,
    wake: Notify,
    shut_down: AtomicBool,
    /// Set for engines built for non-interactive environments; every
    /// operation no-ops or resolves trivially.
    inert: bool,
}

/// Cloneable engine handle.
pub struct AssetEngine<F: FetchClient> {
    inner: Arc<EngineInner<F>>,
}

impl<F: FetchClient> Clone for AssetEngine<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F: FetchClient> AssetEngine<F> {
    /// Construct an engine from its injected capabilities.
    pub fn new(config: EngineConfig, fetcher: F, renderer: Arc<dyn ThumbnailRenderer>) -> Self {
        Self::build(config, fetcher, renderer, false)
    }

    fn build(
        config: EngineConfig,
        fetcher: F,
        renderer: Arc<dyn ThumbnailRenderer>,
        inert: bool,
    ) -> Self {
        let pool_size = config
            .thumbnail_pool_size
            .unwrap_or_else(thumbnail::default_pool_size);
        let pool = ThumbnailPool::new(pool_size, renderer);
        let idle = IdleDetector::new(config.idle_quiet_period);
        let cache = AssetCache::new(config.max_cache_size);

        Self {
            inner: Arc::new(EngineInner {
                config,
                fetcher: Arc::new(fetcher),
                cache,
                queues: Mutex::new(PriorityQueueSet::new()),
                states: RwLock::new(HashMap::new()),
                idle,
                metrics: EngineMetricsHandle::new(),
                pool,
                current_loads: AtomicUsize::new(0),
                spawner: RwLock::new(Arc::new(TokioSpawner::new())),
                current_project: RwLock::new(String::new()),
                wake: Notify::new(),
                shut_down: AtomicBool::new(false),
                inert,
            }),
        }
    }

    /// Spawn the scheduler loop. The spawner is kept and reused for every
    /// load future the scheduler dispatches, so one that drops its tasks
    /// (e.g. `MockSpawner::new()`) leaves the engine fully silent.
    pub fn start<S: AsyncSpawner + Clone + 'static>(&self, spawner: &S) -> JoinHandle {
        if self.inner.inert {
            return JoinHandle::new(());
        }
        log::debug!("starting scheduler loop on {}", spawner.runtime_name());
        *self.inner.spawner.write() = Arc::new(spawner.clone());
        let engine = self.clone();
        spawner.spawn(Box::pin(async move { engine.run().await }))
    }

    /// The scheduler loop. Runs until `destroy`.
    pub async fn run(self) {
        while !self.inner.shut_down.load(Ordering::SeqCst) {
            self.tick();
            let _ = tokio::time::timeout(
                self.inner.config.tick_interval,
                self.inner.wake.notified(),
            )
            .await;
        }
    }

    /// One scheduling pass: dispatch queued loads while slots are free.
    ///
    /// Load futures go through the spawner installed by `start` (a Tokio one
    /// until then, so direct callers must be inside a tokio runtime).
    pub fn tick(&self) {
        loop {
            if self.inner.shut_down.load(Ordering::SeqCst) {
                return;
            }
            if !self.claim_slot() {
                return;
            }

            let idle = self.inner.idle.is_idle();
            let Some(entry) = self.inner.queues.lock().pop_next(idle) else {
                self.inner.current_loads.fetch_sub(1, Ordering::SeqCst);
                return;
            };

            self.set_state(&entry.descriptor.id, AssetState::Loading);
            let engine = self.clone();
            let spawner = Arc::clone(&*self.inner.spawner.read());
            spawner.spawn(Box::pin(async move { engine.load_one(entry).await }));
        }
    }

    /// Reserve a concurrency slot, failing at the cap. The claim and the
    /// check are one atomic step so concurrent ticks cannot overshoot.
    fn claim_slot(&self) -> bool {
        let mut loads = self.inner.current_loads.load(Ordering::SeqCst);
        loop {
            if loads >= self.inner.config.max_concurrent_loads {
                return false;
            }
            match self.inner.current_loads.compare_exchange(
                loads,
                loads + 1,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return true,
                Err(actual) => loads = actual,
            }
        }
    }

    async fn load_one(self, entry: QueueEntry) {
        let descriptor = entry.descriptor;
        let url = self.asset_url(&descriptor.path);
        let options = LoaderOptions {
            texture_timeout: self.inner.config.texture_timeout,
            blob_threshold: self.inner.config.blob_threshold,
        };

        let started = Instant::now();
        let result =
            loaders::dispatch(self.inner.fetcher.as_ref(), &descriptor, &url, &options).await;

        match result {
            Ok(payload) => {
                self.inner.cache.set(descriptor.id.clone(), payload);
                self.set_state(&descriptor.id, AssetState::Loaded);
                self.inner.metrics.record_load_time(started.elapsed());
                log::debug!(
                    "loaded {} ({}) in {:?}",
                    descriptor.id,
                    descriptor.category,
                    started.elapsed()
                );
            }
            Err(e) => {
                self.set_state(&descriptor.id, AssetState::Error);
                self.inner.metrics.record_error();
                log::warn!("failed to load {}: {e}", descriptor.id);
            }
        }

        // The slot is returned on both paths; losing one would permanently
        // shrink the concurrency budget.
        self.inner.current_loads.fetch_sub(1, Ordering::SeqCst);
        self.inner.wake.notify_one();
    }

    /// Enqueue an asset at the given priority. Idempotent per asset id:
    /// already Queued, Loading or Loaded assets are left alone.
    pub fn queue_asset(&self, descriptor: AssetDescriptor, priority: Priority) {
        if self.inner.inert || self.inner.shut_down.load(Ordering::SeqCst) {
            return;
        }
        // A request answered from the cache is a hit regardless of the
        // state machine; the asset is marked Cached.
        if self.inner.cache.has(&descriptor.id) {
            self.inner.metrics.record_request();
            self.inner.metrics.record_cache_hit();
            self.set_state(&descriptor.id, AssetState::Cached);
            return;
        }

        // The state check makes re-enqueues no-ops; the queue membership
        // check additionally guards against a double entry if the two ever
        // disagree.
        if self.get_asset_state(&descriptor.id).rejects_enqueue()
            || self.inner.queues.lock().contains(&descriptor.id)
        {
            log::trace!("ignoring re-enqueue of {}", descriptor.id);
            return;
        }

        self.inner.metrics.record_request();
        self.inner.metrics.record_cache_miss();

        self.set_state(&descriptor.id, AssetState::Queued);
        self.inner
            .queues
            .lock()
            .push(QueueEntry::new(descriptor, priority));
        self.inner.wake.notify_one();
    }

    /// Render (or fetch from cache) a thumbnail for a 3D model asset.
    ///
    /// Non-3D categories resolve to `None` by contract. The result is cached
    /// under `thumb_<asset id>` with the same eviction policy as every other
    /// payload.
    pub async fn generate_thumbnail(
        &self,
        descriptor: &AssetDescriptor,
        _priority: Priority,
    ) -> Result<Option<Arc<Payload>>> {
        if self.inner.inert {
            return Ok(None);
        }
        if self.inner.shut_down.load(Ordering::SeqCst) {
            return Err(AssetError::PoolShutDown);
        }
        if descriptor.category != AssetCategory::Models3d {
            return Ok(None);
        }

        self.inner.metrics.record_request();
        let key = thumb_key(&descriptor.id);
        if let Some(cached) = self.inner.cache.get(&key) {
            self.inner.metrics.record_cache_hit();
            return Ok(Some(cached));
        }
        self.inner.metrics.record_cache_miss();

        let url = self.asset_url(&descriptor.path);
        let started = Instant::now();
        let rx = self
            .inner
            .pool
            .request(&descriptor.id, &url, &descriptor.extension);

        match rx.await {
            Ok(Ok(texture)) => {
                self.inner.metrics.record_load_time(started.elapsed());
                let stored = self.inner.cache.set(key, Payload::Bitmap(texture));
                Ok(Some(stored))
            }
            Ok(Err(e)) => {
                self.inner.metrics.record_error();
                Err(e)
            }
            Err(_) => Err(AssetError::PoolShutDown),
        }
    }

    /// Scope subsequent asset URLs to a project.
    pub fn set_current_project(&self, name: impl Into<String>) {
        *self.inner.current_project.write() = name.into();
    }

    /// Decoded payload for a loaded asset id, if cached.
    pub fn get_asset(&self, id: &str) -> Option<Arc<Payload>> {
        self.inner.cache.get(id)
    }

    /// Lifecycle state for an asset id. Unknown ids read as `Unloaded`.
    pub fn get_asset_state(&self, id: &str) -> AssetState {
        self.inner
            .states
            .read()
            .get(id)
            .copied()
            .unwrap_or(AssetState::Unloaded)
    }

    /// Observability snapshot.
    pub fn get_stats(&self) -> EngineStats {
        let m = &self.inner.metrics;
        EngineStats {
            total_requests: m.total_requests(),
            cache_hits: m.cache_hits(),
            errors: m.errors(),
            average_load_time: m.average_load_time(),
            hit_rate_percent: m.cache_hit_rate(),
            cache_size_bytes: self.inner.cache.current_size(),
            queue_lengths: self.inner.queues.lock().len_by_priority(),
            current_loads: self.inner.current_loads.load(Ordering::SeqCst),
        }
    }

    /// Forwarded user interaction; feeds the idle detector.
    pub fn record_interaction(&self) {
        self.inner.idle.record_interaction();
    }

    /// Empty the engine cache and every worker's internal cache.
    pub fn clear_cache(&self) {
        self.inner.cache.clear();
        self.inner.pool.clear_worker_caches();
    }

    /// Stop the scheduler, terminate workers and drop the cache. Idempotent.
    pub fn destroy(&self) {
        if self.inner.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }
        log::debug!("destroying asset engine");
        self.inner.wake.notify_one();
        self.inner.queues.lock().clear();
        self.inner.pool.shutdown();
        self.inner.cache.clear();
    }

    /// Number of loads currently holding a concurrency slot.
    pub fn current_loads(&self) -> usize {
        self.inner.current_loads.load(Ordering::SeqCst)
    }

    fn asset_url(&self, path: &str) -> String {
        let project = self.inner.current_project.read();
        format!(
            "{}/api/projects/{}/assets/file/{}",
            self.inner.config.base_url, project, path
        )
    }

    fn set_state(&self, id: &str, state: AssetState) {
        self.inner.states.write().insert(id.to_string(), state);
    }
}

impl AssetEngine<MockFetcher> {
    /// An engine for non-interactive environments: no workers, no scheduler,
    /// every method a no-op or trivially resolved.
    pub fn inert() -> Self {
        let config = EngineConfig {
            thumbnail_pool_size: Some(0),
            ..EngineConfig::default()
        };
        Self::build(config, MockFetcher::new(), Arc::new(MockRenderer::new()), true)
    }
}

/// Cache key for a rendered thumbnail.
pub fn thumb_key(asset_id: &str) -> String {
    format!("thumb_{asset_id}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::AssetCategory;

    fn descriptor(id: &str, category: AssetCategory) -> AssetDescriptor {
        AssetDescriptor::new(id, category, format!("{id}.bin"), "bin")
    }

    fn test_engine() -> AssetEngine<MockFetcher> {
        AssetEngine::new(
            EngineConfig {
                thumbnail_pool_size: Some(1),
                ..EngineConfig::default()
            },
            MockFetcher::new(),
            Arc::new(MockRenderer::new()),
        )
    }

    #[test]
    fn test_unknown_asset_reads_unloaded() {
        let engine = test_engine();
        assert_eq!(engine.get_asset_state("nope"), AssetState::Unloaded);
        assert!(engine.get_asset("nope").is_none());
        engine.destroy();
    }

    #[test]
    fn test_queue_asset_is_idempotent() {
        let engine = test_engine();
        let desc = descriptor("a", AssetCategory::Other);

        engine.queue_asset(desc.clone(), Priority::Medium);
        engine.queue_asset(desc, Priority::Critical);

        let stats = engine.get_stats();
        assert_eq!(stats.queue_lengths.iter().sum::<usize>(), 1);
        assert_eq!(stats.total_requests, 1);
        assert_eq!(engine.get_asset_state("a"), AssetState::Queued);
        engine.destroy();
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let engine = test_engine();
        engine.destroy();
        engine.destroy();
        engine.queue_asset(descriptor("a", AssetCategory::Other), Priority::High);
        assert_eq!(engine.get_stats().queue_lengths, [0; 5]);
    }

    #[test]
    fn test_asset_url_scoped_to_project() {
        let engine = test_engine();
        engine.set_current_project("demo");
        assert_eq!(
            engine.asset_url("models/chair.glb"),
            "/api/projects/demo/assets/file/models/chair.glb"
        );
        engine.destroy();
    }

    #[tokio::test]
    async fn test_inert_engine_is_a_no_op() {
        let engine = AssetEngine::inert();
        engine.queue_asset(descriptor("a", AssetCategory::Textures), Priority::Critical);
        assert_eq!(engine.get_asset_state("a"), AssetState::Unloaded);

        let thumb = engine
            .generate_thumbnail(&descriptor("m", AssetCategory::Models3d), Priority::High)
            .await
            .unwrap();
        assert!(thumb.is_none());

        let stats = engine.get_stats();
        assert_eq!(stats.total_requests, 0);
        engine.destroy();
    }

    #[tokio::test]
    async fn test_thumbnail_non_3d_resolves_none() {
        let engine = test_engine();
        let thumb = engine
            .generate_thumbnail(&descriptor("t", AssetCategory::Textures), Priority::High)
            .await
            .unwrap();
        assert!(thumb.is_none());
        engine.destroy();
    }
}
