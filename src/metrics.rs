//! Engine metrics: request/hit/error counters and load-time statistics
//!
//! Load times are tracked as running statistics (count + total) rather than an
//! unbounded sample list, so observability costs constant memory while the
//! derived average stays identical.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

#[derive(Debug, Default)]
struct LoadTimeStats {
    count: u64,
    total: Duration,
}

/// Tracks counters for asset loading and caching.
#[derive(Debug, Default)]
pub struct EngineMetrics {
    total_requests: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    errors: AtomicU64,
    load_times: Mutex<LoadTimeStats>,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_load_time(&self, duration: Duration) {
        let mut stats = self.load_times.lock();
        stats.count += 1;
        stats.total += duration;
    }

    pub fn total_requests(&self) -> u64 {
        self.total_requests.load(Ordering::Relaxed)
    }

    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    /// Cache hit rate as a percentage of all hits and misses.
    pub fn cache_hit_rate(&self) -> f32 {
        let hits = self.cache_hits.load(Ordering::Relaxed) as f32;
        let misses = self.cache_misses.load(Ordering::Relaxed) as f32;

        if hits + misses > 0.0 {
            hits / (hits + misses) * 100.0
        } else {
            0.0
        }
    }

    /// Average load duration over all completed loads.
    pub fn average_load_time(&self) -> Duration {
        let stats = self.load_times.lock();
        if stats.count == 0 {
            Duration::ZERO
        } else {
            stats.total / stats.count as u32
        }
    }
}

/// A cloneable, thread-safe handle around [`EngineMetrics`].
#[derive(Debug, Clone, Default)]
pub struct EngineMetricsHandle(Arc<EngineMetrics>);

impl EngineMetricsHandle {
    pub fn new() -> Self {
        Self(Arc::new(EngineMetrics::new()))
    }
}

impl std::ops::Deref for EngineMetricsHandle {
    type Target = EngineMetrics;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Read-only snapshot returned by `AssetEngine::get_stats`.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineStats {
    pub total_requests: u64,
    pub cache_hits: u64,
    pub errors: u64,
    pub average_load_time: Duration,
    pub hit_rate_percent: f32,
    pub cache_size_bytes: usize,
    /// Pending queue lengths, Critical first.
    pub queue_lengths: [usize; 5],
    pub current_loads: usize,
}
