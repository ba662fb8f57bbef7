//! studio_assets - Priority-scheduled asset acquisition engine
//!
//! Fetches, decodes, caches and evicts heterogeneous binary assets (3D
//! models, textures, audio) on behalf of an interactive editor UI, under a
//! hard concurrency cap and with user-visible priority: what the user is
//! looking at loads before background work.
//!
//! # Features
//! - Five-level priority queues with an idle-gated background level
//! - Event-driven scheduler with at most N concurrent loads
//! - Per-asset lifecycle state machine
//! - Byte-budgeted cache with insertion-order eviction
//! - Offloaded thumbnail rendering over a bounded worker pool with
//!   back-pressure and request deduplication
//! - Injected capabilities (network, renderer, spawner) with mock
//!   implementations for tests and headless environments
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use studio_assets::{
//!     AssetCategory, AssetDescriptor, AssetEngine, EngineConfig, HttpFetcher,
//!     MockRenderer, Priority, TokioSpawner,
//! };
//!
//! let engine = AssetEngine::new(
//!     EngineConfig::default(),
//!     HttpFetcher::new(),
//!     Arc::new(MockRenderer::new()),
//! );
//! engine.set_current_project("my-project");
//! engine.start(&TokioSpawner::new());
//!
//! let chair = AssetDescriptor::new("chair", AssetCategory::Models3d, "chair.glb", "glb");
//! engine.queue_asset(chair, Priority::Critical);
//! ```
//!
//! # Feature Flags
//!
//! - `http` (default): reqwest-backed [`HttpFetcher`]

// Core modules
pub mod asset;
pub mod cache;
pub mod engine;
pub mod fetch;
pub mod loaders;
pub mod queue;
pub mod thumbnail;

// Support modules
pub mod idle;
pub mod metrics;
pub mod runtime;

// Error types
mod error;
pub use error::{AssetError, Result};

// Re-export main types
pub use asset::{AssetCategory, AssetDescriptor, AssetState, Payload, Priority, Texture};
pub use cache::{AssetCache, DEFAULT_MAX_CACHE_SIZE};
pub use engine::{thumb_key, AssetEngine, EngineConfig};

// Re-export capability types
#[cfg(feature = "http")]
pub use fetch::HttpFetcher;
pub use fetch::{FetchClient, FetchResponse, MockFetcher, MockResponse};
pub use runtime::{AsyncSpawner, JoinHandle, MockSpawner, TokioSpawner};
pub use thumbnail::render::{MockRenderer, ThumbnailRenderer, THUMBNAIL_SIZE};
pub use thumbnail::{default_pool_size, RenderJob, ThumbnailPool, SUPPORTED_MODEL_FORMATS};

// Re-export support types
pub use idle::IdleDetector;
pub use metrics::{EngineMetrics, EngineMetricsHandle, EngineStats};
pub use queue::{PriorityQueueSet, QueueEntry};

// Version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
