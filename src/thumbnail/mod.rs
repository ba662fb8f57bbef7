//! Offloaded thumbnail rendering pool
//!
//! A fixed-size pool of worker threads renders 3D model thumbnails off the
//! scheduler's thread. Excess demand queues in a secondary pending FIFO rather
//! than overloading workers: at most `pool_size` renders are ever in flight.
//! Concurrent requests for the same asset id share one render.

pub mod render;
mod worker;

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::Sender;
use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::asset::Texture;
use crate::error::{AssetError, Result};
use render::ThumbnailRenderer;
use worker::{WorkerReply, WorkerRequest};

/// Model extensions the pool knows how to hand to a renderer.
pub const SUPPORTED_MODEL_FORMATS: &[&str] = &["glb", "gltf", "obj"];

/// Default pool size cap.
const MAX_POOL_SIZE: usize = 4;

/// One render request as dispatched to a worker.
#[derive(Debug, Clone)]
pub struct RenderJob {
    /// Unique correlation token; replies must echo it.
    pub request_id: u64,
    pub asset_id: String,
    pub url: String,
    pub format: String,
}

/// `min(available_parallelism, 4)`, the startup pool size.
pub fn default_pool_size() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(MAX_POOL_SIZE)
}

type Waiter = oneshot::Sender<Result<Texture>>;

struct InFlight {
    request_id: u64,
    waiters: Vec<Waiter>,
}

struct WorkerSlot {
    id: usize,
    busy: bool,
    sender: Sender<WorkerRequest>,
}

struct PoolState {
    workers: Vec<WorkerSlot>,
    /// Secondary FIFO for demand beyond the pool size.
    pending: VecDeque<RenderJob>,
    /// Asset id -> outstanding render; dedup point for concurrent requests.
    in_flight: HashMap<String, InFlight>,
    shut_down: bool,
}

/// Fixed-size worker pool with back-pressure and request deduplication.
pub struct ThumbnailPool {
    state: Arc<Mutex<PoolState>>,
    next_request_id: AtomicU64,
    worker_handles: Mutex<Vec<std::thread::JoinHandle<()>>>,
    pump_handle: Mutex<Option<std::thread::JoinHandle<()>>>,
}

impl ThumbnailPool {
    /// Spawn `size` workers plus a response pump. A zero-size pool is legal
    /// and fails every request with [`AssetError::PoolShutDown`].
    pub fn new(size: usize, renderer: Arc<dyn ThumbnailRenderer>) -> Self {
        let (reply_tx, reply_rx) = crossbeam_channel::unbounded::<WorkerReply>();

        let mut workers = Vec::with_capacity(size);
        let mut handles = Vec::with_capacity(size);
        for id in 0..size {
            let (tx, rx) = crossbeam_channel::unbounded::<WorkerRequest>();
            let replies = reply_tx.clone();
            let renderer = Arc::clone(&renderer);
            let handle = std::thread::Builder::new()
                .name(format!("thumb-worker-{id}"))
                .spawn(move || worker::run(id, rx, replies, renderer))
                .expect("failed to spawn thumbnail worker thread");

            // Workers are initialized before accepting render work.
            let _ = tx.send(WorkerRequest::Init);
            workers.push(WorkerSlot {
                id,
                busy: false,
                sender: tx,
            });
            handles.push(handle);
        }
        drop(reply_tx);

        let state = Arc::new(Mutex::new(PoolState {
            workers,
            pending: VecDeque::new(),
            in_flight: HashMap::new(),
            shut_down: size == 0,
        }));

        let pump_state = Arc::clone(&state);
        let pump_handle = std::thread::Builder::new()
            .name("thumb-pump".to_string())
            .spawn(move || {
                for reply in reply_rx {
                    Self::handle_reply(&pump_state, reply);
                }
            })
            .expect("failed to spawn thumbnail response pump");

        Self {
            state,
            next_request_id: AtomicU64::new(1),
            worker_handles: Mutex::new(handles),
            pump_handle: Mutex::new(Some(pump_handle)),
        }
    }

    /// Request a render. If the asset is already in flight the caller joins
    /// the existing render's waiter list; otherwise the job is dispatched to
    /// a free worker or appended to the pending queue.
    pub fn request(
        &self,
        asset_id: &str,
        url: &str,
        format: &str,
    ) -> oneshot::Receiver<Result<Texture>> {
        let (tx, rx) = oneshot::channel();

        if !SUPPORTED_MODEL_FORMATS.contains(&format) {
            let _ = tx.send(Err(AssetError::UnsupportedFormat(format.to_string())));
            return rx;
        }

        let mut state = self.state.lock();
        if state.shut_down {
            let _ = tx.send(Err(AssetError::PoolShutDown));
            return rx;
        }

        if let Some(in_flight) = state.in_flight.get_mut(asset_id) {
            in_flight.waiters.push(tx);
            return rx;
        }

        let request_id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        let job = RenderJob {
            request_id,
            asset_id: asset_id.to_string(),
            url: url.to_string(),
            format: format.to_string(),
        };
        state.in_flight.insert(
            asset_id.to_string(),
            InFlight {
                request_id,
                waiters: vec![tx],
            },
        );

        if let Some(slot) = state.workers.iter_mut().find(|w| !w.busy) {
            slot.busy = true;
            log::debug!("dispatching render {request_id} for {asset_id} to worker {}", slot.id);
            let _ = slot.sender.send(WorkerRequest::Render(job));
        } else {
            log::debug!("all workers busy, queueing render {request_id} for {asset_id}");
            state.pending.push_back(job);
        }
        rx
    }

    fn handle_reply(state: &Mutex<PoolState>, reply: WorkerReply) {
        let (worker_id, request_id, asset_id, outcome) = match reply {
            WorkerReply::Thumbnail {
                worker_id,
                request_id,
                asset_id,
                image,
            } => {
                let (width, height) = image.dimensions();
                let texture = Texture {
                    width,
                    height,
                    data: image.into_raw(),
                };
                (worker_id, request_id, asset_id, Ok(texture))
            }
            WorkerReply::Error {
                worker_id,
                request_id,
                asset_id,
                message,
            } => (worker_id, request_id, asset_id, Err(message)),
        };

        let mut state = state.lock();

        // Resolve waiters only when the token matches the tracked request.
        let token_matches = state
            .in_flight
            .get(&asset_id)
            .is_some_and(|f| f.request_id == request_id);
        let resolved = if token_matches {
            state.in_flight.remove(&asset_id)
        } else {
            log::warn!("stale thumbnail reply {request_id} for {asset_id}, ignoring");
            None
        };
        if let Some(in_flight) = resolved {
            for waiter in in_flight.waiters {
                let result = match &outcome {
                    Ok(texture) => Ok(texture.clone()),
                    Err(message) => Err(AssetError::Worker(message.clone())),
                };
                let _ = waiter.send(result);
            }
        }

        // Free the worker, then immediately drain one pending job onto it.
        if let Some(slot) = state.workers.iter_mut().find(|w| w.id == worker_id) {
            slot.busy = false;
        }
        if let Some(job) = state.pending.pop_front() {
            if let Some(slot) = state.workers.iter_mut().find(|w| !w.busy) {
                slot.busy = true;
                let _ = slot.sender.send(WorkerRequest::Render(job));
            } else {
                state.pending.push_front(job);
            }
        }
    }

    /// Tell every worker to drop its internal thumbnail cache.
    pub fn clear_worker_caches(&self) {
        let state = self.state.lock();
        for slot in &state.workers {
            let _ = slot.sender.send(WorkerRequest::ClearCache);
        }
    }

    pub fn pool_size(&self) -> usize {
        self.state.lock().workers.len()
    }

    pub fn busy_count(&self) -> usize {
        self.state.lock().workers.iter().filter(|w| w.busy).count()
    }

    pub fn pending_len(&self) -> usize {
        self.state.lock().pending.len()
    }

    /// Terminate all workers and fail outstanding requests. Idempotent.
    pub fn shutdown(&self) {
        {
            let mut state = self.state.lock();
            if state.shut_down {
                return;
            }
            state.shut_down = true;

            for slot in &state.workers {
                let _ = slot.sender.send(WorkerRequest::Shutdown);
            }
            // Dropping the senders disconnects the reply channel once the
            // workers exit, which ends the pump thread.
            state.workers.clear();
            state.pending.clear();

            for (_, in_flight) in state.in_flight.drain() {
                for waiter in in_flight.waiters {
                    let _ = waiter.send(Err(AssetError::PoolShutDown));
                }
            }
        }

        for handle in self.worker_handles.lock().drain(..) {
            let _ = handle.join();
        }
        if let Some(handle) = self.pump_handle.lock().take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ThumbnailPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use render::MockRenderer;

    fn pool(size: usize) -> ThumbnailPool {
        ThumbnailPool::new(size, Arc::new(MockRenderer::new()))
    }

    #[tokio::test]
    async fn test_render_resolves() {
        let pool = pool(2);
        let rx = pool.request("assetA", "http://host/assetA.glb", "glb");
        let texture = rx.await.unwrap().unwrap();
        assert_eq!(texture.width, render::THUMBNAIL_SIZE);
        pool.shutdown();
    }

    #[tokio::test]
    async fn test_unsupported_format_rejected() {
        let pool = pool(1);
        let rx = pool.request("assetA", "http://host/assetA.xyz", "xyz");
        assert!(matches!(
            rx.await.unwrap(),
            Err(AssetError::UnsupportedFormat(_))
        ));
        pool.shutdown();
    }

    #[tokio::test]
    async fn test_worker_error_forwarded() {
        let pool = ThumbnailPool::new(1, Arc::new(MockRenderer::failing("render exploded")));
        let rx = pool.request("assetA", "http://host/assetA.glb", "glb");
        assert!(matches!(
            rx.await.unwrap(),
            Err(AssetError::Worker(m)) if m.contains("render exploded")
        ));
        pool.shutdown();
    }

    #[tokio::test]
    async fn test_shutdown_fails_new_requests() {
        let pool = pool(1);
        pool.shutdown();
        let rx = pool.request("assetA", "http://host/assetA.glb", "glb");
        assert!(matches!(rx.await.unwrap(), Err(AssetError::PoolShutDown)));
    }

    #[test]
    fn test_default_pool_size_capped() {
        let size = default_pool_size();
        assert!(size >= 1);
        assert!(size <= MAX_POOL_SIZE);
    }
}
