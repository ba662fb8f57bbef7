//! Worker thread protocol
//!
//! Each worker owns a receive channel and a small internal thumbnail cache.
//! Replies are correlated by a unique request id, never by asset id alone.

use std::collections::HashMap;
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use image::RgbaImage;

use crate::thumbnail::render::ThumbnailRenderer;
use crate::thumbnail::RenderJob;

/// Messages the pool sends to a worker.
pub(crate) enum WorkerRequest {
    /// Sent once before any work.
    Init,
    Render(RenderJob),
    /// Drop the worker's internal thumbnail cache.
    ClearCache,
    Shutdown,
}

/// Messages a worker sends back to the pool's response pump.
pub(crate) enum WorkerReply {
    Thumbnail {
        worker_id: usize,
        request_id: u64,
        asset_id: String,
        image: RgbaImage,
    },
    Error {
        worker_id: usize,
        request_id: u64,
        asset_id: String,
        message: String,
    },
}

/// Worker thread main loop.
pub(crate) fn run(
    worker_id: usize,
    requests: Receiver<WorkerRequest>,
    replies: Sender<WorkerReply>,
    renderer: Arc<dyn ThumbnailRenderer>,
) {
    let mut local_cache: HashMap<String, RgbaImage> = HashMap::new();

    for request in requests {
        match request {
            WorkerRequest::Init => {
                log::debug!("thumbnail worker {worker_id} initialized");
            }
            WorkerRequest::Render(job) => {
                let reply = match local_cache.get(&job.asset_id) {
                    Some(image) => WorkerReply::Thumbnail {
                        worker_id,
                        request_id: job.request_id,
                        asset_id: job.asset_id.clone(),
                        image: image.clone(),
                    },
                    None => match renderer.render(&job) {
                        Ok(image) => {
                            local_cache.insert(job.asset_id.clone(), image.clone());
                            WorkerReply::Thumbnail {
                                worker_id,
                                request_id: job.request_id,
                                asset_id: job.asset_id,
                                image,
                            }
                        }
                        Err(e) => WorkerReply::Error {
                            worker_id,
                            request_id: job.request_id,
                            asset_id: job.asset_id,
                            message: e.to_string(),
                        },
                    },
                };
                if replies.send(reply).is_err() {
                    break;
                }
            }
            WorkerRequest::ClearCache => {
                local_cache.clear();
            }
            WorkerRequest::Shutdown => break,
        }
    }

    log::debug!("thumbnail worker {worker_id} exiting");
}
