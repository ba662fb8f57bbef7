//! Tokio-backed spawner

use super::{AsyncSpawner, JoinHandle};
use futures::future::BoxFuture;

/// Spawns tasks on the ambient Tokio runtime.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioSpawner;

impl TokioSpawner {
    pub fn new() -> Self {
        Self
    }
}

impl AsyncSpawner for TokioSpawner {
    fn spawn(&self, task: BoxFuture<'static, ()>) -> JoinHandle {
        JoinHandle::new(tokio::spawn(task))
    }

    fn runtime_name(&self) -> &'static str {
        "Tokio"
    }
}
