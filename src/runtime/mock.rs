//! Mock spawner for tests and headless environments

use super::{AsyncSpawner, JoinHandle};
use futures::future::BoxFuture;

/// Spawn behavior for [`MockSpawner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockSpawnBehavior {
    /// Drop tasks immediately (don't execute). The default; an engine started
    /// with this spawner never runs its scheduler loop.
    Drop,
    /// Block on tasks synchronously using a simple executor.
    BlockSync,
}

/// Mock spawner that drops tasks or runs them to completion synchronously.
#[derive(Clone, Debug)]
pub struct MockSpawner {
    behavior: MockSpawnBehavior,
}

impl Default for MockSpawner {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSpawner {
    /// Create a mock spawner that drops tasks.
    pub fn new() -> Self {
        Self {
            behavior: MockSpawnBehavior::Drop,
        }
    }

    /// Create a mock spawner that runs tasks synchronously.
    ///
    /// Only suitable for futures that complete on their own. Do not hand this
    /// to `AssetEngine::start`: the scheduler loop runs until `destroy`, and
    /// this spawner would run it inline on the calling thread.
    pub fn blocking() -> Self {
        Self {
            behavior: MockSpawnBehavior::BlockSync,
        }
    }
}

impl AsyncSpawner for MockSpawner {
    fn spawn(&self, task: BoxFuture<'static, ()>) -> JoinHandle {
        match self.behavior {
            MockSpawnBehavior::Drop => {
                drop(task);
                JoinHandle::new(())
            }
            MockSpawnBehavior::BlockSync => {
                futures::executor::block_on(task);
                JoinHandle::new(())
            }
        }
    }

    fn runtime_name(&self) -> &'static str {
        "Mock"
    }
}
