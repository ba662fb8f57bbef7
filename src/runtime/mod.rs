//! Async spawner abstraction
//!
//! Every task the engine creates, the scheduler loop and the per-asset load
//! futures alike, goes through this trait. Headless environments hand the
//! engine a spawner that drops its tasks and the engine degrades to inert
//! accessors.

pub mod mock;
pub mod tokio_impl;

use std::fmt::Debug;

use futures::future::BoxFuture;

/// Handle to a spawned async task
///
/// Type-erased so the trait stays object-shape agnostic across runtimes.
#[derive(Debug)]
pub struct JoinHandle {
    inner: Box<dyn std::any::Any + Send>,
}

impl JoinHandle {
    pub fn new<T: Send + 'static>(handle: T) -> Self {
        Self {
            inner: Box::new(handle),
        }
    }

    /// Try to downcast to a specific handle type
    pub fn downcast<T: 'static>(self) -> Option<T> {
        self.inner.downcast::<T>().ok().map(|b| *b)
    }
}

/// Async task spawner trait
///
/// Object safe: the engine keeps the spawner it was started with behind a
/// `dyn` pointer and routes all of its task creation through it.
pub trait AsyncSpawner: Send + Sync + Debug {
    /// Spawn an async task to run in the background.
    fn spawn(&self, task: BoxFuture<'static, ()>) -> JoinHandle;

    /// Get the name of this runtime (for debugging)
    fn runtime_name(&self) -> &'static str;
}

pub use mock::MockSpawner;
pub use tokio_impl::TokioSpawner;
