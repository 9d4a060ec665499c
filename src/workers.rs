//! Bounded pool of in-flight evaluations

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Limits concurrent evaluation tasks and waits for them at shutdown.
///
/// Each spawned task holds one permit until it finishes; draining acquires
/// every permit, so it completes only once nothing is in flight.
#[derive(Clone)]
pub struct WorkerPool {
    semaphore: Arc<Semaphore>,
    size: usize,
}

impl WorkerPool {
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    /// Wait for a free worker slot.
    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit> {
        Ok(self.semaphore.clone().acquire_owned().await?)
    }

    /// Wait until every in-flight task has released its slot.
    pub async fn drain(&self) -> Result<()> {
        let _all = self.semaphore.acquire_many(self.size as u32).await?;
        Ok(())
    }

    pub fn in_flight(&self) -> usize {
        self.size - self.semaphore.available_permits()
    }

    pub fn size(&self) -> usize {
        self.size
    }
}
