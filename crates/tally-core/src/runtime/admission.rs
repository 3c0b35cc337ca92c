use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// RAII guard that frees a worker slot when dropped.
///
/// Callers must hold this until the job it was acquired for has finished.
pub struct Permit {
    #[allow(dead_code)]
    permit: OwnedSemaphorePermit,
}

impl std::fmt::Debug for Permit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Permit").finish()
    }
}

/// Bounds how many jobs run at once.
///
/// Unlike a rejecting admission gate, [`Self::acquire`] waits for a slot, so
/// queued jobs are delayed rather than dropped.
#[derive(Debug, Clone)]
pub struct WorkerSlots {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl WorkerSlots {
    /// Create a pool of `capacity` slots. A capacity of zero is raised to one
    /// so that queued work can always make progress.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots not currently held by a running job.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Wait for a free slot. Returns `None` only if the pool was closed.
    pub async fn acquire(&self) -> Option<Permit> {
        Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .ok()
            .map(|permit| Permit { permit })
    }
}
