//! Simulated backing-store latency.
//!
//! Each store operation waits for a configurable delay before touching
//! data. The wait is a tokio timer, so dropping the calling future (request
//! timeout, client disconnect) cancels it instead of tying up a worker.

use std::time::Duration;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOperation {
    Create,
    Read,
    ReadAll,
    Update,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedLatency {
    pub create: Duration,
    pub read: Duration,
    pub read_all: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl SimulatedLatency {
    /// No delay at all.
    pub fn none() -> Self {
        Self::uniform(Duration::ZERO)
    }

    pub fn uniform(delay: Duration) -> Self {
        Self {
            create: delay,
            read: delay,
            read_all: delay,
            update: delay,
            delete: delay,
        }
    }

    pub fn for_operation(&self, op: StoreOperation) -> Duration {
        match op {
            StoreOperation::Create => self.create,
            StoreOperation::Read => self.read,
            StoreOperation::ReadAll => self.read_all,
            StoreOperation::Update => self.update,
            StoreOperation::Delete => self.delete,
        }
    }

    pub async fn wait(&self, op: StoreOperation) {
        let delay = self.for_operation(op);
        if delay.is_zero() {
            return;
        }
        trace!("Simulating {:?} latency of {}ms", op, delay.as_millis());
        tokio::time::sleep(delay).await;
    }
}

/// A slow backing database profile, list reads and deletes being the costliest.
impl Default for SimulatedLatency {
    fn default() -> Self {
        Self {
            create: Duration::from_millis(500),
            read: Duration::from_millis(1000),
            read_all: Duration::from_millis(2000),
            update: Duration::from_millis(1000),
            delete: Duration::from_millis(2000),
        }
    }
}
