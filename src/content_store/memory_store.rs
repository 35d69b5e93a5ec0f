//! In-memory content store.
//!
//! Records live in a sharded `DashMap` as `Arc<Content>`. A stored record is
//! never mutated: writers build a new `Arc` from the snapshot they read and
//! swap it in only if the slot still holds that exact snapshot. Shard locks
//! are held just for the pointer comparison and swap, merging happens
//! outside of them.

use super::error::{ContentStoreError, ContentStoreResult};
use super::latency::{SimulatedLatency, StoreOperation};
use super::mapper;
use super::models::{Content, ContentUpdate};
use super::trait_def::{ContentStore, UpdateFn};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

pub const DEFAULT_MAX_UPDATE_ATTEMPTS: usize = 32;

enum SwapOutcome {
    Swapped,
    Stale,
    Gone,
}

pub struct InMemoryContentStore {
    records: DashMap<Uuid, Arc<Content>>,
    latency: SimulatedLatency,
    max_update_attempts: usize,
}

impl InMemoryContentStore {
    /// # Arguments
    /// * `latency` - Delay charged once per operation
    /// * `max_update_attempts` - Read-merge-swap rounds before an update gives up
    pub fn new(latency: SimulatedLatency, max_update_attempts: usize) -> Self {
        Self {
            records: DashMap::new(),
            latency,
            max_update_attempts: max_update_attempts.max(1),
        }
    }

    fn snapshot(&self, id: &Uuid) -> Option<Arc<Content>> {
        self.records.get(id).map(|slot| Arc::clone(slot.value()))
    }

    fn compare_and_swap(&self, id: &Uuid, expected: &Arc<Content>, new: Arc<Content>) -> SwapOutcome {
        match self.records.get_mut(id) {
            Some(mut slot) if Arc::ptr_eq(slot.value(), expected) => {
                *slot.value_mut() = new;
                SwapOutcome::Swapped
            }
            Some(_) => SwapOutcome::Stale,
            None => SwapOutcome::Gone,
        }
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn create(&self, payload: ContentUpdate) -> ContentStoreResult<Content> {
        self.latency.wait(StoreOperation::Create).await;

        let id = Uuid::new_v4();
        let content = mapper::map(id, &payload)?;

        match self.records.entry(id) {
            Entry::Occupied(_) => Err(ContentStoreError::DuplicateId(id)),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(content.clone()));
                debug!("Created content {}", id);
                Ok(content)
            }
        }
    }

    async fn read(&self, id: Uuid) -> ContentStoreResult<Option<Content>> {
        self.latency.wait(StoreOperation::Read).await;
        Ok(self.snapshot(&id).map(|content| content.as_ref().clone()))
    }

    async fn read_all(&self) -> ContentStoreResult<Vec<Content>> {
        self.latency.wait(StoreOperation::ReadAll).await;

        // Collect the Arcs first so no shard stays locked while cloning.
        let snapshots: Vec<Arc<Content>> = self
            .records
            .iter()
            .map(|slot| Arc::clone(slot.value()))
            .collect();
        Ok(snapshots.iter().map(|c| c.as_ref().clone()).collect())
    }

    async fn update_with(&self, id: Uuid, f: UpdateFn<'_>) -> ContentStoreResult<Option<Content>> {
        self.latency.wait(StoreOperation::Update).await;

        for attempt in 1..=self.max_update_attempts {
            let Some(current) = self.snapshot(&id) else {
                return Ok(None);
            };

            let payload = f(&current);
            let updated = Arc::new(mapper::patch(&current, &payload));

            match self.compare_and_swap(&id, &current, Arc::clone(&updated)) {
                SwapOutcome::Swapped => {
                    debug!("Updated content {} (attempt {})", id, attempt);
                    return Ok(Some(updated.as_ref().clone()));
                }
                SwapOutcome::Gone => return Ok(None),
                SwapOutcome::Stale => {
                    debug!(
                        "Lost update race on content {} (attempt {}), retrying",
                        id, attempt
                    );
                }
            }
        }

        warn!(
            "Giving up update of content {} after {} attempts",
            id, self.max_update_attempts
        );
        Err(ContentStoreError::Conflict {
            id,
            attempts: self.max_update_attempts,
        })
    }

    async fn delete(&self, id: Uuid) -> ContentStoreResult<Uuid> {
        self.latency.wait(StoreOperation::Delete).await;

        match self.records.remove(&id) {
            Some((removed, _)) => {
                debug!("Deleted content {}", removed);
                Ok(removed)
            }
            None => Ok(Uuid::nil()),
        }
    }
}
