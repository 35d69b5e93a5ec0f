//! ContentStore trait definition.
//!
//! This trait abstracts the backing store so the service and the HTTP layer
//! work the same on top of the in-memory engine or the SQLite store.

use super::error::ContentStoreResult;
use super::models::{Content, ContentUpdate};
use async_trait::async_trait;
use uuid::Uuid;

/// Derives a patch payload from the current snapshot of a record.
///
/// Called again with a fresh snapshot whenever a compare-and-swap loses.
pub type UpdateFn<'a> = &'a (dyn Fn(&Content) -> ContentUpdate + Send + Sync);

/// Trait for content storage backends.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Create a record under a freshly generated id.
    ///
    /// Fails with `Validation` if the payload misses a required scalar.
    async fn create(&self, payload: ContentUpdate) -> ContentStoreResult<Content>;

    /// Get the current snapshot of a record.
    async fn read(&self, id: Uuid) -> ContentStoreResult<Option<Content>>;

    /// Snapshot of every record at call time. No ordering is promised.
    async fn read_all(&self) -> ContentStoreResult<Vec<Content>>;

    /// Atomically apply the patch returned by `f` to the current record.
    ///
    /// Returns `None` if the record does not exist.
    async fn update_with(&self, id: Uuid, f: UpdateFn<'_>) -> ContentStoreResult<Option<Content>>;

    /// Merge `payload` into the record.
    async fn update(&self, id: Uuid, payload: ContentUpdate) -> ContentStoreResult<Option<Content>> {
        let same_payload = move |_: &Content| payload.clone();
        self.update_with(id, &same_payload).await
    }

    /// Remove a record. Returns the removed id, or `Uuid::nil()` if there
    /// was nothing to remove.
    async fn delete(&self, id: Uuid) -> ContentStoreResult<Uuid>;
}
