//! Use-case layer over a `ContentStore`.
//!
//! The HTTP boundary talks only to `ContentService`. Genre mutations are a
//! read followed by a separate update, so a writer landing between the two
//! calls can be overwritten; only the update itself is atomic.

use crate::content_store::{Content, ContentStore, ContentStoreResult, ContentUpdate};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

#[derive(Clone)]
pub struct ContentService {
    store: Arc<dyn ContentStore>,
}

impl ContentService {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    pub async fn list_all(&self) -> ContentStoreResult<Vec<Content>> {
        self.store.read_all().await
    }

    /// Records whose title contains `title` (case-sensitive) and whose genres
    /// include `genre` exactly. An empty or absent `genre` matches everything,
    /// as does an empty `title`.
    pub async fn list_filtered(
        &self,
        title: &str,
        genre: Option<&str>,
    ) -> ContentStoreResult<Vec<Content>> {
        let genre = genre.filter(|g| !g.is_empty());
        let contents = self.store.read_all().await?;
        Ok(contents
            .into_iter()
            .filter(|c| c.title.contains(title))
            .filter(|c| genre.map_or(true, |g| c.has_genre(g)))
            .collect())
    }

    pub async fn get(&self, id: Uuid) -> ContentStoreResult<Option<Content>> {
        self.store.read(id).await
    }

    pub async fn create(&self, payload: ContentUpdate) -> ContentStoreResult<Content> {
        self.store.create(payload).await
    }

    pub async fn update(
        &self,
        id: Uuid,
        payload: ContentUpdate,
    ) -> ContentStoreResult<Option<Content>> {
        self.store.update(id, payload).await
    }

    /// Returns the deleted id, or `Uuid::nil()` if nothing was deleted.
    pub async fn delete(&self, id: Uuid) -> ContentStoreResult<Uuid> {
        self.store.delete(id).await
    }

    /// Union the record's genres with `genres`: existing ones first, then the
    /// new ones in the order given, without duplicates.
    pub async fn add_genres(
        &self,
        id: Uuid,
        genres: &[String],
    ) -> ContentStoreResult<Option<Content>> {
        let Some(current) = self.store.read(id).await? else {
            return Ok(None);
        };

        let mut seen = HashSet::new();
        let union: Vec<String> = current
            .genre_list
            .iter()
            .chain(genres.iter())
            .filter(|g| seen.insert(g.as_str()))
            .cloned()
            .collect();

        debug!("Adding genres {:?} to content {}", genres, id);
        self.store.update(id, ContentUpdate::with_genres(union)).await
    }

    /// Drop `genres` from the record.
    ///
    /// Removing every genre sends an empty list, which the merge reads as
    /// "no change": the stored genres stay as they were.
    pub async fn remove_genres(
        &self,
        id: Uuid,
        genres: &[String],
    ) -> ContentStoreResult<Option<Content>> {
        let Some(current) = self.store.read(id).await? else {
            return Ok(None);
        };

        let remaining: Vec<String> = current
            .genre_list
            .into_iter()
            .filter(|g| !genres.contains(g))
            .collect();

        debug!("Removing genres {:?} from content {}", genres, id);
        self.store
            .update(id, ContentUpdate::with_genres(remaining))
            .await
    }
}
