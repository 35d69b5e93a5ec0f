//! SQLite-backed content store.
//!
//! Same contract as the in-memory engine. Rows carry a `revision` counter and
//! writes are conditional on it, so `update_with` runs the same optimistic
//! read-merge-swap loop. All driver calls run on the blocking thread pool.

use super::error::{ContentStoreError, ContentStoreResult};
use super::mapper;
use super::memory_store::DEFAULT_MAX_UPDATE_ATTEMPTS;
use super::models::{Content, ContentUpdate};
use super::schema::CONTENT_VERSIONED_SCHEMAS;
use super::trait_def::{ContentStore, UpdateFn};
use crate::sqlite_persistence::migrate_if_needed;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, types::Type, Connection, OpenFlags};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};
use uuid::Uuid;

const CONTENT_COLUMNS: &str = "id, title, sub_title, description, image_url, duration, start_time, end_time, genre_list, revision";

const GENRE_SEPARATOR: char = ',';

#[derive(Clone)]
pub struct SqliteContentStore {
    read_pool: Vec<Arc<Mutex<Connection>>>,
    write_conn: Arc<Mutex<Connection>>,
    read_index: Arc<AtomicUsize>,
    max_update_attempts: usize,
}

fn lock(conn: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|_| anyhow!("SQLite connection mutex poisoned"))
}

fn join_genres(genres: &[String]) -> String {
    genres.join(&GENRE_SEPARATOR.to_string())
}

fn split_genres(column: &str) -> Vec<String> {
    column
        .split(GENRE_SEPARATOR)
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_time(row: &rusqlite::Row, index: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(index)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(e)))
}

/// Parse a `(Content, revision)` pair from a row selected with `CONTENT_COLUMNS`.
fn parse_content_row(row: &rusqlite::Row) -> rusqlite::Result<(Content, i64)> {
    let raw_id: String = row.get(0)?;
    let id = Uuid::parse_str(&raw_id)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;
    let genres: String = row.get(8)?;

    Ok((
        Content {
            id,
            title: row.get(1)?,
            subtitle: row.get(2)?,
            description: row.get(3)?,
            image_url: row.get(4)?,
            duration: row.get(5)?,
            start_time: parse_time(row, 6)?,
            end_time: parse_time(row, 7)?,
            genre_list: split_genres(&genres),
        },
        row.get(9)?,
    ))
}

impl SqliteContentStore {
    /// Open (or create) the database at `db_path`.
    ///
    /// # Arguments
    /// * `db_path` - Path to the SQLite database file
    /// * `read_pool_size` - Number of read-only connections used round-robin
    pub fn new<P: AsRef<Path>>(db_path: P, read_pool_size: usize) -> Result<Self> {
        let db_path = db_path.as_ref();

        let mut write_conn = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open content database {:?}", db_path))?;

        let version = migrate_if_needed(&mut write_conn, CONTENT_VERSIONED_SCHEMAS)?;
        write_conn.pragma_update(None, "journal_mode", "WAL")?;

        let count: i64 = write_conn.query_row("SELECT COUNT(*) FROM contents", [], |r| r.get(0))?;
        info!(
            "Opened content database {:?} at schema version {}: {} records",
            db_path, version, count
        );

        let mut read_pool = Vec::with_capacity(read_pool_size.max(1));
        for _ in 0..read_pool_size.max(1) {
            let read_conn = Connection::open_with_flags(
                db_path,
                OpenFlags::SQLITE_OPEN_READ_ONLY
                    | OpenFlags::SQLITE_OPEN_URI
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?;
            read_pool.push(Arc::new(Mutex::new(read_conn)));
        }

        Ok(Self {
            read_pool,
            write_conn: Arc::new(Mutex::new(write_conn)),
            read_index: Arc::new(AtomicUsize::new(0)),
            max_update_attempts: DEFAULT_MAX_UPDATE_ATTEMPTS,
        })
    }

    pub fn with_max_update_attempts(mut self, max_update_attempts: usize) -> Self {
        self.max_update_attempts = max_update_attempts.max(1);
        self
    }

    fn get_read_conn(&self) -> Arc<Mutex<Connection>> {
        let index = self.read_index.fetch_add(1, Ordering::SeqCst) % self.read_pool.len();
        self.read_pool[index].clone()
    }

    /// Run `f` on the blocking pool. Driver and join failures both surface
    /// as `ContentStoreError::Unavailable`.
    async fn blocking<T, F>(&self, f: F) -> ContentStoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&SqliteContentStore) -> Result<T> + Send + 'static,
    {
        let store = self.clone();
        let result = tokio::task::spawn_blocking(move || f(&store))
            .await
            .context("SQLite worker task failed")?;
        Ok(result?)
    }

    fn select_row(&self, id: Uuid) -> Result<Option<(Content, i64)>> {
        let conn = self.get_read_conn();
        let conn = lock(&conn)?;
        match conn.query_row(
            &format!("SELECT {} FROM contents WHERE id = ?1", CONTENT_COLUMNS),
            params![id.to_string()],
            parse_content_row,
        ) {
            Ok(row) => Ok(Some(row)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn select_all(&self) -> Result<Vec<Content>> {
        let conn = self.get_read_conn();
        let conn = lock(&conn)?;
        let mut stmt = conn.prepare_cached(&format!("SELECT {} FROM contents", CONTENT_COLUMNS))?;
        let contents = stmt
            .query_map([], |row| parse_content_row(row).map(|(content, _)| content))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(contents)
    }

    /// Returns false if a row with the same id already exists.
    fn insert_row(&self, content: &Content) -> Result<bool> {
        let conn = lock(&self.write_conn)?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO contents (id, title, sub_title, description, image_url, duration, start_time, end_time, genre_list)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                content.id.to_string(),
                content.title,
                content.subtitle,
                content.description,
                content.image_url,
                content.duration,
                content.start_time.to_rfc3339(),
                content.end_time.to_rfc3339(),
                join_genres(&content.genre_list),
            ],
        )?;
        Ok(inserted == 1)
    }

    /// Write `content` only if the row is still at `expected_revision`.
    fn update_row_if_unchanged(&self, content: &Content, expected_revision: i64) -> Result<bool> {
        let conn = lock(&self.write_conn)?;
        let updated = conn.execute(
            "UPDATE contents
             SET title = ?2, sub_title = ?3, description = ?4, image_url = ?5, duration = ?6,
                 start_time = ?7, end_time = ?8, genre_list = ?9, revision = revision + 1
             WHERE id = ?1 AND revision = ?10",
            params![
                content.id.to_string(),
                content.title,
                content.subtitle,
                content.description,
                content.image_url,
                content.duration,
                content.start_time.to_rfc3339(),
                content.end_time.to_rfc3339(),
                join_genres(&content.genre_list),
                expected_revision,
            ],
        )?;
        Ok(updated == 1)
    }

    fn delete_row(&self, id: Uuid) -> Result<bool> {
        let conn = lock(&self.write_conn)?;
        let deleted = conn.execute(
            "DELETE FROM contents WHERE id = ?1",
            params![id.to_string()],
        )?;
        Ok(deleted == 1)
    }
}

#[async_trait]
impl ContentStore for SqliteContentStore {
    async fn create(&self, payload: ContentUpdate) -> ContentStoreResult<Content> {
        let id = Uuid::new_v4();
        let content = mapper::map(id, &payload)?;
        let row = content.clone();
        if !self.blocking(move |store| store.insert_row(&row)).await? {
            return Err(ContentStoreError::DuplicateId(id));
        }
        debug!("Created content {}", id);
        Ok(content)
    }

    async fn read(&self, id: Uuid) -> ContentStoreResult<Option<Content>> {
        let row = self.blocking(move |store| store.select_row(id)).await?;
        Ok(row.map(|(content, _)| content))
    }

    async fn read_all(&self) -> ContentStoreResult<Vec<Content>> {
        self.blocking(|store| store.select_all()).await
    }

    async fn update_with(&self, id: Uuid, f: UpdateFn<'_>) -> ContentStoreResult<Option<Content>> {
        for attempt in 1..=self.max_update_attempts {
            let Some((current, revision)) =
                self.blocking(move |store| store.select_row(id)).await?
            else {
                return Ok(None);
            };

            let updated = mapper::patch(&current, &f(&current));
            let row = updated.clone();
            let written = self
                .blocking(move |store| store.update_row_if_unchanged(&row, revision))
                .await?;
            if written {
                debug!("Updated content {} (attempt {})", id, attempt);
                return Ok(Some(updated));
            }
            debug!(
                "Content {} changed since revision {} (attempt {}), retrying",
                id, revision, attempt
            );
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
        let deleted = self.blocking(move |store| store.delete_row(id)).await?;
        Ok(if deleted { id } else { Uuid::nil() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use tempfile::TempDir;

    fn open_store() -> (TempDir, SqliteContentStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = SqliteContentStore::new(temp_dir.path().join("content.db"), 2).unwrap();
        (temp_dir, store)
    }

    fn payload(title: &str, genres: &[&str]) -> ContentUpdate {
        let start = DateTime::<Utc>::from_timestamp(1_700_000_000, 123_456_000).unwrap();
        ContentUpdate::default()
            .title(title)
            .subtitle("Sub")
            .description("Desc")
            .image_url("https://example.com/image.jpg")
            .duration(95)
            .start_time(start)
            .end_time(start + ChronoDuration::hours(2))
            .genres(genres.iter().copied())
    }

    #[test]
    fn genres_round_trip_through_column() {
        let genres = vec!["Drama".to_string(), "Sci-Fi".to_string()];
        assert_eq!(split_genres(&join_genres(&genres)), genres);
        assert!(split_genres("").is_empty());
        assert_eq!(split_genres(",Drama,"), vec!["Drama"]);
    }

    #[tokio::test]
    async fn create_then_read_returns_same_record() {
        let (_dir, store) = open_store();
        let created = store.create(payload("Inception", &["Sci-Fi", "Action"])).await.unwrap();

        let read = store.read(created.id).await.unwrap().unwrap();
        assert_eq!(read, created);
        assert_eq!(read.genre_list, vec!["Sci-Fi", "Action"]);
        assert_eq!(read.start_time, created.start_time);
    }

    #[tokio::test]
    async fn create_rejects_incomplete_payload() {
        let (_dir, store) = open_store();
        let mut incomplete = payload("A", &[]);
        incomplete.title = None;

        let err = store.create(incomplete).await.unwrap_err();
        assert!(matches!(err, ContentStoreError::Validation(_)));
        assert!(store.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_merges_and_bumps_revision() {
        let (_dir, store) = open_store();
        let created = store.create(payload("A", &["Drama"])).await.unwrap();

        let updated = store
            .update(created.id, ContentUpdate::default().subtitle("B"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "A");
        assert_eq!(updated.subtitle, "B");
        assert_eq!(updated.genre_list, vec!["Drama"]);

        let (_, revision) = store.select_row(created.id).unwrap().unwrap();
        assert_eq!(revision, 1);
    }

    #[tokio::test]
    async fn stale_revision_is_not_written() {
        let (_dir, store) = open_store();
        let created = store.create(payload("A", &[])).await.unwrap();
        store
            .update(created.id, ContentUpdate::default().title("B"))
            .await
            .unwrap();

        let mut stale = created.clone();
        stale.title = "stale".to_string();
        assert!(!store.update_row_if_unchanged(&stale, 0).unwrap());
        assert_eq!(store.read(created.id).await.unwrap().unwrap().title, "B");
    }

    #[tokio::test]
    async fn update_and_delete_missing() {
        let (_dir, store) = open_store();
        let missing = Uuid::new_v4();

        assert_eq!(
            store
                .update(missing, ContentUpdate::default().title("X"))
                .await
                .unwrap(),
            None
        );
        assert_eq!(store.delete(missing).await.unwrap(), Uuid::nil());
    }

    #[tokio::test]
    async fn delete_twice_returns_id_then_nil() {
        let (_dir, store) = open_store();
        let created = store.create(payload("A", &[])).await.unwrap();

        assert_eq!(store.delete(created.id).await.unwrap(), created.id);
        assert_eq!(store.delete(created.id).await.unwrap(), Uuid::nil());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_writers_do_not_lose_updates() {
        let (_dir, store) = open_store();
        let store = Arc::new(store);
        let created = store.create(payload("A", &[])).await.unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    let tag = format!("tag-{}", i);
                    let append_tag = move |current: &Content| {
                        let mut genres = current.genre_list.clone();
                        genres.push(tag.clone());
                        ContentUpdate::with_genres(genres)
                    };
                    store.update_with(created.id, &append_tag).await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let final_state = store.read(created.id).await.unwrap().unwrap();
        assert_eq!(final_state.genre_list.len(), 8);
    }

    #[tokio::test]
    async fn reopening_keeps_records() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("content.db");

        let created = {
            let store = SqliteContentStore::new(&db_path, 1).unwrap();
            store.create(payload("Persisted", &[])).await.unwrap()
        };

        let reopened = SqliteContentStore::new(&db_path, 1).unwrap();
        assert_eq!(reopened.read(created.id).await.unwrap(), Some(created));
    }
}
