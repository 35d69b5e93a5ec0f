//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated server with its own store.

use super::constants::*;
use super::fixtures::seed_fixture_contents;
use content_catalog_server::content_store::{
    ContentStore, InMemoryContentStore, SimulatedLatency, SqliteContentStore,
};
use content_catalog_server::server::{make_app, RequestsLoggingLevel, ServerConfig};
use content_catalog_server::ContentService;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use uuid::Uuid;

/// Test server instance with an isolated store
///
/// When dropped, the server gracefully shuts down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// Store behind the server, for direct access in tests
    pub store: Arc<dyn ContentStore>,

    /// Ids of the fixture records, see `constants.rs`
    pub fixture_ids: [Uuid; 2],

    // Private fields - keep resources alive until drop
    _temp_db_dir: Option<TempDir>,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a server backed by the in-memory store, without simulated latency
    pub async fn spawn() -> Self {
        let store = Arc::new(InMemoryContentStore::new(SimulatedLatency::none(), 32));
        Self::spawn_with_store(store, None).await
    }

    /// Spawns a server backed by a SQLite store in a temporary directory
    pub async fn spawn_sqlite() -> Self {
        let temp_db_dir = TempDir::new().expect("Failed to create temp dir");
        let store = Arc::new(
            SqliteContentStore::new(temp_db_dir.path().join("content.db"), 2)
                .expect("Failed to open SQLite store"),
        );
        Self::spawn_with_store(store, Some(temp_db_dir)).await
    }

    /// Spawns a new test server on a random port
    ///
    /// # Panics
    ///
    /// Panics if fixture seeding fails, the port cannot be bound or the
    /// server doesn't become ready within timeout.
    async fn spawn_with_store(store: Arc<dyn ContentStore>, temp_db_dir: Option<TempDir>) -> Self {
        let fixture_ids = seed_fixture_contents(store.as_ref())
            .await
            .expect("Failed to seed fixture contents");

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");

        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let base_url = format!("http://127.0.0.1:{}", port);

        // Create shutdown channel
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            ..Default::default()
        };
        let app = make_app(config, ContentService::new(store.clone()));

        // Spawn server in background task with graceful shutdown
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            store,
            fixture_ids,
            _temp_db_dir: temp_db_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the / endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
