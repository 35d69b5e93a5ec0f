//! Content Catalog Server Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod config;
pub mod content_service;
pub mod content_store;
pub mod server;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use content_service::ContentService;
pub use content_store::{
    Content, ContentStore, ContentStoreError, ContentUpdate, InMemoryContentStore,
    SimulatedLatency, SqliteContentStore,
};
pub use server::{run_server, RequestsLoggingLevel};
