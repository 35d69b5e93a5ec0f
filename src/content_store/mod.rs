mod error;
pub mod mapper;
mod memory_store;
mod mock_data;
mod models;
mod schema;
mod sqlite_store;
mod trait_def;

mod latency;

pub use error::{ContentStoreError, ContentStoreResult, MappingError};
pub use latency::{SimulatedLatency, StoreOperation};
pub use memory_store::{InMemoryContentStore, DEFAULT_MAX_UPDATE_ATTEMPTS};
pub use mock_data::{mock_payloads, seed_mock_data, MOCK_GENRES, MOCK_TITLES};
pub use models::{Content, ContentUpdate};
pub use sqlite_store::SqliteContentStore;
pub use trait_def::{ContentStore, UpdateFn};
