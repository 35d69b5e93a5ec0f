//! Shared constants for end-to-end tests
//!
//! This module contains all constants used across the test suite.
//! When fixture data changes, update only this file.

// ============================================================================
// Fixture Records
// ============================================================================

/// Title of the first fixture record
pub const CONTENT_1_TITLE: &str = "Inception";

/// Genres of the first fixture record
pub const CONTENT_1_GENRES: &[&str] = &["Sci-Fi"];

/// Title of the second fixture record
pub const CONTENT_2_TITLE: &str = "Fight Club";

/// Genres of the second fixture record
pub const CONTENT_2_GENRES: &[&str] = &["Drama"];

/// Duration shared by every fixture record, in minutes
pub const FIXTURE_DURATION: i32 = 120;

/// Start of every fixture record
pub const FIXTURE_START_TIME: &str = "2024-01-01T20:00:00Z";

/// End of every fixture record
pub const FIXTURE_END_TIME: &str = "2024-01-01T22:00:00Z";

// ============================================================================
// Routes
// ============================================================================

/// Prefix of every content route
pub const CONTENT_API: &str = "/api/v1/Content";

// ============================================================================
// Timing
// ============================================================================

/// Maximum time to wait for the server to become ready
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout for each request issued by the test client
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Poll interval while waiting for the server
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;
