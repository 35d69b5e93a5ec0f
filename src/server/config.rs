use super::RequestsLoggingLevel;
use crate::config::AppConfig;
use std::time::Duration;

#[derive(Clone)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    /// Cache-Control max-age for list and filter responses.
    pub content_cache_age_sec: usize,
    /// Cache-Control max-age for single record responses.
    pub item_cache_age_sec: usize,
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: 3001,
            content_cache_age_sec: 60,
            item_cache_age_sec: 10,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl From<&AppConfig> for ServerConfig {
    fn from(config: &AppConfig) -> Self {
        ServerConfig {
            requests_logging_level: config.logging_level.clone(),
            port: config.port,
            content_cache_age_sec: config.content_cache_age_sec,
            item_cache_age_sec: config.item_cache_age_sec,
            request_timeout: config.request_timeout,
        }
    }
}
