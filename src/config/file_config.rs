use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub port: Option<u16>,
    pub logging_level: Option<String>,
    pub store: Option<String>,
    pub db_path: Option<String>,
    pub read_pool_size: Option<usize>,
    pub seed_mock_data: Option<bool>,
    pub simulated_latency: Option<bool>,
    pub content_cache_age_sec: Option<usize>,
    pub item_cache_age_sec: Option<usize>,
    pub request_timeout_sec: Option<u64>,
    pub max_update_attempts: Option<usize>,

    pub latency: Option<LatencyConfig>,
}

/// Per-operation delays in milliseconds, unset ones keep their default.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct LatencyConfig {
    pub create_ms: Option<u64>,
    pub read_ms: Option<u64>,
    pub read_all_ms: Option<u64>,
    pub update_ms: Option<u64>,
    pub delete_ms: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
