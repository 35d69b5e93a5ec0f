mod file_config;

pub use file_config::{FileConfig, LatencyConfig};

use crate::content_store::{SimulatedLatency, DEFAULT_MAX_UPDATE_ATTEMPTS};
use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_CONTENT_CACHE_AGE_SEC: usize = 60;
pub const DEFAULT_ITEM_CACHE_AGE_SEC: usize = 10;
pub const DEFAULT_REQUEST_TIMEOUT_SEC: u64 = 30;
pub const DEFAULT_READ_POOL_SIZE: usize = 4;

/// Which backing store holds the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum StoreKind {
    #[default]
    Memory,
    Sqlite,
}

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub store: StoreKind,
    pub db_path: Option<PathBuf>,
    pub seed_mock_data: bool,
    pub no_simulated_latency: bool,
    pub content_cache_age_sec: usize,
    pub request_timeout_sec: u64,
    pub max_update_attempts: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreSettings {
    Memory,
    Sqlite {
        db_path: PathBuf,
        read_pool_size: usize,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub store: StoreSettings,
    pub seed_mock_data: bool,
    pub latency: SimulatedLatency,
    pub content_cache_age_sec: usize,
    pub item_cache_age_sec: usize,
    pub request_timeout: Duration,
    pub max_update_attempts: usize,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let port = file.port.unwrap_or(cli.port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let store_kind = match file.store {
            Some(s) => parse_store_kind(&s)
                .ok_or_else(|| anyhow::anyhow!("Unknown store '{}', expected memory or sqlite", s))?,
            None => cli.store,
        };
        let db_path = file
            .db_path
            .map(PathBuf::from)
            .or_else(|| cli.db_path.clone());

        let store = match store_kind {
            StoreKind::Memory => StoreSettings::Memory,
            StoreKind::Sqlite => {
                let db_path = db_path.ok_or_else(|| {
                    anyhow::anyhow!(
                        "db_path must be specified via --db-path or in config file for the sqlite store"
                    )
                })?;
                validate_db_path(&db_path)?;
                StoreSettings::Sqlite {
                    db_path,
                    read_pool_size: file.read_pool_size.unwrap_or(DEFAULT_READ_POOL_SIZE).max(1),
                }
            }
        };

        let seed_mock_data = file.seed_mock_data.unwrap_or(cli.seed_mock_data);

        let latency_enabled = file.simulated_latency.unwrap_or(!cli.no_simulated_latency);
        let latency = if latency_enabled {
            resolve_latency(file.latency.unwrap_or_default())
        } else {
            SimulatedLatency::none()
        };

        let content_cache_age_sec = file
            .content_cache_age_sec
            .unwrap_or(cli.content_cache_age_sec);
        let item_cache_age_sec = file
            .item_cache_age_sec
            .unwrap_or(DEFAULT_ITEM_CACHE_AGE_SEC);

        let request_timeout_sec = file.request_timeout_sec.unwrap_or(cli.request_timeout_sec);
        if request_timeout_sec == 0 {
            bail!("request_timeout_sec must be at least 1");
        }

        let max_update_attempts = file.max_update_attempts.unwrap_or(cli.max_update_attempts);
        if max_update_attempts == 0 {
            bail!("max_update_attempts must be at least 1");
        }

        Ok(Self {
            port,
            logging_level,
            store,
            seed_mock_data,
            latency,
            content_cache_age_sec,
            item_cache_age_sec,
            request_timeout: Duration::from_secs(request_timeout_sec),
            max_update_attempts,
        })
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            logging_level: RequestsLoggingLevel::default(),
            store: StoreKind::default(),
            db_path: None,
            seed_mock_data: false,
            no_simulated_latency: false,
            content_cache_age_sec: DEFAULT_CONTENT_CACHE_AGE_SEC,
            request_timeout_sec: DEFAULT_REQUEST_TIMEOUT_SEC,
            max_update_attempts: DEFAULT_MAX_UPDATE_ATTEMPTS,
        }
    }
}

fn validate_db_path(db_path: &Path) -> Result<()> {
    if db_path.is_dir() {
        bail!("db_path is a directory, expected a file: {:?}", db_path);
    }
    // A bare file name lives in the working directory.
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.is_dir() {
            bail!("Database directory does not exist: {:?}", parent);
        }
    }
    Ok(())
}

fn resolve_latency(overrides: LatencyConfig) -> SimulatedLatency {
    let defaults = SimulatedLatency::default();
    let pick = |ms: Option<u64>, default: Duration| ms.map(Duration::from_millis).unwrap_or(default);
    SimulatedLatency {
        create: pick(overrides.create_ms, defaults.create),
        read: pick(overrides.read_ms, defaults.read),
        read_all: pick(overrides.read_all_ms, defaults.read_all),
        update: pick(overrides.update_ms, defaults.update),
        delete: pick(overrides.delete_ms, defaults.delete),
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}

fn parse_store_kind(s: &str) -> Option<StoreKind> {
    StoreKind::from_str(s, true).ok()
}
