use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::{fmt::Debug, path::PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use content_catalog_server::config::{
    AppConfig, CliConfig, FileConfig, StoreKind, StoreSettings, DEFAULT_CONTENT_CACHE_AGE_SEC,
    DEFAULT_PORT, DEFAULT_REQUEST_TIMEOUT_SEC,
};
use content_catalog_server::content_store::{
    seed_mock_data, ContentStore, InMemoryContentStore, SqliteContentStore,
    DEFAULT_MAX_UPDATE_ATTEMPTS, MOCK_TITLES,
};
use content_catalog_server::server::{run_server, RequestsLoggingLevel, ServerConfig};
use content_catalog_server::ContentService;

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to a TOML config file. Values found there override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Backing store for the catalog.
    #[clap(long, value_enum, default_value = "memory")]
    pub store: StoreKind,

    /// Path to the SQLite database file, required with `--store sqlite`.
    #[clap(long, value_parser = parse_path)]
    pub db_path: Option<PathBuf>,

    /// Fill the catalog with demo records at startup.
    #[clap(long)]
    pub seed_mock_data: bool,

    /// Disable the simulated latency of the in-memory store.
    #[clap(long)]
    pub no_simulated_latency: bool,

    /// Cache-Control max-age of list responses, in seconds.
    #[clap(long, default_value_t = DEFAULT_CONTENT_CACHE_AGE_SEC)]
    pub content_cache_age_sec: usize,

    /// Requests taking longer than this are answered with 408.
    #[clap(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SEC)]
    pub request_timeout_sec: u64,

    /// How many times an update retries after losing a race with another writer.
    #[clap(long, default_value_t = DEFAULT_MAX_UPDATE_ATTEMPTS)]
    pub max_update_attempts: usize,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            port: self.port,
            logging_level: self.logging_level.clone(),
            store: self.store,
            db_path: self.db_path.clone(),
            seed_mock_data: self.seed_mock_data,
            no_simulated_latency: self.no_simulated_latency,
            content_cache_age_sec: self.content_cache_age_sec,
            request_timeout_sec: self.request_timeout_sec,
            max_update_attempts: self.max_update_attempts,
        }
    }
}

fn open_store(config: &AppConfig) -> Result<Arc<dyn ContentStore>> {
    Ok(match &config.store {
        StoreSettings::Memory => {
            info!(
                "Using in-memory content store (simulated latency: {:?})",
                config.latency
            );
            Arc::new(InMemoryContentStore::new(
                config.latency.clone(),
                config.max_update_attempts,
            ))
        }
        StoreSettings::Sqlite {
            db_path,
            read_pool_size,
        } => {
            info!("Opening SQLite content database at {:?}...", db_path);
            Arc::new(
                SqliteContentStore::new(db_path, *read_pool_size)?
                    .with_max_update_attempts(config.max_update_attempts),
            )
        }
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config file {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    let store = open_store(&config)?;

    if config.seed_mock_data {
        info!("Seeding mock content...");
        seed_mock_data(store.as_ref(), MOCK_TITLES.len()).await?;
    }

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl-C, shutting down...");
                signal_token.cancel();
            }
            Err(e) => error!("Failed to listen for Ctrl-C: {}", e),
        }
    });

    info!("Ready to serve at port {}!", config.port);
    run_server(
        ServerConfig::from(&config),
        ContentService::new(store),
        shutdown,
    )
    .await
}
