use std::{path::PathBuf, time::Duration};

use clap::Parser;

use crate::{config::FetcherConfig, RemoteDrawResult};

use super::styles;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// How long the demo pumps completions by default, in milliseconds.
pub const DEFAULT_WAIT_MS: u64 = 10_000;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// remotedraw - Fetch remote images into placeholder-backed visuals
#[derive(Debug, Parser)]
#[command(name = "remotedraw", author, about, version, styles = styles::styles())]
pub struct RemoteDrawArgs {
    /// Resources to load: http(s) URLs, file:// URLs or plain paths
    #[arg(required = true, value_name = "IDENTIFIER")]
    pub identifiers: Vec<String>,

    /// TOML file with fetcher settings
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Number of concurrent fetches
    #[arg(long)]
    pub pool_size: Option<usize>,

    /// Deadline for a single fetch in milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// How long to wait for every visual to settle, in milliseconds
    #[arg(long, value_name = "MS", default_value_t = DEFAULT_WAIT_MS)]
    pub wait_ms: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl RemoteDrawArgs {
    /// Builds the fetcher configuration: the `--config` file (or defaults), then command-line
    /// overrides.
    pub fn fetcher_config(&self) -> RemoteDrawResult<FetcherConfig> {
        let mut config = match &self.config {
            Some(path) => FetcherConfig::load(path)?,
            None => FetcherConfig::default(),
        };

        if let Some(pool_size) = self.pool_size {
            config = config.with_pool_size(pool_size);
        }

        if let Some(timeout_ms) = self.timeout_ms {
            config = config.with_fetch_timeout(Duration::from_millis(timeout_ms));
        }

        config.validate()?;
        Ok(config)
    }

    /// How long to pump the presentation queue.
    pub fn wait(&self) -> Duration {
        Duration::from_millis(self.wait_ms)
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
