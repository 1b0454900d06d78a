use std::{path::Path, time::Duration};

use getset::Getters;
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::{RemoteDrawError, RemoteDrawResult};

use super::{
    DEFAULT_CACHE_MAX_BYTES, DEFAULT_CACHE_MAX_ENTRIES, DEFAULT_CONNECT_TIMEOUT_MS,
    DEFAULT_FETCH_TIMEOUT_MS, DEFAULT_POOL_SIZE, DEFAULT_TRANSPORT_RETRIES, DEFAULT_USER_AGENT,
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Configuration of the fetch coordinator, its cache and its transport.
///
/// Every field is optional in TOML; missing fields take the defaults from [`super::defaults`].
///
/// ```toml
/// pool_size = 4
/// fetch_timeout_ms = 5000
/// cache_max_entries = 128
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder, Getters)]
#[getset(get = "pub with_prefix")]
#[serde(default)]
pub struct FetcherConfig {
    /// Number of fetches that may run concurrently. Further requests queue in FIFO order.
    #[builder(default = DEFAULT_POOL_SIZE)]
    pool_size: usize,

    /// Deadline for reading a single resource, in milliseconds.
    #[builder(default = DEFAULT_FETCH_TIMEOUT_MS)]
    fetch_timeout_ms: u64,

    /// Deadline for establishing a connection, in milliseconds.
    #[builder(default = DEFAULT_CONNECT_TIMEOUT_MS)]
    connect_timeout_ms: u64,

    /// Maximum number of decoded resources kept in the cache.
    #[builder(default = DEFAULT_CACHE_MAX_ENTRIES)]
    cache_max_entries: usize,

    /// Maximum number of decoded bytes kept in the cache.
    #[builder(default = DEFAULT_CACHE_MAX_BYTES)]
    cache_max_bytes: usize,

    /// Retries performed by the HTTP transport on transient failures.
    #[builder(default = DEFAULT_TRANSPORT_RETRIES)]
    transport_retries: u32,

    /// User agent sent with HTTP requests.
    #[builder(default = DEFAULT_USER_AGENT.to_string(), setter(into))]
    user_agent: String,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl FetcherConfig {
    /// Parses a configuration from TOML and validates it.
    pub fn from_toml_str(content: &str) -> RemoteDrawResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration from a TOML file and validates it.
    pub fn load(path: impl AsRef<Path>) -> RemoteDrawResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Checks that the configuration can drive a coordinator.
    pub fn validate(&self) -> RemoteDrawResult<()> {
        if self.pool_size == 0 {
            return Err(RemoteDrawError::InvalidConfig(
                "pool_size must be greater than 0".into(),
            ));
        }

        if self.fetch_timeout_ms == 0 {
            return Err(RemoteDrawError::InvalidConfig(
                "fetch_timeout_ms must be greater than 0".into(),
            ));
        }

        if self.cache_max_entries == 0 || self.cache_max_bytes == 0 {
            return Err(RemoteDrawError::InvalidConfig(
                "cache capacity must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Deadline for reading a single resource.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    /// Deadline for establishing a connection.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Overrides the pool size.
    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    /// Overrides the fetch deadline. Deadlines beyond `u64::MAX` milliseconds saturate.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Default for FetcherConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
