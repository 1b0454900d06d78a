//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The default number of fetches that may run concurrently.
pub const DEFAULT_POOL_SIZE: usize = 3;

/// The default deadline for a single fetch, in milliseconds.
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 30_000;

/// The default deadline for establishing a connection, in milliseconds.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;

/// The default maximum number of decoded resources kept in the cache.
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 64;

/// The default maximum number of decoded bytes kept in the cache (64 MiB).
pub const DEFAULT_CACHE_MAX_BYTES: usize = 64 * 1024 * 1024;

/// The default number of transport-level retries for transient HTTP failures.
pub const DEFAULT_TRANSPORT_RETRIES: u32 = 0;

/// The default user agent sent with HTTP requests.
pub const DEFAULT_USER_AGENT: &str = concat!("remotedraw/", env!("CARGO_PKG_VERSION"));
