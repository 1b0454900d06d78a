use std::{
    error::Error,
    fmt::{self, Display},
    time::Duration,
};
use thiserror::Error;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The result of a remotedraw-related operation.
pub type RemoteDrawResult<T> = Result<T, RemoteDrawError>;

/// An error that occurred while setting up remotedraw components.
#[derive(pretty_error_debug::Debug, Error)]
pub enum RemoteDrawError {
    /// An I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// An error that can represent any error.
    #[error(transparent)]
    Custom(#[from] AnyError),

    /// An error that occurred while parsing a TOML configuration.
    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// An error that occurred while building an HTTP client or request.
    #[error("http request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// An error that occurred when a configuration value was rejected.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// The reason a single fetch attempt failed.
///
/// Fetch errors never escape a worker; they are delivered to every callback waiting on the
/// identifier, which is why the type is cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The transport could not deliver the bytes (unreachable host, reset connection,
    /// non-success status).
    #[error("transport error: {0}")]
    Transport(String),

    /// The bytes were fetched but could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The fetch did not finish before its deadline.
    #[error("fetch timed out after {0:?}")]
    Timeout(Duration),

    /// The coordinator was shut down before the fetch could complete.
    #[error("fetch coordinator is shut down")]
    Shutdown,
}

/// An error that can represent any error.
#[derive(Debug)]
pub struct AnyError {
    error: anyhow::Error,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl RemoteDrawError {
    /// Creates a new `Err` result.
    pub fn custom(error: impl Into<anyhow::Error>) -> RemoteDrawError {
        RemoteDrawError::Custom(AnyError {
            error: error.into(),
        })
    }
}

impl FetchError {
    /// Creates a transport error from anything displayable.
    pub fn transport(error: impl Display) -> Self {
        FetchError::Transport(error.to_string())
    }

    /// Creates a decode error from anything displayable.
    pub fn decode(error: impl Display) -> Self {
        FetchError::Decode(error.to_string())
    }
}

impl AnyError {
    /// Downcasts the error to a `T`.
    pub fn downcast<T>(&self) -> Option<&T>
    where
        T: Display + fmt::Debug + Send + Sync + 'static,
    {
        self.error.downcast_ref::<T>()
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Creates an `Ok` `RemoteDrawResult`.
#[allow(non_snake_case)]
pub fn Ok<T>(value: T) -> RemoteDrawResult<T> {
    Result::Ok(value)
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl PartialEq for AnyError {
    fn eq(&self, other: &Self) -> bool {
        self.error.to_string() == other.error.to_string()
    }
}

impl Display for AnyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl Error for AnyError {}

impl From<reqwest_middleware::Error> for FetchError {
    fn from(error: reqwest_middleware::Error) -> Self {
        FetchError::transport(error)
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        FetchError::transport(error)
    }
}

impl From<image::ImageError> for FetchError {
    fn from(error: image::ImageError) -> Self {
        FetchError::decode(error)
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
