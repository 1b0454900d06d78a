use async_trait::async_trait;
use bytes::Bytes;

use crate::{config::FetcherConfig, FetchError, RemoteDrawResult};

use super::{FileTransport, HttpTransport, Transport};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Routes `http://` and `https://` identifiers to [`HttpTransport`] and everything else to
/// [`FileTransport`].
#[derive(Debug, Clone)]
pub struct DefaultTransport {
    http: HttpTransport,
    file: FileTransport,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl DefaultTransport {
    /// Creates a routing transport.
    pub fn new(config: &FetcherConfig) -> RemoteDrawResult<Self> {
        Ok(Self {
            http: HttpTransport::new(config)?,
            file: FileTransport,
        })
    }

    /// Whether `identifier` is served over HTTP.
    pub fn is_http(identifier: &str) -> bool {
        let lower = identifier.to_ascii_lowercase();
        lower.starts_with("http://") || lower.starts_with("https://")
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

#[async_trait]
impl Transport for DefaultTransport {
    async fn fetch(&self, identifier: &str) -> Result<Bytes, FetchError> {
        if Self::is_http(identifier) {
            self.http.fetch(identifier).await
        } else {
            self.file.fetch(identifier).await
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
