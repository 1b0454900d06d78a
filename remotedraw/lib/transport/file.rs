use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;

use crate::FetchError;

use super::Transport;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The scheme prefix of file identifiers.
pub const FILE_SCHEME_PREFIX: &str = "file://";

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A transport that reads resources from the local filesystem.
///
/// Accepts `file://` identifiers as well as plain paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileTransport;

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl FileTransport {
    /// Resolves an identifier to the path it names.
    pub fn path_of(identifier: &str) -> PathBuf {
        PathBuf::from(
            identifier
                .strip_prefix(FILE_SCHEME_PREFIX)
                .unwrap_or(identifier),
        )
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

#[async_trait]
impl Transport for FileTransport {
    async fn fetch(&self, identifier: &str) -> Result<Bytes, FetchError> {
        let path = Self::path_of(identifier);
        let bytes = fs::read(&path)
            .await
            .map_err(|e| FetchError::Transport(format!("{}: {e}", path.display())))?;

        Ok(Bytes::from(bytes))
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
