use bytes::Bytes;

use crate::FetchError;

//--------------------------------------------------------------------------------------------------
// Traits
//--------------------------------------------------------------------------------------------------

/// Fetches the raw bytes identified by a resource identifier.
///
/// Implementations run on the fetch pool and may block on I/O for as long as the coordinator's
/// deadline allows.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Fetches every byte of the resource identified by `identifier`.
    async fn fetch(&self, identifier: &str) -> Result<Bytes, FetchError>;
}
