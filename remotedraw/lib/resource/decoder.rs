use crate::FetchError;

use super::DecodedResource;

//--------------------------------------------------------------------------------------------------
// Traits
//--------------------------------------------------------------------------------------------------

/// Turns fetched bytes into a [`DecodedResource`].
///
/// Decoding is CPU-bound and runs on a blocking thread of the fetch pool, never on the
/// presentation context.
pub trait Decoder: Send + Sync {
    /// Decodes `bytes` into a displayable resource.
    fn decode(&self, bytes: &[u8]) -> Result<DecodedResource, FetchError>;
}

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A decoder for every raster format supported by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageDecoder;

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Decoder for ImageDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedResource, FetchError> {
        if bytes.is_empty() {
            return Err(FetchError::decode("empty payload"));
        }

        let image = image::load_from_memory(bytes)?.into_rgba8();
        let (width, height) = image.dimensions();

        DecodedResource::from_rgba8(width, height, image.into_raw())
            .ok_or_else(|| FetchError::decode("decoded pixel buffer has unexpected size"))
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
