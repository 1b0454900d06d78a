use bytes::Bytes;
use getset::CopyGetters;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// An immutable, decoded image ready for display.
///
/// Pixels are stored as tightly packed RGBA8 rows. The resource is shared through `Arc` by the
/// cache and by every visual displaying it.
#[derive(Debug, Clone, PartialEq, Eq, CopyGetters)]
pub struct DecodedResource {
    /// Intrinsic width in pixels.
    #[getset(get_copy = "pub")]
    width: u32,

    /// Intrinsic height in pixels.
    #[getset(get_copy = "pub")]
    height: u32,

    pixels: Bytes,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl DecodedResource {
    /// Creates a resource from RGBA8 pixels.
    ///
    /// Returns `None` if `pixels` does not hold exactly `width * height` pixels.
    pub fn from_rgba8(width: u32, height: u32, pixels: impl Into<Bytes>) -> Option<Self> {
        let pixels = pixels.into();
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        (pixels.len() == expected).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    /// The RGBA8 pixel data.
    pub fn pixels(&self) -> &Bytes {
        &self.pixels
    }

    /// Number of bytes held by the pixel data; used as the cache cost.
    pub fn byte_len(&self) -> usize {
        self.pixels.len()
    }

    /// Whether every pixel is fully opaque.
    pub fn is_opaque(&self) -> bool {
        self.pixels.chunks_exact(4).all(|px| px[3] == 0xFF)
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
