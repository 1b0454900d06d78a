use std::sync::Arc;

use crate::resource::DecodedResource;

use super::Rect;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// How a [`ColorFilter`] combines its color with the drawn pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendMode {
    /// Keep the filter color where the drawn pixels are opaque.
    SrcIn,

    /// Draw the filter color over the drawn pixels, keeping their alpha.
    SrcAtop,

    /// Multiply the drawn pixels by the filter color.
    Multiply,

    /// Screen the drawn pixels with the filter color.
    Screen,
}

/// An opaque color filter handle applied when drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorFilter {
    /// Filter color as `0xAARRGGBB`.
    pub color: u32,

    /// How the color is combined.
    pub mode: BlendMode,
}

/// The drawing attributes handed to a [`Canvas`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paint {
    /// Global alpha, `0` (invisible) to `255` (unchanged).
    pub alpha: u8,

    /// Optional color filter.
    pub color_filter: Option<ColorFilter>,

    /// Whether to dither when reducing color depth.
    pub dither: bool,

    /// Whether to filter bitmaps when scaling.
    pub filter_bitmap: bool,
}

/// A draw call captured by a [`RecordingCanvas`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// A solid color fill.
    FillRect {
        /// Destination rectangle.
        rect: Rect,

        /// Fill color as `0xAARRGGBB`.
        color: u32,

        /// Paint used for the fill.
        paint: Paint,
    },

    /// A bitmap blit.
    Bitmap {
        /// The drawn resource.
        resource: Arc<DecodedResource>,

        /// Destination rectangle.
        dst: Rect,

        /// Paint used for the blit.
        paint: Paint,
    },
}

/// A canvas that records every draw call instead of rasterizing.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    ops: Vec<DrawOp>,
}

//--------------------------------------------------------------------------------------------------
// Traits
//--------------------------------------------------------------------------------------------------

/// A drawing surface. Rasterization is left to the host.
pub trait Canvas {
    /// Fills `rect` with `color` (`0xAARRGGBB`).
    fn fill_rect(&mut self, rect: Rect, color: u32, paint: &Paint);

    /// Draws `resource` scaled into `dst`.
    fn draw_bitmap(&mut self, resource: &Arc<DecodedResource>, dst: Rect, paint: &Paint);
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl RecordingCanvas {
    /// Creates an empty recording.
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded draw calls, in order.
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Takes the recorded draw calls, leaving the canvas empty.
    pub fn take(&mut self) -> Vec<DrawOp> {
        std::mem::take(&mut self.ops)
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Default for Paint {
    fn default() -> Self {
        Self {
            alpha: 0xFF,
            color_filter: None,
            dither: true,
            filter_bitmap: true,
        }
    }
}

impl Canvas for RecordingCanvas {
    fn fill_rect(&mut self, rect: Rect, color: u32, paint: &Paint) {
        self.ops.push(DrawOp::FillRect {
            rect,
            color,
            paint: *paint,
        });
    }

    fn draw_bitmap(&mut self, resource: &Arc<DecodedResource>, dst: Rect, paint: &Paint) {
        self.ops.push(DrawOp::Bitmap {
            resource: resource.clone(),
            dst,
            paint: *paint,
        });
    }
}
