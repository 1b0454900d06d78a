use std::sync::Arc;

use crate::resource::DecodedResource;

use super::{Canvas, ColorFilter, Opacity, Paint, Rect, Size, Visual};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A visual drawing a decoded resource scaled into its bounds.
#[derive(Debug, Clone)]
pub struct BitmapVisual {
    resource: Arc<DecodedResource>,
    opaque: bool,
    bounds: Rect,
    paint: Paint,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl BitmapVisual {
    /// Wraps `resource`.
    pub fn new(resource: Arc<DecodedResource>) -> Self {
        Self {
            opaque: resource.is_opaque(),
            resource,
            bounds: Rect::default(),
            paint: Paint::default(),
        }
    }

    /// The displayed resource.
    pub fn resource(&self) -> &Arc<DecodedResource> {
        &self.resource
    }

    /// The paint applied when drawing.
    pub fn paint(&self) -> &Paint {
        &self.paint
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Visual for BitmapVisual {
    fn draw(&self, canvas: &mut dyn Canvas) {
        if self.paint.alpha == 0 || self.bounds.is_empty() {
            return;
        }
        canvas.draw_bitmap(&self.resource, self.bounds, &self.paint);
    }

    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
    }

    fn opacity(&self) -> Opacity {
        if self.opaque && self.paint.alpha == 0xFF {
            Opacity::Opaque
        } else {
            Opacity::Translucent
        }
    }

    fn set_alpha(&mut self, alpha: u8) {
        self.paint.alpha = alpha;
    }

    fn set_color_filter(&mut self, filter: Option<ColorFilter>) {
        self.paint.color_filter = filter;
    }

    fn set_dither(&mut self, dither: bool) {
        self.paint.dither = dither;
    }

    fn set_filter_bitmap(&mut self, filter: bool) {
        self.paint.filter_bitmap = filter;
    }

    fn intrinsic_size(&self) -> Size {
        Size::new(
            i32::try_from(self.resource.width()).unwrap_or(i32::MAX),
            i32::try_from(self.resource.height()).unwrap_or(i32::MAX),
        )
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
