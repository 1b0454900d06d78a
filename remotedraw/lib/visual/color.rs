use super::{Canvas, ColorFilter, Opacity, Paint, Rect, Visual};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A visual filling its bounds with a single color. The usual placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorVisual {
    color: u32,
    bounds: Rect,
    paint: Paint,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl ColorVisual {
    /// Creates a visual filled with `color` (`0xAARRGGBB`).
    pub fn new(color: u32) -> Self {
        Self {
            color,
            bounds: Rect::default(),
            paint: Paint::default(),
        }
    }

    /// The fill color.
    pub fn color(&self) -> u32 {
        self.color
    }

    /// The paint applied when drawing.
    pub fn paint(&self) -> &Paint {
        &self.paint
    }

    /// Alpha of the fill after applying the paint alpha.
    fn effective_alpha(&self) -> u32 {
        let color_alpha = self.color >> 24;
        color_alpha * u32::from(self.paint.alpha) / 0xFF
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Visual for ColorVisual {
    fn draw(&self, canvas: &mut dyn Canvas) {
        if self.effective_alpha() == 0 || self.bounds.is_empty() {
            return;
        }
        canvas.fill_rect(self.bounds, self.color, &self.paint);
    }

    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
    }

    fn opacity(&self) -> Opacity {
        match self.effective_alpha() {
            0 => Opacity::Transparent,
            0xFF if self.paint.color_filter.is_none() => Opacity::Opaque,
            _ => Opacity::Translucent,
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
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
