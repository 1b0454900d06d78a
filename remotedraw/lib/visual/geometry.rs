//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// An axis-aligned rectangle in host coordinates. `right` and `bottom` are exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    /// Left edge.
    pub left: i32,

    /// Top edge.
    pub top: i32,

    /// Right edge.
    pub right: i32,

    /// Bottom edge.
    pub bottom: i32,
}

/// A width and height pair. Negative values mean "no intrinsic size".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Size {
    /// Width in pixels.
    pub width: i32,

    /// Height in pixels.
    pub height: i32,
}

/// Space a visual asks to keep free around its content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Insets {
    /// Left inset.
    pub left: i32,

    /// Top inset.
    pub top: i32,

    /// Right inset.
    pub right: i32,

    /// Bottom inset.
    pub bottom: i32,
}

/// How a visual covers the pixels beneath it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opacity {
    /// Coverage cannot be determined.
    Unknown,

    /// Draws nothing visible, or may leave pixels beneath it showing.
    Transparent,

    /// Partially covers the pixels beneath it.
    Translucent,

    /// Fully covers its bounds.
    Opaque,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl Rect {
    /// Creates a rectangle from its edges.
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Width of the rectangle.
    pub const fn width(&self) -> i32 {
        self.right - self.left
    }

    /// Height of the rectangle.
    pub const fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Whether the rectangle covers no pixel.
    pub const fn is_empty(&self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }
}

impl Size {
    /// The size reported by visuals without an intrinsic size.
    pub const UNKNOWN: Size = Size::new(-1, -1);

    /// The zero size.
    pub const ZERO: Size = Size::new(0, 0);

    /// Creates a size.
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
