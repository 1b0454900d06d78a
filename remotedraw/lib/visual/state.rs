use std::sync::Arc;

use parking_lot::Mutex;

use super::{ColorFilter, Visual};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Configuration applied uniformly to whichever visual a remote visual currently wraps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisualState {
    /// Global alpha.
    pub alpha: u8,

    /// Optional color filter.
    pub color_filter: Option<ColorFilter>,

    /// Whether dithering is enabled.
    pub dither: bool,

    /// Whether bitmap filtering is enabled.
    pub filter_bitmap: bool,

    /// Host configuration changes this state depends on, as an opaque bit mask.
    pub changing_configurations: u32,
}

/// A [`VisualState`] that may be shared by several visuals until one of them detaches a private
/// copy.
#[derive(Debug, Clone, Default)]
pub struct SharedVisualState {
    inner: Arc<Mutex<VisualState>>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl VisualState {
    /// Applies every attribute to `visual`.
    pub fn apply_to(&self, visual: &mut dyn Visual) {
        visual.set_alpha(self.alpha);
        visual.set_color_filter(self.color_filter);
        visual.set_dither(self.dither);
        visual.set_filter_bitmap(self.filter_bitmap);
    }
}

impl SharedVisualState {
    /// Wraps `state` for sharing.
    pub fn new(state: VisualState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> VisualState {
        self.inner.lock().clone()
    }

    /// Runs `f` on the state. Changes are visible to every sharer.
    pub fn update<R>(&self, f: impl FnOnce(&mut VisualState) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// A new handle to a private copy of the current state.
    pub fn detach(&self) -> Self {
        Self::new(self.snapshot())
    }

    /// Whether both handles refer to the same state.
    pub fn is_shared_with(&self, other: &SharedVisualState) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Default for VisualState {
    fn default() -> Self {
        Self {
            alpha: 0xFF,
            color_filter: None,
            dither: true,
            filter_bitmap: true,
            changing_configurations: 0,
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
