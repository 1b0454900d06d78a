use std::{
    fmt,
    sync::{Arc, Weak},
    time::Instant,
};

use super::{Canvas, ColorFilter, Insets, Opacity, Rect, Size};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Work a visual asks its host to run later, usually the next frame of an animation.
///
/// Tasks are identified by pointer, so the same `Arc` must be passed to unschedule it.
pub type ScheduledTask = Arc<dyn Fn() + Send + Sync>;

//--------------------------------------------------------------------------------------------------
// Traits
//--------------------------------------------------------------------------------------------------

/// Something a host can position, configure and draw.
///
/// Only `draw`, the bounds accessors and `opacity` are required; the other methods default to a
/// visual that ignores the attribute.
pub trait Visual: Send + fmt::Debug {
    /// Draws the visual within its bounds.
    fn draw(&self, canvas: &mut dyn Canvas);

    /// The bounds last assigned by the host.
    fn bounds(&self) -> Rect;

    /// Assigns the bounds the visual draws into.
    fn set_bounds(&mut self, bounds: Rect);

    /// How the visual covers the pixels beneath it.
    fn opacity(&self) -> Opacity;

    /// Sets the global alpha.
    fn set_alpha(&mut self, _alpha: u8) {}

    /// Sets or clears the color filter.
    fn set_color_filter(&mut self, _filter: Option<ColorFilter>) {}

    /// Enables or disables dithering.
    fn set_dither(&mut self, _dither: bool) {}

    /// Enables or disables bitmap filtering when scaling.
    fn set_filter_bitmap(&mut self, _filter: bool) {}

    /// Whether the visual changes appearance with the host's state.
    fn is_stateful(&self) -> bool {
        false
    }

    /// Applies the host's state set. Returns whether the appearance changed.
    fn set_state(&mut self, _state: &[i32]) -> bool {
        false
    }

    /// Applies a level (for progress-like visuals). Returns whether the appearance changed.
    fn set_level(&mut self, _level: i32) -> bool {
        false
    }

    /// The natural size of the content, or [`Size::UNKNOWN`].
    fn intrinsic_size(&self) -> Size {
        Size::UNKNOWN
    }

    /// The smallest size the visual should be given.
    fn minimum_size(&self) -> Size {
        Size::ZERO
    }

    /// Space to keep free around the content, if any.
    fn padding(&self) -> Option<Insets> {
        None
    }

    /// Installs the host to notify when the visual needs a redraw.
    fn set_host(&mut self, _host: Option<Weak<dyn HostCallback>>) {}
}

/// The host side of a visual: whoever owns it on screen.
///
/// Calls may come from within a visual's setters, so implementations should only record the
/// request (mark dirty, queue a frame) and must not call back into the visual synchronously.
pub trait HostCallback: Send + Sync {
    /// The visual needs to be redrawn.
    fn invalidate_visual(&self);

    /// Runs `task` at `when`.
    fn schedule_visual(&self, _task: ScheduledTask, _when: Instant) {}

    /// Cancels a task previously passed to [`schedule_visual`](Self::schedule_visual).
    fn unschedule_visual(&self, _task: &ScheduledTask) {}
}
