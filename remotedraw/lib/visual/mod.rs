//! Visual abstractions and the remote-backed visual.
//!
//! A [`Visual`] is anything a host can position, configure and draw onto a [`Canvas`]. The
//! [`RemoteVisual`] wraps a placeholder until its resource has been fetched, then swaps in a
//! [`BitmapVisual`] for it and asks its [`HostCallback`] to redraw.

mod bitmap;
mod canvas;
mod color;
mod geometry;
mod remote;
mod state;
mod traits;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use bitmap::*;
pub use canvas::*;
pub use color::*;
pub use geometry::*;
pub use remote::*;
pub use state::*;
pub use traits::*;
