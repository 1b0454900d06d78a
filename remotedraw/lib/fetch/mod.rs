//! Fetch coordination.
//!
//! This module provides:
//! - [`FetchCoordinator`], the single entry point for request-or-return-cached lookups
//! - the pending-fetch table that lets concurrent requests for one identifier share a fetch
//! - a fixed-size worker pool performing transport reads and decodes
//! - the [`Presenter`] abstraction that delivers completions to the host's presentation context

mod callback;
mod coordinator;
mod pending;
mod pool;
mod presenter;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use callback::*;
pub use coordinator::*;
pub use presenter::*;
