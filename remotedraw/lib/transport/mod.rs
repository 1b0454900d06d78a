//! Transports that fetch the raw bytes of a resource.
//!
//! The fetch coordinator only depends on the [`Transport`] trait. This module provides:
//! - [`HttpTransport`] for `http://` and `https://` identifiers
//! - [`FileTransport`] for `file://` identifiers and plain paths
//! - [`DefaultTransport`] routing between the two by scheme

mod default;
mod file;
mod http;
mod traits;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use default::*;
pub use file::*;
pub use http::*;
pub use traits::*;
