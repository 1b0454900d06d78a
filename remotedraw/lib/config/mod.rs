//! Configuration types and defaults.

mod defaults;
mod fetcher;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use defaults::*;
pub use fetcher::*;
