//! Command-line interface of the `remotedraw` demo binary.

mod args;
mod report;
mod styles;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use args::*;
pub use report::*;
pub use styles::*;
