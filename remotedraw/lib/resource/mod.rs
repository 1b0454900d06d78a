//! Decoded resources and the decoders that produce them.

mod decoded;
mod decoder;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use decoded::*;
pub use decoder::*;
