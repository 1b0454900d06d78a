use std::sync::Arc;

use crate::{resource::DecodedResource, FetchError};

//--------------------------------------------------------------------------------------------------
// Traits
//--------------------------------------------------------------------------------------------------

/// Receives the outcome of a fetch.
///
/// Callbacks are registered as weak references and are always invoked on the presentation
/// context, never on a worker thread. Each registration receives at most one call.
pub trait FetchCallback: Send + Sync {
    /// The resource identified by `key` was fetched, decoded and cached.
    fn on_loaded(&self, key: &str, resource: Arc<DecodedResource>);

    /// The fetch for `key` failed. Nothing was cached.
    fn on_failed(&self, key: &str, error: &FetchError);
}
