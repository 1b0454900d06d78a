use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Weak,
};

use parking_lot::Mutex;

use crate::{
    fetch::{FetchCallback, FetchCoordinator, FetchOutcome, FetchRegistration},
    resource::DecodedResource,
    visual::{DrawOp, HostCallback, RecordingCanvas, RemoteVisual},
    FetchError,
};

use super::AnsiStyles;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Where a tracked visual's fetch stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No notification has arrived yet.
    Pending,

    /// The resource arrived, whether or not the cache kept it.
    Resolved,

    /// The fetch failed and the placeholder stays.
    Failed,
}

/// Hosts one [`RemoteVisual`] for the demo and learns how its fetch ended.
///
/// The tracker waits on the visual's key next to the visual itself, so the outcome comes from the
/// same notification the visual receives rather than from the coordinator's cache, which may
/// never hold an oversized or already evicted resource.
pub struct LoadTracker {
    outcome: Mutex<LoadOutcome>,
    invalidations: AtomicUsize,
    registration: Mutex<Option<FetchRegistration>>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl LoadTracker {
    /// Creates a tracker with nothing to watch yet.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            outcome: Mutex::new(LoadOutcome::Pending),
            invalidations: AtomicUsize::new(0),
            registration: Mutex::new(None),
        })
    }

    /// Becomes the host of `visual` and starts waiting for its resource.
    ///
    /// The visual registered its own callback first, so it has already swapped by the time the
    /// tracker hears about the same fetch.
    pub fn track(self: &Arc<Self>, visual: &RemoteVisual, coordinator: &FetchCoordinator) {
        visual.set_host(Some(Arc::downgrade(self) as Weak<dyn HostCallback>));
        if visual.is_resolved() {
            self.settle(LoadOutcome::Resolved);
            return;
        }

        let callback = Arc::downgrade(self) as Weak<dyn FetchCallback>;
        match coordinator.fetch_or_get(visual.key(), callback) {
            FetchOutcome::Ready(_) => self.settle(LoadOutcome::Resolved),
            FetchOutcome::Pending(registration) => {
                *self.registration.lock() = Some(registration);
            }
        }
    }

    /// How the fetch ended, or [`LoadOutcome::Pending`] while it runs.
    pub fn outcome(&self) -> LoadOutcome {
        *self.outcome.lock()
    }

    /// Whether the fetch has ended one way or the other.
    pub fn is_settled(&self) -> bool {
        self.outcome() != LoadOutcome::Pending
    }

    /// Redraw requests received from the visual.
    pub fn invalidations(&self) -> usize {
        self.invalidations.load(Ordering::Relaxed)
    }

    /// One line describing the visual identified by `key` and what it drew onto `canvas`.
    pub fn summary(&self, key: &str, canvas: &RecordingCanvas) -> String {
        let status = match self.outcome() {
            LoadOutcome::Resolved => "resolved".valid(),
            LoadOutcome::Failed => "failed".invalid(),
            LoadOutcome::Pending => "pending".placeholder(),
        };

        let drawn = match canvas.ops() {
            [DrawOp::Bitmap { resource, .. }] => {
                format!("image {}x{}", resource.width(), resource.height())
            }
            [DrawOp::FillRect { color, .. }] => format!("placeholder #{color:08X}"),
            [] => "nothing".to_string(),
            ops => format!("{} draw calls", ops.len()),
        };

        format!(
            "{} {status}: {drawn} ({} redraw requests)",
            key.literal(),
            self.invalidations()
        )
    }

    fn settle(&self, outcome: LoadOutcome) {
        let mut current = self.outcome.lock();
        if *current == LoadOutcome::Pending {
            *current = outcome;
        }
        self.registration.lock().take();
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl HostCallback for LoadTracker {
    fn invalidate_visual(&self) {
        self.invalidations.fetch_add(1, Ordering::Relaxed);
    }
}

impl FetchCallback for LoadTracker {
    fn on_loaded(&self, _key: &str, _resource: Arc<DecodedResource>) {
        self.settle(LoadOutcome::Resolved);
    }

    fn on_failed(&self, key: &str, error: &FetchError) {
        tracing::debug!("demo fetch for {key} failed: {error}");
        self.settle(LoadOutcome::Failed);
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
