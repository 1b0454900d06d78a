use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Weak,
    },
};

use super::FetchCallback;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Identifies one callback registration.
pub(crate) type CallbackId = u64;

/// A callback waiting on a fetch.
pub(crate) struct Waiter {
    id: CallbackId,
    callback: Weak<dyn FetchCallback>,

    /// Cleared when the registration is cancelled; checked again at delivery time since a
    /// cancellation may race with a completion that was already posted.
    active: Arc<AtomicBool>,
}

/// One in-flight fetch and the callbacks waiting on it, in registration order.
#[derive(Default)]
pub(crate) struct PendingFetch {
    waiters: Vec<Waiter>,
}

/// The table of in-flight fetches. At most one entry exists per key.
#[derive(Default)]
pub(crate) struct PendingFetches {
    fetches: HashMap<String, PendingFetch>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl Waiter {
    pub(crate) fn new(
        id: CallbackId,
        callback: Weak<dyn FetchCallback>,
        active: Arc<AtomicBool>,
    ) -> Self {
        Self {
            id,
            callback,
            active,
        }
    }

    /// Returns the callback if it is still registered and alive.
    pub(crate) fn callback(&self) -> Option<Arc<dyn FetchCallback>> {
        if !self.active.swap(false, Ordering::AcqRel) {
            return None;
        }
        self.callback.upgrade()
    }
}

impl PendingFetches {
    /// Adds `waiter` to the fetch for `key`.
    ///
    /// Returns `true` if no fetch was in flight for `key`, meaning the caller must start one.
    pub(crate) fn register(&mut self, key: &str, waiter: Waiter) -> bool {
        match self.fetches.get_mut(key) {
            Some(pending) => {
                pending.waiters.push(waiter);
                false
            }
            None => {
                self.fetches.insert(
                    key.to_string(),
                    PendingFetch {
                        waiters: vec![waiter],
                    },
                );
                true
            }
        }
    }

    /// Removes the waiter registered under `id`. The fetch itself keeps running.
    pub(crate) fn unregister(&mut self, key: &str, id: CallbackId) -> bool {
        let Some(pending) = self.fetches.get_mut(key) else {
            return false;
        };

        let before = pending.waiters.len();
        pending.waiters.retain(|waiter| waiter.id != id);
        before != pending.waiters.len()
    }

    /// Ends the fetch for `key`, returning its waiters in registration order.
    pub(crate) fn complete(&mut self, key: &str) -> Vec<Waiter> {
        self.fetches
            .remove(key)
            .map(|pending| pending.waiters)
            .unwrap_or_default()
    }

    /// Ends every fetch, returning each key with its waiters.
    pub(crate) fn drain(&mut self) -> Vec<(String, Vec<Waiter>)> {
        self.fetches
            .drain()
            .map(|(key, pending)| (key, pending.waiters))
            .collect()
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        self.fetches.contains_key(key)
    }

    pub(crate) fn waiter_count(&self, key: &str) -> usize {
        self.fetches
            .get(key)
            .map(|pending| pending.waiters.len())
            .unwrap_or(0)
    }

    pub(crate) fn len(&self) -> usize {
        self.fetches.len()
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use crate::{resource::DecodedResource, FetchError};

    use super::*;

    struct Noop;

    impl FetchCallback for Noop {
        fn on_loaded(&self, _: &str, _: Arc<DecodedResource>) {}
        fn on_failed(&self, _: &str, _: &FetchError) {}
    }

    fn waiter(id: CallbackId, callback: &Arc<dyn FetchCallback>) -> Waiter {
        Waiter::new(
            id,
            Arc::downgrade(callback),
            Arc::new(AtomicBool::new(true)),
        )
    }

    #[test]
    fn test_pending_register_deduplicates_by_key() {
        let callback: Arc<dyn FetchCallback> = Arc::new(Noop);
        let mut pending = PendingFetches::default();

        assert!(pending.register("a", waiter(1, &callback)));
        assert!(!pending.register("a", waiter(2, &callback)));
        assert!(pending.register("b", waiter(3, &callback)));

        assert_eq!(pending.len(), 2);
        assert_eq!(pending.waiter_count("a"), 2);
    }

    #[test]
    fn test_pending_complete_preserves_registration_order() {
        let callback: Arc<dyn FetchCallback> = Arc::new(Noop);
        let mut pending = PendingFetches::default();
        for id in [7, 3, 9] {
            pending.register("a", waiter(id, &callback));
        }

        let ids: Vec<_> = pending.complete("a").iter().map(|w| w.id).collect();
        assert_eq!(ids, vec![7, 3, 9]);
        assert!(!pending.contains("a"));
        assert!(pending.complete("a").is_empty());
    }

    #[test]
    fn test_pending_unregister_keeps_fetch_entry() {
        let callback: Arc<dyn FetchCallback> = Arc::new(Noop);
        let mut pending = PendingFetches::default();
        pending.register("a", waiter(1, &callback));

        assert!(pending.unregister("a", 1));
        assert!(!pending.unregister("a", 1));
        assert!(!pending.unregister("missing", 1));

        // The fetch is still in flight, so a new request must join it rather than start another.
        assert!(pending.contains("a"));
        assert!(!pending.register("a", waiter(2, &callback)));
    }

    #[test]
    fn test_waiter_skips_inactive_and_dropped_callbacks() {
        let callback: Arc<dyn FetchCallback> = Arc::new(Noop);

        let inactive = Waiter::new(
            1,
            Arc::downgrade(&callback),
            Arc::new(AtomicBool::new(false)),
        );
        assert!(inactive.callback().is_none());

        let live = waiter(2, &callback);
        assert!(live.callback().is_some());
        assert!(live.callback().is_none(), "a waiter is delivered at most once");

        let dropped = {
            let temporary: Arc<dyn FetchCallback> = Arc::new(Noop);
            waiter(3, &temporary)
        };
        assert!(dropped.callback().is_none());
    }
}
