use std::{
    any::Any,
    fmt,
    panic::AssertUnwindSafe,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc, Weak,
    },
    time::Duration,
};

use futures::FutureExt;
use parking_lot::Mutex;
use tokio::{
    runtime::{self, Runtime},
    task, time,
};

use crate::{
    cache::ResourceCache,
    config::FetcherConfig,
    resource::{DecodedResource, Decoder},
    transport::Transport,
    FetchError, RemoteDrawResult,
};

use super::{
    pending::{CallbackId, PendingFetches, Waiter},
    pool::WorkerPool,
    FetchCallback, Presenter,
};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The name given to the threads of the fetch runtime.
const FETCH_THREAD_NAME: &str = "remotedraw-fetch";

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Owns the resource cache and the fetch worker pool.
///
/// [`fetch_or_get`](Self::fetch_or_get) either answers from the cache synchronously or joins (or
/// starts) the single in-flight fetch for the identifier. Completions are stored in the cache and
/// then delivered to every waiting callback on the presentation context, in registration order.
///
/// The coordinator runs its workers on a dedicated tokio runtime and must be created, shut down
/// and dropped outside of any async context.
pub struct FetchCoordinator {
    shared: Arc<CoordinatorShared>,
    pool: WorkerPool,
    runtime: Mutex<Option<Runtime>>,
}

/// The result of [`FetchCoordinator::fetch_or_get`].
#[derive(Debug)]
pub enum FetchOutcome {
    /// The resource was cached. No callback will be invoked.
    Ready(Arc<DecodedResource>),

    /// The resource is being fetched; the callback will be invoked once the fetch ends.
    ///
    /// Dropping the registration unregisters the callback.
    Pending(FetchRegistration),
}

/// A callback's interest in a pending fetch.
///
/// Dropping the registration (or calling [`cancel`](Self::cancel)) guarantees the callback is not
/// invoked afterwards. The fetch itself keeps running for the other waiters and the cache.
pub struct FetchRegistration {
    key: String,
    id: CallbackId,
    active: Arc<AtomicBool>,
    shared: Weak<CoordinatorShared>,
}

/// State shared between the coordinator handle and its workers.
struct CoordinatorShared {
    state: Mutex<CoordinatorState>,
    transport: Arc<dyn Transport>,
    decoder: Arc<dyn Decoder>,
    presenter: Arc<dyn Presenter>,
    fetch_timeout: Duration,
    next_callback_id: AtomicU64,
}

/// The cache and the pending-fetch table, guarded by one lock that is never held across I/O or
/// callback delivery.
struct CoordinatorState {
    cache: ResourceCache,
    pending: PendingFetches,
    shut_down: bool,
}

/// How a callback was registered by [`FetchCoordinator::fetch_or_get`].
enum Registered {
    Joined,
    Started,
    Rejected(Waiter),
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl FetchCoordinator {
    /// Creates a coordinator and starts its worker pool.
    ///
    /// ## Arguments
    ///
    /// * `config` - Pool size, fetch deadline and cache bounds
    /// * `transport` - Reads the raw bytes of a resource
    /// * `decoder` - Turns raw bytes into a [`DecodedResource`]
    /// * `presenter` - Runs completion callbacks on the host's presentation context
    pub fn new(
        config: FetcherConfig,
        transport: Arc<dyn Transport>,
        decoder: Arc<dyn Decoder>,
        presenter: Arc<dyn Presenter>,
    ) -> RemoteDrawResult<Self> {
        config.validate()?;

        let pool_size = *config.get_pool_size();
        let runtime = runtime::Builder::new_multi_thread()
            .worker_threads(pool_size)
            .thread_name(FETCH_THREAD_NAME)
            .enable_all()
            .build()?;

        let shared = Arc::new(CoordinatorShared {
            state: Mutex::new(CoordinatorState {
                cache: ResourceCache::new(
                    *config.get_cache_max_entries(),
                    *config.get_cache_max_bytes(),
                ),
                pending: PendingFetches::default(),
                shut_down: false,
            }),
            transport,
            decoder,
            presenter,
            fetch_timeout: config.fetch_timeout(),
            next_callback_id: AtomicU64::new(0),
        });

        let pool = {
            let shared = shared.clone();
            WorkerPool::start(runtime.handle(), pool_size, move |key| {
                shared.clone().run_job(key)
            })
        };

        tracing::info!(
            "fetch coordinator started with {pool_size} workers and a {:?} fetch deadline",
            config.fetch_timeout()
        );

        Ok(Self {
            shared,
            pool,
            runtime: Mutex::new(Some(runtime)),
        })
    }

    /// Returns the cached resource for `key`, or registers `callback` to be told when it arrives.
    ///
    /// Never blocks and never fails:
    /// - a cache hit is returned as [`FetchOutcome::Ready`] without scheduling anything
    /// - a miss joins the in-flight fetch for `key`, or queues a new one
    /// - after shutdown, a miss gets [`FetchError::Shutdown`] posted to `callback`
    pub fn fetch_or_get(&self, key: &str, callback: Weak<dyn FetchCallback>) -> FetchOutcome {
        let id = self.shared.next_callback_id.fetch_add(1, Ordering::Relaxed);
        let active = Arc::new(AtomicBool::new(true));
        let waiter = Waiter::new(id, callback, active.clone());

        let registered = {
            let mut state = self.shared.state.lock();
            if let Some(resource) = state.cache.get(key) {
                return FetchOutcome::Ready(resource);
            }

            if state.shut_down {
                Registered::Rejected(waiter)
            } else if state.pending.register(key, waiter) {
                Registered::Started
            } else {
                Registered::Joined
            }
        };

        match registered {
            Registered::Joined => {
                tracing::debug!("joining in-flight fetch for {key}");
            }
            Registered::Started => {
                tracing::debug!("queueing fetch for {key}");
                if !self.pool.submit(key.to_string()) {
                    self.shared.complete(key, Err(FetchError::Shutdown));
                }
            }
            Registered::Rejected(waiter) => {
                self.shared.deliver(key, vec![waiter], Err(FetchError::Shutdown));
            }
        }

        FetchOutcome::Pending(FetchRegistration {
            key: key.to_string(),
            id,
            active,
            shared: Arc::downgrade(&self.shared),
        })
    }

    /// Returns the cached resource for `key` without affecting its recency.
    pub fn cached(&self, key: &str) -> Option<Arc<DecodedResource>> {
        self.shared.state.lock().cache.peek(key)
    }

    /// Whether a fetch for `key` is queued or running.
    pub fn is_pending(&self, key: &str) -> bool {
        self.shared.state.lock().pending.contains(key)
    }

    /// Number of callbacks still waiting on the fetch for `key`.
    pub fn waiter_count(&self, key: &str) -> usize {
        self.shared.state.lock().pending.waiter_count(key)
    }

    /// Number of fetches queued or running.
    pub fn pending_count(&self) -> usize {
        self.shared.state.lock().pending.len()
    }

    /// Number of cached resources.
    pub fn cache_len(&self) -> usize {
        self.shared.state.lock().cache.len()
    }

    /// Drops the cached resource for `key`. The next request for it fetches again.
    pub fn evict(&self, key: &str) -> Option<Arc<DecodedResource>> {
        self.shared.state.lock().cache.remove(key)
    }

    /// Drops every cached resource.
    pub fn clear_cache(&self) {
        self.shared.state.lock().cache.clear();
    }

    /// Number of fetches that may run concurrently.
    pub fn pool_size(&self) -> usize {
        self.pool.size()
    }

    /// Stops the worker pool.
    ///
    /// Every pending fetch is failed with [`FetchError::Shutdown`]. Cached resources stay
    /// available through [`fetch_or_get`](Self::fetch_or_get). Calling this more than once is a
    /// no-op.
    pub fn shutdown(&self) {
        let drained = {
            let mut state = self.shared.state.lock();
            if state.shut_down {
                return;
            }
            state.shut_down = true;
            state.pending.drain()
        };

        for (key, waiters) in drained {
            self.shared.deliver(&key, waiters, Err(FetchError::Shutdown));
        }

        if let Some(runtime) = self.runtime.lock().take() {
            runtime.shutdown_background();
        }

        tracing::info!("fetch coordinator shut down");
    }
}

impl FetchRegistration {
    /// The identifier the registration is waiting on.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Unregisters the callback.
    pub fn cancel(self) {}
}

impl CoordinatorShared {
    async fn run_job(self: Arc<Self>, key: String) {
        tracing::debug!("starting fetch: {key}");

        let result = AssertUnwindSafe(self.fetch_and_decode(&key))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| {
                Err(FetchError::Transport(format!(
                    "fetch task panicked: {}",
                    panic_message(panic.as_ref())
                )))
            });

        self.complete(&key, result);
    }

    async fn fetch_and_decode(&self, key: &str) -> Result<Arc<DecodedResource>, FetchError> {
        let bytes = time::timeout(self.fetch_timeout, self.transport.fetch(key))
            .await
            .map_err(|_| FetchError::Timeout(self.fetch_timeout))??;

        let decoder = self.decoder.clone();
        let resource = task::spawn_blocking(move || decoder.decode(&bytes))
            .await
            .map_err(|e| FetchError::Decode(format!("decoder task failed: {e}")))??;

        Ok(Arc::new(resource))
    }

    /// Records the outcome of the fetch for `key` and notifies its waiters.
    ///
    /// A successful resource is in the cache before any waiter can observe the completion.
    fn complete(&self, key: &str, result: Result<Arc<DecodedResource>, FetchError>) {
        let waiters = {
            let mut state = self.state.lock();
            if let Ok(resource) = &result {
                state.cache.put(key, resource.clone());
            }
            state.pending.complete(key)
        };

        match &result {
            Ok(resource) => tracing::debug!(
                "fetch completed: {key} ({}x{}, {} waiters)",
                resource.width(),
                resource.height(),
                waiters.len()
            ),
            Err(e) => tracing::warn!("fetch failed: {key}: {e}"),
        }

        self.deliver(key, waiters, result);
    }

    /// Posts a single presentation task notifying `waiters` in order.
    fn deliver(
        &self,
        key: &str,
        waiters: Vec<Waiter>,
        result: Result<Arc<DecodedResource>, FetchError>,
    ) {
        if waiters.is_empty() {
            return;
        }

        let key = key.to_string();
        self.presenter.post(Box::new(move || {
            for callback in waiters.iter().filter_map(Waiter::callback) {
                match &result {
                    Ok(resource) => callback.on_loaded(&key, resource.clone()),
                    Err(error) => callback.on_failed(&key, error),
                }
            }
        }));
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Drop for FetchCoordinator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl Drop for FetchRegistration {
    fn drop(&mut self) {
        self.active.store(false, Ordering::Release);
        if let Some(shared) = self.shared.upgrade() {
            shared.state.lock().pending.unregister(&self.key, self.id);
        }
    }
}

impl fmt::Debug for FetchCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("FetchCoordinator")
            .field("pool_size", &self.pool.size())
            .field("cached", &state.cache.len())
            .field("pending", &state.pending.len())
            .field("shut_down", &state.shut_down)
            .finish()
    }
}

impl fmt::Debug for FetchRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchRegistration")
            .field("key", &self.key)
            .field("id", &self.id)
            .finish()
    }
}
