#![allow(dead_code)]

use std::{
    collections::HashMap,
    io::Cursor,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Weak,
    },
    thread,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use bytes::Bytes;
use image::{ImageFormat, Rgba, RgbaImage};
use parking_lot::Mutex;
use remotedraw::{
    config::FetcherConfig,
    fetch::{FetchCallback, FetchCoordinator, PresentationQueue},
    resource::{DecodedResource, ImageDecoder},
    transport::Transport,
    visual::HostCallback,
    FetchError,
};
use tokio::sync::watch;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Upper bound for anything a test waits on.
pub const WAIT: Duration = Duration::from_secs(5);

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// What [`MockTransport`] does for an identifier.
#[derive(Debug, Clone)]
pub enum Behavior {
    Serve(Bytes),
    Fail(String),
    Hang,
}

/// A transport that counts calls, tracks concurrency and can hold every fetch behind a gate.
pub struct MockTransport {
    behaviors: Mutex<HashMap<String, Behavior>>,
    default_body: Bytes,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    gate: watch::Sender<bool>,
}

/// What a [`RecordingCallback`] was told.
#[derive(Debug, Clone)]
pub enum Event {
    Loaded(String, Arc<DecodedResource>),
    Failed(String, FetchError),
}

/// A fetch callback recording every notification, optionally into a log shared with others.
#[derive(Default)]
pub struct RecordingCallback {
    name: String,
    events: Mutex<Vec<Event>>,
    log: Option<Arc<Mutex<Vec<String>>>>,
}

/// A host counting redraw requests.
#[derive(Default)]
pub struct CountingHost {
    invalidations: AtomicUsize,
}

struct InFlight<'a>(&'a AtomicUsize);

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl MockTransport {
    /// A transport serving a 4x3 PNG for every identifier.
    pub fn new() -> Arc<Self> {
        Self::with_gate(true)
    }

    /// Like [`new`](Self::new) but every fetch waits for [`release`](Self::release).
    pub fn gated() -> Arc<Self> {
        Self::with_gate(false)
    }

    fn with_gate(open: bool) -> Arc<Self> {
        let (gate, _) = watch::channel(open);
        Arc::new(Self {
            behaviors: Mutex::new(HashMap::new()),
            default_body: png_bytes(4, 3),
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            gate,
        })
    }

    pub fn set(&self, key: &str, behavior: Behavior) {
        self.behaviors.lock().insert(key.to_string(), behavior);
    }

    pub fn release(&self) {
        self.gate.send_replace(true);
    }

    pub fn calls_for(&self, key: &str) -> usize {
        self.calls.lock().iter().filter(|call| *call == key).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl RecordingCallback {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A callback appending `name` to `log` whenever it is notified.
    pub fn logging(name: &str, log: &Arc<Mutex<Vec<String>>>) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            events: Mutex::new(Vec::new()),
            log: Some(log.clone()),
        })
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn event_count(&self) -> usize {
        self.events.lock().len()
    }

    pub fn loaded(&self) -> Option<Arc<DecodedResource>> {
        self.events.lock().iter().find_map(|event| match event {
            Event::Loaded(_, resource) => Some(resource.clone()),
            Event::Failed(..) => None,
        })
    }

    pub fn failure(&self) -> Option<FetchError> {
        self.events.lock().iter().find_map(|event| match event {
            Event::Failed(_, error) => Some(error.clone()),
            Event::Loaded(..) => None,
        })
    }

    fn record(&self, event: Event) {
        if let Some(log) = &self.log {
            log.lock().push(self.name.clone());
        }
        self.events.lock().push(event);
    }
}

impl CountingHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn invalidations(&self) -> usize {
        self.invalidations.load(Ordering::SeqCst)
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Encodes a solid `width` x `height` PNG.
pub fn png_bytes(width: u32, height: u32) -> Bytes {
    let image = RgbaImage::from_pixel(width, height, Rgba([0x10, 0x20, 0x30, 0xFF]));
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, ImageFormat::Png)
        .expect("encoding a PNG in memory");
    Bytes::from(out.into_inner())
}

/// A coordinator decoding with [`ImageDecoder`] and delivering into `queue`.
pub fn coordinator(
    config: FetcherConfig,
    transport: &Arc<MockTransport>,
    queue: &PresentationQueue,
) -> FetchCoordinator {
    FetchCoordinator::new(
        config,
        transport.clone(),
        Arc::new(ImageDecoder),
        queue.presenter(),
    )
    .expect("building the coordinator")
}

pub fn weak_callback(callback: &Arc<RecordingCallback>) -> Weak<dyn FetchCallback> {
    Arc::downgrade(callback) as Weak<dyn FetchCallback>
}

pub fn weak_host(host: &Arc<CountingHost>) -> Weak<dyn HostCallback> {
    Arc::downgrade(host) as Weak<dyn HostCallback>
}

/// Polls `condition` until it holds or [`WAIT`] elapses.
pub fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + WAIT;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

#[async_trait]
impl Transport for MockTransport {
    async fn fetch(&self, identifier: &str) -> Result<Bytes, FetchError> {
        self.calls.lock().push(identifier.to_string());
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        let _in_flight = InFlight(&self.in_flight);

        let mut gate = self.gate.subscribe();
        let _ = gate.wait_for(|open| *open).await;

        let behavior = self.behaviors.lock().get(identifier).cloned();
        match behavior {
            None => Ok(self.default_body.clone()),
            Some(Behavior::Serve(body)) => Ok(body),
            Some(Behavior::Fail(reason)) => Err(FetchError::Transport(reason)),
            Some(Behavior::Hang) => std::future::pending().await,
        }
    }
}

impl FetchCallback for RecordingCallback {
    fn on_loaded(&self, key: &str, resource: Arc<DecodedResource>) {
        self.record(Event::Loaded(key.to_string(), resource));
    }

    fn on_failed(&self, key: &str, error: &FetchError) {
        self.record(Event::Failed(key.to_string(), error.clone()));
    }
}

impl HostCallback for CountingHost {
    fn invalidate_visual(&self) {
        self.invalidations.fetch_add(1, Ordering::SeqCst);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
