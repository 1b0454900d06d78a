use std::{
    fmt,
    sync::Arc,
    time::{Duration, Instant},
};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A unit of work to run on the presentation context.
pub type PresentationTask = Box<dyn FnOnce() + Send + 'static>;

/// A presentation context backed by a channel.
///
/// Workers post tasks through [`PresentationQueue::presenter`]; the host drains them on the
/// thread that owns its visuals with [`run_pending`](PresentationQueue::run_pending) or
/// [`run_for`](PresentationQueue::run_for).
pub struct PresentationQueue {
    sender: Sender<PresentationTask>,
    receiver: Receiver<PresentationTask>,
}

/// The posting half of a [`PresentationQueue`].
#[derive(Clone)]
pub struct QueuePresenter {
    sender: Sender<PresentationTask>,
}

//--------------------------------------------------------------------------------------------------
// Traits
//--------------------------------------------------------------------------------------------------

/// The host's "run this on the presentation context" primitive.
pub trait Presenter: Send + Sync + 'static {
    /// Schedules `task` to run on the presentation context. Must not block.
    fn post(&self, task: PresentationTask);
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl PresentationQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self { sender, receiver }
    }

    /// Returns a presenter posting into this queue.
    pub fn presenter(&self) -> Arc<dyn Presenter> {
        Arc::new(QueuePresenter {
            sender: self.sender.clone(),
        })
    }

    /// Runs every task already queued without blocking. Returns the number of tasks run.
    pub fn run_pending(&self) -> usize {
        let mut count = 0;
        while let Ok(task) = self.receiver.try_recv() {
            task();
            count += 1;
        }
        count
    }

    /// Runs tasks as they arrive until `timeout` elapses. Returns the number of tasks run.
    pub fn run_for(&self, timeout: Duration) -> usize {
        self.run_until(timeout, || false)
    }

    /// Runs tasks as they arrive until `done` returns true or `timeout` elapses.
    ///
    /// `done` is checked before waiting and after every task. Returns the number of tasks run.
    pub fn run_until(&self, timeout: Duration, mut done: impl FnMut() -> bool) -> usize {
        let deadline = Instant::now() + timeout;
        let mut count = 0;
        while !done() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.receiver.recv_timeout(remaining) {
                Ok(task) => {
                    task();
                    count += 1;
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        count
    }

    /// Number of tasks waiting to run.
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Whether no task is waiting.
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Default for PresentationQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PresentationQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PresentationQueue")
            .field("pending", &self.receiver.len())
            .finish()
    }
}

impl Presenter for QueuePresenter {
    fn post(&self, task: PresentationTask) {
        // The receiver lives as long as the queue; a closed queue means the host is gone.
        if self.sender.send(task).is_err() {
            tracing::debug!("presentation queue closed, dropping task");
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
