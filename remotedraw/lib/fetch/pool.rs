use std::{future::Future, sync::Arc};

use tokio::{
    runtime::Handle,
    sync::{mpsc, Mutex},
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A fixed number of workers pulling fetch jobs from a shared FIFO queue.
///
/// Each worker runs one job at a time, so at most `size` jobs run concurrently. Waiting workers
/// take turns on the queue in arrival order, which keeps job start order FIFO.
#[derive(Debug)]
pub(crate) struct WorkerPool {
    jobs: mpsc::UnboundedSender<String>,
    size: usize,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl WorkerPool {
    /// Spawns `size` workers on `handle`, each running `run` for the jobs it receives.
    pub(crate) fn start<F, Fut>(handle: &Handle, size: usize, run: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (jobs, receiver) = mpsc::unbounded_channel::<String>();
        let receiver = Arc::new(Mutex::new(receiver));
        let run = Arc::new(run);

        for worker in 0..size {
            let receiver = receiver.clone();
            let run = run.clone();
            handle.spawn(async move {
                loop {
                    // The lock is held only while waiting for the next job.
                    let job = receiver.lock().await.recv().await;
                    let Some(key) = job else {
                        break;
                    };

                    tracing::trace!("fetch worker {worker} picked up {key}");
                    run(key).await;
                }

                tracing::debug!("fetch worker {worker} stopped");
            });
        }

        Self { jobs, size }
    }

    /// Queues a job. Returns `false` if the workers are gone.
    pub(crate) fn submit(&self, key: String) -> bool {
        self.jobs.send(key).is_ok()
    }

    pub(crate) fn size(&self) -> usize {
        self.size
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
