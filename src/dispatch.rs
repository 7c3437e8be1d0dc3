//! Background execution for capture work.
//!
//! A single-thread rayon pool fed with `spawn_fifo` behaves as a serial
//! queue: jobs run one at a time, in submission order.

use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use std::any::Any;
use std::sync::mpsc;

pub(crate) struct SerialQueue {
    pool: ThreadPool,
}

impl SerialQueue {
    pub(crate) fn new(thread_name: &str) -> Result<Self, ThreadPoolBuildError> {
        let thread_name = thread_name.to_string();
        let pool = ThreadPoolBuilder::new()
            .num_threads(1)
            .thread_name(move |_| thread_name.clone())
            .panic_handler(log_panic)
            .build()?;
        Ok(Self { pool })
    }

    pub(crate) fn dispatch<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.pool.spawn_fifo(job);
    }

    /// Block until every job dispatched before this call has finished.
    ///
    /// Must not be called from a job on this queue.
    pub(crate) fn barrier(&self) {
        let (done_tx, done_rx) = mpsc::channel();
        self.pool.spawn_fifo(move || {
            let _ = done_tx.send(());
        });
        // A disconnect means the job was dropped, which also ends the wait.
        let _ = done_rx.recv();
    }
}

fn log_panic(payload: Box<dyn Any + Send>) {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string());
    tracing::error!(%message, "capture worker job panicked");
}
