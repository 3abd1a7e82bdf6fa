//! `FixedPool` — the worker pool.
//!
//! Spawns N OS threads at creation. Each worker blocks on the shared
//! `DispatchQueue`, takes exactly one item, and runs the handler on it
//! outside the queue lock. No dynamic scaling.
//!
//! Stopping closes the queue: every worker wakes, finishes what is
//! already queued, and exits. `join()` returns once all of them have.

use crate::dispatch_queue::DispatchQueue;
use sfs_core::error::{Result, ServeError};
use sfs_core::event::{EventSink, ServerEvent};

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Stable worker identity, also used in the thread name.
pub type WorkerId = usize;

pub struct FixedPool<T> {
    queue: Arc<DispatchQueue<T>>,
    handles: Vec<JoinHandle<()>>,
    /// Number of workers currently running the handler.
    busy: Arc<AtomicUsize>,
    total: usize,
}

impl<T: Send + 'static> FixedPool<T> {
    /// Spawn `n` workers consuming `queue`.
    ///
    /// If a thread cannot be spawned, the workers already started are
    /// stopped and joined before the error is returned.
    pub fn start<H>(
        n: usize,
        queue: Arc<DispatchQueue<T>>,
        events: Arc<dyn EventSink>,
        handler: H,
    ) -> Result<Self>
    where
        H: Fn(WorkerId, T) + Send + Sync + 'static,
    {
        let n = n.max(1);
        let handler = Arc::new(handler);
        let busy = Arc::new(AtomicUsize::new(0));

        let mut pool = FixedPool {
            queue: Arc::clone(&queue),
            handles: Vec::with_capacity(n),
            busy: Arc::clone(&busy),
            total: n,
        };

        for worker_id in 0..n {
            let queue = Arc::clone(&queue);
            let handler = Arc::clone(&handler);
            let busy = Arc::clone(&busy);
            let events = Arc::clone(&events);

            let spawned = thread::Builder::new()
                .name(format!("sfs-worker-{}", worker_id))
                .spawn(move || worker_loop(worker_id, &queue, &*handler, &busy, &*events));

            match spawned {
                Ok(handle) => pool.handles.push(handle),
                Err(e) => {
                    pool.stop();
                    pool.join_all();
                    return Err(ServeError::Spawn(e));
                }
            }
        }

        Ok(pool)
    }
}

impl<T> FixedPool<T> {
    /// Deliver the stop signal to every worker. Idempotent.
    pub fn stop(&self) -> bool {
        self.queue.close()
    }

    /// Wait for every worker thread to exit.
    ///
    /// Call `stop()` first (or close the queue elsewhere), otherwise this
    /// blocks until someone does.
    pub fn join(mut self) {
        self.join_all();
    }

    fn join_all(&mut self) {
        for handle in self.handles.drain(..) {
            // Handler panics are caught inside the loop; a join error here
            // means the loop itself died, which we have nothing to add to.
            let _ = handle.join();
        }
    }

    /// Number of workers currently executing an item.
    pub fn busy_workers(&self) -> usize {
        self.busy.load(Ordering::Relaxed)
    }

    /// Total number of workers.
    pub fn total_workers(&self) -> usize {
        self.total
    }
}

impl<T> Drop for FixedPool<T> {
    fn drop(&mut self) {
        self.queue.close();
        self.join_all();
    }
}

/// Worker thread main loop.
fn worker_loop<T, H>(
    worker_id: WorkerId,
    queue: &DispatchQueue<T>,
    handler: &H,
    busy: &AtomicUsize,
    events: &dyn EventSink,
) where
    H: Fn(WorkerId, T),
{
    events.emit(ServerEvent::WorkerStarted { worker: worker_id });

    while let Some(item) = queue.dequeue() {
        busy.fetch_add(1, Ordering::Relaxed);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler(worker_id, item)));
        busy.fetch_sub(1, Ordering::Relaxed);

        if outcome.is_err() {
            events.emit(ServerEvent::WorkerPanicked { worker: worker_id });
        }
    }

    events.emit(ServerEvent::WorkerStopped { worker: worker_id });
}
