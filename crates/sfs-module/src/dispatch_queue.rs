//! `DispatchQueue` — FIFO of accepted exchanges shared by the accept
//! thread and the workers.
//!
//! One mutex guards both the items and the running-state, so a worker can
//! never miss the stop signal between checking the flag and waiting.
//! Two kinds of wakeup:
//!
//! - `enqueue()` → `notify_one()`: at most one worker per item.
//! - `close()` → `notify_all()`: every worker, once.
//!
//! Workers block on the condvar; nothing spins.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// State protected by the queue lock.
struct State<T> {
    items: VecDeque<T>,
    running: bool,
}

pub struct DispatchQueue<T> {
    state: Mutex<State<T>>,
    /// Signaled once per enqueue, and broadcast on close.
    available: Condvar,
    /// Total items accepted (diagnostics).
    enqueued: AtomicU64,
    /// Total items handed to a consumer (diagnostics).
    dequeued: AtomicU64,
}

impl<T> DispatchQueue<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                items: VecDeque::new(),
                running: true,
            }),
            available: Condvar::new(),
            enqueued: AtomicU64::new(0),
            dequeued: AtomicU64::new(0),
        }
    }

    /// Every mutation is a single push/pop/flag write, so a poisoned
    /// state is still consistent.
    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append to the tail and wake one waiting consumer.
    ///
    /// Returns the item back if the queue has been closed.
    pub fn enqueue(&self, item: T) -> Result<(), T> {
        {
            let mut state = self.lock();
            if !state.running {
                return Err(item);
            }
            state.items.push_back(item);
        }
        self.enqueued.fetch_add(1, Ordering::Relaxed);
        self.available.notify_one();
        Ok(())
    }

    /// Remove the head, blocking while the queue is empty and running.
    ///
    /// Returns `None` once the queue is closed and empty. Items enqueued
    /// before `close()` are still handed out.
    pub fn dequeue(&self) -> Option<T> {
        let mut state = self.lock();
        loop {
            if let Some(item) = state.items.pop_front() {
                drop(state);
                self.dequeued.fetch_add(1, Ordering::Relaxed);
                return Some(item);
            }
            if !state.running {
                return None;
            }
            state = self
                .available
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Non-blocking variant of `dequeue()`.
    pub fn try_dequeue(&self) -> Option<T> {
        let item = self.lock().items.pop_front();
        if item.is_some() {
            self.dequeued.fetch_add(1, Ordering::Relaxed);
        }
        item
    }

    /// Flip running-state to false and wake every consumer.
    ///
    /// Idempotent: returns `true` only for the call that flipped it.
    pub fn close(&self) -> bool {
        let first = {
            let mut state = self.lock();
            std::mem::replace(&mut state.running, false)
        };
        if first {
            self.available.notify_all();
        }
        first
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.lock().running
    }

    /// Items waiting (hint, may be stale).
    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn enqueued_count(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    pub fn dequeued_count(&self) -> u64 {
        self.dequeued.load(Ordering::Relaxed)
    }
}

impl<T> Default for DispatchQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
