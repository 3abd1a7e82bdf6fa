//! Event reporting.
//!
//! Components never print. They emit a `ServerEvent` to the `EventSink`
//! they were constructed with.
//!
//! # Implementors
//!
//! - `ConsoleSink` (default): leveled stderr lines via the `logging` macros.
//! - `MemorySink` (testing): records every event for assertions.

use std::path::PathBuf;

/// Everything the server reports about itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// Listener bound, pool about to start.
    Listening {
        prefix: String,
        root: PathBuf,
        workers: usize,
    },
    /// A worker thread entered its loop.
    WorkerStarted { worker: usize },
    /// A worker thread left its loop.
    WorkerStopped { worker: usize },
    /// A request head was read and routed.
    Request { method: String, path: String },
    /// A file was found and is being streamed.
    Served { path: PathBuf },
    /// No file at the resolved path.
    NotFound { path: PathBuf },
    /// The response writer finalized an exchange.
    Responded {
        status: u16,
        content_type: Option<String>,
        content_length: u64,
    },
    /// `/shutdown` was requested. `first` is false for repeats.
    ShutdownRequested { first: bool },
    /// `accept()` failed.
    AcceptFailed { transient: bool, message: String },
    /// One exchange failed. Never affects other exchanges.
    ExchangeFailed { kind: &'static str, message: String },
    /// A handler panicked; the worker survived.
    WorkerPanicked { worker: usize },
    /// Accept loop done and every worker joined. `in_flight` is how many
    /// of the `workers` were still mid-exchange when accepting stopped.
    Stopped {
        enqueued: u64,
        dequeued: u64,
        workers: usize,
        in_flight: usize,
    },
}

/// Receives `ServerEvent`s from every component.
///
/// **Contract:**
/// - `emit()` must NEVER block for long; it is called on worker threads
///   and on the accept thread.
/// - Implementations must be thread-safe.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: ServerEvent);
}
