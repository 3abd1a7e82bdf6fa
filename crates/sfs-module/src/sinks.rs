//! `EventSink` implementations.
//!
//! `ConsoleSink` is what the binary uses. `MemorySink` records events so
//! tests can assert on them without capturing stderr.

use sfs_core::event::{EventSink, ServerEvent};
use sfs_core::{log_debug, log_error, log_info, log_warn};

use std::sync::{Mutex, PoisonError};

/// Writes events as leveled stderr lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl EventSink for ConsoleSink {
    fn emit(&self, event: ServerEvent) {
        match event {
            ServerEvent::Listening { prefix, root, workers } => {
                log_info!("Listening on {} (root={}, workers={})", prefix, root.display(), workers);
            }
            ServerEvent::WorkerStarted { worker } => log_debug!("worker {} started", worker),
            ServerEvent::WorkerStopped { worker } => log_debug!("worker {} stopped", worker),
            ServerEvent::Request { method, path } => log_info!("New request: {} {}", method, path),
            ServerEvent::Served { path } => log_debug!("Ok request! Searched path: {}", path.display()),
            ServerEvent::NotFound { path } => {
                log_info!("Page not found! Searched path: {}", path.display());
            }
            ServerEvent::Responded { status, content_type, content_length } => {
                log_info!(
                    "Responding: {}, {}, {}",
                    status,
                    content_type.as_deref().unwrap_or("-"),
                    content_length
                );
            }
            ServerEvent::ShutdownRequested { first: true } => log_info!("shutdown requested"),
            ServerEvent::ShutdownRequested { first: false } => {
                log_debug!("shutdown requested again, already stopping");
            }
            ServerEvent::AcceptFailed { transient: true, message } => {
                log_warn!("accept failed (transient): {}", message);
            }
            ServerEvent::AcceptFailed { transient: false, message } => {
                log_error!("accept failed: {}", message);
            }
            ServerEvent::ExchangeFailed { kind, message } => {
                log_warn!("exchange failed [{}]: {}", kind, message);
            }
            ServerEvent::WorkerPanicked { worker } => {
                log_error!("worker {} recovered from a panicking exchange", worker);
            }
            ServerEvent::Stopped {
                enqueued,
                dequeued,
                workers,
                in_flight,
            } => {
                log_info!(
                    "stopped (accepted={}, dispatched={}, busy workers at stop={}/{})",
                    enqueued,
                    dequeued,
                    in_flight,
                    workers
                );
            }
        }
    }
}

/// Drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: ServerEvent) {}
}

/// Records every event in arrival order.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<ServerEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn events(&self) -> Vec<ServerEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of recorded events matching `pred`.
    pub fn count(&self, pred: impl Fn(&ServerEvent) -> bool) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| pred(e))
            .count()
    }

    /// Recorded `Responded` status codes, in order.
    pub fn statuses(&self) -> Vec<u16> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ServerEvent::Responded { status, .. } => Some(status),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: ServerEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sfs_core::logging::{set_log_level, LogLevel};
    use std::path::PathBuf;

    #[test]
    fn test_memory_sink_records_in_order() {
        let sink = MemorySink::new();
        sink.emit(ServerEvent::WorkerStarted { worker: 1 });
        sink.emit(ServerEvent::Responded {
            status: 404,
            content_type: None,
            content_length: 0,
        });
        sink.emit(ServerEvent::Responded {
            status: 200,
            content_type: Some("text/html".into()),
            content_length: 5,
        });

        assert_eq!(sink.events().len(), 3);
        assert_eq!(sink.statuses(), vec![404, 200]);
        assert_eq!(sink.count(|e| matches!(e, ServerEvent::WorkerStarted { .. })), 1);
    }

    #[test]
    fn test_console_sink_accepts_every_event() {
        set_log_level(LogLevel::Off);
        let sink = ConsoleSink;
        sink.emit(ServerEvent::Listening {
            prefix: "http://+:8080/".into(),
            root: PathBuf::from("/srv"),
            workers: 4,
        });
        sink.emit(ServerEvent::NotFound { path: PathBuf::from("/srv/x") });
        sink.emit(ServerEvent::AcceptFailed { transient: true, message: "EMFILE".into() });
        sink.emit(ServerEvent::ShutdownRequested { first: false });
        sink.emit(ServerEvent::Stopped {
            enqueued: 1,
            dequeued: 1,
            workers: 4,
            in_flight: 0,
        });
    }
}
