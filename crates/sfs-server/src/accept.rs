//! Accept error classification.
//!
//! Transient failures are reported and the loop keeps accepting.
//! Anything else stops the server.

use std::io;
use std::time::Duration;

/// What the accept loop does after a failed `accept()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptAction {
    /// Try again immediately.
    Retry,
    /// Out of descriptors: sleep, then try again.
    Backoff(Duration),
    /// Stop the server.
    Fatal,
}

/// Sleep applied when the process or system runs out of descriptors.
pub const FD_EXHAUSTED_BACKOFF: Duration = Duration::from_millis(10);

pub fn classify(err: &io::Error) -> AcceptAction {
    if let Some(action) = err.raw_os_error().and_then(classify_errno) {
        return action;
    }
    match err.kind() {
        io::ErrorKind::Interrupted
        | io::ErrorKind::WouldBlock
        | io::ErrorKind::TimedOut
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::ConnectionReset => AcceptAction::Retry,
        _ => AcceptAction::Fatal,
    }
}

#[cfg(unix)]
fn classify_errno(code: i32) -> Option<AcceptAction> {
    match code {
        libc::EINTR | libc::ECONNABORTED | libc::EPROTO | libc::EAGAIN => Some(AcceptAction::Retry),
        libc::EMFILE | libc::ENFILE | libc::ENOBUFS | libc::ENOMEM => {
            Some(AcceptAction::Backoff(FD_EXHAUSTED_BACKOFF))
        }
        _ => None,
    }
}

#[cfg(not(unix))]
fn classify_errno(_code: i32) -> Option<AcceptAction> {
    None
}
