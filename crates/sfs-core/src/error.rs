//! Error types for the static file server.

use crate::response::StatusCode;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for server operations
pub type Result<T> = std::result::Result<T, ServeError>;

/// Errors raised while serving an exchange or running the server.
#[derive(Debug, Error)]
pub enum ServeError {
    /// The exchange has no usable request (missing head or path).
    #[error("invalid request context: {0}")]
    InvalidContext(&'static str),

    /// The resolved path escapes the root directory.
    #[error("path escapes root directory: {}", .0.display())]
    OutOfScope(PathBuf),

    /// Writing to the client failed.
    #[error("transport error: {0}")]
    Transport(#[source] io::Error),

    /// Filesystem failure while responding.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file delivered fewer bytes than its declared length.
    #[error("source truncated: expected {expected} bytes, got {copied}")]
    Truncated { expected: u64, copied: u64 },

    /// `accept()` failed with a non-transient error.
    #[error("accept failed: {0}")]
    Accept(#[source] io::Error),

    /// Could not bind the listener.
    #[error("bind {addr} failed: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// Could not spawn a worker thread.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] io::Error),

    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ServeError {
    /// Short, stable name used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            ServeError::InvalidContext(_) => "invalid_context",
            ServeError::OutOfScope(_) => "out_of_scope",
            ServeError::Transport(_) => "transport",
            ServeError::Io(_) => "io",
            ServeError::Truncated { .. } => "truncated",
            ServeError::Accept(_) => "accept",
            ServeError::Bind { .. } => "bind",
            ServeError::Spawn(_) => "spawn",
            ServeError::Config(_) => "config",
        }
    }

    /// Status code an exchange is finalized with when this error ends it.
    ///
    /// Transport failures are 500, traversal is 403, everything else 400.
    pub fn status(&self) -> StatusCode {
        match self {
            ServeError::Transport(_) => StatusCode::InternalServerError,
            ServeError::OutOfScope(_) => StatusCode::Forbidden,
            _ => StatusCode::BadRequest,
        }
    }
}

impl From<CopyError> for ServeError {
    fn from(e: CopyError) -> Self {
        match e {
            CopyError::Read(e) => ServeError::Io(e),
            CopyError::Write(e) => ServeError::Transport(e),
            CopyError::Truncated { expected, copied } => {
                ServeError::Truncated { expected, copied }
            }
        }
    }
}

/// Errors from the stream copier. The side that failed decides the status.
#[derive(Debug, Error)]
pub enum CopyError {
    /// Reading the source failed.
    #[error("read failed: {0}")]
    Read(#[source] io::Error),

    /// Writing the destination failed.
    #[error("write failed: {0}")]
    Write(#[source] io::Error),

    /// Source hit end-of-file before its declared length.
    #[error("source ended after {copied} of {expected} bytes")]
    Truncated { expected: u64, copied: u64 },
}

/// Configuration errors. Fatal at construction.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("listen url must not be empty")]
    EmptyUrl,

    #[error("root directory must not be empty")]
    EmptyDirectory,

    #[error("invalid listen url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: &'static str },

    #[error("invalid config: {0}")]
    InvalidValue(&'static str),

    #[error("cannot create root directory {}: {source}", .path.display())]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
