//! # sfs-core — Trait definitions for the static file server
//!
//! This crate defines the seams between the pieces of the server.
//! Each trait models one collaborator of the dispatch layer:
//!
//! - `Exchange` - one accepted client exchange (request path + output sink)
//! - `EventSink` - where components report what happened
//! - `ContentTypeResolver` - file extension → MIME string
//! - `ShutdownHandler` - what `/shutdown` triggers
//!
//! Default implementations live in `sfs-module`. The lifecycle that wires
//! them together lives in `sfs-server`.
//!
//! ## Modules
//!
//! - `response` - `StatusCode` and the immutable `ResponseInfo`
//! - `exchange` - the `Exchange` trait
//! - `event` - `ServerEvent` and the `EventSink` trait
//! - `content_type` - the `ContentTypeResolver` trait
//! - `error` - error types
//! - `logging` - leveled stderr macros
//! - `env` - environment variable utilities

pub mod response;
pub mod exchange;
pub mod event;
pub mod content_type;
pub mod error;
pub mod logging;
pub mod env;

// Re-exports for convenience
pub use response::{ResponseInfo, StatusCode, DEFAULT_ENCODING};
pub use exchange::Exchange;
pub use event::{EventSink, ServerEvent};
pub use content_type::{ContentTypeResolver, FALLBACK_CONTENT_TYPE};
pub use error::{ConfigError, CopyError, Result, ServeError};
pub use logging::{set_log_level, LogLevel};
pub use env::{env_get, env_get_bool, env_get_opt};

/// Triggered by the router when a client requests `/shutdown`.
///
/// **Contract:**
/// - Must be idempotent. Only the first call changes anything.
/// - Must NEVER block on in-flight exchanges (the caller is a worker).
pub trait ShutdownHandler: Send + Sync {
    /// Stop the server. Returns `true` for the call that actually
    /// flipped the running-state, `false` if it was already stopped.
    fn request_shutdown(&self) -> bool;
}
