//! Exchange abstraction.
//!
//! An `Exchange` is one accepted client connection from acceptance to
//! response finalization. It is owned by exactly one worker at a time and
//! moves through:
//!
//! ```text
//! Accepted → Routed → {ShuttingDown | Serving} → Finalized(status)
//! ```
//!
//! `close()` consumes the boxed exchange, so nothing can touch it after
//! it has been finalized.
//!
//! # Implementors
//!
//! - `HttpExchange` (default): HTTP/1.1 over a `TcpStream`, one request
//!   per connection.
//! - Test doubles that record the head and body in memory.

use crate::response::ResponseInfo;
use std::io::{self, Write};

/// One client exchange: the request side plus an output sink.
///
/// **Contract:**
/// - `write_head()` is called at most once, before any body bytes.
/// - `body()` bytes are only written after the head.
/// - `close()` flushes and releases the connection.
pub trait Exchange: Send {
    /// Request method (`GET`, `HEAD`, ...). `None` if the request head
    /// could not be parsed.
    fn method(&self) -> Option<&str>;

    /// Request path without query or fragment, still percent-encoded.
    /// `None` if the request head could not be parsed.
    fn path(&self) -> Option<&str>;

    /// Whether the transport frames the body itself (chunked). When true
    /// the response head carries no content length.
    fn send_chunked(&self) -> bool {
        false
    }

    /// Whether the status line and headers have been committed.
    fn head_written(&self) -> bool;

    /// Commit status line and headers.
    fn write_head(&mut self, info: &ResponseInfo) -> io::Result<()>;

    /// Output sink for body bytes.
    fn body(&mut self) -> &mut dyn Write;

    /// Flush and close the connection.
    fn close(self: Box<Self>) -> io::Result<()>;
}
