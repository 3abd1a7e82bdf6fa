//! Response metadata.
//!
//! A `ResponseInfo` is built once per exchange and handed to the
//! response writer exactly once. It never changes after construction.

use std::fmt;

/// Character encoding advertised for textual bodies.
pub const DEFAULT_ENCODING: &str = "utf-8";

/// The status codes this server produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// File served.
    Ok,
    /// Shutdown acknowledged.
    NoContent,
    /// Malformed request or unexpected failure while responding.
    BadRequest,
    /// Request path escapes the root directory.
    Forbidden,
    /// No such file.
    NotFound,
    /// Transport failure while writing the response.
    InternalServerError,
}

impl StatusCode {
    pub const fn code(self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::NoContent => 204,
            StatusCode::BadRequest => 400,
            StatusCode::Forbidden => 403,
            StatusCode::NotFound => 404,
            StatusCode::InternalServerError => 500,
        }
    }

    pub const fn reason(self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::NoContent => "No Content",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }

    /// Whether a response with this status may carry a body.
    pub const fn allows_body(self) -> bool {
        !matches!(self, StatusCode::NoContent)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code(), self.reason())
    }
}

/// Immutable description of one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseInfo {
    status: StatusCode,
    content_length: u64,
    content_type: Option<String>,
    encoding: &'static str,
}

impl ResponseInfo {
    /// A response without a content type (errors, shutdown ack).
    pub fn new(status: StatusCode, content_length: u64) -> Self {
        Self {
            status,
            content_length,
            content_type: None,
            encoding: DEFAULT_ENCODING,
        }
    }

    /// A response with a content type. An empty or blank type is
    /// treated as absent.
    pub fn with_content_type(
        status: StatusCode,
        content_type: impl Into<String>,
        content_length: u64,
    ) -> Self {
        let content_type = content_type.into();
        let content_type = if content_type.trim().is_empty() {
            None
        } else {
            Some(content_type)
        };
        Self {
            status,
            content_length,
            content_type,
            encoding: DEFAULT_ENCODING,
        }
    }

    /// Empty-bodied response for a status (400, 403, 500, 204).
    pub fn empty(status: StatusCode) -> Self {
        Self::new(status, 0)
    }

    #[inline]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[inline]
    pub fn content_length(&self) -> u64 {
        self.content_length
    }

    #[inline]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    #[inline]
    pub fn encoding(&self) -> &'static str {
        self.encoding
    }
}
