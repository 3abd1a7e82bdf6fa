//! Content-type lookup abstraction.
//!
//! # Implementors
//!
//! - `MimeGuessResolver` (default): extension table from `mime_guess`.

use std::path::Path;

/// Used when the resolver knows nothing about an extension.
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Maps a file path to a MIME string.
pub trait ContentTypeResolver: Send + Sync {
    /// Returns the content type for `path`, or `None` if unknown.
    fn resolve(&self, path: &Path) -> Option<String>;

    /// Like `resolve()`, falling back to `application/octet-stream`.
    fn resolve_or_default(&self, path: &Path) -> String {
        self.resolve(path)
            .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string())
    }
}
