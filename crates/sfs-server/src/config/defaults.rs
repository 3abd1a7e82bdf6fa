//! Library defaults. Every value here can be overridden by `SFS_*`
//! environment variables or the builder.

/// Listen on every interface, port 8080, base path `/`.
pub const URL: &str = "http://+:8080/";

pub const NUM_WORKERS: usize = 20;

/// Upper bound accepted by `validate()`.
pub const MAX_WORKERS: usize = 1024;

/// Bytes per copy chunk.
pub const CHUNK_SIZE: usize = 8 * 1024;

/// Deadline for a complete request head, counted from the first read.
pub const READ_TIMEOUT_MS: u64 = 5_000;

/// How long one response write may block on a client that is not reading.
pub const WRITE_TIMEOUT_MS: u64 = 30_000;

pub const DEFAULT_DOCUMENT: &str = "index.html";

pub const NOT_FOUND_DOCUMENT: &str = "notFound.html";

/// Per-user data directory subfolder holding the default root.
pub const APP_DIR: &str = "StaticFileServer-1.0";

pub const STATIC_DIR: &str = "static";
