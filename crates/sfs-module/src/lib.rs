//! # sfs-module — Default implementations
//!
//! This crate provides the default implementation for every `sfs-core`
//! seam plus the dispatch machinery the server is built from.
//! Each impl prioritizes correctness and simplicity over performance.
//!
//! ## Default stack
//!
//! | Piece               | Default Impl        | Notes                          |
//! |---------------------|---------------------|--------------------------------|
//! | Dispatch queue      | DispatchQueue       | Mutex<VecDeque> + Condvar      |
//! | Worker pool         | FixedPool           | N OS threads, fixed at start   |
//! | Stream copier       | StreamCopier        | pooled chunk buffers           |
//! | Response writer     | ResponseWriter      | single finalization point      |
//! | File responder      | FileResponder       | root containment enforced      |
//! | Router              | RequestRouter       | `/shutdown` vs. files          |
//! | Exchange            | HttpExchange        | HTTP/1.1, one request per conn |
//! | ContentTypeResolver | MimeGuessResolver   | `mime_guess` table             |
//! | EventSink           | ConsoleSink         | MemorySink for tests           |

pub mod dispatch_queue;
pub mod fixed_pool;
pub mod chunk_buffers;
pub mod stream_copy;
pub mod response_writer;
pub mod file_responder;
pub mod router;
pub mod http_exchange;
pub mod mime_resolver;
pub mod sinks;

pub use dispatch_queue::DispatchQueue;
pub use fixed_pool::{FixedPool, WorkerId};
pub use chunk_buffers::ChunkBuffers;
pub use stream_copy::{copy_exact, StreamCopier};
pub use response_writer::ResponseWriter;
pub use file_responder::{resolve_candidate, FileResponder, ResponderConfig};
pub use router::RequestRouter;
pub use http_exchange::{parse_request_head, ExchangeTimeouts, HttpExchange, RequestHead};
pub use mime_resolver::MimeGuessResolver;
pub use sinks::{ConsoleSink, MemorySink, NullSink};
