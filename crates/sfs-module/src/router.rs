//! `RequestRouter` — decides what an exchange is for.
//!
//! ```text
//! no path            → 400, InvalidContext
//! outside base path  → 404, empty body
//! <base>shutdown     → ShutdownHandler, 204
//! anything else      → FileResponder
//! ```
//!
//! Every branch ends in exactly one `ResponseWriter::finalize()`.

use crate::file_responder::FileResponder;
use crate::response_writer::ResponseWriter;
use sfs_core::error::{Result, ServeError};
use sfs_core::event::{EventSink, ServerEvent};
use sfs_core::exchange::Exchange;
use sfs_core::response::{ResponseInfo, StatusCode};
use sfs_core::ShutdownHandler;

use std::sync::Arc;

const SHUTDOWN_PATH: &str = "shutdown";

pub struct RequestRouter {
    responder: FileResponder,
    writer: ResponseWriter,
    shutdown: Arc<dyn ShutdownHandler>,
    /// Always starts and ends with `/`.
    base_path: String,
    events: Arc<dyn EventSink>,
}

impl RequestRouter {
    pub fn new(
        responder: FileResponder,
        writer: ResponseWriter,
        shutdown: Arc<dyn ShutdownHandler>,
        base_path: &str,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            responder,
            writer,
            shutdown,
            base_path: normalize_base_path(base_path),
            events,
        }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Handle one exchange to completion.
    ///
    /// The exchange is always finalized. The returned error only tells the
    /// caller why it ended badly; it never needs handling beyond logging.
    pub fn route(&self, mut exchange: Box<dyn Exchange>) -> Result<()> {
        let path = match exchange.path().map(str::to_string) {
            Some(p) => p,
            None => {
                self.writer
                    .finalize(exchange, &ResponseInfo::empty(StatusCode::BadRequest));
                let err = ServeError::InvalidContext("request has no path");
                self.report(&err);
                return Err(err);
            }
        };

        self.events.emit(ServerEvent::Request {
            method: exchange.method().unwrap_or("").to_string(),
            path: path.clone(),
        });

        let relative = match strip_base_path(&path, &self.base_path) {
            Some(rel) => rel,
            None => {
                self.writer
                    .finalize(exchange, &ResponseInfo::empty(StatusCode::NotFound));
                return Ok(());
            }
        };

        if relative.eq_ignore_ascii_case(SHUTDOWN_PATH) {
            let first = self.shutdown.request_shutdown();
            self.events.emit(ServerEvent::ShutdownRequested { first });
            self.writer
                .finalize(exchange, &ResponseInfo::empty(StatusCode::NoContent));
            return Ok(());
        }

        match self.responder.respond(exchange.as_mut(), relative) {
            Ok(info) => {
                self.writer.finalize(exchange, &info);
                Ok(())
            }
            Err(err) => {
                self.report(&err);
                self.writer
                    .finalize(exchange, &ResponseInfo::empty(err.status()));
                Err(err)
            }
        }
    }

    fn report(&self, err: &ServeError) {
        self.events.emit(ServerEvent::ExchangeFailed {
            kind: err.kind(),
            message: err.to_string(),
        });
    }
}

fn normalize_base_path(base: &str) -> String {
    let trimmed = base.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", trimmed)
    }
}

/// `path` relative to `base` (no leading `/`), or `None` if it lies
/// outside. The base itself without its trailing slash counts as inside.
fn strip_base_path<'a>(path: &'a str, base: &str) -> Option<&'a str> {
    if let Some(rest) = path.strip_prefix(base) {
        return Some(rest);
    }
    let bare = base.trim_end_matches('/');
    (path == bare).then_some("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mime_resolver::MimeGuessResolver;
    use crate::response_writer::testing::MockExchange;
    use crate::sinks::MemorySink;
    use crate::stream_copy::StreamCopier;
    use crate::file_responder::ResponderConfig;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    #[derive(Default)]
    struct CountingShutdown {
        calls: AtomicUsize,
    }

    impl ShutdownHandler for CountingShutdown {
        fn request_shutdown(&self) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst) == 0
        }
    }

    struct Fixture {
        dir: TempDir,
        router: RequestRouter,
        sink: Arc<MemorySink>,
        shutdown: Arc<CountingShutdown>,
    }

    fn fixture(base: &str) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let sink = Arc::new(MemorySink::new());
        let shutdown = Arc::new(CountingShutdown::default());
        let responder = FileResponder::new(
            ResponderConfig::new(dir.path()),
            Arc::new(MimeGuessResolver),
            Arc::new(StreamCopier::default()),
            sink.clone(),
        )
        .unwrap();
        let router = RequestRouter::new(
            responder,
            ResponseWriter::new(sink.clone()),
            shutdown.clone(),
            base,
            sink.clone(),
        );
        Fixture { dir, router, sink, shutdown }
    }

    fn route(f: &Fixture, ex: MockExchange) -> (Result<()>, Vec<u8>, usize) {
        let record = Arc::clone(&ex.record);
        let res = f.router.route(Box::new(ex));
        let rec = record.lock().unwrap();
        (res, rec.body.clone(), rec.closed)
    }

    #[test]
    fn test_base_path_helpers() {
        assert_eq!(normalize_base_path(""), "/");
        assert_eq!(normalize_base_path("/"), "/");
        assert_eq!(normalize_base_path("static"), "/static/");
        assert_eq!(normalize_base_path("/static/"), "/static/");

        assert_eq!(strip_base_path("/a.txt", "/"), Some("a.txt"));
        assert_eq!(strip_base_path("/static/a.txt", "/static/"), Some("a.txt"));
        assert_eq!(strip_base_path("/static", "/static/"), Some(""));
        assert_eq!(strip_base_path("/other/a.txt", "/static/"), None);
    }

    #[test]
    fn test_shutdown_is_case_insensitive_and_idempotent() {
        let f = fixture("/");
        for path in ["/shutdown", "/SHUTDOWN", "/ShutDown"] {
            let (res, body, closed) = route(&f, MockExchange::get(path));
            assert!(res.is_ok());
            assert!(body.is_empty());
            assert_eq!(closed, 1);
        }
        assert_eq!(f.shutdown.calls.load(Ordering::SeqCst), 3);
        assert_eq!(f.sink.statuses(), vec![204, 204, 204]);
        assert_eq!(
            f.sink.count(|e| matches!(e, ServerEvent::ShutdownRequested { first: true })),
            1
        );
    }

    #[test]
    fn test_shutdown_prefix_is_not_shutdown() {
        let f = fixture("/");
        let (_, _, closed) = route(&f, MockExchange::get("/shutdown.html"));
        assert_eq!(closed, 1);
        assert_eq!(f.shutdown.calls.load(Ordering::SeqCst), 0);
        assert_eq!(f.sink.statuses(), vec![404]);
    }

    #[test]
    fn test_missing_path_is_invalid_context() {
        let f = fixture("/");
        let (res, _, closed) = route(&f, MockExchange::with(None, None));
        assert!(matches!(res, Err(ServeError::InvalidContext(_))));
        assert_eq!(closed, 1);
        assert_eq!(f.sink.statuses(), vec![400]);
    }

    #[test]
    fn test_serves_file() {
        let f = fixture("/");
        fs::write(f.dir.path().join("hello.txt"), "hi there").unwrap();
        let (res, body, closed) = route(&f, MockExchange::get("/hello.txt"));
        assert!(res.is_ok());
        assert_eq!(body, b"hi there");
        assert_eq!(closed, 1);
        assert_eq!(f.sink.statuses(), vec![200]);
    }

    #[test]
    fn test_base_path_is_stripped() {
        let f = fixture("/static/");
        fs::write(f.dir.path().join("a.txt"), "A").unwrap();

        let (_, body, _) = route(&f, MockExchange::get("/static/a.txt"));
        assert_eq!(body, b"A");

        let (_, body, _) = route(&f, MockExchange::get("/a.txt"));
        assert!(body.is_empty());

        route(&f, MockExchange::get("/static/shutdown"));
        assert_eq!(f.shutdown.calls.load(Ordering::SeqCst), 1);
        assert_eq!(f.sink.statuses(), vec![200, 404, 204]);
    }

    #[test]
    fn test_traversal_is_forbidden() {
        let f = fixture("/");
        let (res, body, closed) = route(&f, MockExchange::get("/..%2f..%2fetc%2fpasswd"));
        assert!(matches!(res, Err(ServeError::OutOfScope(_))));
        assert!(body.is_empty());
        assert_eq!(closed, 1);
        assert_eq!(f.sink.statuses(), vec![403]);
    }

    #[test]
    fn test_transport_failure_is_500() {
        let f = fixture("/");
        fs::write(f.dir.path().join("a.txt"), "abc").unwrap();
        let (res, _, closed) = route(&f, MockExchange::get("/a.txt").failing());
        assert!(matches!(res, Err(ServeError::Transport(_))));
        assert_eq!(closed, 1);
        assert_eq!(f.sink.statuses(), vec![500]);
        assert_eq!(
            f.sink.count(|e| matches!(e, ServerEvent::ExchangeFailed { kind: "transport", .. })),
            2
        );
    }
}
