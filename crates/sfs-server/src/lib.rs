//! # sfs-server — Static file server lifecycle
//!
//! Owns the listener, the dispatch queue and the worker pool, and wires
//! the `sfs-module` defaults together.
//!
//! ## Architecture
//!
//! ```text
//! accept thread ──enqueue──► DispatchQueue ──dequeue──► N workers
//!   (run())                   (Mutex+Condvar)            read head → RequestRouter
//!                                                              │
//!                                       /shutdown ◄────────────┴──► FileResponder
//!                                           │
//!                                    ShutdownHandle: close queue, wake accept
//! ```
//!
//! ## Shutdown
//!
//! 1. `ShutdownHandle::shutdown()` closes the queue (idempotent).
//! 2. It then connects to the listener once so a blocked `accept()`
//!    returns and the accept loop sees the closed queue.
//! 3. Workers finish what is queued and exit; `run()` joins them and
//!    returns. The listener is dropped, so later connects are refused.

pub mod accept;
pub mod config;
mod platform;

pub use config::{ListenHost, ListenPrefix, ServerConfig};

use accept::AcceptAction;
use sfs_core::error::{ConfigError, Result, ServeError};
use sfs_core::event::{EventSink, ServerEvent};
use sfs_core::ShutdownHandler;
use sfs_module::{
    DispatchQueue, ExchangeTimeouts, FileResponder, FixedPool, HttpExchange, MimeGuessResolver,
    RequestRouter, ResponderConfig, ResponseWriter, StreamCopier,
};

use std::fs;
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// How long the wake-up connect may take before it is abandoned.
const WAKE_CONNECT_TIMEOUT: Duration = Duration::from_secs(1);

/// A bound, not yet running server.
pub struct Server {
    config: ServerConfig,
    prefix: ListenPrefix,
    listener: TcpListener,
    local_addr: SocketAddr,
    queue: Arc<DispatchQueue<TcpStream>>,
    events: Arc<dyn EventSink>,
}

impl Server {
    /// Validate `config`, create the root directory if needed and bind the
    /// listener.
    pub fn bind(config: ServerConfig, events: Arc<dyn EventSink>) -> Result<Self> {
        let prefix = config.validate()?;

        fs::create_dir_all(&config.root_dir).map_err(|source| ConfigError::CreateDirectory {
            path: config.root_dir.clone(),
            source,
        })?;

        let bind_err = |source| ServeError::Bind {
            addr: prefix.to_string(),
            source,
        };
        let addrs = prefix.socket_addrs().map_err(bind_err)?;
        let listener = TcpListener::bind(&addrs[..]).map_err(bind_err)?;
        let local_addr = listener.local_addr()?;

        Ok(Self {
            config,
            prefix,
            listener,
            local_addr,
            queue: Arc::new(DispatchQueue::new()),
            events,
        })
    }

    /// Actual bound address (resolves port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn prefix(&self) -> &ListenPrefix {
        &self.prefix
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Handle that stops this server from any thread.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            queue: Arc::clone(&self.queue),
            wake_addr: wake_addr(self.local_addr),
        }
    }

    /// Start the workers and accept until shut down.
    ///
    /// Returns once every worker has exited. A fatal accept error stops
    /// the server the same way `/shutdown` does and is returned.
    pub fn run(self) -> Result<()> {
        let Server {
            config,
            prefix,
            listener,
            local_addr: _,
            queue,
            events,
        } = self;

        let shutdown: Arc<dyn ShutdownHandler> = Arc::new(ShutdownHandle {
            queue: Arc::clone(&queue),
            wake_addr: wake_addr(listener.local_addr()?),
        });
        let copier = Arc::new(StreamCopier::with_chunk_size(
            config.chunk_size,
            config.num_workers,
        ));
        let responder = FileResponder::new(
            ResponderConfig {
                root: config.root_dir.clone(),
                default_document: config.default_document.clone(),
                not_found_document: config.not_found_document.clone(),
            },
            Arc::new(MimeGuessResolver),
            copier,
            Arc::clone(&events),
        )?;
        let router = RequestRouter::new(
            responder,
            ResponseWriter::new(Arc::clone(&events)),
            shutdown,
            &prefix.base_path,
            Arc::clone(&events),
        );

        events.emit(ServerEvent::Listening {
            prefix: prefix.to_string(),
            root: config.root_dir.clone(),
            workers: config.num_workers,
        });

        let timeouts = ExchangeTimeouts::new(config.read_timeout, config.write_timeout);
        let handler_events = Arc::clone(&events);
        let pool = FixedPool::start(
            config.num_workers,
            Arc::clone(&queue),
            Arc::clone(&events),
            move |_worker, stream: TcpStream| match HttpExchange::read_from(stream, timeouts) {
                // The router finalizes and reports every outcome itself.
                Ok(exchange) => {
                    let _ = router.route(Box::new(exchange));
                }
                Err(e) => handler_events.emit(ServerEvent::ExchangeFailed {
                    kind: "transport",
                    message: format!("preparing connection: {}", e),
                }),
            },
        )?;

        let accept = || listener.accept().map(|(stream, _peer)| stream);
        let outcome = accept_loop(accept, &queue, &*events);

        let in_flight = pool.busy_workers();
        let workers = pool.total_workers();
        pool.stop();
        pool.join();
        drop(listener);

        events.emit(ServerEvent::Stopped {
            enqueued: queue.enqueued_count(),
            dequeued: queue.dequeued_count(),
            workers,
            in_flight,
        });
        outcome
    }
}

/// Accept and enqueue until the queue is closed or accept fails fatally.
///
/// `accept` blocks for the next connection; transient failures are
/// reported and retried.
fn accept_loop<S>(
    mut accept: impl FnMut() -> io::Result<S>,
    queue: &DispatchQueue<S>,
    events: &dyn EventSink,
) -> Result<()> {
    while queue.is_running() {
        match accept() {
            Ok(stream) => {
                // Closed between accept and enqueue: this is the wake-up
                // connect or a client that lost the race. Drop it.
                if queue.enqueue(stream).is_err() {
                    break;
                }
            }
            Err(e) => match accept::classify(&e) {
                AcceptAction::Retry => events.emit(ServerEvent::AcceptFailed {
                    transient: true,
                    message: e.to_string(),
                }),
                AcceptAction::Backoff(pause) => {
                    events.emit(ServerEvent::AcceptFailed {
                        transient: true,
                        message: e.to_string(),
                    });
                    thread::sleep(pause);
                }
                AcceptAction::Fatal => {
                    events.emit(ServerEvent::AcceptFailed {
                        transient: false,
                        message: e.to_string(),
                    });
                    return Err(ServeError::Accept(e));
                }
            },
        }
    }
    Ok(())
}

/// Where to connect to wake a blocked `accept()` on `bound`.
fn wake_addr(bound: SocketAddr) -> SocketAddr {
    let ip = match bound.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
        IpAddr::V6(ip) if ip.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
        ip => ip,
    };
    SocketAddr::new(ip, bound.port())
}

/// Stops a running `Server`. Cheap to clone; every clone stops the same
/// server.
#[derive(Clone)]
pub struct ShutdownHandle {
    queue: Arc<DispatchQueue<TcpStream>>,
    wake_addr: SocketAddr,
}

impl ShutdownHandle {
    /// Flip the running-state and wake the accept loop.
    ///
    /// Never waits for in-flight exchanges. Returns `true` only for the
    /// call that actually stopped the server.
    pub fn shutdown(&self) -> bool {
        let first = self.queue.close();
        if first {
            // Refused or timed out means accept is not blocked any more.
            let _ = TcpStream::connect_timeout(&self.wake_addr, WAKE_CONNECT_TIMEOUT);
        }
        first
    }

    pub fn is_running(&self) -> bool {
        self.queue.is_running()
    }
}

impl ShutdownHandler for ShutdownHandle {
    fn request_shutdown(&self) -> bool {
        self.shutdown()
    }
}
