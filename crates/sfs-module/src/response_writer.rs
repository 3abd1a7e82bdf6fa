//! `ResponseWriter` — the single point where an exchange is completed.
//!
//! `finalize()` takes the exchange by value, so an exchange can be
//! finalized at most once and nothing touches it afterwards.

use sfs_core::event::{EventSink, ServerEvent};
use sfs_core::exchange::Exchange;
use sfs_core::response::ResponseInfo;

use std::sync::Arc;

pub struct ResponseWriter {
    events: Arc<dyn EventSink>,
}

impl ResponseWriter {
    pub fn new(events: Arc<dyn EventSink>) -> Self {
        Self { events }
    }

    /// Apply `info` (unless the head is already on the wire), close the
    /// exchange and report the outcome.
    ///
    /// Failures here are reported, never returned: by this point there is
    /// nobody left to hand them to.
    pub fn finalize(&self, mut exchange: Box<dyn Exchange>, info: &ResponseInfo) {
        if !exchange.head_written() {
            if let Err(e) = exchange.write_head(info) {
                self.events.emit(ServerEvent::ExchangeFailed {
                    kind: "transport",
                    message: format!("writing response head: {}", e),
                });
            }
        }

        if let Err(e) = exchange.close() {
            self.events.emit(ServerEvent::ExchangeFailed {
                kind: "transport",
                message: format!("closing exchange: {}", e),
            });
        }

        self.events.emit(ServerEvent::Responded {
            status: info.status().code(),
            content_type: info.content_type().map(str::to_string),
            content_length: info.content_length(),
        });
    }
}
