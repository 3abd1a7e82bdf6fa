//! `HttpExchange` — HTTP/1.1 over a `TcpStream`, one request per
//! connection.
//!
//! The request head is read by the worker that owns the exchange, never by
//! the accept thread. A head that is malformed, larger than
//! `MAX_HEAD_BYTES`, or not complete before the head deadline still yields
//! an exchange, just one without a path; the router answers it with 400.
//! The deadline covers the whole head, so trickling bytes does not extend
//! it.
//!
//! Every response carries `Connection: close`.

use sfs_core::exchange::Exchange;
use sfs_core::response::ResponseInfo;

use std::io::{self, BufWriter, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::time::{Duration, Instant};

/// Upper bound on the request line plus headers.
pub const MAX_HEAD_BYTES: usize = 8 * 1024;

const SERVER_NAME: &str = "sfs-httpd";
const HEAD_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Parsed request line and headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHead {
    pub method: String,
    pub target: String,
    pub version: String,
    pub headers: Vec<(String, String)>,
}

impl RequestHead {
    /// Path component of the target: absolute-form authority removed,
    /// query and fragment dropped. Still percent-encoded.
    pub fn path(&self) -> &str {
        let mut target = self.target.as_str();
        for scheme in ["http://", "https://"] {
            if let Some(rest) = strip_prefix_ignore_case(target, scheme) {
                target = rest.find('/').map_or("/", |i| &rest[i..]);
                break;
            }
        }
        let end = target.find(['?', '#']).unwrap_or(target.len());
        &target[..end]
    }

    /// First header named `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}

/// Parse `"GET /path HTTP/1.1\r\nName: value\r\n\r\n"`.
///
/// Anything after the blank line is ignored. Returns `None` for a head
/// that is not valid HTTP/1.x.
pub fn parse_request_head(buf: &[u8]) -> Option<RequestHead> {
    let end = find_terminator(buf).unwrap_or(buf.len());
    let text = std::str::from_utf8(&buf[..end]).ok()?;
    let mut lines = text.split("\r\n");

    let mut parts = lines.next()?.split(' ');
    let method = parts.next()?;
    let target = parts.next()?;
    let version = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    if method.is_empty() || !method.bytes().all(|b| b.is_ascii_alphabetic()) {
        return None;
    }
    let origin_form = target.starts_with('/');
    let absolute_form = strip_prefix_ignore_case(target, "http://").is_some()
        || strip_prefix_ignore_case(target, "https://").is_some();
    if !origin_form && !absolute_form {
        return None;
    }
    if !version.starts_with("HTTP/1.") {
        return None;
    }

    let mut headers = Vec::new();
    for line in lines.filter(|l| !l.is_empty()) {
        let (name, value) = line.split_once(':')?;
        if name.is_empty() || name.contains(' ') {
            return None;
        }
        headers.push((name.to_string(), value.trim().to_string()));
    }

    Some(RequestHead {
        method: method.to_string(),
        target: target.to_string(),
        version: version.to_string(),
        headers,
    })
}

fn find_terminator(buf: &[u8]) -> Option<usize> {
    buf.windows(HEAD_TERMINATOR.len())
        .position(|w| w == HEAD_TERMINATOR)
}

fn is_textual(content_type: &str) -> bool {
    content_type.starts_with("text/")
        || content_type == "application/javascript"
        || content_type == "application/json"
        || content_type == "application/xml"
        || content_type.ends_with("+xml")
}

/// Status line and headers for `info`, ending with the blank line.
pub fn encode_head(info: &ResponseInfo, chunked: bool) -> String {
    let status = info.status();
    let mut head = format!(
        "HTTP/1.1 {} {}\r\nServer: {}\r\nConnection: close\r\n",
        status.code(),
        status.reason(),
        SERVER_NAME
    );
    if let Some(ct) = info.content_type() {
        if is_textual(ct) && !ct.contains("charset=") {
            head.push_str(&format!("Content-Type: {}; charset={}\r\n", ct, info.encoding()));
        } else {
            head.push_str(&format!("Content-Type: {}\r\n", ct));
        }
    }
    if !chunked && status.allows_body() {
        head.push_str(&format!("Content-Length: {}\r\n", info.content_length()));
    }
    head.push_str("\r\n");
    head
}

pub struct HttpExchange {
    head: Option<RequestHead>,
    out: BufWriter<TcpStream>,
    head_written: bool,
}

/// Socket time limits for one exchange. A zero duration means no limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeTimeouts {
    /// Deadline for the whole request head, however it is split into
    /// reads.
    pub head: Duration,
    /// Limit on each blocking write of the response.
    pub write: Duration,
}

impl ExchangeTimeouts {
    pub fn new(head: Duration, write: Duration) -> Self {
        Self { head, write }
    }
}

fn non_zero(d: Duration) -> Option<Duration> {
    (!d.is_zero()).then_some(d)
}

impl HttpExchange {
    /// Read the request head from `stream`.
    ///
    /// Only socket setup failures are errors. An unreadable head produces
    /// an exchange whose `path()` is `None`. A client that stops reading
    /// the response fails the write after `timeouts.write`.
    pub fn read_from(mut stream: TcpStream, timeouts: ExchangeTimeouts) -> io::Result<Self> {
        stream.set_nodelay(true)?;
        stream.set_write_timeout(non_zero(timeouts.write))?;

        let deadline = non_zero(timeouts.head).map(|t| Instant::now() + t);
        let head = read_head(&mut stream, deadline).and_then(|buf| parse_request_head(&buf));
        Ok(Self {
            head,
            out: BufWriter::new(stream),
            head_written: false,
        })
    }

    pub fn request_head(&self) -> Option<&RequestHead> {
        self.head.as_ref()
    }
}

/// Bytes up to and including the blank line, or `None` on EOF, reset, an
/// oversized head, or `deadline` passing first.
fn read_head(stream: &mut TcpStream, deadline: Option<Instant>) -> Option<Vec<u8>> {
    let mut buf = vec![0u8; MAX_HEAD_BYTES];
    let mut pos = 0usize;
    loop {
        if pos == buf.len() {
            return None;
        }
        // Each read may only wait for what is left of the deadline.
        if let Some(deadline) = deadline {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return None;
            }
            stream.set_read_timeout(Some(remaining)).ok()?;
        }
        match stream.read(&mut buf[pos..]) {
            Ok(0) => return None,
            Ok(n) => {
                // Terminator may straddle two reads.
                let scan_from = pos.saturating_sub(HEAD_TERMINATOR.len() - 1);
                pos += n;
                if let Some(p) = find_terminator(&buf[scan_from..pos]) {
                    buf.truncate(scan_from + p + HEAD_TERMINATOR.len());
                    return Some(buf);
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(_) => return None,
        }
    }
}

impl Exchange for HttpExchange {
    fn method(&self) -> Option<&str> {
        self.head.as_ref().map(|h| h.method.as_str())
    }

    fn path(&self) -> Option<&str> {
        self.head.as_ref().map(RequestHead::path)
    }

    fn head_written(&self) -> bool {
        self.head_written
    }

    fn write_head(&mut self, info: &ResponseInfo) -> io::Result<()> {
        // Mark first: a failed write has still committed whatever reached
        // the socket.
        self.head_written = true;
        let head = encode_head(info, self.send_chunked());
        self.out.write_all(head.as_bytes())
    }

    fn body(&mut self) -> &mut dyn Write {
        &mut self.out
    }

    fn close(mut self: Box<Self>) -> io::Result<()> {
        self.out.flush()?;
        match self.out.get_ref().shutdown(Shutdown::Write) {
            Err(e) if e.kind() != io::ErrorKind::NotConnected => Err(e),
            _ => Ok(()),
        }
    }
}
