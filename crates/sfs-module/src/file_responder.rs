//! `FileResponder` — maps a request path to a file under the root
//! directory and streams it.
//!
//! Containment is checked twice: lexically before touching the
//! filesystem (`..` may never climb above the root), and again on the
//! canonical path so a symlink cannot point outside it.

use crate::stream_copy::StreamCopier;
use sfs_core::content_type::ContentTypeResolver;
use sfs_core::error::{Result, ServeError};
use sfs_core::event::{EventSink, ServerEvent};
use sfs_core::exchange::Exchange;
use sfs_core::response::{ResponseInfo, StatusCode};

use std::fs::File;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

pub const DEFAULT_DOCUMENT: &str = "index.html";
pub const NOT_FOUND_DOCUMENT: &str = "notFound.html";

/// Where files come from.
#[derive(Debug, Clone)]
pub struct ResponderConfig {
    pub root: PathBuf,
    /// Served for an empty request path.
    pub default_document: String,
    /// Body of every 404, relative to `root`.
    pub not_found_document: String,
}

impl ResponderConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            default_document: DEFAULT_DOCUMENT.to_string(),
            not_found_document: NOT_FOUND_DOCUMENT.to_string(),
        }
    }
}

/// Join `relative` onto `root` without leaving it.
///
/// Purely lexical: `.` is skipped, `..` pops one level, and a `..` with
/// nothing left to pop, an absolute path, or a drive prefix is
/// `OutOfScope`.
pub fn resolve_candidate(root: &Path, relative: &str) -> Result<PathBuf> {
    let mut out = root.to_path_buf();
    let mut depth = 0usize;
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => {
                out.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            Component::ParentDir if depth > 0 => {
                out.pop();
                depth -= 1;
            }
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(ServeError::OutOfScope(root.join(relative)));
            }
        }
    }
    Ok(out)
}

pub struct FileResponder {
    config: ResponderConfig,
    canonical_root: PathBuf,
    resolver: Arc<dyn ContentTypeResolver>,
    copier: Arc<StreamCopier>,
    events: Arc<dyn EventSink>,
}

impl FileResponder {
    /// The root directory must already exist.
    pub fn new(
        config: ResponderConfig,
        resolver: Arc<dyn ContentTypeResolver>,
        copier: Arc<StreamCopier>,
        events: Arc<dyn EventSink>,
    ) -> Result<Self> {
        let canonical_root = config.root.canonicalize()?;
        Ok(Self {
            config,
            canonical_root,
            resolver,
            copier,
            events,
        })
    }

    pub fn root(&self) -> &Path {
        &self.config.root
    }

    /// Serve `request_path` (percent-encoded, relative to the base path)
    /// on `exchange`.
    ///
    /// On success the head and body are already written and the returned
    /// info describes them; the caller still has to finalize. On error
    /// the head may or may not have been written.
    pub fn respond(&self, exchange: &mut dyn Exchange, request_path: &str) -> Result<ResponseInfo> {
        let decoded = urlencoding::decode(request_path)
            .map_err(|_| ServeError::InvalidContext("request path is not valid UTF-8"))?;
        let relative = match decoded.trim_start_matches('/') {
            "" => self.config.default_document.as_str(),
            rel => rel,
        };

        let candidate = resolve_candidate(&self.config.root, relative)?;
        let head_only = exchange
            .method()
            .map_or(false, |m| m.eq_ignore_ascii_case("HEAD"));

        if !candidate.is_file() {
            return self.respond_not_found(exchange, candidate, head_only);
        }

        let canonical = candidate.canonicalize()?;
        if !canonical.starts_with(&self.canonical_root) {
            return Err(ServeError::OutOfScope(candidate));
        }

        let mut file = File::open(&canonical)?;
        let len = file.metadata()?.len();
        let content_type = self.resolver.resolve_or_default(&candidate);
        let info = ResponseInfo::with_content_type(StatusCode::Ok, content_type, len);

        self.events.emit(ServerEvent::Served { path: candidate });
        self.send(exchange, &info, Some(&mut file), head_only)?;
        Ok(info)
    }

    fn respond_not_found(
        &self,
        exchange: &mut dyn Exchange,
        searched: PathBuf,
        head_only: bool,
    ) -> Result<ResponseInfo> {
        self.events.emit(ServerEvent::NotFound { path: searched });

        let doc_path = self.config.root.join(&self.config.not_found_document);
        let doc = File::open(&doc_path).ok().and_then(|f| {
            let meta = f.metadata().ok()?;
            meta.is_file().then(|| (f, meta.len()))
        });

        match doc {
            Some((mut file, len)) => {
                let content_type = self.resolver.resolve_or_default(&doc_path);
                let info = ResponseInfo::with_content_type(StatusCode::NotFound, content_type, len);
                self.send(exchange, &info, Some(&mut file), head_only)?;
                Ok(info)
            }
            None => {
                let info = ResponseInfo::empty(StatusCode::NotFound);
                self.send(exchange, &info, None, head_only)?;
                Ok(info)
            }
        }
    }

    fn send(
        &self,
        exchange: &mut dyn Exchange,
        info: &ResponseInfo,
        source: Option<&mut File>,
        head_only: bool,
    ) -> Result<()> {
        exchange.write_head(info).map_err(ServeError::Transport)?;
        if let Some(source) = source {
            if !head_only && info.status().allows_body() {
                self.copier.copy(source, info.content_length(), exchange.body())?;
            }
        }
        Ok(())
    }
}
