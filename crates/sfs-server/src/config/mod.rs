//! Server configuration
//!
//! Provides compile-time defaults with runtime environment overrides.
//!
//! # Configuration Priority (highest wins)
//!
//! 1. Builder calls (command line)
//! 2. Environment variables
//! 3. Library defaults
//!
//! # Example
//!
//! ```rust,ignore
//! use sfs_server::config::ServerConfig;
//!
//! let config = ServerConfig::from_env()
//!     .url("http://localhost:9000/site")
//!     .root_dir("/srv/www")
//!     .num_workers(8);
//! let prefix = config.validate()?;
//! ```

pub mod defaults;

use crate::platform;
use sfs_core::env::{env_get, env_get_opt};
use sfs_core::error::ConfigError;

use std::fmt;
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs};
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration with builder pattern.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listener prefix, e.g. `http://+:8080/`. Always ends with `/` once
    /// set through the builder.
    pub url: String,
    /// Directory files are served from. Created if absent.
    pub root_dir: PathBuf,
    /// Worker threads, fixed for the server's lifetime.
    pub num_workers: usize,
    /// Bytes per copy chunk.
    pub chunk_size: usize,
    /// Deadline for the whole request head, however slowly it arrives.
    /// Zero disables it.
    pub read_timeout: Duration,
    /// Limit on each blocking response write. Zero disables it.
    pub write_timeout: Duration,
    /// Served for an empty request path.
    pub default_document: String,
    /// Body of every 404.
    pub not_found_document: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl ServerConfig {
    /// Create config from defaults with environment overrides.
    ///
    /// Environment variables (all optional):
    /// - `SFS_URL` - Listener prefix
    /// - `SFS_DIR` - Root directory
    /// - `SFS_WORKERS` - Number of worker threads
    /// - `SFS_CHUNK_SIZE` - Copy chunk size in bytes
    /// - `SFS_READ_TIMEOUT_MS` - Request head deadline in milliseconds
    /// - `SFS_WRITE_TIMEOUT_MS` - Response write timeout in milliseconds
    pub fn from_env() -> Self {
        let defaults = Self::new();
        let url = env_get_opt::<String>("SFS_URL")
            .map(|u| with_trailing_slash(&u))
            .unwrap_or(defaults.url);
        Self {
            url,
            root_dir: env_get_opt("SFS_DIR").unwrap_or(defaults.root_dir),
            num_workers: env_get("SFS_WORKERS", defaults::NUM_WORKERS),
            chunk_size: env_get("SFS_CHUNK_SIZE", defaults::CHUNK_SIZE),
            read_timeout: Duration::from_millis(env_get(
                "SFS_READ_TIMEOUT_MS",
                defaults::READ_TIMEOUT_MS,
            )),
            write_timeout: Duration::from_millis(env_get(
                "SFS_WRITE_TIMEOUT_MS",
                defaults::WRITE_TIMEOUT_MS,
            )),
            ..defaults
        }
    }

    /// Create config with library defaults only (no env override).
    pub fn new() -> Self {
        Self {
            url: defaults::URL.to_string(),
            root_dir: default_root_dir(),
            num_workers: defaults::NUM_WORKERS,
            chunk_size: defaults::CHUNK_SIZE,
            read_timeout: Duration::from_millis(defaults::READ_TIMEOUT_MS),
            write_timeout: Duration::from_millis(defaults::WRITE_TIMEOUT_MS),
            default_document: defaults::DEFAULT_DOCUMENT.to_string(),
            not_found_document: defaults::NOT_FOUND_DOCUMENT.to_string(),
        }
    }

    // Builder methods

    /// Appends `/` when missing.
    pub fn url(mut self, url: impl AsRef<str>) -> Self {
        self.url = with_trailing_slash(url.as_ref());
        self
    }

    pub fn root_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.root_dir = dir.into();
        self
    }

    pub fn num_workers(mut self, n: usize) -> Self {
        self.num_workers = n;
        self
    }

    pub fn chunk_size(mut self, bytes: usize) -> Self {
        self.chunk_size = bytes;
        self
    }

    pub fn read_timeout(mut self, d: Duration) -> Self {
        self.read_timeout = d;
        self
    }

    pub fn write_timeout(mut self, d: Duration) -> Self {
        self.write_timeout = d;
        self
    }

    pub fn default_document(mut self, name: impl Into<String>) -> Self {
        self.default_document = name.into();
        self
    }

    pub fn not_found_document(mut self, name: impl Into<String>) -> Self {
        self.not_found_document = name.into();
        self
    }

    /// Validate configuration and parse the listener prefix.
    pub fn validate(&self) -> Result<ListenPrefix, ConfigError> {
        if self.url.trim().trim_end_matches('/').is_empty() {
            return Err(ConfigError::EmptyUrl);
        }
        if self.root_dir.to_string_lossy().trim().is_empty() {
            return Err(ConfigError::EmptyDirectory);
        }
        if self.num_workers == 0 {
            return Err(ConfigError::InvalidValue("num_workers must be > 0"));
        }
        if self.num_workers > defaults::MAX_WORKERS {
            return Err(ConfigError::InvalidValue("num_workers must be <= 1024"));
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::InvalidValue("chunk_size must be > 0"));
        }
        if self.default_document.trim().is_empty() {
            return Err(ConfigError::InvalidValue("default_document must not be empty"));
        }
        if self.not_found_document.trim().is_empty() {
            return Err(ConfigError::InvalidValue("not_found_document must not be empty"));
        }
        ListenPrefix::parse(&self.url)
    }

    /// Print configuration (for debugging)
    pub fn print(&self) {
        eprintln!("Static File Server Configuration:");
        eprintln!("  url:                 {}", self.url);
        eprintln!("  root_dir:            {}", self.root_dir.display());
        eprintln!("  num_workers:         {}", self.num_workers);
        eprintln!("  chunk_size:          {}", self.chunk_size);
        eprintln!("  read_timeout:        {:?}", self.read_timeout);
        eprintln!("  write_timeout:       {:?}", self.write_timeout);
        eprintln!("  default_document:    {}", self.default_document);
        eprintln!("  not_found_document:  {}", self.not_found_document);
    }
}

fn with_trailing_slash(url: &str) -> String {
    let url = url.trim();
    if url.is_empty() || url.ends_with('/') {
        url.to_string()
    } else {
        format!("{}/", url)
    }
}

/// `<user data dir>/StaticFileServer-1.0/static`, or a relative
/// `StaticFileServer-1.0/static` when the platform has none.
pub fn default_root_dir() -> PathBuf {
    platform::user_data_dir()
        .unwrap_or_default()
        .join(defaults::APP_DIR)
        .join(defaults::STATIC_DIR)
}

/// Which interface the listener binds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenHost {
    /// `+`, `*` or empty: every interface.
    Any,
    /// `localhost`.
    Loopback,
    Ip(IpAddr),
    /// Resolved at bind time.
    Name(String),
}

/// A parsed `http://host:port/base/` listener prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenPrefix {
    pub host: ListenHost,
    pub port: u16,
    /// Starts and ends with `/`.
    pub base_path: String,
}

impl ListenPrefix {
    pub fn parse(url: &str) -> Result<Self, ConfigError> {
        let url = url.trim();
        let invalid = |reason| ConfigError::InvalidUrl {
            url: url.to_string(),
            reason,
        };

        let has_scheme = |scheme: &str| {
            url.get(..scheme.len())
                .map_or(false, |s| s.eq_ignore_ascii_case(scheme))
        };
        if has_scheme("https://") {
            return Err(invalid("https is not supported"));
        }
        if !has_scheme("http://") {
            return Err(invalid("scheme must be http://"));
        }
        let rest = &url["http://".len()..];

        let (authority, path) = match rest.find('/') {
            Some(i) => (&rest[..i], &rest[i..]),
            None => (rest, "/"),
        };
        if path.contains(['?', '#']) {
            return Err(invalid("prefix must not carry a query or fragment"));
        }

        let (host, port) = split_host_port(authority).ok_or_else(|| invalid("malformed host"))?;
        let port = match port {
            None => 80,
            Some(p) => p.parse::<u16>().map_err(|_| invalid("invalid port"))?,
        };

        let host = match host {
            "" | "+" | "*" => ListenHost::Any,
            h if h.eq_ignore_ascii_case("localhost") => ListenHost::Loopback,
            h => match h.parse::<IpAddr>() {
                Ok(ip) => ListenHost::Ip(ip),
                Err(_) => ListenHost::Name(h.to_string()),
            },
        };

        let base_path = if path.ends_with('/') {
            path.to_string()
        } else {
            format!("{}/", path)
        };

        Ok(Self { host, port, base_path })
    }

    /// Addresses to try, in order.
    pub fn socket_addrs(&self) -> io::Result<Vec<SocketAddr>> {
        let ip = match &self.host {
            ListenHost::Any => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            ListenHost::Loopback => IpAddr::V4(Ipv4Addr::LOCALHOST),
            ListenHost::Ip(ip) => *ip,
            ListenHost::Name(name) => {
                return Ok((name.as_str(), self.port).to_socket_addrs()?.collect());
            }
        };
        Ok(vec![SocketAddr::new(ip, self.port)])
    }
}

impl fmt::Display for ListenPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let host = match &self.host {
            ListenHost::Any => "+".to_string(),
            ListenHost::Loopback => "localhost".to_string(),
            ListenHost::Ip(IpAddr::V6(ip)) => format!("[{}]", ip),
            ListenHost::Ip(ip) => ip.to_string(),
            ListenHost::Name(name) => name.clone(),
        };
        write!(f, "http://{}:{}{}", host, self.port, self.base_path)
    }
}

/// `host[:port]` or `[v6][:port]`.
fn split_host_port(authority: &str) -> Option<(&str, Option<&str>)> {
    if let Some(rest) = authority.strip_prefix('[') {
        let (host, after) = rest.split_once(']')?;
        host.parse::<Ipv6Addr>().ok()?;
        return match after {
            "" => Some((host, None)),
            a => Some((host, Some(a.strip_prefix(':')?))),
        };
    }
    if authority.contains('@') {
        return None;
    }
    match authority.split_once(':') {
        Some((host, port)) => Some((host, Some(port))),
        None => Some((authority, None)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_defaults() {
        let config = ServerConfig::new();
        assert_eq!(config.url, "http://+:8080/");
        assert_eq!(config.num_workers, 20);
        assert_eq!(config.chunk_size, 8192);
        assert!(config.root_dir.ends_with("StaticFileServer-1.0/static"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = ServerConfig::new()
            .url("http://localhost:9000")
            .root_dir("/srv/www")
            .num_workers(4)
            .read_timeout(Duration::from_millis(250))
            .write_timeout(Duration::from_secs(2));

        assert_eq!(config.url, "http://localhost:9000/");
        assert_eq!(config.root_dir, PathBuf::from("/srv/www"));
        assert_eq!(config.num_workers, 4);
        assert_eq!(config.read_timeout, Duration::from_millis(250));
        assert_eq!(config.write_timeout, Duration::from_secs(2));
        assert_eq!(ServerConfig::new().write_timeout, Duration::from_millis(defaults::WRITE_TIMEOUT_MS));
    }

    #[test]
    fn test_validation() {
        assert!(matches!(ServerConfig::new().url("   ").validate(), Err(ConfigError::EmptyUrl)));
        assert!(matches!(ServerConfig::new().root_dir(" ").validate(), Err(ConfigError::EmptyDirectory)));
        assert!(matches!(
            ServerConfig::new().num_workers(0).validate(),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(ServerConfig::new().num_workers(5000).validate().is_err());
        assert!(ServerConfig::new().chunk_size(0).validate().is_err());
        assert!(matches!(
            ServerConfig::new().url("ftp://host/").validate(),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_from_env_overrides() {
        std::env::set_var("SFS_WORKERS", "3");
        std::env::set_var("SFS_URL", "http://127.0.0.1:0/files");
        std::env::set_var("SFS_WRITE_TIMEOUT_MS", "1500");
        let config = ServerConfig::from_env();
        std::env::remove_var("SFS_WORKERS");
        std::env::remove_var("SFS_URL");
        std::env::remove_var("SFS_WRITE_TIMEOUT_MS");

        assert_eq!(config.num_workers, 3);
        assert_eq!(config.url, "http://127.0.0.1:0/files/");
        assert_eq!(config.write_timeout, Duration::from_millis(1500));
    }

    #[test]
    fn test_prefix_wildcards() {
        for url in ["http://+:8080/", "http://*:8080/", "http://:8080/"] {
            let p = ListenPrefix::parse(url).unwrap();
            assert_eq!(p.host, ListenHost::Any);
            assert_eq!(p.port, 8080);
            assert_eq!(p.base_path, "/");
        }
    }

    #[test]
    fn test_prefix_hosts_and_ports() {
        let p = ListenPrefix::parse("HTTP://localhost/app").unwrap();
        assert_eq!(p.host, ListenHost::Loopback);
        assert_eq!(p.port, 80);
        assert_eq!(p.base_path, "/app/");
        assert_eq!(p.to_string(), "http://localhost:80/app/");

        let p = ListenPrefix::parse("http://127.0.0.1:0/").unwrap();
        assert_eq!(p.host, ListenHost::Ip(IpAddr::V4(Ipv4Addr::LOCALHOST)));
        assert_eq!(p.socket_addrs().unwrap(), vec!["127.0.0.1:0".parse().unwrap()]);

        let p = ListenPrefix::parse("http://[::1]:8443/x/y/").unwrap();
        assert_eq!(p.host, ListenHost::Ip("::1".parse().unwrap()));
        assert_eq!(p.port, 8443);
        assert_eq!(p.base_path, "/x/y/");

        let p = ListenPrefix::parse("http://example.test:81/").unwrap();
        assert_eq!(p.host, ListenHost::Name("example.test".into()));
    }

    #[test]
    fn test_prefix_rejects() {
        for url in [
            "https://+:8080/",
            "+:8080/",
            "http://host:notaport/",
            "http://host:70000/",
            "http://[::1/",
            "http://user@host/",
            "http://host/?q=1",
        ] {
            assert!(ListenPrefix::parse(url).is_err(), "{}", url);
        }
    }
}
