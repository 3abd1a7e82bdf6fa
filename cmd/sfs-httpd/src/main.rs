//! sfs-httpd — serve a directory over HTTP/1.1
//!
//! Usage:
//!     sfs-httpd [-d|--directory <root>] [-u|-url <prefix>] [-t|--threads <n>]
//!
//! Flags are case-insensitive. Unknown flags, and a flag with no value
//! after it, are ignored. `SFS_*` environment variables supply anything
//! not given on the command line.
//!
//! Stop it with:
//!     curl http://localhost:8080/shutdown

use sfs_core::{log_error, log_info, logging};
use sfs_server::{Server, ServerConfig};
use sfs_module::ConsoleSink;

use std::process::ExitCode;
use std::sync::Arc;

fn parse_args(args: &[String], mut config: ServerConfig) -> ServerConfig {
    let mut i = 1;
    // The last argument can only be a value, never a flag.
    while i + 1 < args.len() {
        let value = &args[i + 1];
        match args[i].to_ascii_lowercase().as_str() {
            "-d" | "--directory" => config = config.root_dir(value),
            "-u" | "-url" | "--url" => config = config.url(value),
            "-t" | "--threads" => {
                if let Ok(n) = value.parse() {
                    config = config.num_workers(n);
                }
            }
            _ => {
                i += 1;
                continue;
            }
        }
        i += 2;
    }
    config
}

fn main() -> ExitCode {
    logging::init();

    let args: Vec<String> = std::env::args().collect();
    let config = parse_args(&args, ServerConfig::from_env());
    if logging::level_enabled(logging::LogLevel::Debug) {
        config.print();
    }

    let server = match Server::bind(config, Arc::new(ConsoleSink)) {
        Ok(server) => server,
        Err(e) => {
            log_error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let code = match server.run() {
        Ok(()) => 0,
        Err(e) => {
            log_error!("{}", e);
            1
        }
    };
    log_info!("Ended with code {}", code);
    ExitCode::from(code)
}
