//! Per-user application data directory.

use sfs_core::env::env_get_opt;
use std::path::PathBuf;

cfg_if::cfg_if! {
    if #[cfg(target_os = "windows")] {
        /// `%APPDATA%`, falling back to `%LOCALAPPDATA%`.
        pub fn user_data_dir() -> Option<PathBuf> {
            env_get_opt::<PathBuf>("APPDATA").or_else(|| env_get_opt("LOCALAPPDATA"))
        }
    } else if #[cfg(target_os = "macos")] {
        /// `~/Library/Application Support`.
        pub fn user_data_dir() -> Option<PathBuf> {
            env_get_opt::<PathBuf>("HOME").map(|h| h.join("Library").join("Application Support"))
        }
    } else {
        /// `$XDG_DATA_HOME`, falling back to `~/.local/share`.
        pub fn user_data_dir() -> Option<PathBuf> {
            env_get_opt::<PathBuf>("XDG_DATA_HOME")
                .filter(|p| p.is_absolute())
                .or_else(|| env_get_opt::<PathBuf>("HOME").map(|h| h.join(".local").join("share")))
        }
    }
}

