//! Environment variable utilities
//!
//! # Usage
//!
//! ```ignore
//! use sfs_core::env::{env_get, env_get_bool, env_get_opt};
//!
//! let workers: usize = env_get("SFS_WORKERS", 20);
//! let flush: bool = env_get_bool("SFS_FLUSH_EPRINT", false);
//! let url: Option<String> = env_get_opt("SFS_URL");
//! ```

use std::str::FromStr;

/// Get environment variable parsed as type T, or return default.
///
/// An unset variable and one that fails to parse both yield `default`.
#[inline]
pub fn env_get<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    env_get_opt(key).unwrap_or(default)
}

/// Get environment variable as boolean.
///
/// Accepts "1", "true", "yes", "on" (case-insensitive) as true.
/// Any other value is false; unset returns the default.
#[inline]
pub fn env_get_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(val) => matches!(val.to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

/// Get environment variable as optional value.
///
/// Blank values count as unset.
#[inline]
pub fn env_get_opt<T>(key: &str) -> Option<T>
where
    T: FromStr,
{
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_get_default() {
        let val: usize = env_get("__SFS_TEST_UNSET_VAR__", 42);
        assert_eq!(val, 42);
    }

    #[test]
    fn test_env_get_opt_none() {
        let val: Option<usize> = env_get_opt("__SFS_TEST_UNSET_VAR__");
        assert!(val.is_none());
    }

    #[test]
    fn test_env_get_with_set_var() {
        std::env::set_var("__SFS_TEST_NUM__", " 123 ");
        let val: usize = env_get("__SFS_TEST_NUM__", 0);
        assert_eq!(val, 123);
        std::env::remove_var("__SFS_TEST_NUM__");
    }

    #[test]
    fn test_env_get_blank_is_unset() {
        std::env::set_var("__SFS_TEST_BLANK__", "   ");
        let val: Option<String> = env_get_opt("__SFS_TEST_BLANK__");
        assert!(val.is_none());
        std::env::remove_var("__SFS_TEST_BLANK__");
    }

    #[test]
    fn test_env_get_bool_variants() {
        std::env::set_var("__SFS_TEST_BOOL__", "YES");
        assert!(env_get_bool("__SFS_TEST_BOOL__", false));

        std::env::set_var("__SFS_TEST_BOOL__", "off");
        assert!(!env_get_bool("__SFS_TEST_BOOL__", true));

        std::env::remove_var("__SFS_TEST_BOOL__");
        assert!(env_get_bool("__SFS_TEST_BOOL__", true));
    }

    #[test]
    fn test_env_get_invalid_parse() {
        std::env::set_var("__SFS_TEST_INVALID__", "not_a_number");
        let val: usize = env_get("__SFS_TEST_INVALID__", 99);
        assert_eq!(val, 99);
        std::env::remove_var("__SFS_TEST_INVALID__");
    }
}
