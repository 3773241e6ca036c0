//! Runtime configuration
//!
//! Read from environment variables, falling back to defaults with a log line.

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::{info, warn};

use crate::lookup::{HttpLookupConfig, DEFAULT_DEBOUNCE, DEFAULT_LOOKUP_TIMEOUT};

pub const ENV_DATABASE_PATH: &str = "GROCERY_DATABASE_PATH";
pub const ENV_LOOKUP_URL: &str = "GROCERY_LOOKUP_URL";
pub const ENV_LOOKUP_APP_ID: &str = "GROCERY_LOOKUP_APP_ID";
pub const ENV_LOOKUP_APP_KEY: &str = "GROCERY_LOOKUP_APP_KEY";
pub const ENV_LOOKUP_TIMEOUT_SECS: &str = "GROCERY_LOOKUP_TIMEOUT_SECS";
pub const ENV_SEARCH_DEBOUNCE_MS: &str = "GROCERY_SEARCH_DEBOUNCE_MS";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: PathBuf,
    /// Remote food database; `None` means use the built-in catalog
    pub lookup: Option<HttpLookupConfig>,
    pub search_debounce: Duration,
}

impl Config {
    /// Load from the process environment
    pub fn load() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary variable source
    pub fn from_vars<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_path = var(ENV_DATABASE_PATH)
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_database_path);

        let timeout_secs: u64 = parse_or(&var, ENV_LOOKUP_TIMEOUT_SECS, DEFAULT_LOOKUP_TIMEOUT.as_secs());
        let debounce_ms: u64 = parse_or(
            &var,
            ENV_SEARCH_DEBOUNCE_MS,
            DEFAULT_DEBOUNCE.as_millis() as u64,
        );

        let lookup = match (var(ENV_LOOKUP_APP_ID), var(ENV_LOOKUP_APP_KEY)) {
            (Some(app_id), Some(app_key)) if !app_id.is_empty() && !app_key.is_empty() => {
                let defaults = HttpLookupConfig::default();
                Some(HttpLookupConfig {
                    base_url: var(ENV_LOOKUP_URL).unwrap_or(defaults.base_url),
                    app_id,
                    app_key,
                    timeout: Duration::from_secs(timeout_secs.max(1)),
                    cache_ttl: defaults.cache_ttl,
                })
            }
            _ => {
                info!("No food database credentials set, using built-in catalog");
                None
            }
        };

        Self {
            database_path,
            lookup,
            search_debounce: Duration::from_millis(debounce_ms),
        }
    }
}

fn parse_or<F, T>(var: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
    T::Err: Display,
{
    match var(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value '{raw}': {e}, using default: {default}");
            default
        }),
        None => default,
    }
}

/// `data/grocery.db` next to the project root when run from `target/*`,
/// otherwise next to the executable
fn default_database_path() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(grandparent) = path.parent().and_then(|p| p.parent()) {
            path = grandparent.to_path_buf();
        }
    }

    path.push("data");
    path.push("grocery.db");
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_vars(vars(&[]));
        assert!(config.lookup.is_none());
        assert_eq!(config.search_debounce, DEFAULT_DEBOUNCE);
        assert!(config.database_path.ends_with("data/grocery.db"));
    }

    #[test]
    fn test_explicit_values() {
        let config = Config::from_vars(vars(&[
            (ENV_DATABASE_PATH, "/tmp/ledger.db"),
            (ENV_LOOKUP_APP_ID, "app"),
            (ENV_LOOKUP_APP_KEY, "secret"),
            (ENV_LOOKUP_URL, "http://localhost:8080/v2"),
            (ENV_LOOKUP_TIMEOUT_SECS, "5"),
            (ENV_SEARCH_DEBOUNCE_MS, "450"),
        ]));
        assert_eq!(config.database_path, PathBuf::from("/tmp/ledger.db"));
        assert_eq!(config.search_debounce, Duration::from_millis(450));

        let lookup = config.lookup.unwrap();
        assert_eq!(lookup.base_url, "http://localhost:8080/v2");
        assert_eq!(lookup.app_id, "app");
        assert_eq!(lookup.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = Config::from_vars(vars(&[
            (ENV_LOOKUP_APP_ID, "app"),
            (ENV_LOOKUP_APP_KEY, "secret"),
            (ENV_LOOKUP_TIMEOUT_SECS, "soon"),
            (ENV_SEARCH_DEBOUNCE_MS, "-3"),
        ]));
        assert_eq!(config.search_debounce, DEFAULT_DEBOUNCE);
        assert_eq!(config.lookup.unwrap().timeout, DEFAULT_LOOKUP_TIMEOUT);
    }

    #[test]
    fn test_lookup_needs_both_credentials() {
        let config = Config::from_vars(vars(&[(ENV_LOOKUP_APP_ID, "app")]));
        assert!(config.lookup.is_none());
    }
}
