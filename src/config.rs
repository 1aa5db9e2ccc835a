//! Process configuration read from the environment.
//!
//! The binary loads `.env` before calling [`Config::from_env`].

use std::str::FromStr;

/// Default cap on valid rows taken from a CSV upload.
pub const DEFAULT_CSV_ROW_CAP: usize = 10_000;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 500 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub port: u16,
    /// Request body limit for uploads.
    pub max_upload_bytes: usize,
    pub csv_row_cap: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            csv_row_cap: DEFAULT_CSV_ROW_CAP,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: parsed(&lookup, "PORT", defaults.port),
            max_upload_bytes: parsed(&lookup, "MAX_UPLOAD_BYTES", defaults.max_upload_bytes),
            csv_row_cap: parsed(&lookup, "CSV_ROW_CAP", defaults.csv_row_cap),
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

fn parsed<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy + std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid {}={:?}, using {}", key, raw, default);
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(lookup_from(&[]));
        assert_eq!(config.port, 5000);
        assert_eq!(config.csv_row_cap, 10_000);
        assert_eq!(config.max_upload_bytes, 500 * 1024 * 1024);
        assert_eq!(config.listen_addr(), "0.0.0.0:5000");
    }

    #[test]
    fn test_overrides_and_bad_values() {
        let config = Config::from_lookup(lookup_from(&[
            ("PORT", "8080"),
            ("CSV_ROW_CAP", "not-a-number"),
            ("BIND_ADDR", "127.0.0.1"),
        ]));
        assert_eq!(config.port, 8080);
        assert_eq!(config.csv_row_cap, DEFAULT_CSV_ROW_CAP);
        assert_eq!(config.listen_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_from_env_reads_process_environment() {
        std::env::set_var("CSV_ROW_CAP", "250");
        let config = Config::from_env();
        std::env::remove_var("CSV_ROW_CAP");
        assert_eq!(config.csv_row_cap, 250);
    }
}
