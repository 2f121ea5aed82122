//! Server configuration.
//!
//! Every field has a default; the binary overrides them from the
//! environment:
//!
//! | variable                  | field               | default          |
//! |---------------------------|---------------------|------------------|
//! | `CHASEMAP_BIND`           | `bind_addr`         | `127.0.0.1:8080` |
//! | `CHASEMAP_DATA_DIR`       | `data_dir`          | `.`              |
//! | `CHASEMAP_REFRESH_SECS`   | `refresh.period`    | `30` (`0` = manual) |
//! | `CHASEMAP_HANDSHAKE_SECS` | `handshake_timeout` | `5`              |

use std::path::PathBuf;
use std::time::Duration;

use chasemap_clock::RefreshConfig;
use tracing::warn;

pub const ENV_BIND: &str = "CHASEMAP_BIND";
pub const ENV_DATA_DIR: &str = "CHASEMAP_DATA_DIR";
pub const ENV_REFRESH_SECS: &str = "CHASEMAP_REFRESH_SECS";
pub const ENV_HANDSHAKE_SECS: &str = "CHASEMAP_HANDSHAKE_SECS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Directory holding the `ChaseBotGame_{id}.json` exports.
    pub data_dir: PathBuf,
    pub refresh: RefreshConfig,
    /// How long a new connection may take to send its `Watch`.
    pub handshake_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            data_dir: PathBuf::from("."),
            refresh: RefreshConfig::default(),
            handshake_timeout: Duration::from_secs(5),
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by the `CHASEMAP_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through
    /// `lookup`. Values that don't parse are ignored with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(bind) = lookup(ENV_BIND).filter(|v| !v.trim().is_empty()) {
            config.bind_addr = bind.trim().to_string();
        }
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.trim().is_empty()) {
            config.data_dir = PathBuf::from(dir.trim());
        }
        if let Some(secs) = parse_secs(&lookup, ENV_REFRESH_SECS) {
            config.refresh.period = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_secs(&lookup, ENV_HANDSHAKE_SECS) {
            if secs == 0 {
                warn!(var = ENV_HANDSHAKE_SECS, "handshake timeout must be positive, keeping default");
            } else {
                config.handshake_timeout = Duration::from_secs(secs);
            }
        }

        config.refresh = config.refresh.validated();
        config
    }
}

fn parse_secs(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<u64> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(secs) => Some(secs),
        Err(_) => {
            warn!(var = key, value = %raw, "not a number of seconds, keeping default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.refresh.period, Duration::from_secs(30));
        assert_eq!(config.handshake_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_empty_environment_gives_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[]));
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            (ENV_BIND, "0.0.0.0:9000"),
            (ENV_DATA_DIR, "/srv/chase"),
            (ENV_REFRESH_SECS, "10"),
            (ENV_HANDSHAKE_SECS, "2"),
        ]));
        assert_eq!(config.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.data_dir, PathBuf::from("/srv/chase"));
        assert_eq!(config.refresh.period, Duration::from_secs(10));
        assert_eq!(config.handshake_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_bad_values_fall_back() {
        let config = ServerConfig::from_lookup(lookup(&[
            (ENV_REFRESH_SECS, "soon"),
            (ENV_HANDSHAKE_SECS, "0"),
        ]));
        assert_eq!(config.refresh.period, Duration::from_secs(30));
        assert_eq!(config.handshake_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_zero_refresh_is_manual() {
        let config = ServerConfig::from_lookup(lookup(&[(ENV_REFRESH_SECS, "0")]));
        assert!(config.refresh.is_manual());
        // Jitter is clamped to the (zero) period.
        assert_eq!(config.refresh.initial_jitter, Duration::ZERO);
    }
}
