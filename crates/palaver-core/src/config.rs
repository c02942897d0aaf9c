// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Configuration loading from environment variables.

/// Palaver Core configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Remote store URL (e.g. `redis://127.0.0.1:6379`). Absent selects the
    /// in-memory backend without any health check.
    pub redis_url: Option<String>,
    /// Fail bootstrap instead of falling back to in-memory when the remote
    /// store is unreachable.
    pub require_remote: bool,
    /// Health-check attempts against the remote store.
    pub store_attempts: u32,
    /// Base backoff delay between health-check attempts, in milliseconds.
    pub store_retry_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            redis_url: None,
            require_remote: false,
            store_attempts: 3,
            store_retry_delay_ms: 250,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Optional (with defaults):
    /// - `PALAVER_REDIS_URL`: remote store URL (default: none, in-memory backend)
    /// - `PALAVER_REQUIRE_REMOTE`: fail fast when the remote store is down (default: false)
    /// - `PALAVER_STORE_ATTEMPTS`: health-check attempts (default: 3)
    /// - `PALAVER_STORE_RETRY_DELAY_MS`: base backoff delay (default: 250)
    pub fn from_env() -> Result<Self, ConfigError> {
        let redis_url = std::env::var("PALAVER_REDIS_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let require_remote: bool = std::env::var("PALAVER_REQUIRE_REMOTE")
            .unwrap_or_else(|_| "false".to_string())
            .parse()
            .map_err(|_| {
                ConfigError::Invalid("PALAVER_REQUIRE_REMOTE", "must be 'true' or 'false'")
            })?;

        if require_remote && redis_url.is_none() {
            return Err(ConfigError::Invalid(
                "PALAVER_REQUIRE_REMOTE",
                "set without PALAVER_REDIS_URL",
            ));
        }

        let store_attempts: u32 = std::env::var("PALAVER_STORE_ATTEMPTS")
            .unwrap_or_else(|_| "3".to_string())
            .parse()
            .map_err(|_| {
                ConfigError::Invalid("PALAVER_STORE_ATTEMPTS", "must be a positive integer")
            })?;
        if store_attempts == 0 {
            return Err(ConfigError::Invalid(
                "PALAVER_STORE_ATTEMPTS",
                "must be a positive integer",
            ));
        }

        let store_retry_delay_ms: u64 = std::env::var("PALAVER_STORE_RETRY_DELAY_MS")
            .unwrap_or_else(|_| "250".to_string())
            .parse()
            .map_err(|_| {
                ConfigError::Invalid(
                    "PALAVER_STORE_RETRY_DELAY_MS",
                    "must be a non-negative integer",
                )
            })?;

        Ok(Self {
            redis_url,
            require_remote,
            store_attempts,
            store_retry_delay_ms,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),

    /// An environment variable has an invalid value.
    #[error("invalid value for {0}: {1}")]
    Invalid(&'static str, &'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to serialize tests that modify environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Helper to set env vars for a test and restore them after
    struct EnvGuard {
        vars: Vec<(String, Option<String>)>,
    }

    impl EnvGuard {
        fn new() -> Self {
            Self { vars: Vec::new() }
        }

        fn set(&mut self, key: &str, value: &str) {
            let old = env::var(key).ok();
            self.vars.push((key.to_string(), old));
            // SAFETY: Tests are serialized via ENV_MUTEX, so no concurrent access
            unsafe { env::set_var(key, value) };
        }

        fn remove(&mut self, key: &str) {
            let old = env::var(key).ok();
            self.vars.push((key.to_string(), old));
            // SAFETY: Tests are serialized via ENV_MUTEX, so no concurrent access
            unsafe { env::remove_var(key) };
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, value) in self.vars.drain(..).rev() {
                // SAFETY: Tests are serialized via ENV_MUTEX, so no concurrent access
                unsafe {
                    match value {
                        Some(v) => env::set_var(&key, v),
                        None => env::remove_var(&key),
                    }
                }
            }
        }
    }

    fn clear_all(guard: &mut EnvGuard) {
        guard.remove("PALAVER_REDIS_URL");
        guard.remove("PALAVER_REQUIRE_REMOTE");
        guard.remove("PALAVER_STORE_ATTEMPTS");
        guard.remove("PALAVER_STORE_RETRY_DELAY_MS");
    }

    #[test]
    fn test_config_defaults_to_in_memory() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let mut guard = EnvGuard::new();
        clear_all(&mut guard);

        let config = Config::from_env().unwrap();

        assert!(config.redis_url.is_none());
        assert!(!config.require_remote);
        assert_eq!(config.store_attempts, 3);
        assert_eq!(config.store_retry_delay_ms, 250);
    }

    #[test]
    fn test_config_with_remote_store() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let mut guard = EnvGuard::new();
        clear_all(&mut guard);

        guard.set("PALAVER_REDIS_URL", "redis://127.0.0.1:6379");
        guard.set("PALAVER_REQUIRE_REMOTE", "true");
        guard.set("PALAVER_STORE_ATTEMPTS", "5");
        guard.set("PALAVER_STORE_RETRY_DELAY_MS", "100");

        let config = Config::from_env().unwrap();

        assert_eq!(config.redis_url.as_deref(), Some("redis://127.0.0.1:6379"));
        assert!(config.require_remote);
        assert_eq!(config.store_attempts, 5);
        assert_eq!(config.store_retry_delay_ms, 100);
    }

    #[test]
    fn test_config_blank_url_selects_in_memory() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let mut guard = EnvGuard::new();
        clear_all(&mut guard);

        guard.set("PALAVER_REDIS_URL", "   ");

        let config = Config::from_env().unwrap();
        assert!(config.redis_url.is_none());
    }

    #[test]
    fn test_config_require_remote_without_url() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let mut guard = EnvGuard::new();
        clear_all(&mut guard);

        guard.set("PALAVER_REQUIRE_REMOTE", "true");

        let result = Config::from_env();
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::Invalid("PALAVER_REQUIRE_REMOTE", _)
        ));
    }

    #[test]
    fn test_config_invalid_require_remote() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let mut guard = EnvGuard::new();
        clear_all(&mut guard);

        guard.set("PALAVER_REQUIRE_REMOTE", "yes");

        let result = Config::from_env();
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::Invalid("PALAVER_REQUIRE_REMOTE", _)
        ));
    }

    #[test]
    fn test_config_invalid_attempts() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let mut guard = EnvGuard::new();
        clear_all(&mut guard);

        guard.set("PALAVER_STORE_ATTEMPTS", "0");
        assert!(Config::from_env().is_err());

        guard.set("PALAVER_STORE_ATTEMPTS", "abc");
        assert!(Config::from_env().is_err());
    }

    #[test]
    fn test_config_error_display() {
        let missing = ConfigError::Missing("MY_VAR");
        assert_eq!(
            missing.to_string(),
            "missing required environment variable: MY_VAR"
        );

        let invalid = ConfigError::Invalid("MY_VAR", "must be a number");
        assert_eq!(
            invalid.to_string(),
            "invalid value for MY_VAR: must be a number"
        );
    }
}
