use std::{net::SocketAddr, time::Duration};

use anyhow::Context;
use stockfolio_core::constants::DEFAULT_MAX_WRITE_ATTEMPTS;

#[derive(Debug)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    /// Read-modify-write attempts per holdings mutation before a version
    /// conflict is reported to the client.
    pub max_write_attempts: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the config from `SF_*` values supplied by `var`.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let listen_addr: SocketAddr = var("SF_LISTEN_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8080".to_string())
            .parse()
            .context("Invalid SF_LISTEN_ADDR")?;
        let db_path = var("SF_DB_PATH").unwrap_or_else(|| "./db/app.db".into());
        let cors_allow = var("SF_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = match var("SF_REQUEST_TIMEOUT_MS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("Invalid SF_REQUEST_TIMEOUT_MS: {}", raw))?,
            None => 30000,
        };
        let max_write_attempts: u32 = match var("SF_MAX_WRITE_ATTEMPTS") {
            Some(raw) => raw
                .parse()
                .ok()
                .filter(|n| *n > 0)
                .with_context(|| format!("Invalid SF_MAX_WRITE_ATTEMPTS: {}", raw))?,
            None => DEFAULT_MAX_WRITE_ATTEMPTS,
        };
        Ok(Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            max_write_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.listen_addr.port(), 8080);
        assert_eq!(config.db_path, "./db/app.db");
        assert_eq!(config.cors_allow, vec!["*".to_string()]);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.max_write_attempts, DEFAULT_MAX_WRITE_ATTEMPTS);
    }

    #[test]
    fn test_explicit_values() {
        let config = config_from(&[
            ("SF_REQUEST_TIMEOUT_MS", "1500"),
            ("SF_MAX_WRITE_ATTEMPTS", "7"),
            ("SF_CORS_ALLOW_ORIGINS", "http://a.test, ,http://b.test"),
        ])
        .unwrap();

        assert_eq!(config.request_timeout, Duration::from_millis(1500));
        assert_eq!(config.max_write_attempts, 7);
        assert_eq!(config.cors_allow, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn test_invalid_request_timeout_is_rejected() {
        let err = config_from(&[("SF_REQUEST_TIMEOUT_MS", "soon")]).unwrap_err();
        assert!(err.to_string().contains("SF_REQUEST_TIMEOUT_MS"));

        assert!(config_from(&[("SF_REQUEST_TIMEOUT_MS", "-5")]).is_err());
    }

    #[test]
    fn test_invalid_write_attempts_are_rejected() {
        assert!(config_from(&[("SF_MAX_WRITE_ATTEMPTS", "0")]).is_err());
        assert!(config_from(&[("SF_MAX_WRITE_ATTEMPTS", "many")]).is_err());
    }
}
