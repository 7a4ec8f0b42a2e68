//! Configuration module
//!
//! Application defaults loaded from a YAML or JSON file, then overridden by
//! `RPC_BENCH_*` environment variables and finally by command-line flags.

mod env;

pub use env::{print_env_help, EnvConfig};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::benchmark::MAX_DURATION_SECS;

/// Configuration file locations (in order of precedence)
const CONFIG_LOCATIONS: &[&str] = &[
    "./rpc-bench.yaml",
    "./rpc-bench.yml",
    "./rpc-bench.json",
    "~/.config/rpc-bench/config.yaml",
];

/// Longest per-request timeout accepted
pub const MAX_TIMEOUT_SECS: u64 = 60;

/// Application configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// RPS used when none is given
    pub default_rps: u32,

    /// Duration used when none is given
    pub default_duration_secs: u32,

    /// Address the HTTP server binds to
    pub listen_addr: String,

    /// Benchmarks the server runs at the same time
    pub max_concurrent_runs: usize,

    /// Highest rps the server accepts per run
    pub max_rps: u32,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            default_rps: 5,
            default_duration_secs: 10,
            listen_addr: "127.0.0.1:8080".to_string(),
            max_concurrent_runs: 4,
            max_rps: 100,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Find configuration file in standard locations
    pub fn find() -> Option<PathBuf> {
        CONFIG_LOCATIONS
            .iter()
            .map(|location| expand_path(location))
            .find(|path| path.exists())
    }

    /// Load from the given path, the first standard location, or defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path.map(Path::to_path_buf).or_else(Self::find) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = if is_yaml_file(path) {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if is_yaml_file(path) {
            serde_yaml::to_string(self).context("Failed to serialize config")?
        } else {
            serde_json::to_string_pretty(self).context("Failed to serialize config")?
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Apply environment overrides
    pub fn merge_env(&mut self, env: &EnvConfig) {
        if let Some(timeout) = env.timeout {
            self.timeout_secs = timeout;
        }
        if let Some(rps) = env.rps {
            self.default_rps = rps;
        }
        if let Some(duration) = env.duration {
            self.default_duration_secs = duration;
        }
        if let Some(listen) = &env.listen {
            self.listen_addr = listen.clone();
        }
        if let Some(max_runs) = env.max_runs {
            self.max_concurrent_runs = max_runs;
        }
        if let Some(max_rps) = env.max_rps {
            self.max_rps = max_rps;
        }
        if let Some(level) = &env.log_level {
            self.log_level = level.clone();
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 || self.timeout_secs > MAX_TIMEOUT_SECS {
            anyhow::bail!(
                "timeout_secs must be between 1 and {}, got {}",
                MAX_TIMEOUT_SECS,
                self.timeout_secs
            );
        }
        if self.default_rps == 0 {
            anyhow::bail!("default_rps must be positive");
        }
        if self.default_duration_secs == 0 || self.default_duration_secs > MAX_DURATION_SECS {
            anyhow::bail!(
                "default_duration_secs must be between 1 and {}, got {}",
                MAX_DURATION_SECS,
                self.default_duration_secs
            );
        }
        if self.max_concurrent_runs == 0 {
            anyhow::bail!("max_concurrent_runs must be at least 1");
        }
        if self.max_rps == 0 {
            anyhow::bail!("max_rps must be positive");
        }
        self.listen_addr
            .parse::<std::net::SocketAddr>()
            .with_context(|| format!("Invalid listen_addr: {}", self.listen_addr))?;
        Ok(())
    }

    /// Example configuration written by `config init`
    pub fn example() -> Self {
        Self {
            timeout_secs: 10,
            default_rps: 10,
            default_duration_secs: 10,
            listen_addr: "0.0.0.0:8080".to_string(),
            max_concurrent_runs: 2,
            max_rps: 50,
            log_level: "info".to_string(),
        }
    }
}

/// Check if path is a YAML file
fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}

/// Expand ~ to home directory
fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.default_rps, 5);
        assert!(config.validate().is_ok());
        assert!(AppConfig::example().validate().is_ok());
    }

    #[test]
    fn test_yaml_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/rpc-bench.yaml");

        AppConfig::example().save(&path).unwrap();
        let loaded = AppConfig::load(&path).unwrap();

        assert_eq!(loaded, AppConfig::example());
    }

    #[test]
    fn test_json_partial_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rpc-bench.json");
        std::fs::write(&path, r#"{"timeout_secs": 3}"#).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded.timeout_secs, 3);
        assert_eq!(loaded.default_rps, AppConfig::default().default_rps);
    }

    #[test]
    fn test_load_rejects_invalid() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "timeout_secs: 0\n").unwrap();

        assert!(AppConfig::load(&path).is_err());
    }

    #[test]
    fn test_validate_bounds() {
        let long = AppConfig {
            default_duration_secs: 61,
            ..AppConfig::default()
        };
        assert!(long.validate().is_err());

        let no_runs = AppConfig {
            max_concurrent_runs: 0,
            ..AppConfig::default()
        };
        assert!(no_runs.validate().is_err());

        let no_rps = AppConfig {
            max_rps: 0,
            ..AppConfig::default()
        };
        assert!(no_rps.validate().is_err());

        let bad_addr = AppConfig {
            listen_addr: "localhost".to_string(),
            ..AppConfig::default()
        };
        assert!(bad_addr.validate().is_err());
    }

    #[test]
    fn test_merge_env() {
        let mut config = AppConfig::default();
        let env = EnvConfig {
            timeout: Some(5),
            rps: Some(15),
            listen: Some("0.0.0.0:9000".to_string()),
            max_rps: Some(20),
            ..Default::default()
        };

        config.merge_env(&env);

        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.default_rps, 15);
        assert_eq!(config.listen_addr, "0.0.0.0:9000");
        assert_eq!(config.max_rps, 20);
        assert_eq!(config.default_duration_secs, 10);
    }

    #[test]
    fn test_expand_path() {
        assert_eq!(expand_path("./rpc-bench.yaml"), PathBuf::from("./rpc-bench.yaml"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_path("~/x.yaml"), home.join("x.yaml"));
        }
    }
}
