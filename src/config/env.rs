//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use std::env;

/// Environment variable prefix
const ENV_PREFIX: &str = "RPC_BENCH";

/// Environment configuration from environment variables
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EnvConfig {
    /// Per-request timeout from RPC_BENCH_TIMEOUT
    pub timeout: Option<u64>,
    /// Default rps from RPC_BENCH_RPS
    pub rps: Option<u32>,
    /// Default duration from RPC_BENCH_DURATION
    pub duration: Option<u32>,
    /// Server listen address from RPC_BENCH_LISTEN
    pub listen: Option<String>,
    /// Concurrent server runs from RPC_BENCH_MAX_RUNS
    pub max_runs: Option<usize>,
    /// Server rps ceiling from RPC_BENCH_MAX_RPS
    pub max_rps: Option<u32>,
    /// Log level from RPC_BENCH_LOG_LEVEL
    pub log_level: Option<String>,
    /// Config file from RPC_BENCH_CONFIG
    pub config_file: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load using a custom variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| {
            lookup(&format!("{ENV_PREFIX}_{name}"))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            timeout: get("TIMEOUT").and_then(|v| v.parse().ok()),
            rps: get("RPS").and_then(|v| v.parse().ok()),
            duration: get("DURATION").and_then(|v| v.parse().ok()),
            listen: get("LISTEN"),
            max_runs: get("MAX_RUNS").and_then(|v| v.parse().ok()),
            max_rps: get("MAX_RPS").and_then(|v| v.parse().ok()),
            log_level: get("LOG_LEVEL"),
            config_file: get("CONFIG"),
        }
    }

    /// Check if any environment variables are set
    pub fn has_any(&self) -> bool {
        *self != Self::default()
    }
}

/// Print all RPC_BENCH environment variables
pub fn print_env_help() {
    println!("Environment Variables:");
    println!();
    println!("  {ENV_PREFIX}_TIMEOUT     Per-request timeout in seconds");
    println!("  {ENV_PREFIX}_RPS         Default requests per second");
    println!("  {ENV_PREFIX}_DURATION    Default duration in seconds (max 60)");
    println!("  {ENV_PREFIX}_LISTEN      Server listen address");
    println!("  {ENV_PREFIX}_MAX_RUNS    Benchmarks the server runs concurrently");
    println!("  {ENV_PREFIX}_MAX_RPS     Highest rps the server accepts");
    println!("  {ENV_PREFIX}_LOG_LEVEL   Log level (trace, debug, info, warn, error)");
    println!("  {ENV_PREFIX}_CONFIG      Path to configuration file");
    println!();
    println!("Example:");
    println!("  export {ENV_PREFIX}_TIMEOUT=5");
    println!("  rpc-bench run --url http://localhost:8545 --rps 10 --duration 5");
}
