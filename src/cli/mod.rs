//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// JSON-RPC latency benchmarking harness
#[derive(Parser, Debug)]
#[command(name = "rpc-bench")]
#[command(version)]
#[command(about = "Benchmark JSON-RPC latency of a blockchain node endpoint")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file (YAML or JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a single benchmark and print the report
    Run(RunArgs),

    /// Serve the benchmark API over HTTP
    Serve(ServeArgs),

    /// List supported JSON-RPC methods
    Methods,

    /// Show or create configuration
    Config(ConfigArgs),
}

/// Arguments for run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// JSON-RPC endpoint URL
    #[arg(short, long)]
    pub url: String,

    /// Method to benchmark (eth_blockNumber, eth_getBlockByNumber)
    #[arg(short, long, default_value = "eth_blockNumber")]
    pub method: String,

    /// Requests per second
    #[arg(short, long)]
    pub rps: Option<i64>,

    /// Duration in seconds (max 60)
    #[arg(short, long)]
    pub duration: Option<i64>,

    /// Extra header, repeatable ("Name: value")
    #[arg(short = 'H', long = "header")]
    pub header: Vec<String>,

    /// Extra headers as a JSON object
    #[arg(long)]
    pub headers: Option<String>,

    /// Per-request timeout in seconds
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Output format (text, json, json-pretty, markdown, csv)
    #[arg(short, long, default_value = "text")]
    pub format: String,

    /// Include every request in the report
    #[arg(long)]
    pub outcomes: bool,
}

/// Arguments for serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Listen address
    #[arg(short, long)]
    pub listen: Option<String>,

    /// Benchmarks executed at the same time
    #[arg(long)]
    pub max_runs: Option<usize>,

    /// Highest rps a caller may request
    #[arg(long)]
    pub max_rps: Option<u32>,

    /// Per-request timeout in seconds
    #[arg(short, long)]
    pub timeout: Option<u64>,
}

/// Arguments for config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,

    /// Write an example configuration file
    Init {
        /// Output path
        #[arg(default_value = "rpc-bench.yaml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// List environment variables
    Env,
}
