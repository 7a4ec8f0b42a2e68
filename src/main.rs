//! rpc-bench - JSON-RPC latency benchmarking harness
//!
//! Sends paced bursts of JSON-RPC calls to a blockchain node endpoint and
//! reports latency statistics.
//!
//! ## Features
//!
//! - One-second batch pacing at a target requests-per-second
//! - `eth_blockNumber` and `eth_getBlockByNumber` calls
//! - min/avg/max and p50/p90/p95/p99 latency over successful requests
//! - Timeout, HTTP/RPC and network error breakdown
//! - HTTP API for front-ends (`serve`)
//! - Multiple output formats (Text, JSON, Markdown, CSV)
//!
//! ## Usage
//!
//! ```bash
//! # Benchmark a local node at 10 rps for 5 seconds
//! rpc-bench run --url http://localhost:8545 --rps 10 --duration 5
//!
//! # Forward an API key and print JSON
//! rpc-bench run --url https://rpc.example.com -H "x-api-key: secret" --format json
//!
//! # Serve the benchmark API
//! rpc-bench serve --listen 0.0.0.0:8080
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{debug, info, warn};

mod benchmark;
mod cli;
mod config;
mod http;
#[cfg(test)]
mod mock;
mod rpc;
mod server;
mod utils;

use benchmark::{
    parse_header_arg, parse_headers_json, BenchmarkParams, BenchmarkReport, BenchmarkRequest,
    BenchmarkRunner, ReportFormat, MAX_DURATION_SECS, RPS_PRESETS,
};
use cli::Args;
use config::{AppConfig, EnvConfig};
use rpc::RpcMethod;
use utils::LogLevel;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let env = EnvConfig::load();
    let config_path = args
        .config
        .clone()
        .or_else(|| env.config_file.as_ref().map(Into::into));
    let mut config = AppConfig::load_or_default(config_path.as_deref())?;
    let config_source = config_path.or_else(AppConfig::find);
    config.merge_env(&env);

    let level = if args.verbose {
        LogLevel::Debug
    } else {
        let name = args.log_level.as_deref().unwrap_or(&config.log_level);
        LogLevel::from_str(name).ok_or_else(|| anyhow::anyhow!("Unknown log level: {name}"))?
    };
    utils::init_logger(level);

    if env.has_any() {
        debug!("Applied environment overrides: {:?}", env);
    }

    match args.command {
        cli::Command::Run(run_args) => {
            run_benchmark(run_args, &config).await?;
        }
        cli::Command::Serve(serve_args) => {
            serve(serve_args, config).await?;
        }
        cli::Command::Methods => {
            list_methods();
        }
        cli::Command::Config(config_args) => {
            manage_config(config_args, &config, config_source)?;
        }
    }

    Ok(())
}

async fn run_benchmark(args: cli::RunArgs, config: &AppConfig) -> Result<()> {
    let format = ReportFormat::from_str(&args.format)
        .ok_or_else(|| anyhow::anyhow!("Unknown output format: {}", args.format))?;

    let mut headers = match &args.headers {
        Some(json) => parse_headers_json(json)?,
        None => Default::default(),
    };
    for header in &args.header {
        let (name, value) = parse_header_arg(header)?;
        headers.insert(name, value);
    }

    let params = BenchmarkParams {
        endpoint_url: args.url,
        method: args.method,
        headers: Some(serde_json::to_value(headers)?),
        rps: args.rps.unwrap_or(config.default_rps as i64),
        duration_seconds: args.duration.unwrap_or(config.default_duration_secs as i64),
        include_outcomes: args.outcomes,
    };
    let request = BenchmarkRequest::try_from(params)?;

    let timeout = Duration::from_secs(args.timeout.unwrap_or(config.timeout_secs));
    let runner = BenchmarkRunner::new().with_timeout(timeout);

    let interrupt = runner.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping benchmark");
            interrupt.stop();
        }
    });

    let result = runner.run(&request).await?;
    println!("{}", BenchmarkReport::render(&result, format)?);

    Ok(())
}

async fn serve(args: cli::ServeArgs, mut config: AppConfig) -> Result<()> {
    if let Some(listen) = args.listen {
        config.listen_addr = listen;
    }
    if let Some(max_runs) = args.max_runs {
        config.max_concurrent_runs = max_runs;
    }
    if let Some(max_rps) = args.max_rps {
        config.max_rps = max_rps;
    }
    if let Some(timeout) = args.timeout {
        config.timeout_secs = timeout;
    }
    config.validate()?;

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address: {}", config.listen_addr))?;

    info!(
        "Starting server (timeout {}s, {} concurrent runs, max {} rps)",
        config.timeout_secs, config.max_concurrent_runs, config.max_rps
    );

    server::serve(addr, server::ServerState::from_config(&config)).await
}

fn list_methods() {
    println!("\nSupported JSON-RPC methods\n");
    for method in RpcMethod::all() {
        println!(
            "  {:22} params={:18} {}",
            method.name(),
            method.params().to_string(),
            method.description()
        );
    }
    println!(
        "\nRPS presets: {:?}   max duration: {}s\n",
        RPS_PRESETS, MAX_DURATION_SECS
    );
}

fn manage_config(
    args: cli::ConfigArgs,
    config: &AppConfig,
    source: Option<std::path::PathBuf>,
) -> Result<()> {
    match args.action {
        cli::ConfigAction::Show => {
            let yaml = serde_yaml::to_string(config).context("Failed to serialize config")?;
            match &source {
                Some(path) => println!("# loaded from {}", path.display()),
                None => println!("# no config file found, using defaults"),
            }
            println!("{yaml}");
        }
        cli::ConfigAction::Init { path, force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                );
            }
            AppConfig::example().save(&path)?;
            println!("Wrote example configuration to {}", path.display());
        }
        cli::ConfigAction::Env => {
            config::print_env_help();
        }
    }

    Ok(())
}
