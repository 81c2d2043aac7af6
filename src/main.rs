use std::process::ExitCode;

use clap::Parser;
use date_to_block::{
    config::{ConfigError, ResolverConfig},
    report::{render_json, render_text},
    BlockResolver, ResolutionResult,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Find the block closest to a unix timestamp.
#[derive(Parser, Debug)]
#[command(name = "date-to-block", version, about)]
struct Cli {
    /// Unix epoch timestamp in seconds
    timestamp: u64,

    /// RPC endpoint URL (overrides RPC_URL)
    #[arg(long)]
    rpc_url: Option<String>,

    /// Accepted distance from the target in seconds (overrides TOLERANCE_SECS)
    #[arg(long)]
    tolerance: Option<u64>,

    /// Narrowing budget (overrides MAX_ATTEMPTS)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    max_attempts: Option<u32>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("Error: {0}")]
    Config(#[from] ConfigError),
    #[error("Error finding block for timestamp:\n{0}")]
    Resolve(Box<dyn std::error::Error + Send + Sync>),
}

/// `--help` and `--version` succeed; every other parse error is a usage error.
fn usage_exit_code(err: &clap::Error) -> u8 {
    if err.use_stderr() { 1 } else { 0 }
}

fn exit_code(outcome: &Result<ResolutionResult, CliError>) -> u8 {
    match outcome {
        Ok(_) => 0,
        Err(CliError::Config(_)) | Err(CliError::Resolve(_)) => 1,
    }
}

fn load_config(cli: &Cli) -> Result<ResolverConfig, CliError> {
    let mut config = ResolverConfig::from_env()?;
    if let Some(url) = &cli.rpc_url {
        config.rpc_url = url.clone();
    }
    if let Some(tolerance) = cli.tolerance {
        config.tolerance_secs = tolerance;
    }
    if let Some(max_attempts) = cli.max_attempts {
        config.max_attempts = max_attempts;
    }
    Ok(config)
}

async fn resolve(cli: &Cli, config: &ResolverConfig) -> Result<ResolutionResult, Box<dyn std::error::Error + Send + Sync>> {
    let oracle = config.build_oracle()?;
    let resolver = BlockResolver::new(config.settings());
    let result = match config.resolve_timeout {
        Some(limit) => tokio::time::timeout(limit, resolver.resolve(&oracle, cli.timestamp))
            .await
            .map_err(|_| format!("Resolution timed out after {}s", limit.as_secs()))??,
        None => resolver.resolve(&oracle, cli.timestamp).await?,
    };
    Ok(result)
}

async fn run(cli: &Cli) -> Result<ResolutionResult, CliError> {
    let config = load_config(cli)?;
    resolve(cli, &config).await.map_err(CliError::Resolve)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(usage_exit_code(&e));
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let outcome = run(&cli).await;
    match &outcome {
        Ok(result) if cli.json => println!("{}", render_json(cli.timestamp, result)),
        Ok(result) => print!("{}", render_text(cli.timestamp, result)),
        Err(e) => eprintln!("{}", e),
    }
    ExitCode::from(exit_code(&outcome))
}
