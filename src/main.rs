use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio::io::AsyncReadExt;
use tracing::{Level, debug};

use htdp_bridge::config::EngineConfig;
use htdp_bridge::consts::{DEFAULT_BINARY, DEFAULT_TIMEOUT};
use htdp_bridge::engine::htdp::HtdpEngine;
use htdp_bridge::service::Service;
use htdp_bridge::telemetry::init_tracing;

#[derive(Parser)]
#[command(
    name = "htdp-bridge",
    version,
    about = "Transform coordinates between reference frames and epochs with NOAA HTDP."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to the compiled HTDP binary
    #[arg(long, env = "HTDP_BINARY", default_value = DEFAULT_BINARY, global = true)]
    binary: PathBuf,

    /// Engine timeout in seconds
    #[arg(short, long, env = "HTDP_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT.as_secs(), global = true)]
    timeout: u64,

    /// Parent directory for per-run working directories (default: system temp)
    #[arg(long, env = "HTDP_WORK_ROOT", global = true)]
    work_root: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Report readiness
    Health,
    /// List the reference frames HTDP knows, by menu index
    Frames {
        /// Print an aligned table instead of JSON
        #[arg(long)]
        table: bool,
    },
    /// Run a transformation request (JSON) through HTDP
    Transform {
        /// Request file, or `-` for stdin
        #[arg(default_value = "-")]
        payload: String,
    },
    /// Show the stdin script and point file a request would produce, without running HTDP
    Script {
        /// Request file, or `-` for stdin
        #[arg(default_value = "-")]
        payload: String,
    },
}

#[derive(Serialize)]
struct ScriptPreview {
    stdin: Vec<String>,
    input_file: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    init_tracing(cli.log_json, level);

    let mut config = EngineConfig::new(&cli.binary);
    if let Some(root) = &cli.work_root {
        config = config.with_work_root(root);
    }
    let timeout = Duration::from_secs(cli.timeout);
    debug!(?config, timeout_secs = cli.timeout, "engine configuration");

    let service = Service::new(Arc::new(HtdpEngine::new(config)), timeout);

    match cli.command {
        Command::Health => print_json(&service.health()),
        Command::Frames { table } => {
            let frames = service.frames();
            if table {
                for frame in &frames {
                    println!("{:>3}  {}", frame.index, frame.label);
                }
                Ok(())
            } else {
                print_json(&frames)
            }
        }
        Command::Transform { payload } => {
            let text = read_payload(&payload).await?;
            let outcome = match service.parse_payload(&text) {
                Ok(raw) => service.transform(&raw).await,
                Err(err) => Err(err),
            };
            match outcome {
                Ok(execution) => print_json(&execution),
                Err(err) => {
                    print_json(&err)?;
                    std::process::exit(1);
                }
            }
        }
        Command::Script { payload } => {
            let text = read_payload(&payload).await?;
            let work_dir = std::env::temp_dir().join("htdp_preview");
            let plan = service
                .parse_payload(&text)
                .and_then(|raw| service.plan(&raw, &work_dir));
            match plan {
                Ok(plan) => print_json(&ScriptPreview {
                    stdin: plan.script,
                    input_file: plan.input_file,
                }),
                Err(err) => {
                    print_json(&err)?;
                    std::process::exit(1);
                }
            }
        }
    }
}

async fn read_payload(source: &str) -> Result<String> {
    if source == "-" {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .context("failed to read request from stdin")?;
        Ok(text)
    } else {
        tokio::fs::read_to_string(source)
            .await
            .with_context(|| format!("failed to read request file {source}"))
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
