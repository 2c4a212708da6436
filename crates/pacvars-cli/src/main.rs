//! Command-line interface for controller variables.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pacvars_client::{ControllerConfig, LogFormat, LogSink, PacController};
use pacvars_core::Category;
use serde_json::{json, Value as JsonValue};
use tracing::debug;

/// Read and write controller strategy variables over REST.
#[derive(Parser, Debug)]
#[command(name = "pacvars")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Action to perform.
    #[command(subcommand)]
    command: Command,

    /// TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Controller host (overrides config and PACVARS_HOST).
    #[arg(long, global = true)]
    host: Option<String>,

    /// API key id (overrides config and PACVARS_USERNAME).
    #[arg(short, long, global = true)]
    username: Option<String>,

    /// API key value (overrides config and PACVARS_PASSWORD).
    #[arg(short, long, global = true)]
    password: Option<String>,

    /// Accept self-signed controller certificates.
    #[arg(long, global = true)]
    insecure: bool,

    /// Transport error sink: none, stderr or file:<path>.
    #[arg(long, global = true)]
    error_log: Option<LogSink>,

    /// Transport error format: csv or text.
    #[arg(long, global = true)]
    error_format: Option<LogFormat>,

    /// Print the request log to stderr when done.
    #[arg(long, global = true)]
    show_requests: bool,

    /// Verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Read a variable.
    Get {
        /// Variable name, e.g. iCount or itCounts.
        name: String,
    },
    /// Write a variable. The value is parsed as JSON, falling back to a string.
    Set {
        name: String,
        value: String,
    },
    /// Write one element of a table variable.
    SetIndex {
        name: String,
        index: usize,
        value: String,
    },
    /// List scalar variable names of a category.
    List {
        /// Category, e.g. Integer or AnalogInput.
        category: Category,
    },
    /// Show device and strategy metadata.
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = build_config(&args)?;
    debug!(
        base_url = %config.base_url(),
        username = %config.username,
        eager_load = config.eager_load,
        "Resolved controller configuration"
    );
    let mut pac = PacController::connect(config).await?;

    let output = match &args.command {
        Command::Get { name } => serde_json::to_value(pac.get(name).await?)?,
        Command::Set { name, value } => {
            pac.set(name, &parse_value(value)).await?;
            json!({ "ok": true })
        }
        Command::SetIndex { name, index, value } => {
            let mut table = pac.table(name).await?;
            table.set_index(*index, &parse_value(value)).await?;
            serde_json::to_value(table.values())?
        }
        Command::List { category } => json!(pac.list(*category).await?),
        Command::Info => {
            let device = match pac.device() {
                Some(device) => device.clone(),
                None => pac.device_info().await?,
            };
            let strategy = match pac.strategy() {
                Some(strategy) => strategy.clone(),
                None => pac.strategy_info().await?,
            };
            json!({ "device": device, "strategy": strategy })
        }
    };
    println!("{}", serde_json::to_string_pretty(&output)?);

    debug!(requests = pac.request_count(), "Done");
    if args.show_requests {
        eprintln!("{} request(s)", pac.request_count());
        for record in pac.requests() {
            eprintln!("  {} {}", record.at.format("%H:%M:%S%.3f"), record);
        }
    }
    Ok(())
}

/// Config file, then environment, then command-line flags.
fn build_config(args: &Args) -> Result<ControllerConfig> {
    let mut config = match &args.config {
        Some(path) => ControllerConfig::load(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => ControllerConfig::new("", "", ""),
    }
    .apply_env();

    if let Some(host) = &args.host {
        config.host = host.clone();
    }
    if let Some(username) = &args.username {
        config.username = username.clone();
    }
    if let Some(password) = &args.password {
        config.password = password.clone();
    }
    if args.insecure {
        config.accept_invalid_certs = true;
    }
    if let Some(sink) = &args.error_log {
        config.log.sink = sink.clone();
    }
    if let Some(format) = args.error_format {
        config.log.format = format;
    }
    Ok(config)
}

fn parse_value(raw: &str) -> JsonValue {
    serde_json::from_str(raw).unwrap_or_else(|_| JsonValue::String(raw.to_string()))
}

fn init_logging(verbose: bool) {
    let json_logging = std::env::var("PACVARS_LOG_JSON")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(false);

    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "pacvars={0},pacvars_client={0},pacvars_core={0}",
            default_level
        ))
    });

    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value_falls_back_to_string() {
        assert_eq!(parse_value("42"), json!(42));
        assert_eq!(parse_value("[1, 2]"), json!([1, 2]));
        assert_eq!(parse_value("true"), json!(true));
        assert_eq!(parse_value("auto mode"), json!("auto mode"));
    }

    #[test]
    fn test_flags_override_config() {
        let args = Args::parse_from([
            "pacvars",
            "--host",
            "10.0.0.5",
            "-u",
            "kid",
            "-p",
            "secret",
            "--insecure",
            "--error-log",
            "stderr",
            "--error-format",
            "csv",
            "list",
            "integer",
        ]);
        let config = build_config(&args).unwrap();
        assert_eq!(config.host, "10.0.0.5");
        assert!(config.accept_invalid_certs);
        assert_eq!(config.log.sink, LogSink::Stderr);
        assert_eq!(config.log.format, LogFormat::Csv);
        assert!(matches!(
            args.command,
            Command::List {
                category: Category::Integer
            }
        ));
    }
}
