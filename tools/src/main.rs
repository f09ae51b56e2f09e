use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use syncodec_tools::{f32_report, f64_report, hex_report, signed_report, unsigned_report};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "syncodec-tools",
    version,
    about = "syncodec inspection and debugging tools"
)]
struct Cli {
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Pretty, global = true)]
    format: OutputFormat,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a captured buffer as hex escapes.
    Hex {
        /// Path to the captured bytes.
        path: PathBuf,
        /// Only show the first N bytes.
        #[arg(long)]
        len: Option<usize>,
    },
    /// Show the packed and unpacked encodings of an integer.
    Varint {
        /// Value to encode.
        #[arg(allow_hyphen_values = true)]
        value: String,
        /// Treat the value as signed (zig-zag).
        #[arg(long)]
        signed: bool,
    },
    /// Show the packed round trip of a float.
    Float {
        /// Value to encode.
        #[arg(allow_hyphen_values = true)]
        value: f64,
        /// Use the f64 encoding instead of f32.
        #[arg(long)]
        double: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Hex { path, len } => {
            let bytes =
                fs::read(&path).with_context(|| format!("read buffer {}", path.display()))?;
            debug!(path = %path.display(), bytes = bytes.len(), "loaded buffer");
            emit(cli.format, &hex_report(&bytes, len))
        }
        Command::Varint { value, signed } => {
            let report = if signed {
                let value: i64 = value
                    .parse()
                    .with_context(|| format!("parse signed integer {value:?}"))?;
                signed_report(value)
            } else {
                let value: u64 = value
                    .parse()
                    .with_context(|| format!("parse unsigned integer {value:?}"))?;
                unsigned_report(value)
            }
            .context("encode integer")?;
            emit(cli.format, &report)
        }
        Command::Float { value, double } => {
            let report = if double {
                f64_report(value)
            } else {
                f32_report(value)
            }
            .context("encode float")?;
            emit(cli.format, &report)
        }
    }
}

fn emit<T: Serialize + std::fmt::Display>(format: OutputFormat, report: &T) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(report).context("serialize json")?;
            println!("{json}");
        }
        OutputFormat::Pretty => println!("{report}"),
    }
    Ok(())
}
