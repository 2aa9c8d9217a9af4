use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use glob::glob;
use log::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "abeeway")]
#[command(version)]
#[command(
    about = "Decoder for Abeeway tracker uplink payloads.",
    long_about = None,
    after_help = "Examples:\n  abeeway decode 05206480150003020701020a --port 18\n  abeeway batch uplinks.txt -o report.json\n  abeeway batch uplinks.txt --stdout --pretty"
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a single hex payload and print the record as JSON.
    Decode {
        /// Payload as hex digits (either case, no separators)
        payload: String,

        /// LoRaWAN port the payload was received on
        #[arg(short, long, default_value_t = 1)]
        port: u32,

        #[command(flatten)]
        format: FormatArgs,
    },
    /// Decode a file of uplinks (one `<hex>` or `<port> <hex>` per line) into a JSON report.
    #[command(
        after_help = "Examples:\n  abeeway batch uplinks.txt -o report.json\n  abeeway batch 'captures/*.txt' --stdout --strict"
    )]
    Batch {
        /// Path (or glob matching one file) of the uplink list
        input: PathBuf,

        /// Output report path (JSON)
        #[arg(short = 'o', long, required_unless_present = "stdout")]
        report: Option<PathBuf>,

        /// Write JSON report to stdout
        #[arg(long, conflicts_with = "report")]
        stdout: bool,

        /// Port used for lines that do not give one
        #[arg(short, long, default_value_t = 1)]
        port: u32,

        #[command(flatten)]
        format: FormatArgs,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,

        /// Exit with a non-zero code if any uplink failed or reported an error
        #[arg(long)]
        strict: bool,
    },
}

#[derive(Args, Debug, Clone, Copy)]
struct FormatArgs {
    /// Pretty-print JSON output
    #[arg(long, conflicts_with = "compact")]
    pretty: bool,

    /// Compact JSON output (default)
    #[arg(long)]
    compact: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let quiet = matches!(cli.command, Commands::Batch { quiet: true, .. });
    init_logging(cli.verbose, quiet);

    let result = match cli.command {
        Commands::Decode {
            payload,
            port,
            format,
        } => cmd_decode(&payload, port, format),
        Commands::Batch {
            input,
            report,
            stdout,
            port,
            format,
            quiet,
            strict,
        } => cmd_batch(input, report, stdout, port, format, quiet, strict),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .target(env_logger::Target::Stderr)
        .init();
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{:#}", err), None)
    }
}

fn cmd_decode(payload: &str, port: u32, format: FormatArgs) -> Result<(), CliError> {
    let bytes = abeeway_core::parse_hex(payload.trim()).map_err(|err| {
        CliError::new(
            format!("invalid payload '{}': {}", payload, err),
            Some("pass the payload as an even number of hex digits".to_string()),
        )
    })?;

    let record = abeeway_core::decode_uplink(&bytes, port).map_err(|err| {
        CliError::new(
            format!("decode failed: {}", err),
            Some("check that the payload was captured in full".to_string()),
        )
    })?;
    let json = serialize_json(&record, format)?;
    println!("{}", json);
    Ok(())
}

fn cmd_batch(
    input: PathBuf,
    report: Option<PathBuf>,
    stdout: bool,
    port: u32,
    format: FormatArgs,
    quiet: bool,
    strict: bool,
) -> Result<(), CliError> {
    let resolved_input = resolve_input_path(&input)?;
    validate_input_file(&resolved_input)?;
    let input_abs = fs::canonicalize(&resolved_input)
        .with_context(|| format!("Failed to resolve input path: {}", resolved_input.display()))?;

    let report = if stdout {
        None
    } else {
        Some(report.ok_or_else(|| {
            CliError::new(
                "missing output path",
                Some("use -o/--report or --stdout".to_string()),
            )
        })?)
    };

    if let Some(report_path) = report.as_ref() {
        ensure_distinct_output(report_path, &input_abs)?;
    }

    let rep = abeeway_core::decode_file(&resolved_input, port, &abeeway_core::SystemClock)
        .context("uplink batch decoding failed")?;
    let json = serialize_json(&rep, format)?;

    match report {
        None => println!("{}", json),
        Some(report) => {
            if let Some(parent) = report.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create output directory: {}", parent.display())
                    })?;
                }
            }
            fs::write(&report, json)
                .with_context(|| format!("Failed to write report: {}", report.display()))?;
            if !quiet {
                eprintln!("OK: report written -> {}", report.display());
            }
        }
    }

    if strict && rep.has_problems() {
        return Err(CliError::new(
            format!(
                "{} uplink(s) failed, {} decoded with errors",
                rep.summary.failed, rep.summary.with_errors
            ),
            Some("inspect the report entries for 'failure' or 'error' fields".to_string()),
        ));
    }
    Ok(())
}

fn ensure_distinct_output(report_path: &Path, input_abs: &Path) -> Result<(), CliError> {
    let report_dir = report_path
        .parent()
        .map(|parent| {
            if parent.as_os_str().is_empty() {
                fs::canonicalize(".")
            } else {
                fs::canonicalize(parent)
            }
        })
        .transpose();
    // A missing output directory cannot contain the input.
    let Ok(Some(report_dir)) = report_dir else {
        return Ok(());
    };
    let file_name = report_path
        .file_name()
        .ok_or_else(|| CliError::new("invalid report path", None))?;
    if report_dir.join(file_name).as_path() == input_abs {
        return Err(CliError::new(
            format!(
                "report path must differ from input: {}",
                report_path.display()
            ),
            Some("choose a different output path".to_string()),
        ));
    }
    Ok(())
}

fn serialize_json<T: serde::Serialize>(value: &T, format: FormatArgs) -> Result<String, CliError> {
    if format.pretty {
        serde_json::to_string_pretty(value)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(value)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

fn validate_input_file(input: &PathBuf) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("pass a text file with one hex uplink per line".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("pass a text file with one hex uplink per line".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &PathBuf) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.clone());
    }

    let mut matches = Vec::new();
    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    match matches.len() {
        0 => Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern".to_string()),
        )),
        1 => Ok(matches.remove(0)),
        count => {
            let listed = matches
                .iter()
                .take(3)
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            let more = if count > 3 { ", ..." } else { "" };
            Err(CliError::new(
                format!(
                    "multiple files match pattern '{}' ({} matches); matches: {}{}",
                    pattern, count, listed, more
                ),
                Some("pass a single uplink file, or run once per file".to_string()),
            ))
        }
    }
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
