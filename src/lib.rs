//! wpdkit: read, validate and calibrate WebPlotDigitizer project files.
//!
//! A `wpd.json` document holds axes calibrated by four pixel ↔ data points,
//! and datasets of digitized points bound to an axis by name. This crate
//! parses such documents strictly, writes them back losslessly, and turns
//! each axis calibration into a pixel ↔ data transform.
//!
//! # Modules
//!
//! - [`wpd`]: Document model plus the `wpd.json` reader and writer
//! - [`calibration`]: Per-axis transforms and recalibration
//! - [`validation`]: Document validation and error reporting
//! - [`series`]: Value series and data extents
//! - [`inspect`]: Document summaries
//! - [`export`]: Point export to CSV and JSON records
//! - [`error`]: Error types for wpdkit operations

pub mod calibration;
pub mod error;
pub mod export;
pub mod inspect;
pub mod series;
pub mod validation;
pub mod wpd;

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

pub use error::{CoordinateError, FormatError, WpdError};

/// The wpdkit CLI application.
#[derive(Parser)]
#[command(name = "wpdkit")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Validate a document for errors and warnings.
    Validate(ValidateArgs),
    /// Print a summary of a document.
    Inspect(InspectArgs),
    /// Recompute point values from the axis calibrations and write the result.
    Calibrate(CalibrateArgs),
    /// Export digitized points to CSV or JSON records.
    Export(ExportArgs),
}

/// Arguments for the validate subcommand.
#[derive(clap::Args)]
struct ValidateArgs {
    /// Input wpd.json file to validate.
    input: PathBuf,

    /// Treat warnings as errors (exit non-zero if any warnings).
    #[arg(long, env = "WPDKIT_STRICT")]
    strict: bool,

    /// Output format for the report ('text' or 'json').
    #[arg(long, default_value = "text", env = "WPDKIT_OUTPUT")]
    output: String,

    /// Relative tolerance when comparing stored values to the calibration.
    #[arg(long, default_value_t = validation::DEFAULT_VALUE_TOLERANCE, env = "WPDKIT_TOLERANCE")]
    tolerance: f64,
}

/// Arguments for the inspect subcommand.
#[derive(clap::Args)]
struct InspectArgs {
    /// Input wpd.json file to inspect.
    input: PathBuf,
}

/// Arguments for the calibrate subcommand.
#[derive(clap::Args)]
struct CalibrateArgs {
    /// Input wpd.json file.
    input: PathBuf,

    /// Output file for the recalibrated document.
    #[arg(short, long)]
    output: PathBuf,
}

/// Arguments for the export subcommand.
#[derive(clap::Args)]
struct ExportArgs {
    /// Input wpd.json file.
    input: PathBuf,

    /// Output file.
    #[arg(short, long)]
    output: PathBuf,

    /// Export format ('csv' or 'json').
    #[arg(long = "to", default_value = "csv")]
    to: String,

    /// Only export datasets whose name contains this text.
    #[arg(long)]
    dataset: Option<String>,
}

/// Run the wpdkit CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), WpdError> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Validate(args)) => run_validate(args),
        Some(Commands::Inspect(args)) => run_inspect(args),
        Some(Commands::Calibrate(args)) => run_calibrate(args),
        Some(Commands::Export(args)) => run_export(args),
        None => {
            // No subcommand: just print a help hint and exit successfully
            println!("wpdkit {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Read, validate and calibrate WebPlotDigitizer project files.");
            println!();
            println!("Run 'wpdkit --help' for usage information.");
            Ok(())
        }
    }
}

/// Install the stderr log subscriber. `RUST_LOG` overrides `-v`.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // A subscriber may already be installed when embedded; keep that one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Execute the validate subcommand.
fn run_validate(args: ValidateArgs) -> Result<(), WpdError> {
    let doc = wpd::io_json::read_wpd_json(&args.input)?;

    let opts = validation::ValidateOptions {
        strict: args.strict,
        value_tolerance: args.tolerance,
    };
    let report = validation::validate_document(&doc, &opts);

    match args.output.as_str() {
        "json" => {
            let out = serde_json::json!({
                "error_count": report.error_count(),
                "warning_count": report.warning_count(),
                "issues": report.issues,
            });
            let text = serde_json::to_string_pretty(&out).map_err(|source| {
                WpdError::WpdJsonWrite {
                    path: PathBuf::from("<stdout>"),
                    source,
                }
            })?;
            println!("{}", text);
        }
        "text" => print!("{}", report),
        other => {
            return Err(WpdError::UnsupportedFormat(format!(
                "'{}' (supported: text, json)",
                other
            )));
        }
    }

    // Strict mode has already promoted warnings to errors.
    if report.error_count() > 0 {
        Err(WpdError::ValidationFailed {
            error_count: report.error_count(),
            warning_count: report.warning_count(),
            report,
        })
    } else {
        Ok(())
    }
}

/// Execute the inspect subcommand.
fn run_inspect(args: InspectArgs) -> Result<(), WpdError> {
    let doc = wpd::io_json::read_wpd_json(&args.input)?;
    let report = inspect::inspect_document(&doc, &inspect::InspectOptions::default());
    print!("{}", report);
    Ok(())
}

/// Execute the calibrate subcommand.
fn run_calibrate(args: CalibrateArgs) -> Result<(), WpdError> {
    let mut doc = wpd::io_json::read_wpd_json(&args.input)?;
    let updated = calibration::recalibrate(&mut doc)?;
    wpd::io_json::write_wpd_json(&args.output, &doc)?;

    tracing::info!(output = %args.output.display(), "wrote recalibrated document");
    println!(
        "Recalibrated {} point(s) into {}",
        updated,
        args.output.display()
    );
    Ok(())
}

/// Execute the export subcommand.
fn run_export(args: ExportArgs) -> Result<(), WpdError> {
    let doc = wpd::io_json::read_wpd_json(&args.input)?;
    let opts = export::ExportOptions {
        dataset_filter: args.dataset,
    };

    match args.to.as_str() {
        "csv" => export::write_points_csv(&args.output, &doc, &opts)?,
        "json" => export::write_records_json(&args.output, &doc, &opts)?,
        other => {
            return Err(WpdError::UnsupportedFormat(format!(
                "'{}' (supported: csv, json)",
                other
            )));
        }
    }

    tracing::info!(output = %args.output.display(), format = %args.to, "exported points");
    Ok(())
}
