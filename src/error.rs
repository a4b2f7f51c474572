use std::path::PathBuf;
use thiserror::Error;

use crate::validation::ValidationReport;

/// The main error type for wpdkit operations.
#[derive(Debug, Error)]
pub enum WpdError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse WPD JSON from {path}: {source}")]
    WpdJsonParse {
        path: PathBuf,
        #[source]
        source: FormatError,
    },

    #[error("Failed to write JSON to {path}: {source}")]
    WpdJsonWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write CSV to {path}: {source}")]
    CsvWrite {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Invalid export output for {path}: {message}")]
    ExportInvalid { path: PathBuf, message: String },

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Coordinate(#[from] CoordinateError),

    #[error("Validation failed with {error_count} error(s) and {warning_count} warning(s)")]
    ValidationFailed {
        error_count: usize,
        warning_count: usize,
        report: ValidationReport,
    },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// A document that cannot be accepted as a `wpd.json` file.
///
/// Parsing aborts on the first of these; no partial document is returned.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing top-level \"version\"")]
    MissingVersion,

    #[error("\"version\" must be a [major, minor] integer pair, got {0}")]
    InvalidVersion(String),

    #[error("unsupported version {major}.{minor}")]
    UnsupportedVersion { major: u32, minor: u32 },

    #[error("axis '{axis}' has {count} calibration point(s), expected 4")]
    CalibrationPointCount { axis: String, count: usize },

    #[error("axis '{axis}' calibration point {index}: {field} {value} is not a finite number")]
    NonNumericCalibration {
        axis: String,
        index: usize,
        field: &'static str,
        value: String,
    },

    #[error("dataset '{dataset}' references unknown axis '{axis}'")]
    UnknownAxis { dataset: String, axis: String },
}

/// A calibration that cannot produce a pixel to data transform.
///
/// Raised by [`crate::calibration::resolve`], never while parsing.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoordinateError {
    #[error("axis '{axis}': calibration pixels are degenerate ({reason})")]
    DegeneratePixels { axis: String, reason: String },

    #[error("axis '{axis}': calibration point {index} has no {dimension} value")]
    MissingValue {
        axis: String,
        index: usize,
        dimension: char,
    },

    #[error("axis '{axis}': {dimension} calibration values are equal ({value})")]
    ZeroDataSpan {
        axis: String,
        dimension: char,
        value: f64,
    },

    #[error("axis '{axis}': log-scaled {dimension} value {value} must be positive")]
    NonPositiveLog {
        axis: String,
        dimension: char,
        value: f64,
    },

    #[error("dataset '{dataset}' references unknown axis '{axis}'")]
    UnknownAxis { dataset: String, axis: String },
}
