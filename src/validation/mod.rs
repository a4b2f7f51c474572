//! Document validation for wpdkit.
//!
//! Parsing already rejects documents that are structurally unusable. This
//! module reports everything else worth knowing about a document:
//! - Naming problems (duplicate or empty axis and dataset names)
//! - Calibrations that cannot be resolved
//! - Point data quality (non-finite values, values that disagree with the
//!   calibration)
//! - Colours outside 0..=255, which the file format itself never enforces

mod report;

pub use report::{IssueCode, IssueContext, Severity, ValidationIssue, ValidationReport};

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::calibration::{approx_eq, AxisCalibration};
use crate::wpd::{Dataset, Document};

/// Default relative tolerance when comparing stored and recomputed values.
pub const DEFAULT_VALUE_TOLERANCE: f64 = 1e-4;

/// Options for validation behavior.
#[derive(Clone, Debug)]
pub struct ValidateOptions {
    /// If true, treat warnings as errors.
    pub strict: bool,
    /// Relative tolerance for [`IssueCode::ValueMismatch`].
    pub value_tolerance: f64,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            strict: false,
            value_tolerance: DEFAULT_VALUE_TOLERANCE,
        }
    }
}

/// Validates a document and returns a report of all issues found.
///
/// In strict mode every warning is reported as an error.
pub fn validate_document(doc: &Document, opts: &ValidateOptions) -> ValidationReport {
    let mut report = ValidationReport::new();

    let calibrations = validate_axes(doc, &mut report);
    validate_datasets(doc, &calibrations, opts, &mut report);

    if opts.strict {
        for issue in &mut report.issues {
            issue.severity = Severity::Error;
        }
    }

    if !report.is_clean() {
        tracing::warn!(
            errors = report.error_count(),
            warnings = report.warning_count(),
            "validation found issues"
        );
    }
    report
}

/// Validates axis names and calibrations. Returns the axes that resolved.
fn validate_axes<'a>(
    doc: &'a Document,
    report: &mut ValidationReport,
) -> BTreeMap<&'a str, AxisCalibration> {
    let mut calibrations = BTreeMap::new();
    let mut seen: HashMap<&str, usize> = HashMap::new();
    let referenced: HashSet<&str> = doc.datasets.iter().map(|d| d.axes_name.as_str()).collect();

    for (idx, axis) in doc.axes.iter().enumerate() {
        let context = || IssueContext::Axis {
            name: axis.name.clone(),
        };

        if axis.name.is_empty() {
            report.add(ValidationIssue::warning(
                IssueCode::EmptyAxisName,
                format!("Empty axis name (axis at index {})", idx),
                context(),
            ));
        }

        if let Some(first_idx) = seen.get(axis.name.as_str()) {
            report.add(ValidationIssue::warning(
                IssueCode::DuplicateAxisName,
                format!(
                    "Duplicate axis name (first seen at index {}); references resolve to the first",
                    first_idx
                ),
                context(),
            ));
            continue;
        }
        seen.insert(&axis.name, idx);

        if !referenced.contains(axis.name.as_str()) {
            report.add(ValidationIssue::warning(
                IssueCode::UnusedAxis,
                "Axis is not used by any dataset",
                context(),
            ));
        }

        match AxisCalibration::from_axis(axis) {
            Ok(calibration) => {
                calibrations.insert(axis.name.as_str(), calibration);
            }
            Err(err) => report.add(ValidationIssue::error(
                IssueCode::DegenerateCalibration,
                err.to_string(),
                context(),
            )),
        }
    }

    calibrations
}

/// Validates datasets, their colours and their points.
fn validate_datasets(
    doc: &Document,
    calibrations: &BTreeMap<&str, AxisCalibration>,
    opts: &ValidateOptions,
    report: &mut ValidationReport,
) {
    let axis_names: HashSet<&str> = doc.axes.iter().map(|a| a.name.as_str()).collect();
    let mut seen_names: HashMap<&str, usize> = HashMap::new();

    for (idx, dataset) in doc.datasets.iter().enumerate() {
        let context = || IssueContext::Dataset {
            name: dataset.name.clone(),
        };

        if dataset.name.is_empty() {
            report.add(ValidationIssue::warning(
                IssueCode::EmptyDatasetName,
                format!("Empty dataset name (dataset at index {})", idx),
                context(),
            ));
        } else if let Some(first_idx) = seen_names.get(dataset.name.as_str()) {
            report.add(ValidationIssue::warning(
                IssueCode::DuplicateDatasetName,
                format!("Duplicate dataset name (first seen at index {})", first_idx),
                context(),
            ));
        } else {
            seen_names.insert(&dataset.name, idx);
        }

        if !axis_names.contains(dataset.axes_name.as_str()) {
            report.add(ValidationIssue::error(
                IssueCode::MissingAxisRef,
                format!("References non-existent axis '{}'", dataset.axes_name),
                context(),
            ));
        }

        if dataset.points.is_empty() {
            report.add(ValidationIssue::warning(
                IssueCode::EmptyDataset,
                "Dataset has no points",
                context(),
            ));
        }

        validate_colors(dataset, report);

        let calibration = calibrations.get(dataset.axes_name.as_str());
        validate_points(dataset, calibration, opts.value_tolerance, report);
    }
}

fn validate_colors(dataset: &Dataset, report: &mut ValidationReport) {
    let mut check = |label: &str, components: &[i64]| {
        if components.iter().any(|c| !(0..=255).contains(c)) {
            report.add(ValidationIssue::warning(
                IssueCode::ColorOutOfRange,
                format!("{} {:?} has a component outside 0..=255", label, components),
                IssueContext::Dataset {
                    name: dataset.name.clone(),
                },
            ));
        }
    };

    check("colorRGB", &dataset.color_rgb[..]);
    if let Some(auto) = &dataset.auto_detection {
        check("fgColor", &auto.fg_color[..]);
        check("bgColor", &auto.bg_color[..]);
    }

    if let Some(auto) = &dataset.auto_detection {
        if auto.image_width == 0 || auto.image_height == 0 {
            report.add(ValidationIssue::warning(
                IssueCode::InvalidImageDimensions,
                format!(
                    "Auto-detection image size {}x{} (must be positive)",
                    auto.image_width, auto.image_height
                ),
                IssueContext::Dataset {
                    name: dataset.name.clone(),
                },
            ));
        }
    }
}

fn validate_points(
    dataset: &Dataset,
    calibration: Option<&AxisCalibration>,
    tolerance: f64,
    report: &mut ValidationReport,
) {
    for (index, point) in dataset.points.iter().enumerate() {
        let context = || IssueContext::Point {
            dataset: dataset.name.clone(),
            index,
        };

        if !point.pixel().is_finite() || !point.data().is_finite() {
            report.add(ValidationIssue::error(
                IssueCode::PointNotFinite,
                format!(
                    "Non-finite point: pixel ({}, {}), value ({}, {})",
                    point.x, point.y, point.value[0], point.value[1]
                ),
                context(),
            ));
            continue; // Skip calibration check if coordinates are invalid
        }

        let Some(calibration) = calibration else {
            continue;
        };
        let expected = calibration.calibrate(point);
        if !approx_eq(expected.x, point.value[0], tolerance)
            || !approx_eq(expected.y, point.value[1], tolerance)
        {
            report.add(ValidationIssue::warning(
                IssueCode::ValueMismatch,
                format!(
                    "Stored value ({}, {}) differs from calibrated ({:.6}, {:.6})",
                    point.value[0], point.value[1], expected.x, expected.y
                ),
                context(),
            ));
        }
    }
}
