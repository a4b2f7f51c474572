//! Document inspection.
//!
//! This module summarises a document: counts, axis scales and calibration
//! status, and per-dataset point counts with their data extents.

mod report;

pub use report::{AxisRow, DatasetRow, InspectReport, SummarySection};

use crate::calibration::AxisCalibration;
use crate::series::{dataset_series, document_extent};
use crate::wpd::Document;

/// Options for document inspection.
#[derive(Clone, Debug)]
pub struct InspectOptions {
    /// Width of point-count bars (in characters).
    pub bar_width: usize,
}

impl Default for InspectOptions {
    fn default() -> Self {
        Self { bar_width: 20 }
    }
}

/// Inspect a document and produce a report.
pub fn inspect_document(doc: &Document, opts: &InspectOptions) -> InspectReport {
    let summary = SummarySection {
        version: doc.version.to_string(),
        axes: doc.axes.len(),
        datasets: doc.datasets.len(),
        points: doc.point_count(),
        measurements: doc.measurements.as_ref().map_or(0, Vec::len),
        auto_detected: doc
            .datasets
            .iter()
            .filter(|d| d.auto_detection.is_some())
            .count(),
    };

    let axes = doc
        .axes
        .iter()
        .map(|axis| AxisRow {
            name: axis.name.clone(),
            kind: axis.kind.clone(),
            is_log_x: axis.is_log_x,
            is_log_y: axis.is_log_y,
            calibration_error: AxisCalibration::from_axis(axis)
                .err()
                .map(|e| e.to_string()),
        })
        .collect();

    let datasets = doc
        .datasets
        .iter()
        .map(|ds| DatasetRow {
            name: ds.name.clone(),
            axis: ds.axes_name.clone(),
            points: ds.points.len(),
            extent: dataset_series(ds).extent(),
        })
        .collect();

    InspectReport {
        summary,
        axes,
        datasets,
        extent: document_extent(doc),
        bar_width: opts.bar_width,
    }
}
