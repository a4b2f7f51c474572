//! Inspect report types and terminal formatting.

use std::fmt;

use crate::series::DataExtent;

/// The result of inspecting a document.
#[derive(Clone, Debug)]
pub struct InspectReport {
    /// Summary counts for the document.
    pub summary: SummarySection,
    /// One row per axis.
    pub axes: Vec<AxisRow>,
    /// One row per dataset, in document order.
    pub datasets: Vec<DatasetRow>,
    /// Extent of every point value, if any are finite.
    pub extent: Option<DataExtent>,
    /// Display options for formatting.
    pub(crate) bar_width: usize,
}

/// Summary counts for the document.
#[derive(Clone, Debug, Default)]
pub struct SummarySection {
    /// Format version as `major.minor`.
    pub version: String,
    pub axes: usize,
    pub datasets: usize,
    pub points: usize,
    /// Entries in `measurementColl`.
    pub measurements: usize,
    /// Datasets carrying auto-detection parameters.
    pub auto_detected: usize,
}

/// One axis with its scale flags and whether it calibrates.
#[derive(Clone, Debug)]
pub struct AxisRow {
    pub name: String,
    pub kind: String,
    pub is_log_x: bool,
    pub is_log_y: bool,
    /// `None` if calibration resolved, otherwise the reason it did not.
    pub calibration_error: Option<String>,
}

/// One dataset with its point count and extent.
#[derive(Clone, Debug)]
pub struct DatasetRow {
    pub name: String,
    pub axis: String,
    pub points: usize,
    pub extent: Option<DataExtent>,
}

impl fmt::Display for InspectReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "╭─────────────────────────────────────────────────────────────╮")?;
        writeln!(f, "│              📈  WPD Document Inspection Report             │")?;
        writeln!(f, "╰─────────────────────────────────────────────────────────────╯")?;
        writeln!(f)?;

        self.fmt_summary(f)?;
        writeln!(f)?;
        self.fmt_axes(f)?;
        writeln!(f)?;
        self.fmt_datasets(f)?;

        Ok(())
    }
}

impl InspectReport {
    fn fmt_summary(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.summary;

        writeln!(f, "┌─ Summary ─────────────────────────────────────────────────┐")?;
        writeln!(f, "│   Version:       {:>8}", s.version)?;
        writeln!(f, "│   Axes:          {:>8}", format_number(s.axes))?;
        writeln!(f, "│   Datasets:      {:>8}", format_number(s.datasets))?;
        writeln!(f, "│   Points:        {:>8}", format_number(s.points))?;
        if s.measurements > 0 {
            writeln!(f, "│   Measurements:  {:>8}", format_number(s.measurements))?;
        }
        if s.auto_detected > 0 {
            writeln!(f, "│   Auto-detect:   {:>8}", format_number(s.auto_detected))?;
        }
        match &self.extent {
            Some(e) => {
                writeln!(f, "│   X range:       {} .. {}", fmt_value(e.x_min), fmt_value(e.x_max))?;
                writeln!(f, "│   Y range:       {} .. {}", fmt_value(e.y_min), fmt_value(e.y_max))?;
            }
            None => writeln!(f, "│   No finite point values.")?,
        }
        writeln!(f, "└───────────────────────────────────────────────────────────┘")?;

        Ok(())
    }

    fn fmt_axes(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = format!("Axes ({})", self.axes.len());
        writeln!(f, "┌─ {} {}┐", header, "─".repeat(57usize.saturating_sub(header.len())))?;

        for axis in &self.axes {
            let scale = match (axis.is_log_x, axis.is_log_y) {
                (false, false) => "linear",
                (true, false) => "log-x",
                (false, true) => "log-y",
                (true, true) => "log-log",
            };
            let status = match &axis.calibration_error {
                None => "✓ calibrated".to_string(),
                Some(reason) => format!("✗ {}", reason),
            };
            writeln!(
                f,
                "│   {:<16} {:<10} {:<8} {}",
                truncate_label(&axis.name, 16),
                truncate_label(&axis.kind, 10),
                scale,
                status
            )?;
        }
        writeln!(f, "└───────────────────────────────────────────────────────────┘")?;

        Ok(())
    }

    fn fmt_datasets(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = format!("Datasets ({})", self.datasets.len());
        writeln!(f, "┌─ {} {}┐", header, "─".repeat(57usize.saturating_sub(header.len())))?;

        if self.datasets.is_empty() {
            writeln!(f, "│   No datasets found.")?;
        } else {
            let max_points = self.datasets.iter().map(|d| d.points).max().unwrap_or(0);
            for ds in &self.datasets {
                let bar = render_bar(ds.points, max_points, self.bar_width);
                writeln!(
                    f,
                    "│   {:<16} {:<8} {:>7}  {}",
                    truncate_label(&ds.name, 16),
                    truncate_label(&ds.axis, 8),
                    format_number(ds.points),
                    bar
                )?;
                if let Some(e) = &ds.extent {
                    writeln!(
                        f,
                        "│     x {} .. {}   y {} .. {}",
                        fmt_value(e.x_min),
                        fmt_value(e.x_max),
                        fmt_value(e.y_min),
                        fmt_value(e.y_max)
                    )?;
                }
            }
        }
        writeln!(f, "└───────────────────────────────────────────────────────────┘")?;

        Ok(())
    }
}

/// Format a number with thousands separators.
fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Format a data value compactly.
fn fmt_value(v: f64) -> String {
    if v != 0.0 && (v.abs() >= 1e6 || v.abs() < 1e-3) {
        format!("{:.3e}", v)
    } else {
        format!("{:.4}", v)
    }
}

/// Render a horizontal bar using Unicode block characters.
fn render_bar(count: usize, max_count: usize, width: usize) -> String {
    if max_count == 0 || width == 0 {
        return String::new();
    }

    let filled = (count * width) / max_count;
    let filled = filled.min(width); // Clamp to width

    "█".repeat(filled) + &"░".repeat(width - filled)
}

/// Truncate a label to fit in the display column.
fn truncate_label(label: &str, max_len: usize) -> String {
    if label.chars().count() <= max_len {
        label.to_string()
    } else {
        let head: String = label.chars().take(max_len.saturating_sub(1)).collect();
        format!("{}…", head)
    }
}
