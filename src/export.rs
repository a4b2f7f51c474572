//! Point export to flat formats.
//!
//! - CSV: one row per point with `dataset,axis,index,px,py,x,y` columns.
//! - JSON records: an array of `{"x": .., "y": ..}` data values, the shape
//!   plotting and fitting tools load directly.
//!
//! Both can be restricted to datasets whose name contains a substring.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::error::WpdError;
use crate::wpd::{Coord, Data, Dataset, Document};

/// Options for point export.
#[derive(Clone, Debug, Default)]
pub struct ExportOptions {
    /// Only export datasets whose name contains this substring.
    pub dataset_filter: Option<String>,
}

impl ExportOptions {
    fn includes(&self, dataset: &Dataset) -> bool {
        self.dataset_filter
            .as_deref()
            .map_or(true, |needle| dataset.name.contains(needle))
    }
}

#[derive(Debug, Serialize)]
struct PointRow<'a> {
    dataset: &'a str,
    axis: &'a str,
    index: usize,
    px: f64,
    py: f64,
    x: f64,
    y: f64,
}

fn point_rows<'a>(doc: &'a Document, opts: &'a ExportOptions) -> impl Iterator<Item = PointRow<'a>> {
    doc.datasets
        .iter()
        .filter(move |d| opts.includes(d))
        .flat_map(|d| {
            d.points.iter().enumerate().map(move |(index, p)| PointRow {
                dataset: &d.name,
                axis: &d.axes_name,
                index,
                px: p.x,
                py: p.y,
                x: p.value[0],
                y: p.value[1],
            })
        })
}

fn write_csv_rows<W: Write>(
    writer: W,
    doc: &Document,
    opts: &ExportOptions,
    path: &Path,
) -> Result<W, WpdError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in point_rows(doc, opts) {
        csv_writer
            .serialize(&row)
            .map_err(|source| WpdError::CsvWrite {
                path: path.to_path_buf(),
                source,
            })?;
    }
    csv_writer
        .into_inner()
        .map_err(|e| WpdError::Io(e.into_error()))
}

/// Writes every exported point to a CSV file.
pub fn write_points_csv(path: &Path, doc: &Document, opts: &ExportOptions) -> Result<(), WpdError> {
    let file = File::create(path).map_err(WpdError::Io)?;
    write_csv_rows(BufWriter::new(file), doc, opts, path)?
        .flush()
        .map_err(WpdError::Io)?;
    Ok(())
}

/// Writes every exported point to a CSV string.
///
/// Useful for testing without file I/O.
pub fn to_points_csv_string(doc: &Document, opts: &ExportOptions) -> Result<String, WpdError> {
    let dummy_path = Path::new("<string>");
    let bytes = write_csv_rows(Vec::new(), doc, opts, dummy_path)?;

    String::from_utf8(bytes).map_err(|e| WpdError::ExportInvalid {
        path: dummy_path.to_path_buf(),
        message: format!("Invalid UTF-8 in output: {}", e),
    })
}

fn records(doc: &Document, opts: &ExportOptions) -> Vec<Coord<Data>> {
    point_rows(doc, opts)
        .map(|row| Coord::new(row.x, row.y))
        .collect()
}

/// Serializes exported data values as a JSON array of `{x, y}` records.
pub fn to_records_json_string(
    doc: &Document,
    opts: &ExportOptions,
) -> Result<String, serde_json::Error> {
    serde_json::to_string(&records(doc, opts))
}

/// Writes exported data values as JSON records to a file.
pub fn write_records_json(
    path: &Path,
    doc: &Document,
    opts: &ExportOptions,
) -> Result<(), WpdError> {
    let file = File::create(path).map_err(WpdError::Io)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, &records(doc, opts)).map_err(|source| {
        WpdError::WpdJsonWrite {
            path: path.to_path_buf(),
            source,
        }
    })?;
    writer.flush()?;
    Ok(())
}
