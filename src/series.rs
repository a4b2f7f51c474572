//! Data-space value series extracted from datasets.
//!
//! Digitized curves are usually consumed as plain `(x, y)` value lists, one
//! per line on the chart, together with their bounding extent.

use crate::wpd::{Dataset, Document};

/// The data values of one or more datasets, in point order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Series {
    pub name: String,
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
}

impl Series {
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    /// Iterates over `(x, y)` pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.xs.iter().copied().zip(self.ys.iter().copied())
    }

    /// Bounding box of the finite values, or `None` if there are none.
    pub fn extent(&self) -> Option<DataExtent> {
        DataExtent::from_pairs(self.pairs())
    }
}

/// Bounding box in data space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DataExtent {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl DataExtent {
    /// Bounding box of the finite pairs. Non-finite pairs are skipped.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        pairs
            .into_iter()
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .fold(None, |acc: Option<DataExtent>, (x, y)| {
                Some(match acc {
                    None => DataExtent {
                        x_min: x,
                        x_max: x,
                        y_min: y,
                        y_max: y,
                    },
                    Some(e) => e.include(x, y),
                })
            })
    }

    fn include(self, x: f64, y: f64) -> Self {
        Self {
            x_min: self.x_min.min(x),
            x_max: self.x_max.max(x),
            y_min: self.y_min.min(y),
            y_max: self.y_max.max(y),
        }
    }

    /// Smallest extent containing both.
    pub fn union(self, other: DataExtent) -> Self {
        self.include(other.x_min, other.y_min)
            .include(other.x_max, other.y_max)
    }
}

/// Extracts the value series of one dataset.
pub fn dataset_series(dataset: &Dataset) -> Series {
    let (xs, ys) = dataset
        .points
        .iter()
        .map(|p| (p.value[0], p.value[1]))
        .unzip();
    Series {
        name: dataset.name.clone(),
        xs,
        ys,
    }
}

/// Concatenates the series of every dataset whose name contains `needle`.
///
/// Datasets are visited in name order (stable for equal names), so a group
/// of lines such as "growth line 1", "growth line 2" comes out in a fixed
/// order regardless of how the file lists them. Returns `None` when no
/// dataset matches.
pub fn series_matching(doc: &Document, needle: &str) -> Option<Series> {
    let mut matching: Vec<&Dataset> = doc
        .datasets
        .iter()
        .filter(|d| d.name.contains(needle))
        .collect();
    if matching.is_empty() {
        return None;
    }
    matching.sort_by(|a, b| a.name.cmp(&b.name));

    let mut series = Series {
        name: needle.to_string(),
        ..Default::default()
    };
    for dataset in matching {
        for point in &dataset.points {
            series.xs.push(point.value[0]);
            series.ys.push(point.value[1]);
        }
    }
    Some(series)
}

/// Bounding box of every point value in the document.
pub fn document_extent(doc: &Document) -> Option<DataExtent> {
    DataExtent::from_pairs(
        doc.datasets
            .iter()
            .flat_map(|d| d.points.iter().map(|p| (p.value[0], p.value[1]))),
    )
}
