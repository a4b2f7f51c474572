//! Core document model for WebPlotDigitizer project files.
//!
//! A [`Document`] is built by [`super::io_json`] after the raw file has been
//! checked, and serializes straight back to the `wpd.json` wire shape.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::coord::Coord;
use super::space::{Data, Pixel};
use super::value::{DataValue, FormatVersion};

/// Colour WebPlotDigitizer assigns to new datasets.
pub const DEFAULT_DATASET_COLOR: [i64; 4] = [200, 0, 0, 255];

/// A complete `wpd.json` document.
///
/// List order is significant everywhere: datasets, axes and points keep the
/// order they were read in.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Document {
    /// Format version, written as `[major, minor]`.
    pub version: FormatVersion,

    /// Axis definitions (`axesColl`).
    #[serde(rename = "axesColl")]
    pub axes: Vec<Axis>,

    /// Digitized datasets (`datasetColl`).
    #[serde(rename = "datasetColl")]
    pub datasets: Vec<Dataset>,

    /// Distance/angle/area measurements. Kept verbatim.
    #[serde(rename = "measurementColl", skip_serializing_if = "Option::is_none")]
    pub measurements: Option<Vec<Value>>,

    /// Top-level keys this crate does not interpret.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Document {
    /// Creates an empty document at the current format version.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up an axis by name. Duplicate names resolve to the first axis.
    pub fn axis(&self, name: &str) -> Option<&Axis> {
        self.axes.iter().find(|a| a.name == name)
    }

    /// Builds a name-to-axis lookup table.
    pub fn axes_by_name(&self) -> BTreeMap<&str, &Axis> {
        let mut map = BTreeMap::new();
        for axis in &self.axes {
            map.entry(axis.name.as_str()).or_insert(axis);
        }
        map
    }

    /// Looks up a dataset by name.
    pub fn dataset(&self, name: &str) -> Option<&Dataset> {
        self.datasets.iter().find(|d| d.name == name)
    }

    /// Total number of digitized points across all datasets.
    pub fn point_count(&self) -> usize {
        self.datasets.iter().map(|d| d.points.len()).sum()
    }
}

/// A named coordinate system defined by four calibration points.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Axis {
    pub name: String,

    /// Axis type tag, e.g. `XYAxes`.
    #[serde(rename = "type")]
    pub kind: String,

    pub is_log_x: bool,
    pub is_log_y: bool,
    pub no_rotation: bool,

    /// X1, X2 on the x-axis followed by Y1, Y2 on the y-axis.
    pub calibration_points: [CalibrationPoint; 4],

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Axis {
    /// The type tag WebPlotDigitizer uses for cartesian axes.
    pub const XY_KIND: &'static str = "XYAxes";

    /// Creates a linear cartesian axis.
    pub fn xy(name: impl Into<String>, calibration_points: [CalibrationPoint; 4]) -> Self {
        Self {
            name: name.into(),
            kind: Self::XY_KIND.to_string(),
            is_log_x: false,
            is_log_y: false,
            no_rotation: false,
            calibration_points,
            extra: BTreeMap::new(),
        }
    }

    /// Marks the axes as logarithmic.
    pub fn with_log(mut self, is_log_x: bool, is_log_y: bool) -> Self {
        self.is_log_x = is_log_x;
        self.is_log_y = is_log_y;
        self
    }

    /// Sets the rotation-suppression flag.
    pub fn with_no_rotation(mut self, no_rotation: bool) -> Self {
        self.no_rotation = no_rotation;
        self
    }
}

/// A known pixel ↔ data correspondence.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CalibrationPoint {
    pub px: f64,
    pub py: f64,
    pub dx: DataValue,
    pub dy: DataValue,
    /// Unused by cartesian axes; written as `null` when absent.
    pub dz: Option<f64>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl CalibrationPoint {
    /// Creates a calibration point with both data components set.
    pub fn new(px: f64, py: f64, dx: f64, dy: f64) -> Self {
        Self {
            px,
            py,
            dx: DataValue::new(dx),
            dy: DataValue::new(dy),
            dz: None,
            extra: BTreeMap::new(),
        }
    }

    /// Creates an x-axis calibration point (`dy` is written as `"0"`).
    pub fn x_axis(px: f64, py: f64, dx: f64) -> Self {
        Self::new(px, py, dx, 0.0)
    }

    /// Creates a y-axis calibration point (`dx` is written as `"0"`).
    pub fn y_axis(px: f64, py: f64, dy: f64) -> Self {
        Self::new(px, py, 0.0, dy)
    }

    /// Pixel position of this calibration point.
    #[inline]
    pub fn pixel(&self) -> Coord<Pixel> {
        Coord::new(self.px, self.py)
    }
}

/// A named collection of digitized points bound to one axis.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub name: String,

    /// Name of the axis the points were calibrated against.
    pub axes_name: String,

    /// RGBA. Out-of-range components are kept and reported by validation.
    #[serde(rename = "colorRGB")]
    pub color_rgb: [i64; 4],

    pub metadata_keys: Vec<String>,

    #[serde(rename = "data")]
    pub points: Vec<Point>,

    #[serde(
        rename = "autoDetectionData",
        skip_serializing_if = "Option::is_none"
    )]
    pub auto_detection: Option<AutoDetectionData>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Dataset {
    /// Creates an empty dataset bound to the named axis.
    pub fn new(name: impl Into<String>, axes_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            axes_name: axes_name.into(),
            color_rgb: DEFAULT_DATASET_COLOR,
            metadata_keys: Vec::new(),
            points: Vec::new(),
            auto_detection: None,
            extra: BTreeMap::new(),
        }
    }

    /// Appends a point.
    pub fn with_point(mut self, point: Point) -> Self {
        self.points.push(point);
        self
    }

    /// Sets the dataset colour.
    pub fn with_color(mut self, color_rgb: [i64; 4]) -> Self {
        self.color_rgb = color_rgb;
        self
    }
}

/// One digitized point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Pixel x.
    pub x: f64,
    /// Pixel y.
    pub y: f64,
    /// Calibrated data-space value.
    pub value: [f64; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Point {
    /// Creates a point from its pixel position and data value.
    pub fn new(x: f64, y: f64, value: [f64; 2]) -> Self {
        Self {
            x,
            y,
            value,
            metadata: None,
            extra: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn pixel(&self) -> Coord<Pixel> {
        Coord::new(self.x, self.y)
    }

    #[inline]
    pub fn data(&self) -> Coord<Data> {
        Coord::new(self.value[0], self.value[1])
    }
}

/// Parameters for semi-automatic colour-based curve tracing.
///
/// Advisory only; manual point data is valid without it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AutoDetectionData {
    pub fg_color: [i64; 3],
    pub bg_color: [i64; 3],
    /// Masked pixels. The shape varies between releases, so it is kept as-is.
    pub mask: Value,
    pub color_detection_mode: String,
    pub color_distance: u32,
    pub algorithm: Algorithm,
    pub image_width: u32,
    pub image_height: u32,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Default for AutoDetectionData {
    fn default() -> Self {
        Self {
            fg_color: [0, 0, 255],
            bg_color: [255, 255, 255],
            mask: Value::Null,
            color_detection_mode: "fg".to_string(),
            color_distance: 120,
            algorithm: Algorithm::default(),
            image_width: 0,
            image_height: 0,
            extra: BTreeMap::new(),
        }
    }
}

/// Curve-tracing algorithm descriptor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Algorithm {
    pub algo_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_step: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_step: Option<f64>,
    /// Algorithm-specific parameters.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Default for Algorithm {
    fn default() -> Self {
        Self {
            algo_type: "AveragingWindowAlgo".to_string(),
            x_step: Some(10.0),
            y_step: Some(10.0),
            extra: BTreeMap::new(),
        }
    }
}
