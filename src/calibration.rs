//! Pixel ↔ data transforms derived from axis calibration points.
//!
//! Each axis is calibrated the way WebPlotDigitizer calibrates cartesian
//! axes: X1 and X2 fix the x values along one pixel direction, Y1 and Y2 fix
//! the y values along another. The resulting map is affine in (log-)data
//! space:
//!
//! ```text
//! [u]   [a0 a1] [px]   [c0]        x = u, or 10^u when isLogX
//! [v] = [a2 a3] [py] + [c1]        y = v, or 10^v when isLogY
//! ```
//!
//! `A = diag(x1 - x2, y1 - y2) · P⁻¹`, where the columns of `P` are the pixel
//! vectors X1 - X2 and Y1 - Y2. With `noRotation` set, `P` is diagonal and x
//! depends on `px` alone, y on `py` alone.
//!
//! # Exactness
//!
//! X calibration points reproduce their `dx` and Y calibration points their
//! `dy`. The other component of a calibration point is not part of the
//! calibration.

use std::collections::BTreeMap;

use crate::error::CoordinateError;
use crate::wpd::{Axis, CalibrationPoint, Coord, Data, Document, Pixel, Point};

/// Relative tolerance for pixel-matrix singularity.
const SINGULAR_EPS: f64 = 1e-12;

/// A solved pixel ↔ data transform for one axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisCalibration {
    a: [f64; 4],
    c: [f64; 2],
    is_log_x: bool,
    is_log_y: bool,
}

impl AxisCalibration {
    /// Solves the transform for an axis.
    ///
    /// # Errors
    /// Returns [`CoordinateError`] if the calibration points cannot determine
    /// a transform: coincident or parallel pixel axes, equal data values on
    /// one dimension, or non-positive values on a log-scaled dimension.
    pub fn from_axis(axis: &Axis) -> Result<Self, CoordinateError> {
        let [x1, x2, y1, y2] = &axis.calibration_points;

        let xd1 = scaled_value(axis, 0, x1, 'x')?;
        let xd2 = scaled_value(axis, 1, x2, 'x')?;
        let yd1 = scaled_value(axis, 2, y1, 'y')?;
        let yd2 = scaled_value(axis, 3, y2, 'y')?;

        if xd1 == xd2 {
            return Err(CoordinateError::ZeroDataSpan {
                axis: axis.name.clone(),
                dimension: 'x',
                value: x1.dx.value().unwrap_or(xd1),
            });
        }
        if yd1 == yd2 {
            return Err(CoordinateError::ZeroDataSpan {
                axis: axis.name.clone(),
                dimension: 'y',
                value: y1.dy.value().unwrap_or(yd1),
            });
        }

        // Columns: x-axis pixel vector, y-axis pixel vector.
        let p = if axis.no_rotation {
            [x1.px - x2.px, 0.0, 0.0, y1.py - y2.py]
        } else {
            [x1.px - x2.px, y1.px - y2.px, x1.py - x2.py, y1.py - y2.py]
        };

        let degenerate = |reason: &str| CoordinateError::DegeneratePixels {
            axis: axis.name.clone(),
            reason: reason.to_string(),
        };
        let x_len = p[0].hypot(p[2]);
        let y_len = p[1].hypot(p[3]);
        if x_len == 0.0 {
            return Err(degenerate("x-axis calibration pixels have no span"));
        }
        if y_len == 0.0 {
            return Err(degenerate("y-axis calibration pixels have no span"));
        }
        let det = p[0] * p[3] - p[1] * p[2];
        if det.abs() <= SINGULAR_EPS * x_len * y_len {
            return Err(degenerate("x and y calibration axes are parallel"));
        }

        let dx = xd1 - xd2;
        let dy = yd1 - yd2;
        let a = [
            dx * p[3] / det,
            -dx * p[1] / det,
            -dy * p[2] / det,
            dy * p[0] / det,
        ];
        let c = [
            xd1 - a[0] * x1.px - a[1] * x1.py,
            yd1 - a[2] * y1.px - a[3] * y1.py,
        ];

        Ok(Self {
            a,
            c,
            is_log_x: axis.is_log_x,
            is_log_y: axis.is_log_y,
        })
    }

    /// Maps a pixel position to data space.
    pub fn pixel_to_data(&self, pixel: Coord<Pixel>) -> Coord<Data> {
        let u = self.a[0] * pixel.x + self.a[1] * pixel.y + self.c[0];
        let v = self.a[2] * pixel.x + self.a[3] * pixel.y + self.c[1];
        Coord::new(unscale(u, self.is_log_x), unscale(v, self.is_log_y))
    }

    /// Maps a data value back to its pixel position.
    ///
    /// Returns `None` for non-positive values on a log-scaled dimension.
    pub fn data_to_pixel(&self, data: Coord<Data>) -> Option<Coord<Pixel>> {
        let u = scale(data.x, self.is_log_x)? - self.c[0];
        let v = scale(data.y, self.is_log_y)? - self.c[1];
        let det = self.a[0] * self.a[3] - self.a[1] * self.a[2];
        Some(Coord::new(
            (self.a[3] * u - self.a[1] * v) / det,
            (self.a[0] * v - self.a[2] * u) / det,
        ))
    }

    /// Data value of a digitized point, computed from its pixel position.
    #[inline]
    pub fn calibrate(&self, point: &Point) -> Coord<Data> {
        self.pixel_to_data(point.pixel())
    }

    pub fn is_log_x(&self) -> bool {
        self.is_log_x
    }

    pub fn is_log_y(&self) -> bool {
        self.is_log_y
    }
}

/// The calibrated value of point `index`, in log space for log dimensions.
fn scaled_value(
    axis: &Axis,
    index: usize,
    point: &CalibrationPoint,
    dimension: char,
) -> Result<f64, CoordinateError> {
    let (value, is_log) = match dimension {
        'x' => (point.dx.value(), axis.is_log_x),
        _ => (point.dy.value(), axis.is_log_y),
    };
    let value = value.ok_or_else(|| CoordinateError::MissingValue {
        axis: axis.name.clone(),
        index,
        dimension,
    })?;
    scale(value, is_log).ok_or_else(|| CoordinateError::NonPositiveLog {
        axis: axis.name.clone(),
        dimension,
        value,
    })
}

fn scale(value: f64, is_log: bool) -> Option<f64> {
    if !is_log {
        Some(value)
    } else if value > 0.0 {
        Some(value.log10())
    } else {
        None
    }
}

fn unscale(value: f64, is_log: bool) -> f64 {
    if is_log {
        10f64.powf(value)
    } else {
        value
    }
}

/// Solves the transform of every axis, keyed by axis name.
///
/// When names repeat, the first axis wins, matching [`Document::axis`].
///
/// # Errors
/// Fails on the first axis whose calibration is degenerate.
pub fn resolve(doc: &Document) -> Result<BTreeMap<String, AxisCalibration>, CoordinateError> {
    let mut map = BTreeMap::new();
    for axis in &doc.axes {
        if map.contains_key(&axis.name) {
            continue;
        }
        let calibration = AxisCalibration::from_axis(axis)?;
        map.insert(axis.name.clone(), calibration);
    }
    tracing::debug!(axes = map.len(), "resolved axis calibrations");
    Ok(map)
}

/// Recomputes every point's data value from its pixel position.
///
/// Returns the number of points updated. The document is left untouched
/// if any axis fails to resolve.
pub fn recalibrate(doc: &mut Document) -> Result<usize, CoordinateError> {
    let calibrations = resolve(doc)?;

    // Check every reference before mutating anything.
    for dataset in &doc.datasets {
        if !calibrations.contains_key(&dataset.axes_name) {
            return Err(CoordinateError::UnknownAxis {
                dataset: dataset.name.clone(),
                axis: dataset.axes_name.clone(),
            });
        }
    }

    let mut updated = 0;
    for dataset in &mut doc.datasets {
        let calibration = &calibrations[&dataset.axes_name];
        for point in &mut dataset.points {
            let data = calibration.calibrate(point);
            point.value = [data.x, data.y];
            updated += 1;
        }
    }
    tracing::info!(points = updated, "recalibrated document");
    Ok(updated)
}

/// Returns true if `a` and `b` agree within `tolerance`, relative to their
/// magnitude (absolute below 1).
pub fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance * a.abs().max(b.abs()).max(1.0)
}
