//! WebPlotDigitizer document model.
//!
//! This module defines the in-memory form of a `wpd.json` project: axes
//! calibrated by four points each, datasets of digitized points bound to an
//! axis by name, and the advisory auto-detection block.
//!
//! # Design Principles
//!
//! 1. **Checked at the boundary**: [`io_json`] rejects malformed documents
//!    (bad version, wrong calibration count, dangling axis names), so a
//!    [`Document`] in hand is structurally sound.
//!
//! 2. **Lossless**: calibration text, unknown keys and opaque blocks
//!    (`measurementColl`, `mask`) are preserved for round-tripping.
//!
//! 3. **Typed spaces**: [`Coord<Pixel>`] and [`Coord<Data>`] keep image
//!    positions and plot values apart.
//!
//! # Example
//!
//! ```
//! use wpdkit::wpd::{Axis, CalibrationPoint, Dataset, Document, Point};
//!
//! let mut doc = Document::new();
//! doc.axes.push(Axis::xy(
//!     "XY",
//!     [
//!         CalibrationPoint::x_axis(0.0, 100.0, 0.0),
//!         CalibrationPoint::x_axis(100.0, 100.0, 10.0),
//!         CalibrationPoint::y_axis(0.0, 100.0, 0.0),
//!         CalibrationPoint::y_axis(0.0, 0.0, 50.0),
//!     ],
//! ));
//! doc.datasets.push(Dataset::new("growth line", "XY").with_point(Point::new(50.0, 50.0, [5.0, 25.0])));
//! ```

mod coord;
pub mod io_json;
mod model;
mod space;
mod value;

// Re-export core types for convenient access
pub use coord::Coord;
pub use model::{
    Algorithm, AutoDetectionData, Axis, CalibrationPoint, Dataset, Document, Point,
    DEFAULT_DATASET_COLOR,
};
pub use space::{Data, Pixel};
pub use value::{DataValue, FormatVersion};
