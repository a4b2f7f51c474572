#![allow(dead_code)]

use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};
use serde_json::json;

use wpdkit::wpd::{
    AutoDetectionData, Axis, CalibrationPoint, Dataset, Document, FormatVersion, Point,
};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

pub fn arb_version() -> impl Strategy<Value = FormatVersion> {
    prop::sample::select(FormatVersion::SUPPORTED.to_vec())
}

pub fn arb_finite() -> impl Strategy<Value = f64> {
    any::<f64>().prop_filter("finite", |v| v.is_finite())
}

fn arb_name() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9 _-]{0,11}"
}

pub fn arb_calibration_point() -> impl Strategy<Value = CalibrationPoint> {
    (
        arb_finite(),
        arb_finite(),
        arb_finite(),
        arb_finite(),
        prop::option::of(arb_finite()),
    )
        .prop_map(|(px, py, dx, dy, dz)| {
            let mut point = CalibrationPoint::new(px, py, dx, dy);
            point.dz = dz;
            point
        })
}

/// Axis with arbitrary (possibly degenerate) calibration points.
pub fn arb_axis(name: String) -> impl Strategy<Value = Axis> {
    (
        prop::array::uniform4(arb_calibration_point()),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(move |(points, log_x, log_y, no_rotation)| {
            Axis::xy(name.clone(), points)
                .with_log(log_x, log_y)
                .with_no_rotation(no_rotation)
        })
}

pub fn arb_point() -> impl Strategy<Value = Point> {
    (
        arb_finite(),
        arb_finite(),
        arb_finite(),
        arb_finite(),
        prop::option::of("[a-z]{1,8}"),
    )
        .prop_map(|(x, y, vx, vy, label)| {
            let mut point = Point::new(x, y, [vx, vy]);
            point.metadata = label.map(|l| json!({ "label": l }));
            point
        })
}

fn arb_auto_detection() -> impl Strategy<Value = AutoDetectionData> {
    (
        prop::array::uniform3(0i64..=255),
        1u32..4000,
        1u32..4000,
        0u32..255,
    )
        .prop_map(|(fg_color, image_width, image_height, color_distance)| AutoDetectionData {
            fg_color,
            image_width,
            image_height,
            color_distance,
            ..AutoDetectionData::default()
        })
}

fn arb_dataset(axis_names: Vec<String>, max_points: usize) -> impl Strategy<Value = Dataset> {
    (
        arb_name(),
        prop::sample::select(axis_names),
        prop::array::uniform4(-300i64..600),
        prop::collection::vec(arb_point(), 0..=max_points),
        prop::option::of(arb_auto_detection()),
    )
        .prop_map(|(name, axis, color, points, auto_detection)| {
            let mut dataset = Dataset::new(name, axis).with_color(color);
            dataset.points = points;
            dataset.auto_detection = auto_detection;
            dataset
        })
}

/// Builds an arbitrary, parseable document: every dataset references one of
/// the generated axes.
pub fn arb_document(
    max_axes: usize,
    max_datasets: usize,
    max_points: usize,
) -> BoxedStrategy<Document> {
    (1..=max_axes.max(1))
        .prop_flat_map(move |axis_count| {
            let names: Vec<String> = (0..axis_count).map(|i| format!("axis-{i}")).collect();
            let axes = names
                .iter()
                .cloned()
                .map(arb_axis)
                .collect::<Vec<_>>();
            (
                arb_version(),
                axes,
                prop::collection::vec(arb_dataset(names, max_points), 0..=max_datasets),
                prop::option::of(prop::collection::vec(
                    "[a-z]{1,8}".prop_map(|kind| json!({ "type": kind })),
                    0..3,
                )),
            )
        })
        .prop_map(|(version, axes, datasets, measurements)| Document {
            version,
            axes,
            datasets,
            measurements,
            ..Document::default()
        })
        .boxed()
}

/// A non-degenerate linear calibration with slightly skewed pixel axes.
#[derive(Clone, Debug)]
pub struct LinearCalibration {
    pub axis: Axis,
    pub x_data: [f64; 2],
    pub y_data: [f64; 2],
}

pub fn arb_linear_calibration() -> impl Strategy<Value = LinearCalibration> {
    (
        (0.0f64..1000.0, 0.0f64..1000.0, 10.0f64..500.0, -5.0f64..5.0),
        (0.0f64..1000.0, 0.0f64..1000.0, 10.0f64..500.0, -5.0f64..5.0),
        (-1000.0f64..1000.0, 0.5f64..1000.0),
        (-1000.0f64..1000.0, 0.5f64..1000.0),
        any::<bool>(),
    )
        .prop_map(
            |((ax, ay, x_span, x_skew), (bx, by, y_span, y_skew), (x0, xs), (y0, ys), no_rotation)| {
                let x_data = [x0, x0 + xs];
                let y_data = [y0, y0 + ys];
                let axis = Axis::xy(
                    "XY",
                    [
                        CalibrationPoint::x_axis(ax, ay, x_data[0]),
                        CalibrationPoint::x_axis(ax + x_span, ay + x_skew, x_data[1]),
                        CalibrationPoint::y_axis(bx, by, y_data[0]),
                        CalibrationPoint::y_axis(bx + y_skew, by - y_span, y_data[1]),
                    ],
                )
                .with_no_rotation(no_rotation);
                LinearCalibration {
                    axis,
                    x_data,
                    y_data,
                }
            },
        )
}
