//! `wpd.json` reader and writer.
//!
//! Reading goes through a permissive raw schema first, then every structural
//! rule is checked while converting into the [`Document`] model:
//!
//! - `version` must be a supported `[major, minor]` pair
//! - each axis has exactly four calibration points
//! - calibration pixels, and the data component each point calibrates, are
//!   finite numbers (JSON numbers or numeric strings)
//! - each dataset's `axesName` names a declared axis
//!
//! Writing serializes the model directly, so `parse(write(doc)) == doc`.

use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use super::model::{
    AutoDetectionData, Axis, CalibrationPoint, Dataset, Document, Point, DEFAULT_DATASET_COLOR,
};
use super::value::{DataValue, FormatVersion};
use crate::error::{FormatError, WpdError};

// ============================================================================
// Raw schema types (internal to this module)
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    version: Option<Value>,

    #[serde(rename = "axesColl", default)]
    axes: Vec<RawAxis>,

    #[serde(rename = "datasetColl", default)]
    datasets: Vec<RawDataset>,

    #[serde(rename = "measurementColl", default)]
    measurements: Option<Vec<Value>>,

    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAxis {
    name: String,

    #[serde(rename = "type", default)]
    kind: String,

    #[serde(default)]
    is_log_x: bool,

    #[serde(default)]
    is_log_y: bool,

    #[serde(default)]
    no_rotation: bool,

    #[serde(default)]
    calibration_points: Vec<RawCalibrationPoint>,

    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

/// Numbers in calibration points may be JSON numbers or strings.
#[derive(Debug, Deserialize)]
struct RawCalibrationPoint {
    px: Value,
    py: Value,
    #[serde(default)]
    dx: Value,
    #[serde(default)]
    dy: Value,
    #[serde(default)]
    dz: Option<f64>,

    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDataset {
    name: String,

    axes_name: String,

    #[serde(rename = "colorRGB", default)]
    color_rgb: Option<[i64; 4]>,

    #[serde(default)]
    metadata_keys: Vec<String>,

    #[serde(default)]
    data: Vec<Point>,

    #[serde(default)]
    auto_detection_data: Option<AutoDetectionData>,

    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

// ============================================================================
// Public API
// ============================================================================

/// Reads a document from a `wpd.json` file.
///
/// # Errors
/// Returns an error if the file cannot be read or is not a valid document.
///
/// # Example
/// ```no_run
/// use std::path::Path;
/// use wpdkit::wpd::io_json::read_wpd_json;
///
/// let doc = read_wpd_json(Path::new("wpd.json"))?;
/// # Ok::<(), wpdkit::WpdError>(())
/// ```
pub fn read_wpd_json(path: &Path) -> Result<Document, WpdError> {
    let file = File::open(path).map_err(WpdError::Io)?;
    let reader = BufReader::new(file);

    let raw: RawDocument = serde_json::from_reader(reader).map_err(|source| {
        WpdError::WpdJsonParse {
            path: path.to_path_buf(),
            source: FormatError::Json(source),
        }
    })?;

    let doc = raw_to_document(raw).map_err(|source| WpdError::WpdJsonParse {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(
        path = %path.display(),
        axes = doc.axes.len(),
        datasets = doc.datasets.len(),
        points = doc.point_count(),
        "read wpd document"
    );
    Ok(doc)
}

/// Writes a document to a `wpd.json` file.
///
/// # Errors
/// Returns an error if the file cannot be written.
pub fn write_wpd_json(path: &Path, doc: &Document) -> Result<(), WpdError> {
    let file = File::create(path).map_err(WpdError::Io)?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, doc).map_err(|source| WpdError::WpdJsonWrite {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush()?;
    tracing::debug!(path = %path.display(), "wrote wpd document");
    Ok(())
}

/// Parses a document from a JSON string.
pub fn from_wpd_str(json: &str) -> Result<Document, FormatError> {
    let raw: RawDocument = serde_json::from_str(json)?;
    raw_to_document(raw)
}

/// Parses a document from raw bytes.
///
/// Useful for fuzzing and processing raw bytes without UTF-8 validation overhead.
pub fn from_wpd_slice(bytes: &[u8]) -> Result<Document, FormatError> {
    let raw: RawDocument = serde_json::from_slice(bytes)?;
    raw_to_document(raw)
}

/// Serializes a document to a pretty-printed JSON string.
pub fn to_wpd_string(doc: &Document) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(doc)
}

/// Serializes a document to compact JSON bytes, as WebPlotDigitizer saves it.
pub fn to_wpd_vec(doc: &Document) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(doc)
}

// ============================================================================
// Conversion: raw schema -> model
// ============================================================================

fn raw_to_document(raw: RawDocument) -> Result<Document, FormatError> {
    let version = parse_version(raw.version)?;

    let axes = raw
        .axes
        .into_iter()
        .map(raw_to_axis)
        .collect::<Result<Vec<_>, _>>()?;

    let axis_names: HashSet<&str> = axes.iter().map(|a| a.name.as_str()).collect();
    let mut datasets = Vec::with_capacity(raw.datasets.len());
    for ds in raw.datasets {
        if !axis_names.contains(ds.axes_name.as_str()) {
            return Err(FormatError::UnknownAxis {
                dataset: ds.name,
                axis: ds.axes_name,
            });
        }
        datasets.push(raw_to_dataset(ds));
    }

    Ok(Document {
        version,
        axes,
        datasets,
        measurements: raw.measurements,
        extra: raw.extra,
    })
}

fn parse_version(value: Option<Value>) -> Result<FormatVersion, FormatError> {
    let value = match value {
        None | Some(Value::Null) => return Err(FormatError::MissingVersion),
        Some(v) => v,
    };

    let pair = match value.as_array() {
        Some(items) if items.len() == 2 => items,
        _ => return Err(FormatError::InvalidVersion(value.to_string())),
    };
    let part = |v: &Value| v.as_u64().and_then(|n| u32::try_from(n).ok());
    let (major, minor) = match (part(&pair[0]), part(&pair[1])) {
        (Some(major), Some(minor)) => (major, minor),
        _ => return Err(FormatError::InvalidVersion(value.to_string())),
    };

    let version = FormatVersion::new(major, minor);
    if !version.is_supported() {
        return Err(FormatError::UnsupportedVersion { major, minor });
    }
    Ok(version)
}

fn raw_to_axis(raw: RawAxis) -> Result<Axis, FormatError> {
    let count = raw.calibration_points.len();
    let raw_points: [RawCalibrationPoint; 4] =
        raw.calibration_points
            .try_into()
            .map_err(|_| FormatError::CalibrationPointCount {
                axis: raw.name.clone(),
                count,
            })?;

    let [x1, x2, y1, y2] = raw_points;
    let calibration_points = [
        raw_to_calibration_point(&raw.name, 0, x1)?,
        raw_to_calibration_point(&raw.name, 1, x2)?,
        raw_to_calibration_point(&raw.name, 2, y1)?,
        raw_to_calibration_point(&raw.name, 3, y2)?,
    ];

    Ok(Axis {
        name: raw.name,
        kind: raw.kind,
        is_log_x: raw.is_log_x,
        is_log_y: raw.is_log_y,
        no_rotation: raw.no_rotation,
        calibration_points,
        extra: raw.extra,
    })
}

/// Points 0 and 1 calibrate x through `dx`; points 2 and 3 calibrate y
/// through `dy`. The other component is kept as text and need not be numeric.
fn raw_to_calibration_point(
    axis: &str,
    index: usize,
    raw: RawCalibrationPoint,
) -> Result<CalibrationPoint, FormatError> {
    let invalid = |field: &'static str, value: &Value| FormatError::NonNumericCalibration {
        axis: axis.to_string(),
        index,
        field,
        value: value.to_string(),
    };

    let px = pixel_number(&raw.px).ok_or_else(|| invalid("px", &raw.px))?;
    let py = pixel_number(&raw.py).ok_or_else(|| invalid("py", &raw.py))?;

    let calibrated = |field: &'static str, value: &Value| {
        data_value(value)
            .filter(|v| v.value().is_some())
            .ok_or_else(|| invalid(field, value))
    };
    let (dx, dy) = if index < 2 {
        (calibrated("dx", &raw.dx)?, uncalibrated(&raw.dy))
    } else {
        (uncalibrated(&raw.dx), calibrated("dy", &raw.dy)?)
    };

    Ok(CalibrationPoint {
        px,
        py,
        dx,
        dy,
        dz: raw.dz,
        extra: raw.extra,
    })
}

fn pixel_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn data_value(value: &Value) -> Option<DataValue> {
    match value {
        Value::Null => Some(DataValue::blank()),
        Value::String(s) => DataValue::parse(s.as_str()),
        Value::Number(n) => DataValue::parse(n.to_string()),
        _ => None,
    }
}

fn uncalibrated(value: &Value) -> DataValue {
    match value {
        Value::String(s) => DataValue::unparsed(s.as_str()),
        other => data_value(other).unwrap_or_else(|| DataValue::unparsed(other.to_string())),
    }
}

fn raw_to_dataset(raw: RawDataset) -> Dataset {
    Dataset {
        name: raw.name,
        axes_name: raw.axes_name,
        color_rgb: raw.color_rgb.unwrap_or(DEFAULT_DATASET_COLOR),
        metadata_keys: raw.metadata_keys,
        points: raw.data,
        auto_detection: raw.auto_detection_data,
        extra: raw.extra,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wpd::Algorithm;

    const MINIMAL: &str = r#"{
        "version": [4, 2],
        "axesColl": [{
            "name": "XY",
            "type": "XYAxes",
            "isLogX": false,
            "isLogY": false,
            "noRotation": false,
            "calibrationPoints": [
                {"px": 0, "py": 100, "dx": "0", "dy": "0", "dz": null},
                {"px": 100, "py": 100, "dx": "10", "dy": "0", "dz": null},
                {"px": 0, "py": 100, "dx": "0", "dy": "0", "dz": null},
                {"px": 0, "py": 0, "dx": "0", "dy": "50", "dz": null}
            ]
        }],
        "datasetColl": [{
            "name": "Default Dataset",
            "axesName": "XY",
            "colorRGB": [200, 0, 0, 255],
            "metadataKeys": [],
            "data": [{"x": 50, "y": 50, "value": [5, 25]}]
        }],
        "measurementColl": []
    }"#;

    fn replace_calibration(points: &str) -> String {
        let start = MINIMAL.find("\"calibrationPoints\"").unwrap();
        let end = MINIMAL[start..].find(']').unwrap() + start + 1;
        format!(
            "{}\"calibrationPoints\": {}{}",
            &MINIMAL[..start],
            points,
            &MINIMAL[end..]
        )
    }

    #[test]
    fn test_parse_minimal() {
        let doc = from_wpd_str(MINIMAL).expect("parse minimal document");
        assert_eq!(doc.version, FormatVersion::new(4, 2));
        assert_eq!(doc.axes.len(), 1);
        assert_eq!(doc.axes[0].calibration_points[1].dx.value(), Some(10.0));
        assert_eq!(doc.datasets[0].points[0].value, [5.0, 25.0]);
        assert_eq!(doc.measurements, Some(vec![]));
    }

    #[test]
    fn test_roundtrip_preserves_document() {
        let doc = from_wpd_str(MINIMAL).unwrap();
        let json = to_wpd_string(&doc).unwrap();
        assert_eq!(from_wpd_str(&json).unwrap(), doc);

        let bytes = to_wpd_vec(&doc).unwrap();
        assert_eq!(from_wpd_slice(&bytes).unwrap(), doc);
    }

    #[test]
    fn test_missing_version() {
        let json = MINIMAL.replace("\"version\": [4, 2],", "");
        assert!(matches!(
            from_wpd_str(&json),
            Err(FormatError::MissingVersion)
        ));
    }

    #[test]
    fn test_malformed_version() {
        for bad in ["[4]", "[4, 2, 0]", "\"4.2\"", "[4, -1]", "[4.5, 2]"] {
            let json = MINIMAL.replace("[4, 2]", bad);
            assert!(
                matches!(from_wpd_str(&json), Err(FormatError::InvalidVersion(_))),
                "version {bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_unsupported_version() {
        let json = MINIMAL.replace("[4, 2]", "[5, 0]");
        assert!(matches!(
            from_wpd_str(&json),
            Err(FormatError::UnsupportedVersion { major: 5, minor: 0 })
        ));
    }

    #[test]
    fn test_three_calibration_points() {
        let json = replace_calibration(
            r#"[
                {"px": 0, "py": 100, "dx": "0", "dy": "0"},
                {"px": 100, "py": 100, "dx": "10", "dy": "0"},
                {"px": 0, "py": 100, "dx": "0", "dy": "0"}
            ]"#,
        );
        match from_wpd_str(&json) {
            Err(FormatError::CalibrationPointCount { axis, count }) => {
                assert_eq!(axis, "XY");
                assert_eq!(count, 3);
            }
            other => panic!("expected CalibrationPointCount, got {other:?}"),
        }
    }

    #[test]
    fn test_dangling_axis_reference() {
        let json = MINIMAL.replace("\"axesName\": \"XY\"", "\"axesName\": \"Polar\"");
        match from_wpd_str(&json) {
            Err(FormatError::UnknownAxis { dataset, axis }) => {
                assert_eq!(dataset, "Default Dataset");
                assert_eq!(axis, "Polar");
            }
            other => panic!("expected UnknownAxis, got {other:?}"),
        }
    }

    #[test]
    fn test_string_pixels_are_parsed() {
        let json = replace_calibration(
            r#"[
                {"px": "0", "py": "100", "dx": "0", "dy": "0"},
                {"px": "100.5", "py": 100, "dx": 10, "dy": "0"},
                {"px": 0, "py": 100, "dx": "", "dy": "0"},
                {"px": 0, "py": 0, "dx": null, "dy": "50"}
            ]"#,
        );
        let doc = from_wpd_str(&json).expect("string pixels parse");
        let cal = &doc.axes[0].calibration_points;
        assert_eq!(cal[1].px, 100.5);
        assert_eq!(cal[1].dx.text(), "10");
        assert_eq!(cal[2].dx.value(), None);
        assert_eq!(cal[3].dz, None);
    }

    #[test]
    fn test_uncalibrated_component_may_be_text() {
        let json = replace_calibration(
            r#"[
                {"px": 0, "py": 100, "dx": "0", "dy": "n/a"},
                {"px": 100, "py": 100, "dx": "10", "dy": true},
                {"px": 0, "py": 100, "dx": "left", "dy": "0"},
                {"px": 0, "py": 0, "dx": "0", "dy": "50"}
            ]"#,
        );
        let doc = from_wpd_str(&json).expect("unused components are not checked");
        let cal = &doc.axes[0].calibration_points;
        assert_eq!(cal[0].dy.text(), "n/a");
        assert_eq!(cal[0].dy.value(), None);
        assert_eq!(cal[1].dy.text(), "true");
        assert_eq!(cal[2].dx.text(), "left");

        let again = from_wpd_str(&to_wpd_string(&doc).unwrap()).unwrap();
        assert_eq!(again, doc);
    }

    #[test]
    fn test_point_level_unknown_keys_are_preserved() {
        let json = MINIMAL
            .replace(
                r#"{"px": 0, "py": 0, "dx": "0", "dy": "50", "dz": null}"#,
                r#"{"px": 0, "py": 0, "dx": "0", "dy": "50", "dz": null, "locked": true}"#,
            )
            .replace(
                r#"{"x": 50, "y": 50, "value": [5, 25]}"#,
                r#"{"x": 50, "y": 50, "value": [5, 25], "tag": "peak"}"#,
            );
        let doc = from_wpd_str(&json).unwrap();
        assert_eq!(
            doc.axes[0].calibration_points[3].extra.get("locked"),
            Some(&Value::Bool(true))
        );
        assert_eq!(
            doc.datasets[0].points[0].extra.get("tag"),
            Some(&Value::from("peak"))
        );

        let out: Value = serde_json::from_str(&to_wpd_string(&doc).unwrap()).unwrap();
        assert_eq!(out["axesColl"][0]["calibrationPoints"][3]["locked"], true);
        assert_eq!(out["datasetColl"][0]["data"][0]["tag"], "peak");
        assert_eq!(from_wpd_str(&out.to_string()).unwrap(), doc);
    }

    #[test]
    fn test_full_precision_floats_roundtrip() {
        let mut doc = from_wpd_str(MINIMAL).unwrap();
        doc.datasets[0].points[0] = Point::new(
            1.0715660391465826e-75,
            0.1 + 0.2,
            [std::f64::consts::PI * 1e17, -2.2250738585072014e-308],
        );
        doc.axes[0].calibration_points[0].px = 1.0 / 3.0;

        let restored = from_wpd_str(&to_wpd_string(&doc).unwrap()).unwrap();
        assert_eq!(restored, doc);
        assert_eq!(
            restored.datasets[0].points[0].x.to_bits(),
            1.0715660391465826e-75f64.to_bits()
        );
    }

    #[test]
    fn test_non_numeric_pixel_rejected() {
        let json = replace_calibration(
            r#"[
                {"px": "left", "py": 100, "dx": "0", "dy": "0"},
                {"px": 100, "py": 100, "dx": "10", "dy": "0"},
                {"px": 0, "py": 100, "dx": "0", "dy": "0"},
                {"px": 0, "py": 0, "dx": "0", "dy": "50"}
            ]"#,
        );
        match from_wpd_str(&json) {
            Err(FormatError::NonNumericCalibration { index, field, .. }) => {
                assert_eq!(index, 0);
                assert_eq!(field, "px");
            }
            other => panic!("expected NonNumericCalibration, got {other:?}"),
        }
    }

    #[test]
    fn test_blank_calibrated_component_rejected() {
        let json = replace_calibration(
            r#"[
                {"px": 0, "py": 100, "dx": "0", "dy": "0"},
                {"px": 100, "py": 100, "dx": "", "dy": "0"},
                {"px": 0, "py": 100, "dx": "0", "dy": "0"},
                {"px": 0, "py": 0, "dx": "0", "dy": "50"}
            ]"#,
        );
        assert!(matches!(
            from_wpd_str(&json),
            Err(FormatError::NonNumericCalibration { index: 1, field: "dx", .. })
        ));
    }

    #[test]
    fn test_out_of_range_color_is_not_a_parse_error() {
        let json = MINIMAL.replace("[200, 0, 0, 255]", "[300, -1, 0, 255]");
        let doc = from_wpd_str(&json).expect("colors are validated later");
        assert_eq!(doc.datasets[0].color_rgb, [300, -1, 0, 255]);
    }

    #[test]
    fn test_unknown_keys_are_preserved() {
        let json = MINIMAL.replace(
            "\"measurementColl\": []",
            "\"measurementColl\": [{\"type\": \"Distance\"}], \"wpd\": {\"note\": 1}",
        );
        let doc = from_wpd_str(&json).unwrap();
        assert!(doc.extra.contains_key("wpd"));

        let out: Value = serde_json::from_str(&to_wpd_string(&doc).unwrap()).unwrap();
        assert_eq!(out["wpd"]["note"], 1);
        assert_eq!(out["measurementColl"][0]["type"], "Distance");
    }

    #[test]
    fn test_auto_detection_roundtrip() {
        let json = MINIMAL.replace(
            "\"metadataKeys\": [],",
            r#""metadataKeys": [],
            "autoDetectionData": {
                "fgColor": [0, 0, 255],
                "bgColor": [255, 255, 255],
                "mask": [[1, 2], [3, 4]],
                "colorDetectionMode": "fg",
                "colorDistance": 120,
                "algorithm": {"algoType": "AveragingWindowAlgo", "xStep": 10, "yStep": 10},
                "name": 0,
                "imageWidth": 640,
                "imageHeight": 480
            },"#,
        );
        let doc = from_wpd_str(&json).unwrap();
        let auto = doc.datasets[0].auto_detection.as_ref().unwrap();
        assert_eq!(auto.algorithm, Algorithm {
            algo_type: "AveragingWindowAlgo".into(),
            x_step: Some(10.0),
            y_step: Some(10.0),
            extra: BTreeMap::new(),
        });
        assert_eq!(auto.image_width, 640);
        assert_eq!(auto.extra.get("name"), Some(&Value::from(0)));

        let again = from_wpd_str(&to_wpd_string(&doc).unwrap()).unwrap();
        assert_eq!(again, doc);
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(from_wpd_str("{"), Err(FormatError::Json(_))));
        assert!(matches!(from_wpd_slice(b"[]"), Err(FormatError::Json(_))));
    }
}
