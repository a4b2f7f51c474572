//! Small value types with a fixed wire shape.
//!
//! `FormatVersion` is written as a `[major, minor]` pair and `DataValue`
//! keeps the calibration text exactly as it appeared in the file.

use serde::{Serialize, Serializer};
use std::fmt;

/// A `wpd.json` format version.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FormatVersion {
    pub major: u32,
    pub minor: u32,
}

impl FormatVersion {
    /// The version written by current WebPlotDigitizer releases.
    pub const CURRENT: FormatVersion = FormatVersion::new(4, 2);

    /// Every version this crate reads and writes.
    pub const SUPPORTED: [FormatVersion; 3] = [
        FormatVersion::new(4, 0),
        FormatVersion::new(4, 1),
        FormatVersion::new(4, 2),
    ];

    /// Creates a new version.
    #[inline]
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Returns true if documents of this version can be parsed.
    pub fn is_supported(&self) -> bool {
        Self::SUPPORTED.contains(self)
    }
}

impl Default for FormatVersion {
    fn default() -> Self {
        Self::CURRENT
    }
}

impl fmt::Debug for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FormatVersion({}.{})", self.major, self.minor)
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl Serialize for FormatVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.major, self.minor].serialize(serializer)
    }
}

/// A calibration data value stored as text in the file.
///
/// WebPlotDigitizer writes `dx`/`dy` as strings. The original text is kept
/// so a document is re-emitted byte-for-byte, while `value` holds the parsed
/// number. Blank or non-numeric text (unused components) has no value.
#[derive(Clone, PartialEq, Default)]
pub struct DataValue {
    text: String,
    value: Option<f64>,
}

impl DataValue {
    /// Creates a value from a number, formatting it with `f64`'s `Display`.
    pub fn new(value: f64) -> Self {
        Self {
            text: value.to_string(),
            value: Some(value),
        }
    }

    /// Creates an empty value, as written for unused calibration components.
    pub fn blank() -> Self {
        Self::default()
    }

    /// Parses calibration text.
    ///
    /// Returns `None` if the text is non-blank and not a finite number.
    pub fn parse(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Some(Self { text, value: None });
        }
        match trimmed.parse::<f64>() {
            Ok(v) if v.is_finite() => Some(Self { text, value: Some(v) }),
            _ => None,
        }
    }

    /// Keeps text that does not parse as a number. Used for the component a
    /// calibration point does not calibrate.
    pub(crate) fn unparsed(text: impl Into<String>) -> Self {
        let text = text.into();
        match Self::parse(text.as_str()) {
            Some(parsed) => parsed,
            None => Self { text, value: None },
        }
    }

    /// The parsed number, if the text was numeric.
    #[inline]
    pub fn value(&self) -> Option<f64> {
        self.value
    }

    /// The text as it appears in the file.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Debug for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DataValue({:?})", self.text)
    }
}

impl From<f64> for DataValue {
    fn from(value: f64) -> Self {
        DataValue::new(value)
    }
}

impl Serialize for DataValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}
