//! Tracked frame entity and its field dictionary
//!
//! A [`TrackedFrame`] is one fused sample of image data plus zero or more
//! named spatial transforms and metadata, stamped with an acquisition
//! timestamp. Frames are plain value types with deep-copy semantics: once a
//! frame is cloned into a history or buffer, no later mutation of the source
//! can be observed through the copy.

pub mod buffer_item;
pub mod geometry;
pub mod transform_name;
pub mod validation;
pub mod video;
pub mod xml;

use std::sync::Arc;

use tracing::warn;

use crate::error::{FusionError, Result};
pub use buffer_item::StreamBufferItem;
pub use geometry::PolyData;
pub use transform_name::{is_transform, is_transform_status, TransformName};
pub use video::{ImageType, ScalarType, VideoFrame};

/// Well-known field key carrying the human-readable device name
pub const FIELD_FRIENDLY_DEVICE_NAME: &str = "FriendlyDeviceName";

/// Validity flag of a transform field
///
/// A transform is OK only if it was computed from valid tracking/image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldStatus {
    /// Field is valid
    #[default]
    Ok,
    /// Field is invalid
    Invalid,
}

impl FieldStatus {
    /// Dictionary/XML string form
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldStatus::Ok => "OK",
            FieldStatus::Invalid => "INVALID",
        }
    }

    /// Parse the dictionary/XML string form; anything but "OK" is invalid
    pub fn from_str(value: &str) -> Self {
        if value == "OK" {
            FieldStatus::Ok
        } else {
            FieldStatus::Invalid
        }
    }
}

/// Ordered-insertion dictionary from field name to string value
///
/// Frames carry on the order of ten fields, so lookups scan linearly;
/// insertion order is what the XML export and wire dictionary preserve.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldMap {
    entries: Vec<(String, String)>,
}

impl FieldMap {
    /// Insert or replace a field, keeping the original position on replace
    pub fn insert(&mut self, name: String, value: String) {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => *v = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Look up a field value
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Remove a field; true if it was present
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(n, _)| n != name);
        self.entries.len() != before
    }

    /// True iff the field is present
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Iterate fields in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True iff no fields are stored
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One fused sample: image + named transforms + metadata + timestamp
///
/// Chronological ordering: frames compare and equate by timestamp only. This
/// is intentionally a weak ordering usable for sorting a history; full-value
/// comparison goes through the field and image accessors.
#[derive(Debug, Clone, Default)]
pub struct TrackedFrame {
    image: VideoFrame,
    timestamp: f64,
    fields: FieldMap,
    poly_data: Option<Arc<PolyData>>,
    fiducial_points: Option<Vec<[f64; 3]>>,
}

impl TrackedFrame {
    /// Create an empty frame with no image, fields, or timestamp
    pub fn new() -> Self {
        TrackedFrame::default()
    }

    /// Set the image data
    pub fn set_image_data(&mut self, image: VideoFrame) {
        self.image = image;
    }

    /// Image data reference
    pub fn image_data(&self) -> &VideoFrame {
        &self.image
    }

    /// Mutable image data reference
    pub fn image_data_mut(&mut self) -> &mut VideoFrame {
        &mut self.image
    }

    /// Set the acquisition timestamp in seconds
    pub fn set_timestamp(&mut self, timestamp: f64) {
        self.timestamp = timestamp;
    }

    /// Acquisition timestamp in seconds
    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    /// Attach shared point/surface geometry
    pub fn set_poly_data(&mut self, poly: Arc<PolyData>) {
        self.poly_data = Some(poly);
    }

    /// Shared geometry, if any
    pub fn poly_data(&self) -> Option<&Arc<PolyData>> {
        self.poly_data.as_ref()
    }

    /// Set detected calibration marker pixel coordinates
    pub fn set_fiducial_points(&mut self, points: Vec<[f64; 3]>) {
        self.fiducial_points = Some(points);
    }

    /// Detected calibration marker pixel coordinates, if any
    pub fn fiducial_points(&self) -> Option<&[[f64; 3]]> {
        self.fiducial_points.as_deref()
    }

    /// Set a metadata field; empty names are rejected
    pub fn set_custom_field(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        if name.is_empty() {
            return Err(FusionError::InvalidArgument(
                "field name must not be empty".to_string(),
            ));
        }
        self.fields.insert(name.to_string(), value.into());
        Ok(())
    }

    /// Look up a metadata field value
    pub fn custom_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name)
    }

    /// Delete a metadata field
    pub fn delete_custom_field(&mut self, name: &str) -> Result<()> {
        if self.fields.remove(name) {
            Ok(())
        } else {
            Err(FusionError::NotFound(name.to_string()))
        }
    }

    /// True iff the field is present
    pub fn is_field_defined(&self, name: &str) -> bool {
        self.fields.contains(name)
    }

    /// Store a transform as 16 row-major doubles
    pub fn set_transform(&mut self, name: &TransformName, matrix: &[f64; 16]) -> Result<()> {
        if !name.is_valid() {
            return Err(FusionError::MalformedName(name.to_string()));
        }
        let value = matrix
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        self.fields.insert(name.transform_key(), value);
        Ok(())
    }

    /// Read a transform as 16 row-major doubles
    pub fn transform(&self, name: &TransformName) -> Result<[f64; 16]> {
        if !name.is_valid() {
            return Err(FusionError::MalformedName(name.to_string()));
        }
        let key = name.transform_key();
        let raw = self
            .fields
            .get(&key)
            .ok_or_else(|| FusionError::NotFound(key.clone()))?;
        parse_matrix(raw)
    }

    /// Set the validity status of a transform
    pub fn set_transform_status(&mut self, name: &TransformName, status: FieldStatus) -> Result<()> {
        if !name.is_valid() {
            return Err(FusionError::MalformedName(name.to_string()));
        }
        self.fields
            .insert(name.status_key(), status.as_str().to_string());
        Ok(())
    }

    /// Validity status of a transform
    ///
    /// A transform without a paired status entry is implicitly OK; a missing
    /// transform is `NotFound`.
    pub fn transform_status(&self, name: &TransformName) -> Result<FieldStatus> {
        if !name.is_valid() {
            return Err(FusionError::MalformedName(name.to_string()));
        }
        if let Some(raw) = self.fields.get(&name.status_key()) {
            return Ok(FieldStatus::from_str(raw));
        }
        if self.fields.contains(&name.transform_key()) {
            return Ok(FieldStatus::Ok);
        }
        Err(FusionError::NotFound(name.transform_key()))
    }

    /// True iff the transform value field is present
    pub fn is_transform_defined(&self, name: &TransformName) -> bool {
        self.fields.contains(&name.transform_key())
    }

    /// All field names in insertion order
    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|(n, _)| n.to_string()).collect()
    }

    /// All transform names, derived from keys ending in the transform suffix
    ///
    /// Keys that carry the suffix but cannot be split into a From/To pair are
    /// skipped with a warning.
    pub fn transform_names(&self) -> Vec<TransformName> {
        let mut names = Vec::new();
        for (key, _) in self.fields.iter() {
            if !is_transform(key) || is_transform_status(key) {
                continue;
            }
            match TransformName::parse(key) {
                Ok(name) => names.push(name),
                Err(_) => warn!(key, "skipping transform field with unparseable name"),
            }
        }
        names
    }

    /// Field dictionary in insertion order
    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    /// Frame size in pixels (width, height, depth)
    pub fn frame_size(&self) -> [u32; 3] {
        self.image.frame_size()
    }

    /// Bits per scalar of the image
    pub fn bits_per_scalar(&self) -> usize {
        self.image.bits_per_scalar()
    }

    /// Number of scalar components of the image
    pub fn scalar_components(&self) -> u32 {
        self.image.num_components()
    }

    /// Bits per pixel of the image
    pub fn bits_per_pixel(&self) -> usize {
        self.image.bits_per_pixel()
    }
}

impl PartialEq for TrackedFrame {
    fn eq(&self, other: &Self) -> bool {
        self.timestamp == other.timestamp
    }
}

impl PartialOrd for TrackedFrame {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.timestamp.partial_cmp(&other.timestamp)
    }
}

fn parse_matrix(raw: &str) -> Result<[f64; 16]> {
    let mut matrix = [0.0f64; 16];
    let mut count = 0;
    for (i, token) in raw.split_whitespace().enumerate() {
        if i >= 16 {
            return Err(FusionError::ParseValue(format!(
                "transform value has more than 16 elements: {raw:?}"
            )));
        }
        matrix[i] = token.parse::<f64>()?;
        count = i + 1;
    }
    if count != 16 {
        return Err(FusionError::ParseValue(format!(
            "transform value has {count} elements, expected 16"
        )));
    }
    Ok(matrix)
}

/// Identity matrix as 16 row-major doubles
pub fn identity_matrix() -> [f64; 16] {
    let mut m = [0.0f64; 16];
    m[0] = 1.0;
    m[5] = 1.0;
    m[10] = 1.0;
    m[15] = 1.0;
    m
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translation_matrix(x: f64, y: f64, z: f64) -> [f64; 16] {
        let mut m = identity_matrix();
        m[3] = x;
        m[7] = y;
        m[11] = z;
        m
    }

    #[test]
    fn test_custom_field_lifecycle() {
        let mut frame = TrackedFrame::new();
        assert!(!frame.is_field_defined("FrameNumber"));

        frame.set_custom_field("FrameNumber", "42").unwrap();
        assert_eq!(frame.custom_field("FrameNumber"), Some("42"));
        assert!(frame.is_field_defined("FrameNumber"));

        frame.set_custom_field("FrameNumber", "43").unwrap();
        assert_eq!(frame.custom_field("FrameNumber"), Some("43"));

        frame.delete_custom_field("FrameNumber").unwrap();
        assert!(!frame.is_field_defined("FrameNumber"));
        assert!(matches!(
            frame.delete_custom_field("FrameNumber"),
            Err(FusionError::NotFound(_))
        ));
    }

    #[test]
    fn test_empty_field_name_rejected() {
        let mut frame = TrackedFrame::new();
        assert!(matches!(
            frame.set_custom_field("", "value"),
            Err(FusionError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_transform_roundtrip() {
        let mut frame = TrackedFrame::new();
        let name = TransformName::new("Image", "Reference").unwrap();
        let matrix = translation_matrix(10.0, 20.5, -3.25);

        frame.set_transform(&name, &matrix).unwrap();
        assert_eq!(frame.transform(&name).unwrap(), matrix);
    }

    #[test]
    fn test_transform_not_found() {
        let frame = TrackedFrame::new();
        let name = TransformName::new("Probe", "Tracker").unwrap();
        assert!(matches!(
            frame.transform(&name),
            Err(FusionError::NotFound(_))
        ));
    }

    #[test]
    fn test_status_defaults_to_ok_when_transform_exists() {
        let mut frame = TrackedFrame::new();
        let name = TransformName::new("Probe", "Tracker").unwrap();
        frame.set_transform(&name, &identity_matrix()).unwrap();

        assert_eq!(frame.transform_status(&name).unwrap(), FieldStatus::Ok);

        frame
            .set_transform_status(&name, FieldStatus::Invalid)
            .unwrap();
        assert_eq!(frame.transform_status(&name).unwrap(), FieldStatus::Invalid);
    }

    #[test]
    fn test_status_not_found_without_transform() {
        let frame = TrackedFrame::new();
        let name = TransformName::new("Probe", "Tracker").unwrap();
        assert!(matches!(
            frame.transform_status(&name),
            Err(FusionError::NotFound(_))
        ));
    }

    #[test]
    fn test_field_names_preserve_insertion_order() {
        let mut frame = TrackedFrame::new();
        frame.set_custom_field("Zulu", "1").unwrap();
        frame.set_custom_field("Alpha", "2").unwrap();
        frame.set_custom_field("Mike", "3").unwrap();
        assert_eq!(frame.field_names(), vec!["Zulu", "Alpha", "Mike"]);
    }

    #[test]
    fn test_transform_names_filters_and_parses() {
        let mut frame = TrackedFrame::new();
        let probe = TransformName::new("Probe", "Tracker").unwrap();
        let image = TransformName::new("Image", "Probe").unwrap();
        frame.set_transform(&probe, &identity_matrix()).unwrap();
        frame
            .set_transform_status(&probe, FieldStatus::Ok)
            .unwrap();
        frame.set_transform(&image, &identity_matrix()).unwrap();
        frame.set_custom_field("FrameNumber", "7").unwrap();

        let names = frame.transform_names();
        assert_eq!(names, vec![probe, image]);
    }

    #[test]
    fn test_chronological_ordering() {
        let mut a = TrackedFrame::new();
        a.set_timestamp(1.0);
        let mut b = TrackedFrame::new();
        b.set_timestamp(2.0);
        let mut c = TrackedFrame::new();
        c.set_timestamp(1.0);

        assert!(a < b);
        assert!(a == c);
        // equality is by timestamp only, not full value
        c.set_custom_field("FrameNumber", "9").unwrap();
        assert!(a == c);
    }

    #[test]
    fn test_clone_is_deep_for_fields_and_image() {
        let mut original = TrackedFrame::new();
        original.set_timestamp(5.0);
        original.set_custom_field("FrameNumber", "1").unwrap();
        original
            .set_image_data(VideoFrame::allocate([2, 2, 1], ScalarType::Uint8, 1).unwrap());

        let copy = original.clone();
        original.set_custom_field("FrameNumber", "2").unwrap();
        original.image_data_mut().data_mut()[0] = 0xAB;

        assert_eq!(copy.custom_field("FrameNumber"), Some("1"));
        assert_eq!(copy.image_data().data()[0], 0);
    }

    #[test]
    fn test_malformed_matrix_value() {
        let mut frame = TrackedFrame::new();
        frame
            .set_custom_field("ImageToReferenceTransform", "1 2 3")
            .unwrap();
        let name = TransformName::new("Image", "Reference").unwrap();
        assert!(matches!(
            frame.transform(&name),
            Err(FusionError::ParseValue(_))
        ));
    }
}
