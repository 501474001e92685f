//! Human-readable XML representation of a tracked frame
//!
//! One `<TrackedFrame>` element per frame: a `Timestamp` attribute plus one
//! attribute per field. Transform fields serialize their 16 row-major values
//! space-separated; statuses and free-form metadata serialize verbatim. With
//! an empty request list every stored field is exported. Image pixels and
//! geometry are not part of this representation.

use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use tracing::warn;

use crate::error::{FusionError, Result};
use crate::frame::transform_name::TransformName;
use crate::frame::{FieldStatus, TrackedFrame};

const ELEMENT_NAME: &str = "TrackedFrame";
const TIMESTAMP_ATTRIBUTE: &str = "Timestamp";

/// Serialize a frame to one `<TrackedFrame>` element
///
/// `requested_transforms` selects which transforms (and their statuses) are
/// written; an empty slice exports every field in the dictionary. A requested
/// transform absent from the frame is skipped with a warning.
pub fn to_xml(frame: &TrackedFrame, requested_transforms: &[TransformName]) -> Result<String> {
    let mut element = BytesStart::new(ELEMENT_NAME);
    let timestamp = frame.timestamp().to_string();
    element.push_attribute((TIMESTAMP_ATTRIBUTE, timestamp.as_str()));

    if requested_transforms.is_empty() {
        for (name, value) in frame.fields().iter() {
            element.push_attribute((name, value));
        }
    } else {
        for name in requested_transforms {
            let key = name.transform_key();
            let Some(value) = frame.custom_field(&key) else {
                warn!(transform = %name, "requested transform not present in frame");
                continue;
            };
            element.push_attribute((key.as_str(), value));

            let status = frame
                .transform_status(name)
                .unwrap_or(FieldStatus::Invalid);
            element.push_attribute((name.status_key().as_str(), status.as_str()));
        }
    }

    let mut writer = Writer::new(Vec::new());
    writer
        .write_event(Event::Empty(element))
        .map_err(|e| FusionError::Xml(e.to_string()))?;
    String::from_utf8(writer.into_inner()).map_err(|e| FusionError::Xml(e.to_string()))
}

/// Reconstruct a frame from its `<TrackedFrame>` element
///
/// The timestamp and the full field dictionary are restored; attribute names
/// ending in the transform/status suffixes become transform fields by virtue
/// of the dictionary's key convention, everything else is generic metadata.
pub fn from_xml(xml: &str) -> Result<TrackedFrame> {
    let mut reader = Reader::from_str(xml);

    loop {
        let event = reader
            .read_event()
            .map_err(|e| FusionError::Xml(e.to_string()))?;
        match event {
            Event::Empty(element) | Event::Start(element) => {
                if element.name().as_ref() != ELEMENT_NAME.as_bytes() {
                    return Err(FusionError::Xml(format!(
                        "unexpected element {:?}",
                        String::from_utf8_lossy(element.name().as_ref())
                    )));
                }
                return frame_from_attributes(&element);
            }
            Event::Eof => {
                return Err(FusionError::Xml(
                    "no TrackedFrame element found".to_string(),
                ));
            }
            _ => {}
        }
    }
}

fn frame_from_attributes(element: &BytesStart<'_>) -> Result<TrackedFrame> {
    let mut frame = TrackedFrame::new();
    let mut timestamp_seen = false;

    for attribute in element.attributes() {
        let attribute: Attribute =
            attribute.map_err(|e| FusionError::Xml(e.to_string()))?;
        let name = String::from_utf8(attribute.key.as_ref().to_vec())?;
        let value = attribute
            .unescape_value()
            .map_err(|e| FusionError::Xml(e.to_string()))?
            .into_owned();

        if name == TIMESTAMP_ATTRIBUTE {
            frame.set_timestamp(value.parse::<f64>()?);
            timestamp_seen = true;
        } else {
            frame.set_custom_field(&name, value)?;
        }
    }

    if !timestamp_seen {
        return Err(FusionError::Xml(
            "TrackedFrame element has no Timestamp attribute".to_string(),
        ));
    }
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::identity_matrix;

    fn sample_frame() -> TrackedFrame {
        let mut frame = TrackedFrame::new();
        frame.set_timestamp(5.125);
        let probe = TransformName::new("Probe", "Tracker").unwrap();
        let mut matrix = identity_matrix();
        matrix[3] = 10.0;
        matrix[7] = -2.5;
        frame.set_transform(&probe, &matrix).unwrap();
        frame
            .set_transform_status(&probe, FieldStatus::Ok)
            .unwrap();
        frame.set_custom_field("FrameNumber", "42").unwrap();
        frame
            .set_custom_field("FriendlyDeviceName", "VideoDevice")
            .unwrap();
        frame
    }

    #[test]
    fn test_roundtrip_all_fields() {
        let frame = sample_frame();
        let xml = to_xml(&frame, &[]).unwrap();
        let restored = from_xml(&xml).unwrap();

        assert_eq!(restored.timestamp(), frame.timestamp());
        assert_eq!(restored.field_names(), frame.field_names());
        for (name, value) in frame.fields().iter() {
            assert_eq!(restored.custom_field(name), Some(value));
        }
    }

    #[test]
    fn test_roundtrip_preserves_transform_semantics() {
        let frame = sample_frame();
        let restored = from_xml(&to_xml(&frame, &[]).unwrap()).unwrap();

        let probe = TransformName::new("Probe", "Tracker").unwrap();
        assert_eq!(
            restored.transform(&probe).unwrap(),
            frame.transform(&probe).unwrap()
        );
        assert_eq!(
            restored.transform_status(&probe).unwrap(),
            FieldStatus::Ok
        );
        assert_eq!(restored.transform_names(), vec![probe]);
    }

    #[test]
    fn test_requested_subset() {
        let mut frame = sample_frame();
        let stylus = TransformName::new("Stylus", "Tracker").unwrap();
        frame.set_transform(&stylus, &identity_matrix()).unwrap();

        let probe = TransformName::new("Probe", "Tracker").unwrap();
        let xml = to_xml(&frame, std::slice::from_ref(&probe)).unwrap();

        let restored = from_xml(&xml).unwrap();
        assert!(restored.is_transform_defined(&probe));
        assert!(!restored.is_transform_defined(&stylus));
        assert!(!restored.is_field_defined("FrameNumber"));
    }

    #[test]
    fn test_requested_missing_transform_is_skipped() {
        let frame = sample_frame();
        let unknown = TransformName::new("Needle", "Tracker").unwrap();
        let xml = to_xml(&frame, std::slice::from_ref(&unknown)).unwrap();

        let restored = from_xml(&xml).unwrap();
        assert_eq!(restored.field_names().len(), 0);
        assert_eq!(restored.timestamp(), frame.timestamp());
    }

    #[test]
    fn test_from_xml_requires_timestamp() {
        let result = from_xml(r#"<TrackedFrame FrameNumber="1"/>"#);
        assert!(matches!(result, Err(FusionError::Xml(_))));
    }

    #[test]
    fn test_from_xml_rejects_other_elements() {
        let result = from_xml(r#"<Volume Timestamp="1.0"/>"#);
        assert!(matches!(result, Err(FusionError::Xml(_))));
    }

    #[test]
    fn test_from_xml_bad_timestamp_value() {
        let result = from_xml(r#"<TrackedFrame Timestamp="soon"/>"#);
        assert!(matches!(result, Err(FusionError::ParseValue(_))));
    }

    #[test]
    fn test_attribute_escaping_roundtrip() {
        let mut frame = TrackedFrame::new();
        frame.set_timestamp(1.0);
        frame
            .set_custom_field("Note", r#"depth > 5 & angle < 3 "deg""#)
            .unwrap();

        let restored = from_xml(&to_xml(&frame, &[]).unwrap()).unwrap();
        assert_eq!(
            restored.custom_field("Note"),
            Some(r#"depth > 5 & angle < 3 "deg""#)
        );
    }
}
