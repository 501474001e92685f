//! USFRAME composite message body
//!
//! Ultrasound-specific variant of the TRACKEDFRAME composite: the image body
//! plus the ultrasound parameter fields only, with no embedded-transform
//! slot. Navigation clients that only render B-mode video subscribe to this
//! kind to avoid shipping the whole dictionary per frame.

use crate::error::{FusionError, Result};
use crate::frame::TrackedFrame;
use crate::protocol::message::Message;
use crate::protocol::types::image::ImageMessage;
use crate::protocol::types::tracked_frame::{get_field_dictionary, put_field_dictionary};
use bytes::{Buf, BufMut};

/// Dictionary keys that travel with an ultrasound frame
pub const US_FIELD_KEYS: &[&str] = &[
    "SoundVelocity",
    "ImagingDepthMm",
    "TransducerFrequencyMhz",
    "ImageOrientation",
    "LineDensity",
    "SteeringAngleDeg",
];

/// Ultrasound frame on the wire
///
/// Body format: IMAGE VALID u8 + (IMAGE LENGTH u32 + IMAGE body), then the
/// filtered field dictionary in the TRACKEDFRAME pair encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct UsMessage {
    /// Image body; `None` when the frame carries no valid image
    pub image: Option<ImageMessage>,
    /// Ultrasound parameter fields present on the frame
    pub fields: Vec<(String, String)>,
}

impl UsMessage {
    /// Build the ultrasound message from a frame entity
    ///
    /// Only the fields named in [`US_FIELD_KEYS`] are carried.
    pub fn from_tracked_frame(frame: &TrackedFrame) -> Result<Self> {
        let image = if frame.image_data().is_valid() {
            Some(ImageMessage::from_video_frame(frame.image_data())?)
        } else {
            None
        };

        let fields = US_FIELD_KEYS
            .iter()
            .filter_map(|&key| {
                frame
                    .custom_field(key)
                    .map(|value| (key.to_string(), value.to_string()))
            })
            .collect();

        Ok(UsMessage { image, fields })
    }

    /// Reconstruct a frame entity from the unpacked body
    pub fn to_tracked_frame(&self, timestamp: f64) -> Result<TrackedFrame> {
        let mut frame = TrackedFrame::new();
        frame.set_timestamp(timestamp);

        if let Some(image) = &self.image {
            frame.set_image_data(image.to_video_frame()?);
        }
        for (name, value) in &self.fields {
            frame.set_custom_field(name, value.clone())?;
        }
        Ok(frame)
    }
}

impl Message for UsMessage {
    fn message_type() -> &'static str {
        "USFRAME"
    }

    fn encode_content(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();

        match &self.image {
            Some(image) => {
                buf.put_u8(1);
                let image_bytes = image.encode_content()?;
                buf.put_u32(image_bytes.len() as u32);
                buf.extend_from_slice(&image_bytes);
            }
            None => buf.put_u8(0),
        }

        put_field_dictionary(&mut buf, &self.fields)?;
        Ok(buf)
    }

    fn decode_content(mut data: &[u8]) -> Result<Self> {
        if data.remaining() < 1 {
            return Err(FusionError::InvalidSize {
                expected: 1,
                actual: 0,
            });
        }

        let image = if data.get_u8() == 1 {
            if data.remaining() < 4 {
                return Err(FusionError::InvalidSize {
                    expected: 4,
                    actual: data.remaining(),
                });
            }
            let image_len = data.get_u32() as usize;
            if data.remaining() < image_len {
                return Err(FusionError::InvalidSize {
                    expected: image_len,
                    actual: data.remaining(),
                });
            }
            let image = ImageMessage::decode_content(&data[..image_len])?;
            data.advance(image_len);
            Some(image)
        } else {
            None
        };

        let fields = get_field_dictionary(&mut data)?;

        if !data.is_empty() {
            return Err(FusionError::InvalidSize {
                expected: 0,
                actual: data.len(),
            });
        }

        Ok(UsMessage { image, fields })
    }
}
