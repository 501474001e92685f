//! TRACKEDFRAME composite message body
//!
//! Bundles one whole tracked frame into a single message: the image body,
//! the full custom-field dictionary, and an optional embedded
//! image-to-reference transform. `unpack` reconstructs a [`TrackedFrame`]
//! entity directly.
//!
//! # Wire Format
//!
//! - IMAGE VALID: u8 (0/1)
//! - if valid: IMAGE LENGTH u32 + IMAGE body bytes
//! - FIELD COUNT: u32, then per field NAME LEN u16 + NAME + VALUE LEN u16 + VALUE
//! - TRANSFORM PRESENT: u8 (0/1), if present `f32[12]` row-major 3x4

use crate::error::{FusionError, Result};
use crate::frame::transform_name::TransformName;
use crate::frame::TrackedFrame;
use crate::protocol::message::Message;
use crate::protocol::types::image::ImageMessage;
use bytes::{Buf, BufMut};

/// Whole tracked frame on the wire
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedFrameMessage {
    /// Image body; `None` for tracker-only frames
    pub image: Option<ImageMessage>,
    /// Field dictionary as name/value pairs, insertion order preserved
    pub fields: Vec<(String, String)>,
    /// Embedded image-to-reference transform, row-major 3x4
    pub embedded_transform: Option<[[f32; 4]; 3]>,
}

impl TrackedFrameMessage {
    /// Build the composite message from a frame entity
    pub fn from_tracked_frame(
        frame: &TrackedFrame,
        embedded_transform: Option<[[f32; 4]; 3]>,
    ) -> Result<Self> {
        let image = if frame.image_data().is_valid() {
            Some(ImageMessage::from_video_frame(frame.image_data())?)
        } else {
            None
        };

        let fields = frame
            .fields()
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();

        Ok(TrackedFrameMessage {
            image,
            fields,
            embedded_transform,
        })
    }

    /// Reconstruct a frame entity from the unpacked body
    ///
    /// `timestamp` comes from the envelope header; when `embedded_name` is
    /// given and the body carries an embedded transform, it is stored in the
    /// frame dictionary under that name.
    pub fn to_tracked_frame(
        &self,
        timestamp: f64,
        embedded_name: Option<&TransformName>,
    ) -> Result<TrackedFrame> {
        let mut frame = TrackedFrame::new();
        frame.set_timestamp(timestamp);

        if let Some(image) = &self.image {
            frame.set_image_data(image.to_video_frame()?);
        }

        for (name, value) in &self.fields {
            frame.set_custom_field(name, value.clone())?;
        }

        if let (Some(matrix), Some(name)) = (&self.embedded_transform, embedded_name) {
            let mut values = [0.0f64; 16];
            for row in 0..3 {
                for col in 0..4 {
                    values[row * 4 + col] = matrix[row][col] as f64;
                }
            }
            values[15] = 1.0;
            frame.set_transform(name, &values)?;
        }

        Ok(frame)
    }
}

pub(crate) fn put_string(buf: &mut Vec<u8>, value: &str) -> Result<()> {
    let bytes = value.as_bytes();
    if bytes.len() > u16::MAX as usize {
        return Err(FusionError::FieldTooLong {
            size: bytes.len(),
            max: u16::MAX as usize,
        });
    }
    buf.put_u16(bytes.len() as u16);
    buf.extend_from_slice(bytes);
    Ok(())
}

pub(crate) fn get_string(data: &mut &[u8]) -> Result<String> {
    if data.remaining() < 2 {
        return Err(FusionError::InvalidSize {
            expected: 2,
            actual: data.remaining(),
        });
    }
    let len = data.get_u16() as usize;
    if data.remaining() < len {
        return Err(FusionError::InvalidSize {
            expected: len,
            actual: data.remaining(),
        });
    }
    let value = String::from_utf8(data[..len].to_vec())?;
    data.advance(len);
    Ok(value)
}

pub(crate) fn put_field_dictionary(buf: &mut Vec<u8>, fields: &[(String, String)]) -> Result<()> {
    buf.put_u32(fields.len() as u32);
    for (name, value) in fields {
        put_string(buf, name)?;
        put_string(buf, value)?;
    }
    Ok(())
}

pub(crate) fn get_field_dictionary(data: &mut &[u8]) -> Result<Vec<(String, String)>> {
    if data.remaining() < 4 {
        return Err(FusionError::InvalidSize {
            expected: 4,
            actual: data.remaining(),
        });
    }
    let count = data.get_u32() as usize;
    let mut fields = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        let name = get_string(data)?;
        let value = get_string(data)?;
        fields.push((name, value));
    }
    Ok(fields)
}

impl Message for TrackedFrameMessage {
    fn message_type() -> &'static str {
        "TRACKEDFRAME"
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

        match &self.embedded_transform {
            Some(matrix) => {
                buf.put_u8(1);
                for row in matrix {
                    for &val in row {
                        buf.put_f32(val);
                    }
                }
            }
            None => buf.put_u8(0),
        }

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

        if data.remaining() < 1 {
            return Err(FusionError::InvalidSize {
                expected: 1,
                actual: 0,
            });
        }
        let embedded_transform = if data.get_u8() == 1 {
            if data.remaining() < 48 {
                return Err(FusionError::InvalidSize {
                    expected: 48,
                    actual: data.remaining(),
                });
            }
            let mut matrix = [[0.0f32; 4]; 3];
            for row in &mut matrix {
                for val in row {
                    *val = data.get_f32();
                }
            }
            Some(matrix)
        } else {
            None
        };

        if !data.is_empty() {
            return Err(FusionError::InvalidSize {
                expected: 0,
                actual: data.len(),
            });
        }

        Ok(TrackedFrameMessage {
            image,
            fields,
            embedded_transform,
        })
    }
}
