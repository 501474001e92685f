//! IMGMETA message body
//!
//! Catalog of available images: descriptive records with identity, modality,
//! geometry, and scan time. String fields have fixed byte budgets on the
//! wire; packing an over-long field fails instead of truncating identifying
//! data.

use crate::error::{FusionError, Result};
use crate::frame::video::ScalarType;
use crate::protocol::header::Timestamp;
use crate::protocol::message::Message;
use bytes::{Buf, BufMut};

const NAME_LEN: usize = 64;
const DEVICE_ID_LEN: usize = 20;
const MODALITY_LEN: usize = 32;
const PATIENT_NAME_LEN: usize = 64;
const PATIENT_ID_LEN: usize = 64;

/// Record size: 64 + 20 + 32 + 64 + 64 + 8 + 6 + 1 + 1
const ELEMENT_SIZE: usize = 260;

/// One image catalog record
#[derive(Debug, Clone, PartialEq)]
pub struct ImageMetaElement {
    /// Image name or description (max 64 bytes)
    pub name: String,
    /// Device id to query the image by (max 20 bytes)
    pub device_id: String,
    /// Modality, e.g. "CT", "US" (max 32 bytes)
    pub modality: String,
    /// Patient name (max 64 bytes)
    pub patient_name: String,
    /// Patient id (max 64 bytes)
    pub patient_id: String,
    /// Scan time in seconds (UTC)
    pub timestamp: f64,
    /// Image size in pixels
    pub size: [u16; 3],
    /// Pixel scalar type
    pub scalar_type: ScalarType,
}

impl ImageMetaElement {
    /// Create a record with empty patient information
    pub fn new(
        name: impl Into<String>,
        device_id: impl Into<String>,
        modality: impl Into<String>,
    ) -> Self {
        ImageMetaElement {
            name: name.into(),
            device_id: device_id.into(),
            modality: modality.into(),
            patient_name: String::new(),
            patient_id: String::new(),
            timestamp: 0.0,
            size: [0, 0, 0],
            scalar_type: ScalarType::Uint8,
        }
    }

    /// Set patient identity
    pub fn with_patient(
        mut self,
        patient_name: impl Into<String>,
        patient_id: impl Into<String>,
    ) -> Self {
        self.patient_name = patient_name.into();
        self.patient_id = patient_id.into();
        self
    }

    /// Set scan time in seconds (UTC)
    pub fn with_timestamp(mut self, timestamp: f64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Set image size in pixels
    pub fn with_size(mut self, size: [u16; 3]) -> Self {
        self.size = size;
        self
    }

    /// Set the pixel scalar type
    pub fn with_scalar_type(mut self, scalar_type: ScalarType) -> Self {
        self.scalar_type = scalar_type;
        self
    }
}

/// IMGMETA message: a list of image catalog records
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImageMetaMessage {
    /// Catalog records
    pub images: Vec<ImageMetaElement>,
}

impl ImageMetaMessage {
    /// Create from a list of records
    pub fn new(images: Vec<ImageMetaElement>) -> Self {
        ImageMetaMessage { images }
    }

    /// Append a record
    pub fn add_image(&mut self, image: ImageMetaElement) {
        self.images.push(image);
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// True iff no records are stored
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

fn put_bounded(buf: &mut Vec<u8>, value: &str, max: usize) -> Result<()> {
    let bytes = value.as_bytes();
    if bytes.len() > max {
        return Err(FusionError::FieldTooLong {
            size: bytes.len(),
            max,
        });
    }
    let mut slot = vec![0u8; max];
    slot[..bytes.len()].copy_from_slice(bytes);
    buf.extend_from_slice(&slot);
    Ok(())
}

fn get_bounded(data: &mut &[u8], max: usize) -> Result<String> {
    let slot = &data[..max];
    let len = slot.iter().position(|&b| b == 0).unwrap_or(max);
    let value = String::from_utf8(slot[..len].to_vec())?;
    data.advance(max);
    Ok(value)
}

impl Message for ImageMetaMessage {
    fn message_type() -> &'static str {
        "IMGMETA"
    }

    fn encode_content(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.images.len() * ELEMENT_SIZE);

        for image in &self.images {
            put_bounded(&mut buf, &image.name, NAME_LEN)?;
            put_bounded(&mut buf, &image.device_id, DEVICE_ID_LEN)?;
            put_bounded(&mut buf, &image.modality, MODALITY_LEN)?;
            put_bounded(&mut buf, &image.patient_name, PATIENT_NAME_LEN)?;
            put_bounded(&mut buf, &image.patient_id, PATIENT_ID_LEN)?;

            buf.put_u64(Timestamp::from_f64(image.timestamp).to_u64());
            for &s in &image.size {
                buf.put_u16(s);
            }
            buf.put_u8(image.scalar_type.code() as u8);
            buf.put_u8(0); // reserved
        }

        Ok(buf)
    }

    fn decode_content(mut data: &[u8]) -> Result<Self> {
        if data.len() % ELEMENT_SIZE != 0 {
            return Err(FusionError::InvalidSize {
                expected: (data.len() / ELEMENT_SIZE + 1) * ELEMENT_SIZE,
                actual: data.len(),
            });
        }

        let mut images = Vec::with_capacity(data.len() / ELEMENT_SIZE);
        while data.remaining() >= ELEMENT_SIZE {
            let name = get_bounded(&mut data, NAME_LEN)?;
            let device_id = get_bounded(&mut data, DEVICE_ID_LEN)?;
            let modality = get_bounded(&mut data, MODALITY_LEN)?;
            let patient_name = get_bounded(&mut data, PATIENT_NAME_LEN)?;
            let patient_id = get_bounded(&mut data, PATIENT_ID_LEN)?;

            let timestamp = Timestamp::from_u64(data.get_u64()).to_f64();
            let size = [data.get_u16(), data.get_u16(), data.get_u16()];
            let scalar_type = ScalarType::from_code(data.get_u8() as i32)?;
            let _reserved = data.get_u8();

            images.push(ImageMetaElement {
                name,
                device_id,
                modality,
                patient_name,
                patient_id,
                timestamp,
                size,
                scalar_type,
            });
        }

        Ok(ImageMetaMessage { images })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ImageMetaElement {
        ImageMetaElement::new("Liver CT series", "CT_001", "CT")
            .with_patient("DOE^JOHN", "PAT-0042")
            .with_timestamp(1_700_000_000.5)
            .with_size([512, 512, 128])
            .with_scalar_type(ScalarType::Uint16)
    }

    #[test]
    fn test_message_type() {
        assert_eq!(ImageMetaMessage::message_type(), "IMGMETA");
    }

    #[test]
    fn test_element_size() {
        let msg = ImageMetaMessage::new(vec![record()]);
        assert_eq!(msg.encode_content().unwrap().len(), ELEMENT_SIZE);
    }

    #[test]
    fn test_roundtrip() {
        let original = ImageMetaMessage::new(vec![
            record(),
            ImageMetaElement::new("US sweep", "US_002", "US")
                .with_size([640, 480, 1]),
        ]);

        let decoded =
            ImageMetaMessage::decode_content(&original.encode_content().unwrap()).unwrap();

        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded.images[0].name, "Liver CT series");
        assert_eq!(decoded.images[0].patient_id, "PAT-0042");
        assert_eq!(decoded.images[0].size, [512, 512, 128]);
        assert_eq!(decoded.images[0].scalar_type, ScalarType::Uint16);
        assert!((decoded.images[0].timestamp - 1_700_000_000.5).abs() < 1e-6);
        assert_eq!(decoded.images[1], original.images[1]);
    }

    #[test]
    fn test_overlong_device_id_fails() {
        let mut bad = record();
        bad.device_id = "A".repeat(DEVICE_ID_LEN + 1);
        let msg = ImageMetaMessage::new(vec![bad]);

        assert!(matches!(
            msg.encode_content(),
            Err(FusionError::FieldTooLong { size: 21, max: 20 })
        ));
    }

    #[test]
    fn test_overlong_patient_name_fails() {
        let mut bad = record();
        bad.patient_name = "X".repeat(PATIENT_NAME_LEN + 5);
        let msg = ImageMetaMessage::new(vec![bad]);

        assert!(matches!(
            msg.encode_content(),
            Err(FusionError::FieldTooLong { .. })
        ));
    }

    #[test]
    fn test_full_width_field_roundtrips() {
        let mut full = record();
        full.modality = "M".repeat(MODALITY_LEN);
        let msg = ImageMetaMessage::new(vec![full.clone()]);
        let decoded = ImageMetaMessage::decode_content(&msg.encode_content().unwrap()).unwrap();
        assert_eq!(decoded.images[0].modality, full.modality);
    }

    #[test]
    fn test_partial_element_rejected() {
        let msg = ImageMetaMessage::new(vec![record()]);
        let encoded = msg.encode_content().unwrap();
        assert!(matches!(
            ImageMetaMessage::decode_content(&encoded[..ELEMENT_SIZE - 3]),
            Err(FusionError::InvalidSize { .. })
        ));
    }
}
