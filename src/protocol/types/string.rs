//! STRING message body
//!
//! A named UTF-8 text payload; the envelope device name carries the field
//! name, the envelope timestamp the frame time. Used to forward frame
//! metadata fields to clients that cannot consume composite frame messages.

use crate::error::{FusionError, Result};
use crate::protocol::message::Message;
use bytes::{Buf, BufMut};

/// MIBenum value for UTF-8
const ENCODING_UTF8: u16 = 106;

/// Text payload on the wire
///
/// Body format: ENCODING u16 (MIBenum) + LENGTH u16 + payload bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct StringMessage {
    /// Character encoding as a MIBenum value
    pub encoding: u16,
    /// Text content
    pub string: String,
}

impl StringMessage {
    /// Create a UTF-8 text message
    pub fn new(string: impl Into<String>) -> Self {
        StringMessage {
            encoding: ENCODING_UTF8,
            string: string.into(),
        }
    }

    /// Text content
    pub fn as_str(&self) -> &str {
        &self.string
    }

    /// Payload length in bytes
    pub fn len(&self) -> usize {
        self.string.len()
    }

    /// True iff the payload is empty
    pub fn is_empty(&self) -> bool {
        self.string.is_empty()
    }
}

impl Message for StringMessage {
    fn message_type() -> &'static str {
        "STRING"
    }

    fn encode_content(&self) -> Result<Vec<u8>> {
        let payload = self.string.as_bytes();
        if payload.len() > u16::MAX as usize {
            return Err(FusionError::BodyTooLarge {
                size: payload.len(),
                max: u16::MAX as usize,
            });
        }

        let mut buf = Vec::with_capacity(4 + payload.len());
        buf.put_u16(self.encoding);
        buf.put_u16(payload.len() as u16);
        buf.extend_from_slice(payload);
        Ok(buf)
    }

    fn decode_content(mut data: &[u8]) -> Result<Self> {
        if data.len() < 4 {
            return Err(FusionError::InvalidSize {
                expected: 4,
                actual: data.len(),
            });
        }

        let encoding = data.get_u16();
        let length = data.get_u16() as usize;

        if data.remaining() < length {
            return Err(FusionError::InvalidSize {
                expected: length,
                actual: data.remaining(),
            });
        }

        let string = String::from_utf8(data[..length].to_vec())?;
        Ok(StringMessage { encoding, string })
    }
}

impl From<&str> for StringMessage {
    fn from(s: &str) -> Self {
        StringMessage::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_type() {
        assert_eq!(StringMessage::message_type(), "STRING");
    }

    #[test]
    fn test_roundtrip() {
        let original = StringMessage::new("DepthMm=55");
        let decoded = StringMessage::decode_content(&original.encode_content().unwrap()).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_roundtrip_multibyte() {
        let original = StringMessage::new("深度 55 mm");
        let decoded = StringMessage::decode_content(&original.encode_content().unwrap()).unwrap();
        assert_eq!(decoded.string, "深度 55 mm");
    }

    #[test]
    fn test_wire_prefix() {
        let encoded = StringMessage::new("X").encode_content().unwrap();
        assert_eq!(&encoded[0..2], &[0x00, 0x6A]); // UTF-8 MIBenum 106
        assert_eq!(&encoded[2..4], &[0x00, 0x01]);
        assert_eq!(&encoded[4..], b"X");
    }

    #[test]
    fn test_empty_payload() {
        let encoded = StringMessage::new("").encode_content().unwrap();
        assert_eq!(encoded.len(), 4);
        assert!(StringMessage::decode_content(&encoded).unwrap().is_empty());
    }

    #[test]
    fn test_payload_too_large() {
        let msg = StringMessage::new("A".repeat(u16::MAX as usize + 1));
        assert!(matches!(
            msg.encode_content(),
            Err(FusionError::BodyTooLarge { .. })
        ));
    }

    #[test]
    fn test_truncated_payload() {
        let mut data = vec![0x00, 0x6A, 0x00, 0x0A];
        data.extend_from_slice(b"short");
        assert!(matches!(
            StringMessage::decode_content(&data),
            Err(FusionError::InvalidSize { .. })
        ));
    }
}
