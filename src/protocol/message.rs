//! Message trait and generic wire envelope
//!
//! Each message kind implements [`Message`] to encode/decode its body;
//! [`WireMessage`] wraps a body with the envelope header and handles CRC
//! calculation on pack and verification on unpack.

use crate::error::{FusionError, Result};
use crate::protocol::crc::calculate_crc;
use crate::protocol::header::{DeviceName, Header, Timestamp, TypeName};

/// Common interface for all wire message kinds
pub trait Message: Sized {
    /// Message kind tag carried in the envelope header (e.g. "TRANSFORM")
    fn message_type() -> &'static str;

    /// Encode the message body (without envelope header)
    fn encode_content(&self) -> Result<Vec<u8>>;

    /// Decode the message body (without envelope header)
    fn decode_content(data: &[u8]) -> Result<Self>;
}

/// A message body wrapped with its envelope header
///
/// `pack` produces `header || body` with the body CRC filled in; `unpack`
/// validates the header, reads exactly body-length bytes, verifies the
/// integrity code, and only then decodes the body. A CRC mismatch returns
/// [`FusionError::CrcMismatch`] and produces no entity.
#[derive(Debug)]
pub struct WireMessage<T: Message> {
    /// Envelope header
    pub header: Header,
    /// Message body
    pub content: T,
}

impl<T: Message> WireMessage<T> {
    /// Wrap a message body with a generated header
    ///
    /// The header timestamp starts at zero; acquisition code sets it from the
    /// frame clock with [`WireMessage::with_timestamp`].
    pub fn new(content: T, device_name: &str) -> Result<Self> {
        let content_bytes = content.encode_content()?;

        let header = Header {
            version: 2,
            type_name: TypeName::new(T::message_type())?,
            device_name: DeviceName::new(device_name)?,
            timestamp: Timestamp::zero(),
            body_size: content_bytes.len() as u64,
            crc: 0, // calculated during pack
        };

        Ok(WireMessage { header, content })
    }

    /// Set the envelope timestamp from acquisition-clock seconds
    pub fn with_timestamp(mut self, seconds: f64) -> Self {
        self.header.timestamp = Timestamp::from_f64(seconds);
        self
    }

    /// Envelope timestamp as acquisition-clock seconds
    pub fn timestamp(&self) -> f64 {
        self.header.timestamp.to_f64()
    }

    /// Encode the complete message: header (58 bytes) followed by the body
    pub fn pack(&self) -> Result<Vec<u8>> {
        let body = self.content.encode_content()?;

        let mut header = self.header.clone();
        header.body_size = body.len() as u64;
        header.crc = calculate_crc(&body);

        let mut buf = Vec::with_capacity(Header::SIZE + body.len());
        buf.extend_from_slice(&header.encode());
        buf.extend_from_slice(&body);
        Ok(buf)
    }

    /// Decode a complete message from bytes
    ///
    /// Fails without partial output on a short buffer, a body-size mismatch,
    /// or an integrity-code mismatch.
    pub fn unpack(data: &[u8]) -> Result<Self> {
        if data.len() < Header::SIZE {
            return Err(FusionError::InvalidSize {
                expected: Header::SIZE,
                actual: data.len(),
            });
        }

        let header = Header::decode(&data[..Header::SIZE])?;

        let body_start = Header::SIZE;
        let body_end = body_start + header.body_size as usize;
        if data.len() < body_end {
            return Err(FusionError::InvalidSize {
                expected: body_end,
                actual: data.len(),
            });
        }
        let body = &data[body_start..body_end];

        let calculated = calculate_crc(body);
        if calculated != header.crc {
            return Err(FusionError::CrcMismatch {
                expected: header.crc,
                actual: calculated,
            });
        }

        let content = T::decode_content(body)?;

        Ok(WireMessage { header, content })
    }
}
