//! Wire message envelope header
//!
//! A fixed 58-byte header precedes every message: version, kind tag, device
//! name, timestamp, body size, and the CRC-64 integrity code of the body.
//! All numeric fields are big-endian.

use crate::error::{FusionError, Result};
use bytes::{Buf, BufMut, BytesMut};

/// Message kind tag (12 bytes, null-padded)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeName([u8; 12]);

impl TypeName {
    /// Create a kind tag from a string
    pub fn new(name: &str) -> Result<Self> {
        if name.len() > 12 {
            return Err(FusionError::InvalidHeader(format!(
                "Type name too long: {} bytes (max: 12)",
                name.len()
            )));
        }
        let mut bytes = [0u8; 12];
        bytes[..name.len()].copy_from_slice(name.as_bytes());
        Ok(TypeName(bytes))
    }

    /// Kind tag as a string, null padding trimmed
    pub fn as_str(&self) -> Result<&str> {
        let len = self.0.iter().position(|&b| b == 0).unwrap_or(12);
        std::str::from_utf8(&self.0[..len])
            .map_err(|_| FusionError::InvalidHeader("Invalid UTF-8 in type name".to_string()))
    }
}

impl From<[u8; 12]> for TypeName {
    fn from(bytes: [u8; 12]) -> Self {
        TypeName(bytes)
    }
}

/// Device name (20 bytes, null-padded)
///
/// Transform and position messages render the TransformName into this slot;
/// string messages carry the field name here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceName([u8; 20]);

impl DeviceName {
    /// Create a device name from a string
    pub fn new(name: &str) -> Result<Self> {
        if name.len() > 20 {
            return Err(FusionError::InvalidHeader(format!(
                "Device name too long: {} bytes (max: 20)",
                name.len()
            )));
        }
        let mut bytes = [0u8; 20];
        bytes[..name.len()].copy_from_slice(name.as_bytes());
        Ok(DeviceName(bytes))
    }

    /// Device name as a string, null padding trimmed
    pub fn as_str(&self) -> Result<&str> {
        let len = self.0.iter().position(|&b| b == 0).unwrap_or(20);
        std::str::from_utf8(&self.0[..len])
            .map_err(|_| FusionError::InvalidHeader("Invalid UTF-8 in device name".to_string()))
    }
}

impl From<[u8; 20]> for DeviceName {
    fn from(bytes: [u8; 20]) -> Self {
        DeviceName(bytes)
    }
}

/// Wire timestamp: upper 32 bits whole seconds, lower 32 bits binary fraction
///
/// The acquisition clock domain produces floating-point seconds; the envelope
/// carries them as 32.32 fixed point, which preserves sub-microsecond
/// resolution over the frame rates trackers produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    /// Whole seconds
    pub seconds: u32,
    /// Fractional seconds as a 32-bit binary fraction
    pub fraction: u32,
}

impl Timestamp {
    /// Create a timestamp from raw seconds and fraction fields
    pub fn new(seconds: u32, fraction: u32) -> Self {
        Timestamp { seconds, fraction }
    }

    /// Zero timestamp (no timestamp)
    pub fn zero() -> Self {
        Timestamp {
            seconds: 0,
            fraction: 0,
        }
    }

    /// Convert acquisition-clock seconds to the wire representation
    ///
    /// Negative or non-finite inputs clamp to zero; the acquisition clock is
    /// monotonic and non-negative by contract.
    pub fn from_f64(seconds: f64) -> Self {
        if !seconds.is_finite() || seconds <= 0.0 {
            return Timestamp::zero();
        }
        let whole = seconds.floor();
        let frac = seconds - whole;
        Timestamp {
            seconds: whole as u32,
            fraction: (frac * (u32::MAX as f64 + 1.0)) as u32,
        }
    }

    /// Convert to floating-point seconds
    pub fn to_f64(self) -> f64 {
        let frac = (self.fraction as f64) / (u32::MAX as f64 + 1.0);
        (self.seconds as f64) + frac
    }

    /// Pack into the 64-bit wire field
    pub fn to_u64(self) -> u64 {
        ((self.seconds as u64) << 32) | (self.fraction as u64)
    }

    /// Unpack from the 64-bit wire field
    pub fn from_u64(value: u64) -> Self {
        Timestamp {
            seconds: (value >> 32) as u32,
            fraction: (value & 0xFFFF_FFFF) as u32,
        }
    }
}

/// Message envelope header (58 bytes fixed size)
///
/// Layout, all big-endian:
/// - Version: u16
/// - Kind tag: `char[12]`, null-padded
/// - Device name: `char[20]`, null-padded
/// - Timestamp: u64 (32.32 fixed point)
/// - Body size: u64
/// - CRC: u64 integrity code over the body
#[derive(Debug, Clone)]
pub struct Header {
    /// Protocol version number
    pub version: u16,
    /// Message kind tag
    pub type_name: TypeName,
    /// Device or transform name
    pub device_name: DeviceName,
    /// Frame timestamp
    pub timestamp: Timestamp,
    /// Size of the body in bytes
    pub body_size: u64,
    /// Integrity code of the body
    pub crc: u64,
}

impl Header {
    /// Header size in bytes
    pub const SIZE: usize = 58;

    /// Decode a header from a byte slice of at least 58 bytes
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < Self::SIZE {
            return Err(FusionError::InvalidSize {
                expected: Self::SIZE,
                actual: buf.len(),
            });
        }

        let mut cursor = std::io::Cursor::new(buf);

        let version = cursor.get_u16();

        let mut type_bytes = [0u8; 12];
        cursor.copy_to_slice(&mut type_bytes);
        let type_name = TypeName::from(type_bytes);

        let mut device_bytes = [0u8; 20];
        cursor.copy_to_slice(&mut device_bytes);
        let device_name = DeviceName::from(device_bytes);

        let timestamp = Timestamp::from_u64(cursor.get_u64());
        let body_size = cursor.get_u64();
        let crc = cursor.get_u64();

        Ok(Header {
            version,
            type_name,
            device_name,
            timestamp,
            body_size,
            crc,
        })
    }

    /// Encode the header into a 58-byte vector
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(Self::SIZE);

        buf.put_u16(self.version);
        buf.put_slice(&self.type_name.0);
        buf.put_slice(&self.device_name.0);
        buf.put_u64(self.timestamp.to_u64());
        buf.put_u64(self.body_size);
        buf.put_u64(self.crc);

        buf.to_vec()
    }
}
