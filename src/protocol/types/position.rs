//! POSITION message body
//!
//! Compact pose: a 3-vector position plus a rotation quaternion, 28 bytes.
//! Preferred over TRANSFORM for high-rate tracking where bandwidth matters.
//! The envelope device name carries the rendered TransformName.
//!
//! # Quaternion convention
//!
//! Components are `[ox, oy, oz, w]` (scalar-last), right-handed, expected
//! unit norm. `to_matrix` uses the standard unit-quaternion rotation formula;
//! on unpack only the translation is bit-exact, rotation carries f32
//! round-off.

use crate::error::{FusionError, Result};
use crate::protocol::message::Message;
use bytes::{Buf, BufMut};

/// Position + quaternion pose on the wire
#[derive(Debug, Clone, PartialEq)]
pub struct PositionMessage {
    /// Position in millimeters
    pub position: [f32; 3],
    /// Orientation quaternion `[ox, oy, oz, w]`, scalar-last
    pub quaternion: [f32; 4],
}

impl PositionMessage {
    /// Origin position with identity orientation
    pub fn identity() -> Self {
        PositionMessage {
            position: [0.0, 0.0, 0.0],
            quaternion: [0.0, 0.0, 0.0, 1.0],
        }
    }

    /// Position with identity orientation
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        PositionMessage {
            position: [x, y, z],
            quaternion: [0.0, 0.0, 0.0, 1.0],
        }
    }

    /// Position with explicit quaternion
    pub fn with_quaternion(position: [f32; 3], quaternion: [f32; 4]) -> Self {
        PositionMessage {
            position,
            quaternion,
        }
    }

    /// Convert to a 4x4 row-major matrix
    ///
    /// The translation column is copied exactly; the rotation block is built
    /// from the unit quaternion. A non-unit quaternion is normalized first;
    /// a zero quaternion yields the identity rotation.
    pub fn to_matrix(&self) -> [f64; 16] {
        let [ox, oy, oz, w] = self.quaternion.map(|v| v as f64);
        let norm = (ox * ox + oy * oy + oz * oz + w * w).sqrt();

        let mut m = [0.0f64; 16];
        m[15] = 1.0;

        if norm <= f64::EPSILON {
            m[0] = 1.0;
            m[5] = 1.0;
            m[10] = 1.0;
        } else {
            let (x, y, z, w) = (ox / norm, oy / norm, oz / norm, w / norm);
            m[0] = 1.0 - 2.0 * (y * y + z * z);
            m[1] = 2.0 * (x * y - z * w);
            m[2] = 2.0 * (x * z + y * w);
            m[4] = 2.0 * (x * y + z * w);
            m[5] = 1.0 - 2.0 * (x * x + z * z);
            m[6] = 2.0 * (y * z - x * w);
            m[8] = 2.0 * (x * z - y * w);
            m[9] = 2.0 * (y * z + x * w);
            m[10] = 1.0 - 2.0 * (x * x + y * y);
        }

        m[3] = self.position[0] as f64;
        m[7] = self.position[1] as f64;
        m[11] = self.position[2] as f64;
        m
    }
}

impl Message for PositionMessage {
    fn message_type() -> &'static str {
        "POSITION"
    }

    fn encode_content(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(28);

        for &coord in &self.position {
            buf.put_f32(coord);
        }
        for &component in &self.quaternion {
            buf.put_f32(component);
        }

        Ok(buf)
    }

    fn decode_content(mut data: &[u8]) -> Result<Self> {
        if data.len() != 28 {
            return Err(FusionError::InvalidSize {
                expected: 28,
                actual: data.len(),
            });
        }

        let position = [data.get_f32(), data.get_f32(), data.get_f32()];
        let quaternion = [
            data.get_f32(),
            data.get_f32(),
            data.get_f32(),
            data.get_f32(),
        ];

        Ok(PositionMessage {
            position,
            quaternion,
        })
    }
}
