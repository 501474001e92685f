//! TRANSFORM message body
//!
//! Carries one 4x4 homogeneous transform. Only the upper 3x4 portion travels
//! on the wire (48 bytes, column-major: rotation columns, then translation);
//! the last row is always [0, 0, 0, 1]. The envelope device name carries the
//! rendered TransformName, the envelope timestamp the frame time.

use crate::error::{FusionError, Result};
use crate::protocol::message::Message;
use bytes::{Buf, BufMut};

/// A 4x4 homogeneous transform on the wire
#[derive(Debug, Clone, PartialEq)]
pub struct TransformMessage {
    /// Row-major 4x4 matrix; upper-left 3x3 rotation, upper-right translation
    pub matrix: [[f32; 4]; 4],
}

impl TransformMessage {
    /// Identity transform
    pub fn identity() -> Self {
        TransformMessage {
            matrix: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Build from 16 row-major doubles as stored in a frame dictionary
    pub fn from_row_major_f64(values: &[f64; 16]) -> Self {
        let mut matrix = [[0.0f32; 4]; 4];
        for row in 0..4 {
            for col in 0..4 {
                matrix[row][col] = values[row * 4 + col] as f32;
            }
        }
        TransformMessage { matrix }
    }

    /// Render to 16 row-major doubles for storage in a frame dictionary
    pub fn to_row_major_f64(&self) -> [f64; 16] {
        let mut values = [0.0f64; 16];
        for row in 0..4 {
            for col in 0..4 {
                values[row * 4 + col] = self.matrix[row][col] as f64;
            }
        }
        values
    }
}

impl Message for TransformMessage {
    fn message_type() -> &'static str {
        "TRANSFORM"
    }

    fn encode_content(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(48);

        // 3x4 portion in column-major order:
        // R11 R21 R31 R12 R22 R32 R13 R23 R33 TX TY TZ
        for col in 0..4 {
            for row in 0..3 {
                buf.put_f32(self.matrix[row][col]);
            }
        }

        Ok(buf)
    }

    fn decode_content(data: &[u8]) -> Result<Self> {
        if data.len() != 48 {
            return Err(FusionError::InvalidSize {
                expected: 48,
                actual: data.len(),
            });
        }

        let mut cursor = std::io::Cursor::new(data);
        let mut matrix = [[0.0f32; 4]; 4];
        for col in 0..4 {
            for row in matrix.iter_mut().take(3) {
                row[col] = cursor.get_f32();
            }
        }
        matrix[3] = [0.0, 0.0, 0.0, 1.0];

        Ok(TransformMessage { matrix })
    }
}
