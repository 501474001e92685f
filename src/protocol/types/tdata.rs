//! TDATA message body
//!
//! Multi-tool tracking data: one element per tracked tool, sharing the
//! envelope timestamp. Tool names are truncated to the 19-byte wire slot;
//! every element carries the "6D" (full pose) type tag.

use crate::error::{FusionError, Result};
use crate::protocol::message::Message;
use bytes::{Buf, BufMut};

/// Wire tag marking a full 6-DOF pose element
const ELEMENT_TYPE_6D: u8 = 2;

/// Maximum tool name bytes kept on the wire (one byte reserved for null)
pub const MAX_TOOL_NAME_LEN: usize = 19;

/// One tracked tool: name plus its pose matrix
///
/// Element wire layout: NAME `char[20]` + TYPE u8 + RESERVED u8 +
/// MATRIX `f32[12]` = 70 bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingDataElement {
    /// Tool name; truncated to [`MAX_TOOL_NAME_LEN`] bytes when packed
    pub name: String,
    /// Upper 3x4 of the pose matrix, row-major
    pub matrix: [[f32; 4]; 3],
}

impl TrackingDataElement {
    /// Create an element from a name and pose matrix
    pub fn new(name: impl Into<String>, matrix: [[f32; 4]; 3]) -> Self {
        TrackingDataElement {
            name: name.into(),
            matrix,
        }
    }

    /// Create an element with the identity pose
    pub fn identity(name: impl Into<String>) -> Self {
        TrackingDataElement {
            name: name.into(),
            matrix: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
            ],
        }
    }
}

/// TDATA message: a set of tracked tool poses
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrackingDataMessage {
    /// Tracked tool elements
    pub elements: Vec<TrackingDataElement>,
}

impl TrackingDataMessage {
    /// Create from a list of elements
    pub fn new(elements: Vec<TrackingDataElement>) -> Self {
        TrackingDataMessage { elements }
    }

    /// Append an element
    pub fn add_element(&mut self, element: TrackingDataElement) {
        self.elements.push(element);
    }

    /// Number of tracked tools
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// True iff the message has no elements
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl Message for TrackingDataMessage {
    fn message_type() -> &'static str {
        "TDATA"
    }

    fn encode_content(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.elements.len() * 70);

        for element in &self.elements {
            let mut name_bytes = [0u8; 20];
            let name = element.name.as_bytes();
            let len = name.len().min(MAX_TOOL_NAME_LEN);
            name_bytes[..len].copy_from_slice(&name[..len]);
            buf.extend_from_slice(&name_bytes);

            buf.put_u8(ELEMENT_TYPE_6D);
            buf.put_u8(0); // reserved

            for row in &element.matrix {
                for &val in row {
                    buf.put_f32(val);
                }
            }
        }

        Ok(buf)
    }

    fn decode_content(mut data: &[u8]) -> Result<Self> {
        if data.len() % 70 != 0 {
            return Err(FusionError::InvalidSize {
                expected: (data.len() / 70 + 1) * 70,
                actual: data.len(),
            });
        }

        let mut elements = Vec::with_capacity(data.len() / 70);
        while data.remaining() >= 70 {
            let name_bytes = &data[..20];
            let name_len = name_bytes.iter().position(|&b| b == 0).unwrap_or(20);
            let name = String::from_utf8(name_bytes[..name_len].to_vec())?;
            data.advance(20);

            let _element_type = data.get_u8();
            let _reserved = data.get_u8();

            let mut matrix = [[0.0f32; 4]; 3];
            for row in &mut matrix {
                for val in row {
                    *val = data.get_f32();
                }
            }

            elements.push(TrackingDataElement { name, matrix });
        }

        Ok(TrackingDataMessage { elements })
    }
}
