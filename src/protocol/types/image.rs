//! IMAGE message body
//!
//! Carries one 2D/3D pixel frame: dimensions, spacing, sub-volume window,
//! scalar format, raw pixels, and the embedded image-to-reference transform.
//! The envelope timestamp carries the frame time.
//!
//! # Wire Format
//!
//! All numeric fields big-endian, in this order:
//! - DIMENSIONS: `i32[3]` pixels
//! - SPACING: `f32[3]` mm per pixel
//! - SUBVOLUME SIZE: `i32[3]` pixels
//! - SUBVOLUME OFFSET: `i32[3]` pixels
//! - SCALAR TYPE: i32 code
//! - COMPONENTS: i32
//! - ENDIAN: u8 (1 = big, 2 = little) for the pixel payload
//! - PIXELS: `dims x scalar size x components` bytes
//! - MATRIX: `f32[12]`, row-major 3x4 image-to-reference transform

use crate::error::{FusionError, Result};
use crate::frame::video::{ImageType, ScalarType, VideoFrame};
use crate::protocol::message::Message;
use bytes::{Buf, BufMut};

/// Byte order of the pixel payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Big = 1,
    Little = 2,
}

impl Endian {
    /// Map the wire flag to an endianness
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            1 => Ok(Endian::Big),
            2 => Ok(Endian::Little),
            _ => Err(FusionError::InvalidHeader(format!(
                "invalid endian flag: {value}"
            ))),
        }
    }
}

/// Identity 3x4 matrix
pub const IDENTITY_3X4: [[f32; 4]; 3] = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
];

/// Pixel frame on the wire
#[derive(Debug, Clone, PartialEq)]
pub struct ImageMessage {
    /// Image dimensions in pixels
    pub dimensions: [i32; 3],
    /// Pixel spacing in millimeters
    pub spacing: [f32; 3],
    /// Transmitted sub-volume size in pixels
    pub subvolume_size: [i32; 3],
    /// Transmitted sub-volume offset in pixels
    pub subvolume_offset: [i32; 3],
    /// Pixel scalar type
    pub scalar_type: ScalarType,
    /// Scalar components per pixel
    pub num_components: i32,
    /// Byte order of the pixel payload
    pub endian: Endian,
    /// Raw pixel bytes
    pub data: Vec<u8>,
    /// Embedded image-to-reference transform, row-major 3x4
    pub matrix: [[f32; 4]; 3],
}

impl ImageMessage {
    /// Fixed prelude before the pixel payload: 12 + 12 + 12 + 12 + 4 + 4 + 1
    const PRELUDE_SIZE: usize = 57;
    /// Embedded matrix after the pixel payload
    const MATRIX_SIZE: usize = 48;

    /// Build a whole-frame message around a pixel buffer
    ///
    /// The sub-volume covers the entire frame and the payload is declared
    /// big-endian, matching this codec's scalar encoding.
    pub fn new(scalar_type: ScalarType, dimensions: [i32; 3], data: Vec<u8>) -> Result<Self> {
        let expected = expected_pixel_bytes(&dimensions, scalar_type, 1)?;
        if data.len() != expected {
            return Err(FusionError::InvalidSize {
                expected,
                actual: data.len(),
            });
        }

        Ok(ImageMessage {
            dimensions,
            spacing: [1.0, 1.0, 1.0],
            subvolume_size: dimensions,
            subvolume_offset: [0, 0, 0],
            scalar_type,
            num_components: 1,
            endian: Endian::Big,
            data,
            matrix: IDENTITY_3X4,
        })
    }

    /// Build a message from a frame's image data
    ///
    /// Fails when the frame holds no valid image.
    pub fn from_video_frame(frame: &VideoFrame) -> Result<Self> {
        if !frame.is_valid() {
            return Err(FusionError::InvalidArgument(
                "frame image data is not valid".to_string(),
            ));
        }
        let size = frame.frame_size();
        let dimensions = [size[0] as i32, size[1] as i32, size[2] as i32];
        // frame validity guarantees a scalar type
        let scalar_type = frame.scalar_type().unwrap_or(ScalarType::Uint8);

        Ok(ImageMessage {
            dimensions,
            spacing: [1.0, 1.0, 1.0],
            subvolume_size: dimensions,
            subvolume_offset: [0, 0, 0],
            scalar_type,
            num_components: frame.num_components() as i32,
            endian: Endian::Big,
            data: frame.data().to_vec(),
            matrix: IDENTITY_3X4,
        })
    }

    /// Set the pixel spacing
    pub fn with_spacing(mut self, spacing: [f32; 3]) -> Self {
        self.spacing = spacing;
        self
    }

    /// Set the embedded image-to-reference transform
    pub fn with_matrix(mut self, matrix: [[f32; 4]; 3]) -> Self {
        self.matrix = matrix;
        self
    }

    /// Rebuild an owned frame image from the payload
    ///
    /// Multi-component payloads are marked as color frames.
    pub fn to_video_frame(&self) -> Result<VideoFrame> {
        let size = [
            self.dimensions[0] as u32,
            self.dimensions[1] as u32,
            self.dimensions[2] as u32,
        ];
        let mut frame = VideoFrame::from_data(
            size,
            self.scalar_type,
            self.num_components as u32,
            self.data.clone(),
        )?;
        if self.num_components > 1 {
            frame.set_image_type(ImageType::RgbColor);
        }
        Ok(frame)
    }

    /// Total number of pixels
    pub fn num_pixels(&self) -> usize {
        self.dimensions.iter().map(|&d| d.max(0) as usize).product()
    }
}

fn expected_pixel_bytes(
    dimensions: &[i32; 3],
    scalar_type: ScalarType,
    num_components: i32,
) -> Result<usize> {
    if dimensions.iter().any(|&d| d < 0) || num_components <= 0 {
        return Err(FusionError::InvalidArgument(format!(
            "negative image geometry: dims {dimensions:?}, components {num_components}"
        )));
    }
    Ok(dimensions.iter().map(|&d| d as usize).product::<usize>()
        * scalar_type.size()
        * num_components as usize)
}

impl Message for ImageMessage {
    fn message_type() -> &'static str {
        "IMAGE"
    }

    fn encode_content(&self) -> Result<Vec<u8>> {
        let expected = expected_pixel_bytes(&self.dimensions, self.scalar_type, self.num_components)?;
        if self.data.len() != expected {
            return Err(FusionError::InvalidSize {
                expected,
                actual: self.data.len(),
            });
        }

        let mut buf =
            Vec::with_capacity(Self::PRELUDE_SIZE + self.data.len() + Self::MATRIX_SIZE);

        for &d in &self.dimensions {
            buf.put_i32(d);
        }
        for &s in &self.spacing {
            buf.put_f32(s);
        }
        for &s in &self.subvolume_size {
            buf.put_i32(s);
        }
        for &o in &self.subvolume_offset {
            buf.put_i32(o);
        }
        buf.put_i32(self.scalar_type.code());
        buf.put_i32(self.num_components);
        buf.put_u8(self.endian as u8);

        buf.extend_from_slice(&self.data);

        for row in &self.matrix {
            for &val in row {
                buf.put_f32(val);
            }
        }

        Ok(buf)
    }

    fn decode_content(mut data: &[u8]) -> Result<Self> {
        if data.len() < Self::PRELUDE_SIZE + Self::MATRIX_SIZE {
            return Err(FusionError::InvalidSize {
                expected: Self::PRELUDE_SIZE + Self::MATRIX_SIZE,
                actual: data.len(),
            });
        }

        let dimensions = [data.get_i32(), data.get_i32(), data.get_i32()];
        let spacing = [data.get_f32(), data.get_f32(), data.get_f32()];
        let subvolume_size = [data.get_i32(), data.get_i32(), data.get_i32()];
        let subvolume_offset = [data.get_i32(), data.get_i32(), data.get_i32()];
        let scalar_type = ScalarType::from_code(data.get_i32())?;
        let num_components = data.get_i32();
        let endian = Endian::from_u8(data.get_u8())?;

        let pixel_bytes = expected_pixel_bytes(&dimensions, scalar_type, num_components)?;
        if data.remaining() != pixel_bytes + Self::MATRIX_SIZE {
            return Err(FusionError::InvalidSize {
                expected: pixel_bytes + Self::MATRIX_SIZE,
                actual: data.remaining(),
            });
        }

        let pixels = data[..pixel_bytes].to_vec();
        data.advance(pixel_bytes);

        let mut matrix = [[0.0f32; 4]; 3];
        for row in &mut matrix {
            for val in row {
                *val = data.get_f32();
            }
        }

        Ok(ImageMessage {
            dimensions,
            spacing,
            subvolume_size,
            subvolume_offset,
            scalar_type,
            num_components,
            endian,
            data: pixels,
            matrix,
        })
    }
}
