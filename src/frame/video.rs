//! Owned pixel buffer of a tracked frame
//!
//! A [`VideoFrame`] carries the raw pixels together with the geometry needed
//! to interpret them: frame size (depth is 1 for 2D frames), scalar type and
//! component count. An invalid (empty) frame is a legal state; tracker-only
//! frames carry no image.

use crate::error::{FusionError, Result};

/// Pixel scalar type, identified on the wire by a one-byte code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    Int8 = 2,
    Uint8 = 3,
    Int16 = 4,
    Uint16 = 5,
    Int32 = 6,
    Uint32 = 7,
    Float32 = 10,
    Float64 = 11,
}

impl ScalarType {
    /// Scalar size in bytes
    pub fn size(&self) -> usize {
        match self {
            ScalarType::Int8 | ScalarType::Uint8 => 1,
            ScalarType::Int16 | ScalarType::Uint16 => 2,
            ScalarType::Int32 | ScalarType::Uint32 | ScalarType::Float32 => 4,
            ScalarType::Float64 => 8,
        }
    }

    /// Scalar size in bits
    pub fn bits(&self) -> usize {
        self.size() * 8
    }

    /// Wire code of this scalar type
    pub fn code(&self) -> i32 {
        *self as i32
    }

    /// Map a wire code to a scalar type
    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            2 => Ok(ScalarType::Int8),
            3 => Ok(ScalarType::Uint8),
            4 => Ok(ScalarType::Int16),
            5 => Ok(ScalarType::Uint16),
            6 => Ok(ScalarType::Int32),
            7 => Ok(ScalarType::Uint32),
            10 => Ok(ScalarType::Float32),
            11 => Ok(ScalarType::Float64),
            _ => Err(FusionError::UnsupportedPixelFormat(code)),
        }
    }
}

/// Interpretation of the pixel components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageType {
    /// Single-channel brightness image (B-mode ultrasound, grayscale video)
    #[default]
    Brightness,
    /// Multi-channel color image
    RgbColor,
}

/// Owned pixel buffer with frame geometry
///
/// Value type with deep-copy semantics: `clone` duplicates the pixel data.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VideoFrame {
    frame_size: [u32; 3],
    scalar_type: Option<ScalarType>,
    num_components: u32,
    image_type: ImageType,
    data: Vec<u8>,
}

impl VideoFrame {
    /// An invalid frame carrying no pixels
    pub fn empty() -> Self {
        VideoFrame::default()
    }

    /// Allocate a zero-filled frame
    pub fn allocate(frame_size: [u32; 3], scalar_type: ScalarType, num_components: u32) -> Result<Self> {
        if num_components == 0 {
            return Err(FusionError::InvalidArgument(
                "component count must be positive".to_string(),
            ));
        }
        let len = frame_size.iter().product::<u32>() as usize
            * scalar_type.size()
            * num_components as usize;
        Ok(VideoFrame {
            frame_size,
            scalar_type: Some(scalar_type),
            num_components,
            image_type: ImageType::Brightness,
            data: vec![0u8; len],
        })
    }

    /// Build a frame from an existing pixel buffer
    ///
    /// The buffer length must match `frame size x scalar size x components`.
    pub fn from_data(
        frame_size: [u32; 3],
        scalar_type: ScalarType,
        num_components: u32,
        data: Vec<u8>,
    ) -> Result<Self> {
        if num_components == 0 {
            return Err(FusionError::InvalidArgument(
                "component count must be positive".to_string(),
            ));
        }
        let expected = frame_size.iter().product::<u32>() as usize
            * scalar_type.size()
            * num_components as usize;
        if data.len() != expected {
            return Err(FusionError::InvalidSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(VideoFrame {
            frame_size,
            scalar_type: Some(scalar_type),
            num_components,
            image_type: ImageType::Brightness,
            data,
        })
    }

    /// True iff the frame holds pixel data
    pub fn is_valid(&self) -> bool {
        self.scalar_type.is_some() && !self.data.is_empty()
    }

    /// Frame size in pixels (width, height, depth); depth is 1 for 2D frames
    pub fn frame_size(&self) -> [u32; 3] {
        self.frame_size
    }

    /// Pixel scalar type; `None` for an invalid frame
    pub fn scalar_type(&self) -> Option<ScalarType> {
        self.scalar_type
    }

    /// Number of scalar components per pixel
    pub fn num_components(&self) -> u32 {
        self.num_components
    }

    /// Component interpretation
    pub fn image_type(&self) -> ImageType {
        self.image_type
    }

    /// Set the component interpretation
    pub fn set_image_type(&mut self, image_type: ImageType) {
        self.image_type = image_type;
    }

    /// Raw pixel bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable raw pixel bytes
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Total pixel buffer size in bytes
    pub fn frame_size_in_bytes(&self) -> usize {
        self.data.len()
    }

    /// Bits per scalar; 0 for an invalid frame
    pub fn bits_per_scalar(&self) -> usize {
        self.scalar_type.map(|t| t.bits()).unwrap_or(0)
    }

    /// Bits per pixel (scalar bits x component count)
    pub fn bits_per_pixel(&self) -> usize {
        self.bits_per_scalar() * self.num_components as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_type_codes_roundtrip() {
        for t in [
            ScalarType::Int8,
            ScalarType::Uint8,
            ScalarType::Int16,
            ScalarType::Uint16,
            ScalarType::Int32,
            ScalarType::Uint32,
            ScalarType::Float32,
            ScalarType::Float64,
        ] {
            assert_eq!(ScalarType::from_code(t.code()).unwrap(), t);
        }
    }

    #[test]
    fn test_unknown_scalar_code() {
        assert!(matches!(
            ScalarType::from_code(9),
            Err(FusionError::UnsupportedPixelFormat(9))
        ));
    }

    #[test]
    fn test_empty_frame_is_invalid() {
        let frame = VideoFrame::empty();
        assert!(!frame.is_valid());
        assert_eq!(frame.bits_per_pixel(), 0);
    }

    #[test]
    fn test_allocate() {
        let frame = VideoFrame::allocate([64, 48, 1], ScalarType::Uint8, 1).unwrap();
        assert!(frame.is_valid());
        assert_eq!(frame.frame_size_in_bytes(), 64 * 48);
        assert_eq!(frame.bits_per_scalar(), 8);
        assert_eq!(frame.bits_per_pixel(), 8);
    }

    #[test]
    fn test_from_data_size_check() {
        let result = VideoFrame::from_data([10, 10, 1], ScalarType::Uint16, 1, vec![0u8; 100]);
        assert!(matches!(result, Err(FusionError::InvalidSize { .. })));

        let frame = VideoFrame::from_data([10, 10, 1], ScalarType::Uint16, 1, vec![0u8; 200]).unwrap();
        assert_eq!(frame.bits_per_pixel(), 16);
    }

    #[test]
    fn test_rgb_bits_per_pixel() {
        let frame = VideoFrame::allocate([4, 4, 1], ScalarType::Uint8, 3).unwrap();
        assert_eq!(frame.bits_per_pixel(), 24);
        assert_eq!(frame.frame_size_in_bytes(), 48);
    }

    #[test]
    fn test_clone_is_deep() {
        let mut original = VideoFrame::allocate([2, 2, 1], ScalarType::Uint8, 1).unwrap();
        let copy = original.clone();
        original.data_mut()[0] = 0xFF;
        assert_eq!(copy.data()[0], 0);
    }
}
