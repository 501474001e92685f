//! Error types for tracked-frame and wire-codec operations
//!
//! Every fallible operation in this crate returns [`Result<T>`]. Errors are
//! explicit typed results: recoverable "absent" conditions (a missing optional
//! field, no poly data) are reported as `Option`/`None` by the accessors
//! instead of an error variant.

use thiserror::Error;

/// Unified error type for tracked-frame, XML, and wire-codec operations
#[derive(Error, Debug)]
pub enum FusionError {
    /// A required argument was empty or otherwise unusable
    ///
    /// Raised when a caller violates the API contract, e.g. writing a frame
    /// field with an empty name or packing an image message from a frame
    /// without valid image data.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A transform name string is missing its recognized suffix or a
    /// `<From>To<To>` separator
    ///
    /// Transform field keys must read `<From>To<To>Transform` or
    /// `<From>To<To>TransformStatus` with non-empty coordinate-frame tokens.
    #[error("Malformed transform name: {0}")]
    MalformedName(String),

    /// A requested field or transform is absent from the frame dictionary
    #[error("Not found: {0}")]
    NotFound(String),

    /// Wire message integrity code mismatch
    ///
    /// The message body was corrupted in transit. The body is discarded and no
    /// entity is produced; the caller decides whether to request
    /// retransmission. This is not a fatal condition for the core.
    #[error("CRC mismatch: expected {expected:#x}, got {actual:#x}")]
    CrcMismatch {
        /// CRC value carried in the message header
        expected: u64,
        /// CRC value calculated from the received body
        actual: u64,
    },

    /// Invalid envelope header format or content
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// A message body or body section does not have the expected size
    #[error("Invalid message size: expected {expected}, got {actual}")]
    InvalidSize {
        /// Expected size in bytes based on the message format
        expected: usize,
        /// Actual size in bytes received or parsed
        actual: usize,
    },

    /// A scalar-type code from the wire has no local pixel-format mapping
    #[error("Unsupported pixel format code: {0}")]
    UnsupportedPixelFormat(i32),

    /// A bounded-length wire field exceeds its maximum
    ///
    /// Image-meta strings have fixed byte budgets on the wire; packing fails
    /// rather than silently truncating identifying data.
    #[error("Field too long: {size} bytes (max: {max})")]
    FieldTooLong {
        /// Actual field length in bytes
        size: usize,
        /// Maximum allowed length in bytes
        max: usize,
    },

    /// Message body size exceeds the maximum the format can carry
    #[error("Message body too large: {size} bytes (max: {max})")]
    BodyTooLarge {
        /// Actual body size in bytes
        size: usize,
        /// Maximum allowed size in bytes
        max: usize,
    },

    /// A wire string field contains invalid UTF-8
    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// XML representation could not be read or written
    #[error("XML error: {0}")]
    Xml(String),

    /// A serialized scalar value (timestamp, matrix entry, encoder position)
    /// failed to parse
    #[error("Value parse error: {0}")]
    ParseValue(String),
}

impl From<quick_xml::Error> for FusionError {
    fn from(err: quick_xml::Error) -> Self {
        FusionError::Xml(err.to_string())
    }
}

impl From<std::num::ParseFloatError> for FusionError {
    fn from(err: std::num::ParseFloatError) -> Self {
        FusionError::ParseValue(err.to_string())
    }
}

/// Result type alias for crate operations
pub type Result<T> = std::result::Result<T, FusionError>;
