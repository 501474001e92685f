//! Binary wire protocol
//!
//! Envelope header + per-kind bodies with CRC-64 integrity checking. Pack
//! and unpack are synchronous transforms over byte buffers the transport
//! already received; no I/O happens here.

pub mod crc;
pub mod header;
pub mod message;
pub mod types;

pub use crc::{calculate_crc, verify_crc};
pub use header::{DeviceName, Header, Timestamp, TypeName};
pub use message::{Message, WireMessage};
pub use types::{ImageMessage, TrackedFrameMessage, TransformMessage};
