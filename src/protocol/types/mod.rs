//! Wire message kind implementations
//!
//! One module per message kind; each implements
//! [`Message`](crate::protocol::message::Message) for its body layout.

pub mod image;
pub mod imgmeta;
pub mod polydata;
pub mod position;
pub mod string;
pub mod tdata;
pub mod tracked_frame;
pub mod transform;
pub mod us;

pub use image::{Endian, ImageMessage};
pub use imgmeta::{ImageMetaElement, ImageMetaMessage};
pub use polydata::PolyDataMessage;
pub use position::PositionMessage;
pub use string::StringMessage;
pub use tdata::{TrackingDataElement, TrackingDataMessage, MAX_TOOL_NAME_LEN};
pub use tracked_frame::TrackedFrameMessage;
pub use transform::TransformMessage;
pub use us::{UsMessage, US_FIELD_KEYS};
