//! Tracked-frame data model and streaming codecs for image-guided
//! interventions
//!
//! Acquisition software fuses ultrasound/video frames with spatial-tracking
//! poses into *tracked frames* and exchanges them with navigation and
//! visualization clients. This crate provides the core of that pipeline:
//!
//! - **`frame`** - the [`TrackedFrame`](frame::TrackedFrame) entity: an owned
//!   image, a timestamp, and an ordered dictionary of named transforms,
//!   statuses, and metadata, with deep-copy value semantics. Includes the
//!   `<From>To<To>` naming convention, the XML representation, and the
//!   sequence validator that gates frames entering a time-ordered history.
//! - **`protocol`** - the binary wire protocol: a 58-byte envelope header
//!   with a CRC-64 integrity code, and per-kind bodies (IMAGE, TRANSFORM,
//!   POSITION, TDATA, STRING, POLYDATA, IMGMETA, plus the TRACKEDFRAME and
//!   USFRAME composites).
//! - **`capture`** - the contract toward device drivers and the bounded
//!   channel that carries raw frames from a capture thread to the single
//!   consumer assembling entities.
//!
//! Socket transport, device SDKs, and rendering are external collaborators;
//! everything here is a bounded-time transform over in-memory data.
//!
//! # Building and serializing a frame
//!
//! ```
//! use igtfusion::frame::{xml, FieldStatus, TrackedFrame, TransformName};
//!
//! let mut frame = TrackedFrame::new();
//! frame.set_timestamp(5.125);
//!
//! let probe = TransformName::new("Probe", "Tracker")?;
//! let mut pose = igtfusion::frame::identity_matrix();
//! pose[3] = 42.0;
//! frame.set_transform(&probe, &pose)?;
//! frame.set_transform_status(&probe, FieldStatus::Ok)?;
//! frame.set_custom_field("FrameNumber", "1")?;
//!
//! let exported = xml::to_xml(&frame, &[])?;
//! let restored = xml::from_xml(&exported)?;
//! assert_eq!(restored.transform(&probe)?, pose);
//! # Ok::<(), igtfusion::FusionError>(())
//! ```
//!
//! # Sending a frame over the wire
//!
//! ```
//! use igtfusion::protocol::{TransformMessage, WireMessage};
//!
//! let transform = TransformMessage::identity();
//! let msg = WireMessage::new(transform, "ProbeToTracker")?.with_timestamp(5.125);
//!
//! let bytes = msg.pack()?;
//! let received = WireMessage::<TransformMessage>::unpack(&bytes)?;
//! assert_eq!(received.content, TransformMessage::identity());
//! # Ok::<(), igtfusion::FusionError>(())
//! ```
//!
//! A corrupted body never produces an entity: `unpack` verifies the
//! integrity code first and returns [`FusionError::CrcMismatch`], leaving
//! retransmission policy to the transport.

pub mod capture;
pub mod error;
pub mod frame;
pub mod protocol;

pub use error::{FusionError, Result};
