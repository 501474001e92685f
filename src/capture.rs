//! Capture collaborator contract and frame delivery
//!
//! Device drivers live outside this crate; they hand over raw pixel buffers
//! and frame geometry through the [`CaptureDevice`] contract. Push-style
//! hardware callbacks are decoupled from the consumer by a bounded channel:
//! the capture thread pushes [`RawFrame`]s, a single consumer assembles
//! [`TrackedFrame`] entities from them. The core does not depend on any
//! particular device SDK threading model.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use serde::Deserialize;
use tracing::warn;

use crate::error::{FusionError, Result};
use crate::frame::video::{ScalarType, VideoFrame};
use crate::frame::{TrackedFrame, FIELD_FRIENDLY_DEVICE_NAME};

/// One raw sample handed over by a capture device
#[derive(Debug, Clone)]
pub struct RawFrame {
    /// Raw pixel bytes
    pub data: Vec<u8>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Pixel scalar type
    pub pixel_format: ScalarType,
    /// Scalar components per pixel
    pub num_components: u32,
    /// Device clock timestamp in seconds
    pub timestamp: f64,
}

/// Contract a capture device driver fulfills toward the core
///
/// Pull-mode devices implement `poll_frame`; push-mode devices call
/// [`FrameProducer::push`] from their callback instead and leave `poll_frame`
/// returning `None`.
pub trait CaptureDevice {
    /// Open the device
    fn connect(&mut self) -> Result<()>;

    /// Close the device
    fn disconnect(&mut self);

    /// Begin producing frames
    fn start_streaming(&mut self) -> Result<()>;

    /// Stop producing frames
    fn stop_streaming(&mut self);

    /// Fetch the next frame, or `None` when no frame is pending
    fn poll_frame(&mut self) -> Result<Option<RawFrame>>;
}

/// Producer half of the capture channel; owned by the capture thread
#[derive(Debug, Clone)]
pub struct FrameProducer {
    tx: Sender<RawFrame>,
}

impl FrameProducer {
    /// Push a raw frame toward the consumer
    ///
    /// A full channel drops the frame with a warning: on a live stream the
    /// next sample supersedes a late one. A disconnected consumer is a
    /// contract violation and reported as an error.
    pub fn push(&self, frame: RawFrame) -> Result<()> {
        match self.tx.try_send(frame) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                warn!("capture channel full, dropping frame");
                Ok(())
            }
            Err(TrySendError::Disconnected(_)) => Err(FusionError::InvalidArgument(
                "frame consumer is gone".to_string(),
            )),
        }
    }
}

/// Consumer half of the capture channel; assembles tracked frames
#[derive(Debug)]
pub struct FrameConsumer {
    rx: Receiver<RawFrame>,
    device_name: String,
}

impl FrameConsumer {
    /// Receive the next raw frame, blocking until one arrives or the
    /// producer is gone
    pub fn recv(&self) -> Option<RawFrame> {
        self.rx.recv().ok()
    }

    /// Receive without blocking
    pub fn try_recv(&self) -> Option<RawFrame> {
        self.rx.try_recv().ok()
    }

    /// Assemble a tracked frame from a raw sample
    pub fn assemble(&self, raw: RawFrame) -> Result<TrackedFrame> {
        let image = VideoFrame::from_data(
            [raw.width, raw.height, 1],
            raw.pixel_format,
            raw.num_components,
            raw.data,
        )?;

        let mut frame = TrackedFrame::new();
        frame.set_image_data(image);
        frame.set_timestamp(raw.timestamp);
        frame.set_custom_field(FIELD_FRIENDLY_DEVICE_NAME, self.device_name.clone())?;
        Ok(frame)
    }
}

/// Create a bounded capture channel for one device
pub fn frame_channel(capacity: usize, device_name: &str) -> (FrameProducer, FrameConsumer) {
    let (tx, rx) = bounded(capacity);
    (
        FrameProducer { tx },
        FrameConsumer {
            rx,
            device_name: device_name.to_string(),
        },
    )
}

/// Data source kind in the device configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum SourceType {
    /// Imaging source producing pixel frames
    Video,
    /// Tracked tool producing poses only
    Tool,
}

/// Per-device data source configuration element
///
/// Mirrors the XML config surface consumed by the capture collaborator:
/// `<DataSource Id="VideoDevice" Type="Video" FrameSize="640 480" FrameRate="30"/>`
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Source identifier
    #[serde(rename = "@Id")]
    pub id: String,
    /// Source kind
    #[serde(rename = "@Type")]
    pub source_type: SourceType,
    /// Requested frame size as "width height", imaging sources only
    #[serde(rename = "@FrameSize", default)]
    pub frame_size: Option<String>,
    /// Requested acquisition rate in frames per second
    #[serde(rename = "@FrameRate", default)]
    pub frame_rate: Option<f64>,
}

impl SourceConfig {
    /// Parse a `DataSource` element from its XML text
    pub fn from_xml(xml: &str) -> Result<Self> {
        quick_xml::de::from_str(xml).map_err(|e| FusionError::Xml(e.to_string()))
    }

    /// Requested frame size in pixels, if configured
    pub fn frame_size_px(&self) -> Result<Option<[u32; 2]>> {
        let Some(raw) = self.frame_size.as_deref() else {
            return Ok(None);
        };
        let values: Vec<u32> = raw
            .split_whitespace()
            .map(|token| {
                token
                    .parse::<u32>()
                    .map_err(|e| FusionError::ParseValue(e.to_string()))
            })
            .collect::<Result<_>>()?;
        match values.as_slice() {
            [w, h] => Ok(Some([*w, *h])),
            _ => Err(FusionError::ParseValue(format!(
                "frame size must be two integers, got {raw:?}"
            ))),
        }
    }
}
