//! Transient carrier for one captured sample
//!
//! The acquisition path creates a [`StreamBufferItem`] for every sample and
//! deep-copies it into ring-buffer storage. Items are never mutated in place
//! after being stored; replacement happens only through whole-item deep-copy
//! assignment (`clone`).

use std::sync::Arc;

use crate::error::{FusionError, Result};
use crate::frame::geometry::PolyData;
use crate::frame::video::VideoFrame;
use crate::frame::{FieldMap, FieldStatus};

/// One captured sample on its way into buffer storage
///
/// Tracker-only devices fill the single matrix + status slot; imaging devices
/// fill the frame. Both carry the per-sample metadata dictionary.
#[derive(Debug, Clone, Default)]
pub struct StreamBufferItem {
    frame: VideoFrame,
    poly_data: Option<Arc<PolyData>>,
    filtered_timestamp: f64,
    unfiltered_timestamp: f64,
    index: u64,
    uid: u64,
    matrix: [f64; 16],
    valid_transform_data: bool,
    status: FieldStatus,
    fields: FieldMap,
}

impl StreamBufferItem {
    /// Create an empty item
    pub fn new() -> Self {
        StreamBufferItem {
            matrix: crate::frame::identity_matrix(),
            ..StreamBufferItem::default()
        }
    }

    /// Set the captured image
    pub fn set_frame(&mut self, frame: VideoFrame) {
        self.frame = frame;
    }

    /// Captured image
    pub fn frame(&self) -> &VideoFrame {
        &self.frame
    }

    /// Attach shared geometry
    pub fn set_poly_data(&mut self, poly: Arc<PolyData>) {
        self.poly_data = Some(poly);
    }

    /// True iff geometry is attached
    pub fn has_valid_poly_data(&self) -> bool {
        self.poly_data.is_some()
    }

    /// Shared geometry, if any
    pub fn poly_data(&self) -> Option<&Arc<PolyData>> {
        self.poly_data.as_ref()
    }

    /// Set the jitter-filtered timestamp (seconds)
    pub fn set_filtered_timestamp(&mut self, timestamp: f64) {
        self.filtered_timestamp = timestamp;
    }

    /// Jitter-filtered timestamp (seconds)
    pub fn filtered_timestamp(&self) -> f64 {
        self.filtered_timestamp
    }

    /// Set the raw device timestamp (seconds)
    pub fn set_unfiltered_timestamp(&mut self, timestamp: f64) {
        self.unfiltered_timestamp = timestamp;
    }

    /// Raw device timestamp (seconds)
    pub fn unfiltered_timestamp(&self) -> f64 {
        self.unfiltered_timestamp
    }

    /// Set the monotonically increasing frame index assigned by the device
    pub fn set_index(&mut self, index: u64) {
        self.index = index;
    }

    /// Device frame index
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Set the buffer-unique item id
    pub fn set_uid(&mut self, uid: u64) {
        self.uid = uid;
    }

    /// Buffer-unique item id
    pub fn uid(&self) -> u64 {
        self.uid
    }

    /// Store the tracker matrix (16 row-major doubles) and mark it valid
    pub fn set_matrix(&mut self, matrix: &[f64; 16]) {
        self.matrix = *matrix;
        self.valid_transform_data = true;
    }

    /// Tracker matrix; `NotFound` until one was stored
    pub fn matrix(&self) -> Result<[f64; 16]> {
        if !self.valid_transform_data {
            return Err(FusionError::NotFound(
                "buffer item carries no transform data".to_string(),
            ));
        }
        Ok(self.matrix)
    }

    /// True iff a tracker matrix was stored
    pub fn has_valid_transform_data(&self) -> bool {
        self.valid_transform_data
    }

    /// Set the tracking status of the matrix
    pub fn set_status(&mut self, status: FieldStatus) {
        self.status = status;
    }

    /// Tracking status of the matrix
    pub fn status(&self) -> FieldStatus {
        self.status
    }

    /// Set a metadata field
    pub fn set_custom_field(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        if name.is_empty() {
            return Err(FusionError::InvalidArgument(
                "field name must not be empty".to_string(),
            ));
        }
        self.fields.insert(name.to_string(), value.into());
        Ok(())
    }

    /// Metadata dictionary
    pub fn custom_fields(&self) -> &FieldMap {
        &self.fields
    }

    /// True iff any metadata fields are stored
    pub fn has_valid_field_data(&self) -> bool {
        !self.fields.is_empty()
    }

    /// Replace this item with a deep copy of another
    pub fn deep_copy(&mut self, other: &StreamBufferItem) {
        *self = other.clone();
    }
}
