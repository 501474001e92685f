//! Acquisition-quality validation of candidate frames
//!
//! Before a newly captured frame is appended to a time-ordered history, a set
//! of requirements decides whether it is acceptable: unique timestamp, valid
//! tracking, meaningful motion since the previous frames, speed limits. All
//! predicates are pure functions of `(candidate, comparison frames,
//! thresholds)`, so synthetic histories exercise them exhaustively.

use tracing::{debug, warn};

use crate::error::Result;
use crate::frame::transform_name::TransformName;
use crate::frame::{FieldStatus, TrackedFrame};

/// Field key of the probe translation encoder value (mm)
pub const FIELD_PROBE_POSITION: &str = "ProbePosition";
/// Field key of the probe rotation encoder value (deg)
pub const FIELD_PROBE_ROTATION: &str = "ProbeRotation";
/// Field key of the template translation encoder value (mm)
pub const FIELD_TEMPLATE_POSITION: &str = "TemplatePosition";

/// Bit-set of validation requirements
///
/// If any requested requirement is not fulfilled the validation fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidationRequirements(u32);

impl ValidationRequirements {
    /// No requirements; every candidate is accepted
    pub const NONE: ValidationRequirements = ValidationRequirements(0);
    /// The timestamp shall not repeat any history timestamp
    pub const UNIQUE_TIMESTAMP: ValidationRequirements = ValidationRequirements(0x0001);
    /// The designated transform status shall be OK
    pub const TRACKING_OK: ValidationRequirements = ValidationRequirements(0x0002);
    /// The stepper encoder position shall differ from the previous ones
    pub const CHANGED_ENCODER_POSITION: ValidationRequirements = ValidationRequirements(0x0004);
    /// The frame-to-frame speed shall stay below the threshold
    pub const SPEED_BELOW_THRESHOLD: ValidationRequirements = ValidationRequirements(0x0008);
    /// The designated transform shall differ from the previous ones
    pub const CHANGED_TRANSFORM: ValidationRequirements = ValidationRequirements(0x0010);

    /// True iff every bit of `other` is requested
    pub fn contains(&self, other: ValidationRequirements) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for ValidationRequirements {
    type Output = ValidationRequirements;

    fn bitor(self, rhs: ValidationRequirements) -> ValidationRequirements {
        ValidationRequirements(self.0 | rhs.0)
    }
}

/// Requirements and thresholds for frame validation
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Requested requirement bits
    pub requirements: ValidationRequirements,
    /// Transform examined by the tracking, change, and speed requirements
    pub transform_name: Option<TransformName>,
    /// Minimum translation difference counting as motion (mm)
    pub min_translation_mm: f64,
    /// Minimum angle difference counting as motion (deg)
    pub min_angle_deg: f64,
    /// Maximum tolerated translation speed (mm/s)
    pub max_translation_speed_mm_per_sec: f64,
    /// Maximum tolerated rotation speed (deg/s)
    pub max_rotation_speed_deg_per_sec: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        ValidationConfig {
            requirements: ValidationRequirements::NONE,
            transform_name: None,
            min_translation_mm: 0.5,
            min_angle_deg: 0.2,
            max_translation_speed_mm_per_sec: 600.0,
            max_rotation_speed_deg_per_sec: 600.0,
        }
    }
}

/// Decide whether a candidate frame is acceptable against a history
///
/// `history` is ordered oldest to newest; requirements that compare against a
/// window use the whole slice, the speed requirement uses the newest frame.
pub fn validate(candidate: &TrackedFrame, history: &[TrackedFrame], config: &ValidationConfig) -> bool {
    let req = config.requirements;

    if req.contains(ValidationRequirements::UNIQUE_TIMESTAMP)
        && !is_timestamp_unique(candidate, history)
    {
        debug!(
            timestamp = candidate.timestamp(),
            "rejected: duplicate timestamp"
        );
        return false;
    }

    if req.contains(ValidationRequirements::TRACKING_OK) {
        let Some(name) = config.transform_name.as_ref() else {
            warn!("tracking requirement requested without a transform name");
            return false;
        };
        if !is_tracking_ok(candidate, name) {
            debug!(transform = %name, "rejected: tracking status not OK");
            return false;
        }
    }

    if req.contains(ValidationRequirements::CHANGED_ENCODER_POSITION)
        && history.iter().any(|previous| {
            !encoder_position_changed(
                candidate,
                previous,
                config.min_translation_mm,
                config.min_angle_deg,
            )
        })
    {
        debug!("rejected: encoder position unchanged");
        return false;
    }

    if req.contains(ValidationRequirements::CHANGED_TRANSFORM) {
        let Some(name) = config.transform_name.as_ref() else {
            warn!("transform-change requirement requested without a transform name");
            return false;
        };
        if history.iter().any(|previous| {
            !transform_changed(
                candidate,
                previous,
                name,
                config.min_translation_mm,
                config.min_angle_deg,
            )
        }) {
            debug!(transform = %name, "rejected: transform unchanged");
            return false;
        }
    }

    if req.contains(ValidationRequirements::SPEED_BELOW_THRESHOLD) {
        let Some(name) = config.transform_name.as_ref() else {
            warn!("speed requirement requested without a transform name");
            return false;
        };
        if let Some(previous) = history.last() {
            if !speed_below_threshold(
                candidate,
                previous,
                name,
                config.max_translation_speed_mm_per_sec,
                config.max_rotation_speed_deg_per_sec,
            ) {
                debug!(transform = %name, "rejected: motion speed above threshold");
                return false;
            }
        }
    }

    true
}

/// True iff no history frame shares the candidate's timestamp
pub fn is_timestamp_unique(candidate: &TrackedFrame, history: &[TrackedFrame]) -> bool {
    history
        .iter()
        .all(|frame| frame.timestamp() != candidate.timestamp())
}

/// True iff the designated transform's status is OK
pub fn is_tracking_ok(candidate: &TrackedFrame, name: &TransformName) -> bool {
    matches!(candidate.transform_status(name), Ok(FieldStatus::Ok))
}

/// Extract the stepper encoder values (probe position, probe rotation,
/// template position) from the designated custom fields
pub fn stepper_encoder_values(frame: &TrackedFrame) -> Result<(f64, f64, f64)> {
    let read = |key: &str| -> Result<f64> {
        let raw = frame
            .custom_field(key)
            .ok_or_else(|| crate::error::FusionError::NotFound(key.to_string()))?;
        Ok(raw.trim().parse::<f64>()?)
    };
    Ok((
        read(FIELD_PROBE_POSITION)?,
        read(FIELD_PROBE_ROTATION)?,
        read(FIELD_TEMPLATE_POSITION)?,
    ))
}

/// True iff the encoder position moved enough between two frames
///
/// Translation combines the probe and template axes; rotation is the probe
/// rotation difference. The candidate counts as changed when either exceeds
/// its minimum. Frames without readable encoder fields count as changed, so
/// a misconfigured source degrades to accepting frames rather than stalling
/// the acquisition.
pub fn encoder_position_changed(
    candidate: &TrackedFrame,
    comparison: &TrackedFrame,
    min_translation_mm: f64,
    min_angle_deg: f64,
) -> bool {
    let (cand, comp) = match (
        stepper_encoder_values(candidate),
        stepper_encoder_values(comparison),
    ) {
        (Ok(a), Ok(b)) => (a, b),
        _ => {
            warn!("frame without readable encoder fields treated as changed");
            return true;
        }
    };

    let translation_mm = ((cand.0 - comp.0).powi(2) + (cand.2 - comp.2).powi(2)).sqrt();
    let angle_deg = (cand.1 - comp.1).abs();
    translation_mm >= min_translation_mm || angle_deg >= min_angle_deg
}

/// True iff the designated transform moved enough between two frames
///
/// Frames missing the transform count as changed.
pub fn transform_changed(
    candidate: &TrackedFrame,
    comparison: &TrackedFrame,
    name: &TransformName,
    min_translation_mm: f64,
    min_angle_deg: f64,
) -> bool {
    let (cand, comp) = match (candidate.transform(name), comparison.transform(name)) {
        (Ok(a), Ok(b)) => (a, b),
        _ => {
            debug!(transform = %name, "frame without the transform treated as changed");
            return true;
        }
    };

    translation_distance_mm(&cand, &comp) >= min_translation_mm
        || rotation_angle_deg(&cand, &comp) >= min_angle_deg
}

/// True iff the frame-to-frame motion speed stays below the thresholds
///
/// Speed is inferred from the designated transform and the timestamp delta;
/// a zero or negative delta cannot support an inference and passes.
pub fn speed_below_threshold(
    candidate: &TrackedFrame,
    previous: &TrackedFrame,
    name: &TransformName,
    max_translation_speed_mm_per_sec: f64,
    max_rotation_speed_deg_per_sec: f64,
) -> bool {
    let dt = candidate.timestamp() - previous.timestamp();
    if dt <= 0.0 {
        return true;
    }

    let (cand, prev) = match (candidate.transform(name), previous.transform(name)) {
        (Ok(a), Ok(b)) => (a, b),
        _ => return true,
    };

    let translation_speed = translation_distance_mm(&cand, &prev) / dt;
    let rotation_speed = rotation_angle_deg(&cand, &prev) / dt;
    translation_speed <= max_translation_speed_mm_per_sec
        && rotation_speed <= max_rotation_speed_deg_per_sec
}

/// Euclidean distance between the translation columns of two matrices
fn translation_distance_mm(a: &[f64; 16], b: &[f64; 16]) -> f64 {
    let dx = a[3] - b[3];
    let dy = a[7] - b[7];
    let dz = a[11] - b[11];
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Rotation angle between the 3x3 blocks of two matrices in degrees
///
/// angle = acos((trace(Ra^T * Rb) - 1) / 2)
fn rotation_angle_deg(a: &[f64; 16], b: &[f64; 16]) -> f64 {
    let mut trace = 0.0;
    for row in 0..3 {
        for col in 0..3 {
            trace += a[row * 4 + col] * b[row * 4 + col];
        }
    }
    let cos = ((trace - 1.0) / 2.0).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}
