//! `<From>To<To>` transform naming convention
//!
//! Transform fields and their statuses are stored in the frame dictionary
//! under keys built from a coordinate-frame pair: `ImageToReferenceTransform`,
//! `ImageToReferenceTransformStatus`. This module parses and renders those
//! keys.

use crate::error::{FusionError, Result};

/// Suffix of a transform field key
pub const TRANSFORM_POSTFIX: &str = "Transform";

/// Suffix of a transform status field key
pub const TRANSFORM_STATUS_POSTFIX: &str = "TransformStatus";

/// A From -> To coordinate-frame pair identifying a transform
///
/// Both tokens are non-empty and start with an ASCII uppercase letter; the
/// constructor uppercases the first letter so that every rendered key can be
/// parsed back. Equality is case-sensitive token equality.
///
/// Token splitting rule: a rendered key is split at the first `"To"` that is
/// immediately followed by an uppercase letter. Tokens may therefore contain
/// `"Transform"` or a lowercase `"to"` internally (`"TransformBoard"` is a
/// valid frame name), but not an embedded `To<Uppercase>` sequence, which
/// would be claimed by the separator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransformName {
    from: String,
    to: String,
}

fn capitalize(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

impl TransformName {
    /// Create a transform name from coordinate-frame tokens
    ///
    /// Empty tokens are rejected; the first letter of each token is
    /// uppercased.
    pub fn new(from: &str, to: &str) -> Result<Self> {
        if from.is_empty() || to.is_empty() {
            return Err(FusionError::MalformedName(format!(
                "empty coordinate frame token in ({from:?}, {to:?})"
            )));
        }
        Ok(TransformName {
            from: capitalize(from),
            to: capitalize(to),
        })
    }

    /// Parse a rendered field key back into a transform name
    ///
    /// The key must end with `Transform` or `TransformStatus`; the prefix is
    /// split at the first `To<Uppercase>` separator.
    pub fn parse(raw: &str) -> Result<Self> {
        let prefix = if let Some(p) = raw.strip_suffix(TRANSFORM_STATUS_POSTFIX) {
            p
        } else if let Some(p) = raw.strip_suffix(TRANSFORM_POSTFIX) {
            p
        } else {
            return Err(FusionError::MalformedName(format!(
                "{raw:?} does not end with a recognized transform suffix"
            )));
        };

        let bytes = prefix.as_bytes();
        for i in 1..bytes.len().saturating_sub(2) {
            if bytes[i] == b'T' && bytes[i + 1] == b'o' && bytes[i + 2].is_ascii_uppercase() {
                // ASCII separator, so both slice boundaries are valid
                return Ok(TransformName {
                    from: prefix[..i].to_string(),
                    to: prefix[i + 2..].to_string(),
                });
            }
        }

        Err(FusionError::MalformedName(format!(
            "{raw:?} has no <From>To<To> separator"
        )))
    }

    /// True iff both coordinate-frame tokens are non-empty
    pub fn is_valid(&self) -> bool {
        !self.from.is_empty() && !self.to.is_empty()
    }

    /// Source coordinate frame
    pub fn from_frame(&self) -> &str {
        &self.from
    }

    /// Target coordinate frame
    pub fn to_frame(&self) -> &str {
        &self.to
    }

    /// Dictionary key of the transform value field
    pub fn transform_key(&self) -> String {
        format!("{}To{}{}", self.from, self.to, TRANSFORM_POSTFIX)
    }

    /// Dictionary key of the transform status field
    pub fn status_key(&self) -> String {
        format!("{}To{}{}", self.from, self.to, TRANSFORM_STATUS_POSTFIX)
    }
}

impl std::fmt::Display for TransformName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}To{}", self.from, self.to)
    }
}

/// True iff the string ends with the transform value suffix
pub fn is_transform(key: &str) -> bool {
    key.ends_with(TRANSFORM_POSTFIX)
}

/// True iff the string ends with the transform status suffix
pub fn is_transform_status(key: &str) -> bool {
    key.ends_with(TRANSFORM_STATUS_POSTFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_capitalizes() {
        let name = TransformName::new("image", "reference").unwrap();
        assert_eq!(name.from_frame(), "Image");
        assert_eq!(name.to_frame(), "Reference");
        assert!(name.is_valid());
    }

    #[test]
    fn test_new_rejects_empty_tokens() {
        assert!(matches!(
            TransformName::new("", "Reference"),
            Err(FusionError::MalformedName(_))
        ));
        assert!(matches!(
            TransformName::new("Image", ""),
            Err(FusionError::MalformedName(_))
        ));
    }

    #[test]
    fn test_render_keys() {
        let name = TransformName::new("Probe", "Tracker").unwrap();
        assert_eq!(name.transform_key(), "ProbeToTrackerTransform");
        assert_eq!(name.status_key(), "ProbeToTrackerTransformStatus");
        assert_eq!(name.to_string(), "ProbeToTracker");
    }

    #[test]
    fn test_parse_transform_key() {
        let name = TransformName::parse("ImageToReferenceTransform").unwrap();
        assert_eq!(name.from_frame(), "Image");
        assert_eq!(name.to_frame(), "Reference");
    }

    #[test]
    fn test_parse_status_key() {
        let name = TransformName::parse("StylusToTrackerTransformStatus").unwrap();
        assert_eq!(name.from_frame(), "Stylus");
        assert_eq!(name.to_frame(), "Tracker");
    }

    #[test]
    fn test_parse_roundtrip_is_identity() {
        for key in [
            "ImageToReferenceTransform",
            "ProbeToTrackerTransform",
            "StylusTipToStylusTransformStatus",
            "TransformBoardToTrackerTransform",
        ] {
            let name = TransformName::parse(key).unwrap();
            let rendered = if is_transform_status(key) {
                name.status_key()
            } else {
                name.transform_key()
            };
            assert_eq!(rendered, key);
        }
    }

    #[test]
    fn test_parse_token_containing_transform() {
        // "Transform" inside a token must not confuse the suffix stripper
        let name = TransformName::parse("TransformBoardToTrackerTransform").unwrap();
        assert_eq!(name.from_frame(), "TransformBoard");
        assert_eq!(name.to_frame(), "Tracker");
    }

    #[test]
    fn test_parse_rejects_missing_suffix() {
        assert!(matches!(
            TransformName::parse("ImageToReference"),
            Err(FusionError::MalformedName(_))
        ));
    }

    #[test]
    fn test_parse_rejects_missing_separator() {
        assert!(matches!(
            TransformName::parse("ImagereferenceTransform"),
            Err(FusionError::MalformedName(_))
        ));
        // lowercase follower is not a separator
        assert!(matches!(
            TransformName::parse("ImagetoreferenceTransform"),
            Err(FusionError::MalformedName(_))
        ));
    }

    #[test]
    fn test_suffix_classifiers() {
        assert!(is_transform("ImageToReferenceTransform"));
        assert!(!is_transform("ImageToReferenceTransformStatus"));
        assert!(is_transform_status("ImageToReferenceTransformStatus"));
        assert!(!is_transform_status("ImageToReferenceTransform"));
        assert!(!is_transform("FrameNumber"));
    }
}
