//! Per-track compression settings.

use super::Qvv;
use crate::config::{self, ScalarDefaults, TransformDefaults};
use crate::util::{Error, Result};

/// Output/parent index marking "no track" (strip from output, or root).
pub const INVALID_TRACK_INDEX: u32 = u32::MAX;

/// Settings of a scalar track (float1..float4, vector4).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScalarTrackDescription {
    /// Remap target in the compressed stream; [`INVALID_TRACK_INDEX`] drops the track.
    pub output_index: u32,
    /// Per component precision threshold.
    pub precision: f32,
}

impl ScalarTrackDescription {
    pub fn with_defaults(defaults: &ScalarDefaults) -> Self {
        Self {
            output_index: 0,
            precision: defaults.precision,
        }
    }
}

impl Default for ScalarTrackDescription {
    fn default() -> Self {
        Self::with_defaults(&config::latest().scalar)
    }
}

/// Settings of a transform track (quat, qvv).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformTrackDescription {
    /// Value of sub-tracks elided from storage. Only revisions with default
    /// pose support preserve it.
    pub default_value: Qvv,
    pub output_index: u32,
    /// Parent transform index, [`INVALID_TRACK_INDEX`] for roots.
    pub parent_index: u32,
    /// Shell precision threshold.
    pub precision: f32,
    /// Distance of the error-measuring shell around the transform.
    pub shell_distance: f32,
    pub constant_rotation_threshold_angle: f32,
    pub constant_translation_threshold: f32,
    pub constant_scale_threshold: f32,
}

impl TransformTrackDescription {
    pub fn with_defaults(defaults: &TransformDefaults) -> Self {
        Self {
            default_value: Qvv::IDENTITY,
            output_index: 0,
            parent_index: INVALID_TRACK_INDEX,
            precision: defaults.precision,
            shell_distance: defaults.shell_distance,
            constant_rotation_threshold_angle: defaults.constant_rotation_threshold_angle,
            constant_translation_threshold: defaults.constant_translation_threshold,
            constant_scale_threshold: defaults.constant_scale_threshold,
        }
    }
}

impl Default for TransformTrackDescription {
    fn default() -> Self {
        Self::with_defaults(&config::latest().transform)
    }
}

/// Description of a track; the active variant follows the track's sample type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TrackDescription {
    Scalar(ScalarTrackDescription),
    Transform(TransformTrackDescription),
}

impl TrackDescription {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Transform(_) => "transform",
        }
    }

    #[inline]
    pub const fn is_transform(&self) -> bool {
        matches!(self, Self::Transform(_))
    }

    pub fn output_index(&self) -> u32 {
        match self {
            Self::Scalar(desc) => desc.output_index,
            Self::Transform(desc) => desc.output_index,
        }
    }

    pub fn as_scalar(&self) -> Result<&ScalarTrackDescription> {
        match self {
            Self::Scalar(desc) => Ok(desc),
            other => Err(Error::KindMismatch {
                expected: "scalar",
                actual: other.kind(),
            }),
        }
    }

    pub fn as_transform(&self) -> Result<&TransformTrackDescription> {
        match self {
            Self::Transform(desc) => Ok(desc),
            other => Err(Error::KindMismatch {
                expected: "transform",
                actual: other.kind(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let scalar = ScalarTrackDescription::default();
        assert_eq!(scalar.precision, 0.00001);

        let transform = TransformTrackDescription::default();
        assert_eq!(transform.precision, 0.01);
        assert_eq!(transform.shell_distance, 3.0);
        assert_eq!(transform.constant_rotation_threshold_angle, 0.00284714461);
        assert_eq!(transform.constant_translation_threshold, 0.001);
        assert_eq!(transform.constant_scale_threshold, 0.00001);
        assert_eq!(transform.parent_index, INVALID_TRACK_INDEX);
        assert_eq!(transform.default_value, Qvv::IDENTITY);
    }

    #[test]
    fn test_variant_access() {
        let desc = TrackDescription::Scalar(ScalarTrackDescription::default());
        assert!(desc.as_scalar().is_ok());
        assert!(matches!(
            desc.as_transform(),
            Err(Error::KindMismatch { expected: "transform", .. })
        ));
    }
}
