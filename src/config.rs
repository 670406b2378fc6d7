//! Per-revision configuration table.
//!
//! Every value that differs between schema revisions, or that both the
//! reader and the writer of a revision must agree on, lives here.

use crate::model::{AclVersion, RotationFormat, VectorFormat};

/// Default settings of scalar track descriptions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScalarDefaults {
    pub precision: f32,
}

/// Default settings of transform track descriptions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformDefaults {
    pub precision: f32,
    pub shell_distance: f32,
    pub constant_rotation_threshold_angle: f32,
    pub constant_translation_threshold: f32,
    pub constant_scale_threshold: f32,
}

/// Everything a revision shim needs to know about its revision.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RevisionConfig {
    pub version: AclVersion,
    /// Binary version tags this revision reads.
    pub binary_versions: &'static [u16],
    /// Binary version tag this revision writes.
    pub binary_write_version: u16,
    /// Text document version this revision writes (and the newest it reads).
    pub sjson_version: u32,
    /// Whether transform descriptions carry a default pose.
    pub supports_default_value: bool,
    pub scalar: ScalarDefaults,
    pub transform: TransformDefaults,
    /// Storage formats recorded for text input.
    pub text_rotation_format: RotationFormat,
    pub text_vector_format: VectorFormat,
}

/// Oldest text document version any revision reads.
pub const MIN_SJSON_VERSION: u32 = 1;

const SCALAR_DEFAULTS: ScalarDefaults = ScalarDefaults { precision: 0.00001 };

const TRANSFORM_DEFAULTS: TransformDefaults = TransformDefaults {
    precision: 0.01,
    shell_distance: 3.0,
    constant_rotation_threshold_angle: 0.00284714461,
    constant_translation_threshold: 0.001,
    constant_scale_threshold: 0.00001,
};

/// Known revisions, oldest first.
pub static REVISIONS: [RevisionConfig; 2] = [
    RevisionConfig {
        version: AclVersion::V02_00_00,
        binary_versions: &[7],
        binary_write_version: 7,
        sjson_version: 5,
        supports_default_value: false,
        scalar: SCALAR_DEFAULTS,
        transform: TRANSFORM_DEFAULTS,
        text_rotation_format: RotationFormat::QuatfFull,
        text_vector_format: VectorFormat::Vector3fFull,
    },
    RevisionConfig {
        version: AclVersion::V02_01_00,
        binary_versions: &[8, 9, 10],
        binary_write_version: 10,
        sjson_version: 6,
        supports_default_value: true,
        scalar: SCALAR_DEFAULTS,
        transform: TRANSFORM_DEFAULTS,
        text_rotation_format: RotationFormat::QuatfFull,
        text_vector_format: VectorFormat::Vector3fFull,
    },
];

/// Configuration of `version`, if it is a known revision.
pub fn revision(version: AclVersion) -> Option<&'static RevisionConfig> {
    REVISIONS.iter().find(|config| config.version == version)
}

/// Configuration of the newest revision.
pub fn latest() -> &'static RevisionConfig {
    &REVISIONS[REVISIONS.len() - 1]
}

/// Revision owning a binary version tag.
pub fn revision_for_binary(tag: u16) -> Option<&'static RevisionConfig> {
    REVISIONS
        .iter()
        .find(|config| config.binary_versions.contains(&tag))
}
