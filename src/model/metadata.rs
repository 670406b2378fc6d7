//! Aggregate metadata of a track collection.

use std::fmt;

use super::AclVersion;

/// Storage format of rotation sub-tracks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RotationFormat {
    #[default]
    Unknown,
    QuatfFull,
    QuatfDropWFull,
    QuatfDropWVariable,
}

impl RotationFormat {
    pub const fn name(self) -> &'static str {
        match self {
            Self::QuatfFull => "quatf full",
            Self::QuatfDropWFull => "quatf full no W",
            Self::QuatfDropWVariable => "quatf variable no W",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RotationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Storage format of translation and scale sub-tracks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum VectorFormat {
    #[default]
    Unknown,
    Vector3fFull,
    Vector3fVariable,
}

impl VectorFormat {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Vector3fFull => "vector3f full",
            Self::Vector3fVariable => "vector3f variable",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for VectorFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Layout facts of a transform collection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransformMetadata {
    pub rotation_format: RotationFormat,
    pub translation_format: VectorFormat,
    /// `None` when the binary blob stores no scale at all.
    pub scale_format: Option<VectorFormat>,

    pub num_segments: u32,

    pub num_animated_rotation_sub_tracks: u32,
    pub num_animated_translation_sub_tracks: u32,
    pub num_animated_scale_sub_tracks: u32,

    pub num_constant_rotation_samples: u32,
    pub num_constant_translation_samples: u32,
    pub num_constant_scale_samples: u32,
}

/// Track kind of a collection plus its kind-specific layout facts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TrackVariant {
    #[default]
    Unknown,
    Transform(TransformMetadata),
    Scalar,
}

impl TrackVariant {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Transform(_) => "transform",
            Self::Scalar => "scalar",
            Self::Unknown => "unknown",
        }
    }

    /// Transform layout facts, if this is a transform collection.
    pub fn transform(&self) -> Option<&TransformMetadata> {
        match self {
            Self::Transform(meta) => Some(meta),
            _ => None,
        }
    }
}

/// Metadata recorded when a collection is read.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Metadata {
    pub version: AclVersion,
    /// Serialized size in bytes of the source file.
    pub size: usize,
    pub name: String,
    pub track_variant: TrackVariant,
}

impl Metadata {
    pub fn new(version: AclVersion) -> Self {
        Self {
            version,
            ..Self::default()
        }
    }
}
