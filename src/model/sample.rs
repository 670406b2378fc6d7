//! Track samples.
//!
//! A [`Sample`] is a tagged union over the supported payload kinds. The
//! payload size is fixed by the tag, and payloads convert to and from raw
//! bytes through `bytemuck` so codecs can copy them verbatim.

use bytemuck::{Pod, Zeroable};
use glam::{Quat, Vec2, Vec3, Vec4};
use std::fmt;

use crate::util::{Error, Result};

/// Discriminant of a [`Sample`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SampleType {
    Float1,
    Float2,
    Float3,
    Float4,
    Vector4,
    Quat,
    Qvv,
}

impl SampleType {
    /// Size in bytes of one sample payload of this type.
    #[inline]
    pub const fn size(self) -> usize {
        match self {
            Self::Float1 => 4,
            Self::Float2 => 8,
            Self::Float3 => 12,
            Self::Float4 | Self::Vector4 | Self::Quat => 16,
            Self::Qvv => std::mem::size_of::<Qvv>(),
        }
    }

    /// Whether tracks of this type carry a transform description.
    #[inline]
    pub const fn is_transform(self) -> bool {
        matches!(self, Self::Quat | Self::Qvv)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Float1 => "float1",
            Self::Float2 => "float2",
            Self::Float3 => "float3",
            Self::Float4 => "float4",
            Self::Vector4 => "vector4",
            Self::Quat => "quat",
            Self::Qvv => "qvv",
        }
    }
}

impl fmt::Display for SampleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rotation, translation and scale of one transform sample.
///
/// Translation and scale are 3D; their `w` lanes are padding and are
/// written as zero by every constructor in this crate.
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Qvv {
    pub rotation: Quat,
    pub translation: Vec4,
    pub scale: Vec4,
}

impl Qvv {
    /// Identity transform (unit scale).
    pub const IDENTITY: Self = Self {
        rotation: Quat::IDENTITY,
        translation: Vec4::ZERO,
        scale: Vec4::new(1.0, 1.0, 1.0, 0.0),
    };

    /// All-zero value, used where a revision has no default pose.
    pub const ZERO: Self = Self {
        rotation: Quat::from_xyzw(0.0, 0.0, 0.0, 0.0),
        translation: Vec4::ZERO,
        scale: Vec4::ZERO,
    };

    #[inline]
    pub fn new(rotation: Quat, translation: Vec3, scale: Vec3) -> Self {
        Self {
            rotation,
            translation: translation.extend(0.0),
            scale: scale.extend(0.0),
        }
    }
}

impl Default for Qvv {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// One sample of a track.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Sample {
    Float1(f32),
    Float2(Vec2),
    Float3(Vec3),
    Float4(Vec4),
    Vector4(Vec4),
    Quat(Quat),
    Qvv(Qvv),
}

macro_rules! sample_accessor {
    ($name:ident, $variant:ident, $ty:ty) => {
        #[doc = concat!("Payload of a `", stringify!($variant), "` sample, or a kind mismatch error.")]
        pub fn $name(&self) -> Result<$ty> {
            match self {
                Self::$variant(v) => Ok(*v),
                other => Err(Error::KindMismatch {
                    expected: SampleType::$variant.name(),
                    actual: other.sample_type().name(),
                }),
            }
        }
    };
}

impl Sample {
    /// Tag of this sample.
    pub const fn sample_type(&self) -> SampleType {
        match self {
            Self::Float1(_) => SampleType::Float1,
            Self::Float2(_) => SampleType::Float2,
            Self::Float3(_) => SampleType::Float3,
            Self::Float4(_) => SampleType::Float4,
            Self::Vector4(_) => SampleType::Vector4,
            Self::Quat(_) => SampleType::Quat,
            Self::Qvv(_) => SampleType::Qvv,
        }
    }

    sample_accessor!(as_float1, Float1, f32);
    sample_accessor!(as_float2, Float2, Vec2);
    sample_accessor!(as_float3, Float3, Vec3);
    sample_accessor!(as_float4, Float4, Vec4);
    sample_accessor!(as_vector4, Vector4, Vec4);
    sample_accessor!(as_quat, Quat, Quat);
    sample_accessor!(as_qvv, Qvv, Qvv);

    /// Raw payload bytes; length is `self.sample_type().size()`.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Float1(v) => bytemuck::bytes_of(v),
            Self::Float2(v) => bytemuck::bytes_of(v),
            Self::Float3(v) => bytemuck::bytes_of(v),
            Self::Float4(v) | Self::Vector4(v) => bytemuck::bytes_of(v),
            Self::Quat(v) => bytemuck::bytes_of(v),
            Self::Qvv(v) => bytemuck::bytes_of(v),
        }
    }

    /// Rebuild a sample of `sample_type` from its raw payload bytes.
    pub fn from_bytes(sample_type: SampleType, bytes: &[u8]) -> Result<Self> {
        if bytes.len() != sample_type.size() {
            return Err(Error::invalid_binary(format!(
                "{} sample needs {} bytes, got {}",
                sample_type,
                sample_type.size(),
                bytes.len()
            )));
        }

        Ok(match sample_type {
            SampleType::Float1 => Self::Float1(bytemuck::pod_read_unaligned(bytes)),
            SampleType::Float2 => Self::Float2(bytemuck::pod_read_unaligned(bytes)),
            SampleType::Float3 => Self::Float3(bytemuck::pod_read_unaligned(bytes)),
            SampleType::Float4 => Self::Float4(bytemuck::pod_read_unaligned(bytes)),
            SampleType::Vector4 => Self::Vector4(bytemuck::pod_read_unaligned(bytes)),
            SampleType::Quat => Self::Quat(bytemuck::pod_read_unaligned(bytes)),
            SampleType::Qvv => Self::Qvv(bytemuck::pod_read_unaligned(bytes)),
        })
    }
}
