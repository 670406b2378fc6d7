//! Native track types of the codec.
//!
//! These mirror the codec's own in-memory layout: every track stores its
//! samples as one contiguous byte buffer with a stride fixed by its type.

use crate::model::Qvv;
use crate::util::{Error, Result};

/// Native track type tag as stored in the blob header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TrackType8 {
    Float1f = 0,
    Float2f = 1,
    Float3f = 2,
    Float4f = 3,
    Vector4f = 4,
    Qvvf = 5,
}

impl TrackType8 {
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Float1f),
            1 => Some(Self::Float2f),
            2 => Some(Self::Float3f),
            3 => Some(Self::Float4f),
            4 => Some(Self::Vector4f),
            5 => Some(Self::Qvvf),
            _ => None,
        }
    }

    /// Size in bytes of one sample.
    pub const fn sample_size(self) -> usize {
        match self {
            Self::Float1f => 4,
            Self::Float2f => 8,
            Self::Float3f => 12,
            Self::Float4f | Self::Vector4f => 16,
            Self::Qvvf => std::mem::size_of::<Qvv>(),
        }
    }

    /// Number of f32 components in one scalar sample.
    pub const fn num_components(self) -> usize {
        self.sample_size() / 4
    }

    /// Name used by the text format.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Float1f => "float1f",
            Self::Float2f => "float2f",
            Self::Float3f => "float3f",
            Self::Float4f => "float4f",
            Self::Vector4f => "vector4f",
            Self::Qvvf => "qvvf",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        [
            Self::Float1f,
            Self::Float2f,
            Self::Float3f,
            Self::Float4f,
            Self::Vector4f,
            Self::Qvvf,
        ]
        .into_iter()
        .find(|t| t.name() == name)
    }
}

/// Rotation storage format tag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum RotationFormat8 {
    #[default]
    QuatfFull = 0,
    QuatfDropWFull = 1,
    QuatfDropWVariable = 2,
}

impl RotationFormat8 {
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::QuatfFull),
            1 => Some(Self::QuatfDropWFull),
            2 => Some(Self::QuatfDropWVariable),
            _ => None,
        }
    }
}

/// Translation/scale storage format tag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum VectorFormat8 {
    #[default]
    Vector3fFull = 0,
    Vector3fVariable = 1,
}

impl VectorFormat8 {
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Vector3fFull),
            1 => Some(Self::Vector3fVariable),
            _ => None,
        }
    }
}

/// Native scalar track description.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackDescScalarf {
    pub output_index: u32,
    pub precision: f32,
}

/// Native transform track description.
///
/// `default_value` is only serialized by versions that know about it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackDescTransformf {
    pub default_value: Qvv,
    pub output_index: u32,
    pub parent_index: u32,
    pub precision: f32,
    pub shell_distance: f32,
    pub constant_rotation_threshold_angle: f32,
    pub constant_translation_threshold: f32,
    pub constant_scale_threshold: f32,
}

/// Native description, matching the track type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TrackDesc {
    Scalar(TrackDescScalarf),
    Transform(TrackDescTransformf),
}

/// One native track: description plus a packed sample buffer.
#[derive(Debug, PartialEq)]
pub struct NativeTrack {
    track_type: TrackType8,
    sample_rate: f32,
    name: String,
    desc: TrackDesc,
    data: Vec<u8>,
}

impl NativeTrack {
    /// Create a track with `num_samples` zeroed sample slots.
    pub fn make_reserve(
        track_type: TrackType8,
        desc: TrackDesc,
        num_samples: usize,
        sample_rate: f32,
        name: impl Into<String>,
    ) -> Result<Self> {
        let is_transform = matches!(desc, TrackDesc::Transform(_));
        if is_transform != (track_type == TrackType8::Qvvf) {
            return Err(Error::encode(format!(
                "description does not match track type {}",
                track_type.name()
            )));
        }

        Ok(Self {
            track_type,
            sample_rate,
            name: name.into(),
            desc,
            data: vec![0u8; num_samples * track_type.sample_size()],
        })
    }

    #[inline]
    pub fn track_type(&self) -> TrackType8 {
        self.track_type
    }

    #[inline]
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn desc(&self) -> &TrackDesc {
        &self.desc
    }

    #[inline]
    pub fn sample_size(&self) -> usize {
        self.track_type.sample_size()
    }

    #[inline]
    pub fn num_samples(&self) -> usize {
        self.data.len() / self.sample_size()
    }

    /// Raw bytes of one sample slot. Panics when out of range.
    pub fn sample(&self, index: usize) -> &[u8] {
        let size = self.sample_size();
        &self.data[index * size..(index + 1) * size]
    }

    /// Mutable raw bytes of one sample slot. Panics when out of range.
    pub fn sample_mut(&mut self, index: usize) -> &mut [u8] {
        let size = self.sample_size();
        &mut self.data[index * size..(index + 1) * size]
    }

    /// Transform sample at `index`; only valid for qvvf tracks.
    pub(crate) fn qvv(&self, index: usize) -> Qvv {
        bytemuck::pod_read_unaligned(self.sample(index))
    }
}

/// Ordered native tracks plus the list name.
#[derive(Debug, Default, PartialEq)]
pub struct NativeTrackList {
    pub name: String,
    pub tracks: Vec<NativeTrack>,
}

impl NativeTrackList {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tracks: Vec::new(),
        }
    }

    /// Type of the first track; `None` when empty.
    pub fn track_type(&self) -> Option<TrackType8> {
        self.tracks.first().map(NativeTrack::track_type)
    }

    pub fn num_samples_per_track(&self) -> usize {
        self.tracks.first().map_or(0, NativeTrack::num_samples)
    }

    pub fn sample_rate(&self) -> f32 {
        self.tracks.first().map_or(0.0, NativeTrack::sample_rate)
    }
}
