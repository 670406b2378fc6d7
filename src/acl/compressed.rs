//! Validated view over a compressed tracks blob.

use byteorder::{ByteOrder, LittleEndian};
use flate2::Crc;

use super::format::*;
use super::{RotationFormat8, TrackType8, VectorFormat8};
use crate::util::{Error, Result};

/// Storage formats read from the common tracks header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TracksHeader {
    pub rotation_format: RotationFormat8,
    pub translation_format: VectorFormat8,
    pub scale_format: VectorFormat8,
    pub has_scale: bool,
}

/// Layout facts of a transform blob.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransformTracksHeader {
    pub num_segments: u32,
    pub num_animated_rotation_sub_tracks: u32,
    pub num_animated_translation_sub_tracks: u32,
    pub num_animated_scale_sub_tracks: u32,
    pub num_constant_rotation_samples: u32,
    pub num_constant_translation_samples: u32,
    pub num_constant_scale_samples: u32,
}

impl TransformTracksHeader {
    pub(crate) fn to_words(self) -> [u32; 7] {
        [
            self.num_segments,
            self.num_animated_rotation_sub_tracks,
            self.num_animated_translation_sub_tracks,
            self.num_animated_scale_sub_tracks,
            self.num_constant_rotation_samples,
            self.num_constant_translation_samples,
            self.num_constant_scale_samples,
        ]
    }

    fn from_bytes(data: &[u8]) -> Self {
        let mut words = [0u32; 7];
        LittleEndian::read_u32_into(&data[..TRANSFORM_HEADER_SIZE], &mut words);
        Self {
            num_segments: words[0],
            num_animated_rotation_sub_tracks: words[1],
            num_animated_translation_sub_tracks: words[2],
            num_animated_scale_sub_tracks: words[3],
            num_constant_rotation_samples: words[4],
            num_constant_translation_samples: words[5],
            num_constant_scale_samples: words[6],
        }
    }
}

/// Compute the blob hash over `data[HASHED_START..]`.
pub(crate) fn compute_hash(data: &[u8]) -> u32 {
    let mut crc = Crc::new();
    crc.update(&data[HASHED_START..]);
    crc.sum()
}

/// A compressed tracks blob whose header has been validated.
#[derive(Clone, Copy, Debug)]
pub struct CompressedTracks<'a> {
    data: &'a [u8],
    track_type: TrackType8,
    header: TracksHeader,
}

impl<'a> CompressedTracks<'a> {
    /// Validate `data` as a blob with one of the `accepted_versions`.
    ///
    /// The returned view covers exactly the blob's declared size.
    pub fn validate(data: &'a [u8], accepted_versions: &[u16]) -> Result<Self> {
        if data.len() < TRACKS_HEADER_SIZE {
            return Err(Error::invalid_binary(format!(
                "Buffer too small: {} bytes",
                data.len()
            )));
        }

        if LittleEndian::read_u32(&data[TAG_OFFSET..]) != COMPRESSED_TRACKS_TAG {
            return Err(Error::invalid_binary("Invalid tag"));
        }

        let size = LittleEndian::read_u32(&data[SIZE_OFFSET..]) as usize;
        if size < TRACKS_HEADER_SIZE || size > data.len() {
            return Err(Error::invalid_binary(format!(
                "Invalid size: header claims {size} bytes, buffer holds {}",
                data.len()
            )));
        }
        let data = &data[..size];

        if LittleEndian::read_u32(&data[HASH_OFFSET..]) != compute_hash(data) {
            return Err(Error::invalid_binary("Invalid hash"));
        }

        let version = LittleEndian::read_u16(&data[VERSION_OFFSET..]);
        if !accepted_versions.contains(&version) {
            return Err(Error::invalid_binary(format!("Unsupported version: {version}")));
        }

        if data[ALGORITHM_OFFSET] != ALGORITHM_UNIFORMLY_SAMPLED {
            return Err(Error::invalid_binary(format!(
                "Invalid algorithm type: {}",
                data[ALGORITHM_OFFSET]
            )));
        }

        let track_type = TrackType8::from_u8(data[TRACK_TYPE_OFFSET]).ok_or_else(|| {
            Error::invalid_binary(format!("Invalid track type: {}", data[TRACK_TYPE_OFFSET]))
        })?;

        let misc = LittleEndian::read_u32(&data[MISC_OFFSET..]);
        let rotation_format = RotationFormat8::from_u8(misc_rotation_format(misc))
            .ok_or_else(|| Error::invalid_binary("Invalid rotation format"))?;
        let translation_format = VectorFormat8::from_u8(misc_translation_format(misc))
            .ok_or_else(|| Error::invalid_binary("Invalid translation format"))?;
        let scale_format = VectorFormat8::from_u8(misc_scale_format(misc))
            .ok_or_else(|| Error::invalid_binary("Invalid scale format"))?;

        if track_type == TrackType8::Qvvf && size < TRACKS_HEADER_SIZE + TRANSFORM_HEADER_SIZE {
            return Err(Error::invalid_binary("Transform header truncated"));
        }

        Ok(Self {
            data,
            track_type,
            header: TracksHeader {
                rotation_format,
                translation_format,
                scale_format,
                has_scale: misc_has_scale(misc),
            },
        })
    }

    /// Raw blob bytes.
    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn hash(&self) -> u32 {
        LittleEndian::read_u32(&self.data[HASH_OFFSET..])
    }

    pub fn version(&self) -> u16 {
        LittleEndian::read_u16(&self.data[VERSION_OFFSET..])
    }

    #[inline]
    pub fn track_type(&self) -> TrackType8 {
        self.track_type
    }

    pub fn num_tracks(&self) -> u32 {
        LittleEndian::read_u32(&self.data[NUM_TRACKS_OFFSET..])
    }

    pub fn num_samples_per_track(&self) -> u32 {
        LittleEndian::read_u32(&self.data[NUM_SAMPLES_OFFSET..])
    }

    pub fn sample_rate(&self) -> f32 {
        LittleEndian::read_f32(&self.data[SAMPLE_RATE_OFFSET..])
    }

    #[inline]
    pub fn tracks_header(&self) -> &TracksHeader {
        &self.header
    }

    /// Transform header; `None` for scalar blobs.
    pub fn transform_header(&self) -> Option<TransformTracksHeader> {
        (self.track_type == TrackType8::Qvvf)
            .then(|| TransformTracksHeader::from_bytes(&self.data[TRACKS_HEADER_SIZE..]))
    }

    /// Offset of the first byte after the fixed headers.
    pub(crate) fn body_offset(&self) -> usize {
        match self.track_type {
            TrackType8::Qvvf => TRACKS_HEADER_SIZE + TRANSFORM_HEADER_SIZE,
            _ => TRACKS_HEADER_SIZE,
        }
    }
}
