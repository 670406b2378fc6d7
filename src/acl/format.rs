//! Compressed tracks binary layout constants.

/// Tag identifying a compressed tracks blob.
pub const COMPRESSED_TRACKS_TAG: u32 = 0xac11_ac11;

/// Size of the common tracks header in bytes.
pub const TRACKS_HEADER_SIZE: usize = 32;

/// Size of the transform tracks header that follows it.
pub const TRANSFORM_HEADER_SIZE: usize = 28;

/// Offset of the total blob size (u32).
pub const SIZE_OFFSET: usize = 0;
/// Offset of the CRC-32 of every byte after the hash field (u32).
pub const HASH_OFFSET: usize = 4;
/// Offset of the tag (u32).
pub const TAG_OFFSET: usize = 8;
/// Offset of the version (u16).
pub const VERSION_OFFSET: usize = 12;
/// Offset of the algorithm type (u8).
pub const ALGORITHM_OFFSET: usize = 14;
/// Offset of the track type (u8).
pub const TRACK_TYPE_OFFSET: usize = 15;
/// Offset of the track count (u32).
pub const NUM_TRACKS_OFFSET: usize = 16;
/// Offset of the samples per track (u32).
pub const NUM_SAMPLES_OFFSET: usize = 20;
/// Offset of the sample rate (f32).
pub const SAMPLE_RATE_OFFSET: usize = 24;
/// Offset of the packed format bits (u32).
pub const MISC_OFFSET: usize = 28;

/// First byte covered by the hash.
pub const HASHED_START: usize = TAG_OFFSET;

/// Only uniformly sampled data exists.
pub const ALGORITHM_UNIFORMLY_SAMPLED: u8 = 0;

/// Binary version tags.
pub const VERSION_02_00_00: u16 = 7;
pub const VERSION_02_01_99: u16 = 8;
pub const VERSION_02_01_99_1: u16 = 9;
pub const VERSION_02_01_99_2: u16 = 10;

/// First binary version storing transform default poses.
pub const FIRST_VERSION_WITH_DEFAULT_VALUE: u16 = VERSION_02_01_99;

const ROTATION_FORMAT_SHIFT: u32 = 0;
const TRANSLATION_FORMAT_SHIFT: u32 = 2;
const SCALE_FORMAT_SHIFT: u32 = 4;
const FORMAT_MASK: u32 = 0b11;
const HAS_SCALE_BIT: u32 = 1 << 6;

/// Samples per segment when a clip is split.
pub const IDEAL_SEGMENT_SIZE: u32 = 16;
/// Longest clip kept in a single segment.
pub const MAX_SINGLE_SEGMENT_SIZE: u32 = 31;

/// Pack storage format bits into the misc header field.
#[inline]
pub const fn pack_misc(rotation: u8, translation: u8, scale: u8, has_scale: bool) -> u32 {
    let mut misc = ((rotation as u32) & FORMAT_MASK) << ROTATION_FORMAT_SHIFT
        | ((translation as u32) & FORMAT_MASK) << TRANSLATION_FORMAT_SHIFT
        | ((scale as u32) & FORMAT_MASK) << SCALE_FORMAT_SHIFT;
    if has_scale {
        misc |= HAS_SCALE_BIT;
    }
    misc
}

#[inline]
pub const fn misc_rotation_format(misc: u32) -> u8 {
    ((misc >> ROTATION_FORMAT_SHIFT) & FORMAT_MASK) as u8
}

#[inline]
pub const fn misc_translation_format(misc: u32) -> u8 {
    ((misc >> TRANSLATION_FORMAT_SHIFT) & FORMAT_MASK) as u8
}

#[inline]
pub const fn misc_scale_format(misc: u32) -> u8 {
    ((misc >> SCALE_FORMAT_SHIFT) & FORMAT_MASK) as u8
}

#[inline]
pub const fn misc_has_scale(misc: u32) -> bool {
    misc & HAS_SCALE_BIT != 0
}

/// Number of segments a clip of `num_samples` is split into.
#[inline]
pub const fn num_segments(num_samples: u32) -> u32 {
    if num_samples == 0 {
        0
    } else if num_samples <= MAX_SINGLE_SEGMENT_SIZE {
        1
    } else {
        num_samples.div_ceil(IDEAL_SEGMENT_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_misc_bits() {
        let misc = pack_misc(1, 0, 2, true);
        assert_eq!(misc_rotation_format(misc), 1);
        assert_eq!(misc_translation_format(misc), 0);
        assert_eq!(misc_scale_format(misc), 2);
        assert!(misc_has_scale(misc));
        assert!(!misc_has_scale(pack_misc(0, 0, 0, false)));
    }

    #[test]
    fn test_segments() {
        assert_eq!(num_segments(0), 0);
        assert_eq!(num_segments(1), 1);
        assert_eq!(num_segments(31), 1);
        assert_eq!(num_segments(32), 2);
        assert_eq!(num_segments(33), 3);
    }
}
